//! Value types carried by pose records.

use alloc::string::String;
use core::fmt;

/// Source label of head-mounted display records.
pub const HMD_LABEL: &str = "DEVICE_TYPE_HMD";

/// Source label of hand-tracking records.
pub const HAND_TRACKING_LABEL: &str = "DEVICE_TYPE_HAND_TRACKING";

/// Tracking device that produced a record.
///
/// Labels other than the two known ones are kept verbatim rather than
/// rejected, so tabular output can echo them unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceType {
    /// Head-mounted display (`DEVICE_TYPE_HMD`).
    Hmd,
    /// Hand tracking (`DEVICE_TYPE_HAND_TRACKING`).
    HandTracking,
    /// Any other label, as written in the log.
    Unknown(String),
}

impl DeviceType {
    /// Classify a `deviceType` label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            HMD_LABEL => Self::Hmd,
            HAND_TRACKING_LABEL => Self::HandTracking,
            other => Self::Unknown(other.into()),
        }
    }

    /// The label as it appears in the log.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hmd => HMD_LABEL,
            Self::HandTracking => HAND_TRACKING_LABEL,
            Self::Unknown(label) => label,
        }
    }

    /// Check if this is a recognized device.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hand laterality of a hand-tracking record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hand {
    /// `HAND_LEFT`
    Left,
    /// `HAND_RIGHT`
    Right,
}

impl Hand {
    /// Parse a `hand` label. Returns `None` for anything but
    /// `HAND_LEFT` / `HAND_RIGHT`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "HAND_LEFT" => Some(Self::Left),
            "HAND_RIGHT" => Some(Self::Right),
            _ => None,
        }
    }

    /// The label as it appears in the log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "HAND_LEFT",
            Self::Right => "HAND_RIGHT",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position in the device's reference frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate (vertical in the source frame).
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Position {
    /// Origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Components as `[x, y, z]`.
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Orientation quaternion. Not normalized by the parser.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Orientation {
    /// Scalar part.
    pub w: f64,
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Orientation {
    /// All-zero quaternion, the state before any record is seen.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a new orientation.
    #[must_use]
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Components as `[w, x, y, z]`.
    #[must_use]
    pub const fn to_array(self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }
}

/// Independent pose trajectory within a log.
///
/// Used for per-track carry-forward and for timeline sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Track {
    /// Head-mounted display.
    Hmd,
    /// Left hand.
    LeftHand,
    /// Right hand.
    RightHand,
    /// Unknown devices and hand records without laterality.
    Other,
}

impl Track {
    /// All tracks, in slot order.
    pub const ALL: [Self; 4] = [Self::Hmd, Self::LeftHand, Self::RightHand, Self::Other];

    /// Track of a record with the given device and hand.
    #[must_use]
    pub fn of(device_type: &DeviceType, hand: Option<Hand>) -> Self {
        match (device_type, hand) {
            (DeviceType::Hmd, _) => Self::Hmd,
            (DeviceType::HandTracking, Some(Hand::Left)) => Self::LeftHand,
            (DeviceType::HandTracking, Some(Hand::Right)) => Self::RightHand,
            _ => Self::Other,
        }
    }

    /// Slot index in [`Track::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Hmd => 0,
            Self::LeftHand => 1,
            Self::RightHand => 2,
            Self::Other => 3,
        }
    }
}
