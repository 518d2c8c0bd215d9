//! Tabular views of a pose stream.
//!
//! Downstream tools consume poses as flat rows with the column layout of
//! [`COLUMNS`], usually split per device and hand. Axis conventions differ
//! between consumers, so the parser never reorders axes itself; an
//! [`AxisMapping`] is applied on the way out.

use crate::model::{DeviceType, Hand, Orientation, PoseRecord, Position};
use alloc::vec::Vec;
use core::fmt;

/// Column names, in order.
pub const COLUMNS: [&str; 10] = [
    "recordTimeStamp",
    "deviceType",
    "hand",
    "x_pos",
    "y_pos",
    "z_pos",
    "w_ori",
    "x_ori",
    "y_ori",
    "z_ori",
];

/// Source axis of a position component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Source `x`.
    X,
    /// Source `y`.
    Y,
    /// Source `z`.
    Z,
}

impl Axis {
    const fn pick(self, position: Position) -> f64 {
        match self {
            Self::X => position.x,
            Self::Y => position.y,
            Self::Z => position.z,
        }
    }
}

/// Position axis convention for output.
///
/// Output axis `i` reads source axis `sources[i]`, negated when `flip[i]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisMapping {
    /// Source axis feeding each output axis.
    pub sources: [Axis; 3],
    /// Sign flip per output axis.
    pub flip: [bool; 3],
}

impl AxisMapping {
    /// Positions as logged.
    pub const IDENTITY: Self = Self {
        sources: [Axis::X, Axis::Y, Axis::Z],
        flip: [false; 3],
    };

    /// Log `z` forward as `x`, log `x` as `y`, log `y` up as `z`.
    pub const FORWARD_Z_UP_Y: Self = Self {
        sources: [Axis::Z, Axis::X, Axis::Y],
        flip: [false; 3],
    };

    /// Map one position.
    #[must_use]
    pub fn apply(&self, position: Position) -> Position {
        let axis = |i: usize| {
            let value = self.sources[i].pick(position);
            if self.flip[i] { -value } else { value }
        };
        Position::new(axis(0), axis(1), axis(2))
    }
}

impl Default for AxisMapping {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One table row, borrowing its device label from the record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseRow<'a> {
    /// `recordTimeStamp`.
    pub timestamp: i64,
    /// `deviceType`, as written in the log.
    pub device_type: &'a str,
    /// `hand`; empty for non-hand records.
    pub hand: Option<Hand>,
    /// `x_pos`, `y_pos`, `z_pos`.
    pub position: Position,
    /// `w_ori`, `x_ori`, `y_ori`, `z_ori`.
    pub orientation: Orientation,
}

impl<'a> PoseRow<'a> {
    /// Row for `record`, axes as logged.
    #[must_use]
    pub fn from_record(record: &'a PoseRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            device_type: record.device_type.as_str(),
            hand: record.hand,
            position: record.position,
            orientation: record.orientation,
        }
    }

    /// Same row with its position remapped.
    #[must_use]
    pub fn mapped(self, mapping: &AxisMapping) -> Self {
        Self {
            position: mapping.apply(self.position),
            ..self
        }
    }

    /// Write the row as one CSV line, without the line terminator.
    ///
    /// # Errors
    ///
    /// Propagates writer errors.
    pub fn write_csv<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{},", self.timestamp)?;
        write_field(out, self.device_type)?;
        out.write_char(',')?;
        if let Some(hand) = self.hand {
            out.write_str(hand.as_str())?;
        }
        let [x, y, z] = self.position.to_array();
        let [qw, qx, qy, qz] = self.orientation.to_array();
        for value in [x, y, z, qw, qx, qy, qz] {
            write!(out, ",{value:?}")?;
        }
        Ok(())
    }
}

/// Rows for every record, in stream order.
pub fn rows(records: &[PoseRecord]) -> impl Iterator<Item = PoseRow<'_>> {
    records.iter().map(PoseRow::from_record)
}

/// Write a header line and one line per record.
///
/// # Errors
///
/// Propagates writer errors.
pub fn write_csv<W: fmt::Write>(
    records: &[PoseRecord],
    mapping: &AxisMapping,
    out: &mut W,
) -> fmt::Result {
    for (i, column) in COLUMNS.iter().enumerate() {
        if i > 0 {
            out.write_char(',')?;
        }
        out.write_str(column)?;
    }
    out.write_char('\n')?;
    for row in rows(records) {
        row.mapped(mapping).write_csv(out)?;
        out.write_char('\n')?;
    }
    Ok(())
}

/// Quote a cell if it would otherwise break the line.
fn write_field<W: fmt::Write>(out: &mut W, text: &str) -> fmt::Result {
    if !text.contains([',', '"', '\n', '\r']) {
        return out.write_str(text);
    }
    out.write_char('"')?;
    for c in text.chars() {
        if c == '"' {
            out.write_char('"')?;
        }
        out.write_char(c)?;
    }
    out.write_char('"')
}

/// Records split by device and hand.
///
/// Records of unknown devices, and hand-tracking records without a
/// recognized hand, appear in none of the lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceSplit<'a> {
    /// `DEVICE_TYPE_HMD` records.
    pub hmd: Vec<&'a PoseRecord>,
    /// `DEVICE_TYPE_HAND_TRACKING` records with `HAND_LEFT`.
    pub left_hand: Vec<&'a PoseRecord>,
    /// `DEVICE_TYPE_HAND_TRACKING` records with `HAND_RIGHT`.
    pub right_hand: Vec<&'a PoseRecord>,
}

/// Split records by device, then by hand, keeping stream order.
#[must_use]
pub fn split_by_device(records: &[PoseRecord]) -> DeviceSplit<'_> {
    let mut split = DeviceSplit::default();
    for record in records {
        match (&record.device_type, record.hand) {
            (DeviceType::Hmd, _) => split.hmd.push(record),
            (DeviceType::HandTracking, Some(Hand::Left)) => split.left_hand.push(record),
            (DeviceType::HandTracking, Some(Hand::Right)) => split.right_hand.push(record),
            _ => {}
        }
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    fn record(device_type: DeviceType, hand: Option<Hand>, position: Position) -> PoseRecord {
        PoseRecord {
            timestamp: 10,
            device_type,
            hand,
            position,
            orientation: Orientation::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    #[test]
    fn test_csv_layout() {
        let records = [
            record(DeviceType::Hmd, None, Position::new(1.0, 2.0, 3.0)),
            record(
                DeviceType::HandTracking,
                Some(Hand::Left),
                Position::new(0.5, -0.25, 0.0),
            ),
        ];
        let mut out = String::new();
        write_csv(&records, &AxisMapping::IDENTITY, &mut out).unwrap();

        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("recordTimeStamp,deviceType,hand,x_pos,y_pos,z_pos,w_ori,x_ori,y_ori,z_ori")
        );
        assert_eq!(
            lines.next(),
            Some("10,DEVICE_TYPE_HMD,,1.0,2.0,3.0,1.0,0.0,0.0,0.0")
        );
        assert_eq!(
            lines.next(),
            Some("10,DEVICE_TYPE_HAND_TRACKING,HAND_LEFT,0.5,-0.25,0.0,1.0,0.0,0.0,0.0")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_quotes_odd_device_labels() {
        let records = [record(
            DeviceType::Unknown("A,\"B\"".into()),
            None,
            Position::ZERO,
        )];
        let mut out = String::new();
        write_csv(&records, &AxisMapping::IDENTITY, &mut out).unwrap();
        assert!(out.lines().nth(1).unwrap().starts_with("10,\"A,\"\"B\"\"\",,"));
    }

    #[test]
    fn test_forward_z_up_y_mapping() {
        let mapped = AxisMapping::FORWARD_Z_UP_Y.apply(Position::new(1.0, 2.0, 3.0));
        assert_eq!(mapped, Position::new(3.0, 1.0, 2.0));

        let flipped = AxisMapping {
            flip: [false, true, false],
            ..AxisMapping::IDENTITY
        };
        assert_eq!(
            flipped.apply(Position::new(1.0, 2.0, 3.0)),
            Position::new(1.0, -2.0, 3.0)
        );
    }

    #[test]
    fn test_row_mapping_leaves_orientation() {
        let source = record(DeviceType::Hmd, None, Position::new(1.0, 2.0, 3.0));
        let row = PoseRow::from_record(&source).mapped(&AxisMapping::FORWARD_Z_UP_Y);
        assert_eq!(row.position, Position::new(3.0, 1.0, 2.0));
        assert_eq!(row.orientation, source.orientation);
        assert_eq!(row.device_type, "DEVICE_TYPE_HMD");
    }

    #[test]
    fn test_split_by_device() {
        let records = [
            record(DeviceType::Hmd, None, Position::ZERO),
            record(DeviceType::HandTracking, Some(Hand::Right), Position::ZERO),
            record(DeviceType::HandTracking, Some(Hand::Left), Position::ZERO),
            record(DeviceType::HandTracking, None, Position::ZERO),
            record(DeviceType::Unknown("X".into()), None, Position::ZERO),
            record(DeviceType::Hmd, None, Position::ZERO),
        ];
        let split = split_by_device(&records);

        assert_eq!(split.hmd.len(), 2);
        assert_eq!(split.left_hand.len(), 1);
        assert_eq!(split.right_hand.len(), 1);
        assert!(core::ptr::eq(split.right_hand[0], &records[1]));
    }
}
