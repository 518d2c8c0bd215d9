//! Record extraction.
//!
//! Turns the untyped [`RawBlock`] of one chunk into a [`PoseRecord`]:
//!
//! ```text
//! Log text → Chunks → Lexer → Parser → RawBlock → [Extractor] → PoseStream
//!                                                  ^^^^^^^^^^^
//!                                                  This module
//! ```
//!
//! Rules, in order:
//!
//! 1. `recordTimeStamp` (or `recordTimestamp`) is the timestamp; absent
//!    means 0.
//! 2. `deviceType` is required. A chunk without it is not a record.
//! 3. Pose data comes from `handPose` if present, else `pose`. A hand pose
//!    only contributes when its `key` is [`PRIMARY_JOINT_KEY`], and only its
//!    own `position` / `orientation` children are read: nested `joints`
//!    blocks are never looked at.
//! 4. Whatever the chunk does not supply is carried forward from
//!    [`CarryState`]. The hand vertical offset only applies to a `y` read
//!    from the chunk itself.
//!
//! Numeric fields that do not parse are the only errors.

mod carry;

pub use carry::{Carried, CarryState};

use crate::ast::{RawBlock, Scalar};
use crate::error::{ExtractError, NumberKind};
use crate::lexer::Diagnostic;
use crate::model::{DeviceType, Hand, Orientation, PoseRecord, Position, Track};
use crate::options::{AxisFill, ParseOptions};
use alloc::format;
use alloc::vec::Vec;

/// Field names accepted for the record timestamp. Both spellings occur in
/// exported logs.
pub const TIMESTAMP_KEYS: [&str; 2] = ["recordTimeStamp", "recordTimestamp"];

/// Joint key of the wrist joint, the only hand joint extracted.
pub const PRIMARY_JOINT_KEY: i64 = 1;

/// Where a record's position or orientation came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldSource {
    /// Parsed from the record's own chunk.
    Chunk,
    /// Inherited from an earlier record.
    Carried,
}

/// Result of extracting one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    /// The record, or `None` if the chunk has no `deviceType`.
    pub record: Option<PoseRecord>,
    /// Carry state for the next chunk. Unchanged when `record` is `None`.
    pub state: CarryState,
    /// Origin of the record's position.
    pub position_source: FieldSource,
    /// Origin of the record's orientation.
    pub orientation_source: FieldSource,
    /// Non-fatal findings (unrecognized hand labels).
    pub diagnostics: Vec<Diagnostic>,
}

/// Pose-bearing block selected from a chunk.
struct PoseBlock<'a> {
    block: &'a RawBlock,
    /// Field name, used as the path prefix in errors.
    name: &'static str,
    hand: Option<Hand>,
    /// Whether this block's position and orientation may be read.
    contributes: bool,
    is_hand: bool,
}

/// Extract the record of chunk `chunk` from its parsed block.
///
/// # Errors
///
/// Returns an [`ExtractError`] naming the chunk and field when a timestamp,
/// joint key, coordinate or quaternion component is not a number. Numeric
/// fields are validated even in chunks that end up dropped.
pub fn extract(
    block: &RawBlock,
    chunk: usize,
    state: CarryState,
    options: &ParseOptions,
) -> Result<Extraction, ExtractError> {
    let mut diagnostics = Vec::new();

    let timestamp = match block.get_any(&TIMESTAMP_KEYS) {
        Some(field) => match field.value.as_scalar() {
            Some(scalar) => parse_int(scalar, chunk, &field.key.name)?,
            None => 0,
        },
        None => 0,
    };

    let device_type = block
        .scalar("deviceType")
        .map(|s| DeviceType::from_label(s.as_str()));

    let pose = select_pose(block, chunk, &mut diagnostics)?;
    let hand = pose.as_ref().and_then(|p| p.hand);
    let track = device_type
        .as_ref()
        .map_or(Track::Other, |d| Track::of(d, hand));
    let previous = state.previous(track);

    let mut position = previous.position;
    let mut orientation = previous.orientation;
    let mut position_source = FieldSource::Carried;
    let mut orientation_source = FieldSource::Carried;

    if let Some(pose) = pose.as_ref().filter(|p| p.contributes) {
        if let Some(block) = pose.block.block("position") {
            let base = match options.axis_fill {
                AxisFill::CarryForward => previous.position,
                AxisFill::Zero => Position::ZERO,
            };
            position = read_position(block, base, chunk, pose.name)?;
            if pose.is_hand && block.scalar("y").is_some() {
                position.y += options.hand_vertical_offset;
            }
            position_source = FieldSource::Chunk;
        }
        if let Some(block) = pose.block.block("orientation") {
            let base = match options.axis_fill {
                AxisFill::CarryForward => previous.orientation,
                AxisFill::Zero => Orientation::ZERO,
            };
            orientation = read_orientation(block, base, chunk, pose.name)?;
            orientation_source = FieldSource::Chunk;
        }
    }

    let record = device_type.map(|device_type| PoseRecord {
        timestamp,
        device_type,
        hand,
        position,
        orientation,
    });
    let state = match &record {
        Some(record) => state.advanced(record),
        None => state,
    };

    Ok(Extraction {
        record,
        state,
        position_source,
        orientation_source,
        diagnostics,
    })
}

/// Pick the pose-bearing block of a chunk, reading hand metadata.
fn select_pose<'a>(
    block: &'a RawBlock,
    chunk: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Option<PoseBlock<'a>>, ExtractError> {
    if let Some(hand_pose) = block.block("handPose") {
        let hand = match hand_pose.scalar("hand") {
            Some(label) => {
                let hand = Hand::from_label(label.as_str());
                if hand.is_none() {
                    diagnostics.push(Diagnostic::warning(
                        label.span,
                        format!("unrecognized hand `{}`", label.as_str()),
                    ));
                }
                hand
            }
            None => None,
        };
        let key = hand_pose
            .scalar("key")
            .map(|s| parse_int(s, chunk, "handPose.key"))
            .transpose()?;

        return Ok(Some(PoseBlock {
            block: hand_pose,
            name: "handPose",
            hand,
            contributes: key == Some(PRIMARY_JOINT_KEY),
            is_hand: true,
        }));
    }

    Ok(block.block("pose").map(|pose| PoseBlock {
        block: pose,
        name: "pose",
        hand: None,
        contributes: true,
        is_hand: false,
    }))
}

/// Read `{x, y, z}` over `base`.
fn read_position(
    block: &RawBlock,
    base: Position,
    chunk: usize,
    prefix: &str,
) -> Result<Position, ExtractError> {
    let axis = |name: &str, fallback: f64| -> Result<f64, ExtractError> {
        match block.scalar(name) {
            Some(s) => parse_float(s, chunk, &format!("{prefix}.position.{name}")),
            None => Ok(fallback),
        }
    };
    Ok(Position {
        x: axis("x", base.x)?,
        y: axis("y", base.y)?,
        z: axis("z", base.z)?,
    })
}

/// Read `{w, x, y, z}` over `base`.
fn read_orientation(
    block: &RawBlock,
    base: Orientation,
    chunk: usize,
    prefix: &str,
) -> Result<Orientation, ExtractError> {
    let axis = |name: &str, fallback: f64| -> Result<f64, ExtractError> {
        match block.scalar(name) {
            Some(s) => parse_float(s, chunk, &format!("{prefix}.orientation.{name}")),
            None => Ok(fallback),
        }
    };
    Ok(Orientation {
        w: axis("w", base.w)?,
        x: axis("x", base.x)?,
        y: axis("y", base.y)?,
        z: axis("z", base.z)?,
    })
}

fn parse_int(scalar: &Scalar, chunk: usize, field: &str) -> Result<i64, ExtractError> {
    scalar
        .as_str()
        .parse::<i64>()
        .map_err(|_| invalid(scalar, chunk, field, NumberKind::Integer))
}

fn parse_float(scalar: &Scalar, chunk: usize, field: &str) -> Result<f64, ExtractError> {
    scalar
        .as_str()
        .parse::<f64>()
        .map_err(|_| invalid(scalar, chunk, field, NumberKind::Float))
}

fn invalid(scalar: &Scalar, chunk: usize, field: &str, expected: NumberKind) -> ExtractError {
    ExtractError {
        chunk,
        field: field.into(),
        value: scalar.text.clone(),
        expected,
        span: scalar.span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CarryScope;
    use crate::parser::parse_chunk;

    fn run(source: &str, state: CarryState) -> Result<Extraction, ExtractError> {
        run_with(source, state, &ParseOptions::default())
    }

    fn run_with(
        source: &str,
        state: CarryState,
        options: &ParseOptions,
    ) -> Result<Extraction, ExtractError> {
        let chunk = parse_chunk(source);
        extract(&chunk.root, 0, state, options)
    }

    /// State whose carried pose is easy to recognize.
    fn seeded_state() -> CarryState {
        let seed = PoseRecord {
            timestamp: 1,
            device_type: DeviceType::Hmd,
            hand: None,
            position: Position::new(9.0, 8.0, 7.0),
            orientation: Orientation::new(0.5, 0.5, 0.5, 0.5),
        };
        CarryState::default().advanced(&seed)
    }

    #[test]
    fn test_hmd_pose_identity() {
        let out = run(
            "recordTimeStamp: 42
             deviceType: DEVICE_TYPE_HMD
             pose {
               position { x: 1.0 y: 2.0 z: 3.0 }
               orientation { w: 1.0 x: 0.0 y: 0.0 z: 0.0 }
             }",
            CarryState::default(),
        )
        .unwrap();

        let record = out.record.unwrap();
        assert_eq!(record.timestamp, 42);
        assert_eq!(record.device_type, DeviceType::Hmd);
        assert_eq!(record.hand, None);
        assert_eq!(record.position, Position::new(1.0, 2.0, 3.0));
        assert_eq!(record.orientation, Orientation::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(out.position_source, FieldSource::Chunk);
        assert_eq!(out.orientation_source, FieldSource::Chunk);
    }

    #[test]
    fn test_lowercase_timestamp_spelling() {
        let out = run(
            "recordTimestamp: 7 deviceType: DEVICE_TYPE_HMD",
            CarryState::default(),
        )
        .unwrap();
        assert_eq!(out.record.unwrap().timestamp, 7);
    }

    #[test]
    fn test_missing_timestamp_is_zero() {
        let out = run("deviceType: DEVICE_TYPE_HMD", seeded_state()).unwrap();
        assert_eq!(out.record.unwrap().timestamp, 0);
    }

    #[test]
    fn test_missing_pose_carries_forward() {
        let out = run("deviceType: DEVICE_TYPE_HMD", seeded_state()).unwrap();
        let record = out.record.unwrap();
        assert_eq!(record.position, Position::new(9.0, 8.0, 7.0));
        assert_eq!(record.orientation, Orientation::new(0.5, 0.5, 0.5, 0.5));
        assert_eq!(out.position_source, FieldSource::Carried);
    }

    #[test]
    fn test_missing_device_type_is_not_a_record() {
        let state = seeded_state();
        let out = run(
            "recordTimeStamp: 3 pose { position { x: 1 y: 1 z: 1 } }",
            state,
        )
        .unwrap();
        assert!(out.record.is_none());
        assert_eq!(out.state, state);
    }

    #[test]
    fn test_unknown_device_type_is_kept() {
        let out = run("deviceType: DEVICE_TYPE_CONTROLLER", CarryState::default()).unwrap();
        assert_eq!(
            out.record.unwrap().device_type,
            DeviceType::Unknown("DEVICE_TYPE_CONTROLLER".into())
        );
    }

    #[test]
    fn test_per_axis_carry_forward() {
        let out = run(
            "deviceType: DEVICE_TYPE_HMD
             pose { position { y: 1.5 } orientation { w: 1 } }",
            seeded_state(),
        )
        .unwrap();
        let record = out.record.unwrap();
        assert_eq!(record.position, Position::new(9.0, 1.5, 7.0));
        assert_eq!(record.orientation, Orientation::new(1.0, 0.5, 0.5, 0.5));
    }

    #[test]
    fn test_zero_axis_fill() {
        let options = ParseOptions::default().with_axis_fill(AxisFill::Zero);
        let out = run_with(
            "deviceType: DEVICE_TYPE_HMD pose { position { y: 1.5 } }",
            seeded_state(),
            &options,
        )
        .unwrap();
        let record = out.record.unwrap();
        assert_eq!(record.position, Position::new(0.0, 1.5, 0.0));
        // Orientation block absent: still carried whole.
        assert_eq!(record.orientation, Orientation::new(0.5, 0.5, 0.5, 0.5));
    }

    #[test]
    fn test_primary_hand_joint_is_extracted() {
        let out = run(
            "recordTimeStamp: 5
             deviceType: DEVICE_TYPE_HAND_TRACKING
             handPose {
               hand: HAND_RIGHT
               key: 1
               position { x: 0.1 y: 0.2 z: 0.3 }
               orientation { w: 0.9 x: 0.1 y: 0.0 z: 0.0 }
             }",
            CarryState::default(),
        )
        .unwrap();
        let record = out.record.unwrap();
        assert_eq!(record.hand, Some(Hand::Right));
        assert_eq!(record.track(), Track::RightHand);
        assert_eq!(record.position, Position::new(0.1, 0.2, 0.3));
        assert_eq!(record.orientation, Orientation::new(0.9, 0.1, 0.0, 0.0));
    }

    #[test]
    fn test_non_primary_hand_joint_is_filtered() {
        let out = run(
            "deviceType: DEVICE_TYPE_HAND_TRACKING
             handPose {
               hand: HAND_LEFT
               key: 0
               position { x: 5 y: 5 z: 5 }
               orientation { w: 5 x: 5 y: 5 z: 5 }
             }",
            seeded_state(),
        )
        .unwrap();
        let record = out.record.unwrap();
        assert_eq!(record.hand, Some(Hand::Left));
        assert_eq!(record.position, Position::new(9.0, 8.0, 7.0));
        assert_eq!(record.orientation, Orientation::new(0.5, 0.5, 0.5, 0.5));
        assert_eq!(out.position_source, FieldSource::Carried);
    }

    #[test]
    fn test_nested_joints_are_never_read() {
        let out = run(
            "deviceType: DEVICE_TYPE_HAND_TRACKING
             handPose {
               hand: HAND_LEFT
               key: 1
               joints { key: 1 position { x: 5 y: 5 z: 5 } }
             }",
            seeded_state(),
        )
        .unwrap();
        assert_eq!(out.record.unwrap().position, Position::new(9.0, 8.0, 7.0));
    }

    #[test]
    fn test_hand_pose_without_key_is_filtered() {
        let out = run(
            "deviceType: DEVICE_TYPE_HAND_TRACKING
             handPose { hand: HAND_LEFT position { x: 5 y: 5 z: 5 } }",
            seeded_state(),
        )
        .unwrap();
        assert_eq!(out.record.unwrap().position, Position::new(9.0, 8.0, 7.0));
    }

    #[test]
    fn test_hand_vertical_offset() {
        let options = ParseOptions::default().with_hand_vertical_offset(1.6);
        let source = "deviceType: DEVICE_TYPE_HAND_TRACKING
             handPose { hand: HAND_LEFT key: 1 position { x: 0 y: 0.25 z: 0 } }";
        let out = run_with(source, CarryState::default(), &options).unwrap();
        let y = out.record.unwrap().position.y;
        assert!((y - 1.85).abs() < 1e-12);

        // HMD poses and carried values are never offset.
        let out = run_with(
            "deviceType: DEVICE_TYPE_HMD pose { position { y: 0.25 } }",
            CarryState::default(),
            &options,
        )
        .unwrap();
        assert!((out.record.unwrap().position.y - 0.25).abs() < 1e-12);

        let out = run_with(
            "deviceType: DEVICE_TYPE_HAND_TRACKING handPose { hand: HAND_LEFT key: 2 }",
            seeded_state(),
            &options,
        )
        .unwrap();
        assert!((out.record.unwrap().position.y - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_hand_offset_skips_carried_y() {
        let options = ParseOptions::default().with_hand_vertical_offset(1.6);
        let mut state = seeded_state();
        for x in ["0.1", "0.2", "0.3"] {
            let source = format!(
                "deviceType: DEVICE_TYPE_HAND_TRACKING
                 handPose {{ hand: HAND_LEFT key: 1 position {{ x: {x} }} }}"
            );
            let out = run_with(&source, state, &options).unwrap();
            let position = out.record.unwrap().position;
            assert!((position.y - 8.0).abs() < 1e-12);
            assert_eq!(out.position_source, FieldSource::Chunk);
            state = out.state;
        }

        // Zero fill: an absent y is zero, not the offset.
        let options = options.with_axis_fill(AxisFill::Zero);
        let out = run_with(
            "deviceType: DEVICE_TYPE_HAND_TRACKING handPose { hand: HAND_LEFT key: 1 position { x: 0.1 } }",
            seeded_state(),
            &options,
        )
        .unwrap();
        assert_eq!(out.record.unwrap().position.y, 0.0);
    }

    #[test]
    fn test_unknown_hand_label_warns() {
        let out = run(
            "deviceType: DEVICE_TYPE_HAND_TRACKING handPose { hand: HAND_THIRD key: 1 }",
            CarryState::default(),
        )
        .unwrap();
        assert_eq!(out.record.unwrap().hand, None);
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("HAND_THIRD"));
    }

    #[test]
    fn test_hand_pose_preferred_over_pose() {
        let out = run(
            "deviceType: DEVICE_TYPE_HAND_TRACKING
             pose { position { x: 3 } }
             handPose { hand: HAND_RIGHT key: 1 position { x: 4 } }",
            CarryState::default(),
        )
        .unwrap();
        assert_eq!(out.record.unwrap().position.x, 4.0);
    }

    #[test]
    fn test_invalid_float_is_error() {
        let chunk = parse_chunk("deviceType: DEVICE_TYPE_HMD pose { position { x: abc } }");
        let err = extract(&chunk.root, 3, CarryState::default(), &ParseOptions::default())
            .unwrap_err();
        assert_eq!(err.chunk, 3);
        assert_eq!(err.field, "pose.position.x");
        assert_eq!(err.value, "abc");
        assert_eq!(err.expected, NumberKind::Float);
    }

    #[test]
    fn test_invalid_timestamp_is_error() {
        let err = run(
            "recordTimeStamp: soon deviceType: DEVICE_TYPE_HMD",
            CarryState::default(),
        )
        .unwrap_err();
        assert_eq!(err.field, "recordTimeStamp");
        assert_eq!(err.expected, NumberKind::Integer);
    }

    #[test]
    fn test_invalid_joint_key_is_error() {
        let err = run(
            "deviceType: DEVICE_TYPE_HAND_TRACKING handPose { key: one }",
            CarryState::default(),
        )
        .unwrap_err();
        assert_eq!(err.field, "handPose.key");
    }

    #[test]
    fn test_per_track_scope_reads_own_track() {
        let hmd = PoseRecord {
            timestamp: 0,
            device_type: DeviceType::Hmd,
            hand: None,
            position: Position::new(1.0, 1.0, 1.0),
            orientation: Orientation::new(1.0, 0.0, 0.0, 0.0),
        };
        let state = CarryState::new(CarryScope::PerTrack).advanced(&hmd);

        let out = run(
            "deviceType: DEVICE_TYPE_HAND_TRACKING handPose { hand: HAND_LEFT key: 0 }",
            state,
        )
        .unwrap();
        assert_eq!(out.record.unwrap().position, Position::ZERO);

        let out = run("deviceType: DEVICE_TYPE_HMD", state).unwrap();
        assert_eq!(out.record.unwrap().position, Position::new(1.0, 1.0, 1.0));
    }
}
