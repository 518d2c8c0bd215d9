//! Animation frames.
//!
//! Hand tracking runs at the lowest rate, so its timestamps drive the
//! frame clock. Each frame shows every track at that instant, holding the
//! value of the previous frame when a track has no sample there.

use crate::model::{DeviceType, PoseRecord, Position, Track};
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

/// Positions of the displayed tracks at one timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Frame time, a hand-tracking timestamp.
    pub timestamp: i64,
    /// HMD position.
    pub hmd: Option<Position>,
    /// Right-hand position.
    pub right_hand: Option<Position>,
    /// Left-hand position.
    pub left_hand: Option<Position>,
}

/// Build one frame per distinct hand-tracking timestamp, ascending.
///
/// A track's value is its first record at exactly the frame timestamp,
/// otherwise the value of the previous frame. Tracks never sampled at or
/// before a frame are `None` there.
#[must_use]
pub fn frames(records: &[PoseRecord]) -> Vec<Frame> {
    let clock: BTreeSet<i64> = records
        .iter()
        .filter(|r| r.device_type == DeviceType::HandTracking)
        .map(|r| r.timestamp)
        .collect();

    let mut samples = [BTreeMap::new(), BTreeMap::new(), BTreeMap::new()];
    for record in records {
        let slot = match record.track() {
            Track::Hmd => 0,
            Track::RightHand => 1,
            Track::LeftHand => 2,
            Track::Other => continue,
        };
        samples[slot]
            .entry(record.timestamp)
            .or_insert(record.position);
    }

    let mut held: [Option<Position>; 3] = [None; 3];
    clock
        .into_iter()
        .map(|timestamp| {
            for (value, track) in held.iter_mut().zip(&samples) {
                if let Some(&position) = track.get(&timestamp) {
                    *value = Some(position);
                }
            }
            Frame {
                timestamp,
                hmd: held[0],
                right_hand: held[1],
                left_hand: held[2],
            }
        })
        .collect()
}
