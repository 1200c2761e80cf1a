// ABOUTME: Conversion between bounded slot/set lists and their fixed-capacity persisted arrays
// ABOUTME: Slots tolerate holes; sets end at the first absent repetition value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Fixed-capacity array codec
//!
//! Routines persist ten slot positions and routine details persist ten set
//! positions. In memory both are [`BoundedList`](routine_core::models::BoundedList)s:
//!
//! - slots keep their positions, so an empty position in the middle of the
//!   array is a hole and decoding continues past it
//! - sets are contiguous, so the first position without a repetition value
//!   ends the sequence
//!
//! The arrays are stored as JSON text columns.

use routine_core::constants::limits::{SET_CAPACITY, SLOT_CAPACITY};
use routine_core::models::{DetailId, PerformedSet, SetList, SlotList, SlotRef};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Persisted slot positions; `None` or a zero id marks an empty slot
pub type RawSlotArray = [Option<DetailId>; SLOT_CAPACITY];

/// Persisted set positions
pub type RawSetArray = [Option<RawSet>; SET_CAPACITY];

/// One persisted set position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSet {
    /// Repetition value; absent terminates the set sequence
    pub repetitions: Option<u32>,
    /// Weight; absent for bodyweight exercises
    pub weight: Option<f64>,
}

/// Every occupied slot, in position order
#[must_use]
pub fn decode_slots(raw: &RawSlotArray) -> SlotList {
    raw.iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            entry
                .filter(|id| id.get() != 0)
                .map(|detail_id| SlotRef {
                    position,
                    detail_id,
                })
        })
        .collect()
}

/// Place each slot at its position
///
/// # Errors
///
/// Returns `InvalidPosition` if a slot position is outside the routine
pub fn encode_slots(slots: &[SlotRef]) -> AppResult<RawSlotArray> {
    let mut raw: RawSlotArray = [None; SLOT_CAPACITY];
    for slot in slots {
        set_slot(&mut raw, slot.position, Some(slot.detail_id))?;
    }
    Ok(raw)
}

/// Write exactly one slot position
///
/// # Errors
///
/// Returns `InvalidPosition` if `position` is outside `0..SLOT_CAPACITY`
pub fn set_slot(
    raw: &mut RawSlotArray,
    position: usize,
    detail_id: Option<DetailId>,
) -> AppResult<()> {
    let slot = raw
        .get_mut(position)
        .ok_or_else(|| AppError::invalid_position(position, SLOT_CAPACITY))?;
    *slot = detail_id;
    Ok(())
}

/// Logged sets up to the first absent repetition value
#[must_use]
pub fn decode_sets(raw: &RawSetArray) -> SetList {
    raw.iter()
        .map_while(|entry| match entry {
            Some(RawSet {
                repetitions: Some(repetitions),
                weight,
            }) => Some(PerformedSet::new(*repetitions, *weight)),
            _ => None,
        })
        .collect()
}

/// Lay sets out from position 0, leaving the rest absent
///
/// # Errors
///
/// Returns `CapacityExceeded` if more than `SET_CAPACITY` sets are given
pub fn encode_sets(sets: &[PerformedSet]) -> AppResult<RawSetArray> {
    if sets.len() > SET_CAPACITY {
        return Err(AppError::capacity_exceeded(
            "Routine detail sets",
            sets.len(),
            SET_CAPACITY,
        ));
    }
    let mut raw: RawSetArray = [None; SET_CAPACITY];
    for (slot, set) in raw.iter_mut().zip(sets) {
        *slot = Some(RawSet {
            repetitions: Some(set.repetitions),
            weight: set.weight,
        });
    }
    Ok(raw)
}

/// Parse a persisted slot column
///
/// Shorter arrays are padded with empty slots.
///
/// # Errors
///
/// Returns an error if the text is not a JSON array of at most `SLOT_CAPACITY` ids
pub fn slots_from_json(text: &str) -> AppResult<RawSlotArray> {
    let entries: Vec<Option<DetailId>> = serde_json::from_str(text)?;
    if entries.len() > SLOT_CAPACITY {
        return Err(AppError::capacity_exceeded(
            "Routine slots",
            entries.len(),
            SLOT_CAPACITY,
        ));
    }
    let mut raw: RawSlotArray = [None; SLOT_CAPACITY];
    for (slot, entry) in raw.iter_mut().zip(entries) {
        *slot = entry;
    }
    Ok(raw)
}

/// Serialize a slot array for storage
///
/// # Errors
///
/// Returns an error if serialization fails
pub fn slots_to_json(raw: &RawSlotArray) -> AppResult<String> {
    Ok(serde_json::to_string(raw)?)
}

/// Parse a persisted set column
///
/// Shorter arrays are padded with absent sets.
///
/// # Errors
///
/// Returns an error if the text is not a JSON array of at most `SET_CAPACITY` sets
pub fn sets_from_json(text: &str) -> AppResult<RawSetArray> {
    let entries: Vec<Option<RawSet>> = serde_json::from_str(text)?;
    if entries.len() > SET_CAPACITY {
        return Err(AppError::capacity_exceeded(
            "Routine detail sets",
            entries.len(),
            SET_CAPACITY,
        ));
    }
    let mut raw: RawSetArray = [None; SET_CAPACITY];
    for (slot, entry) in raw.iter_mut().zip(entries) {
        *slot = entry;
    }
    Ok(raw)
}

/// Serialize a set array for storage
///
/// # Errors
///
/// Returns an error if serialization fails
pub fn sets_to_json(raw: &RawSetArray) -> AppResult<String> {
    Ok(serde_json::to_string(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use routine_core::errors::ErrorCode;

    fn sample_sets(count: usize) -> Vec<PerformedSet> {
        (0..count)
            .map(|i| PerformedSet::new(8 + i as u32, (i % 3 != 0).then_some(20.0 + i as f64)))
            .collect()
    }

    #[test]
    fn test_decode_slots_skips_holes_and_zero_ids() {
        let mut raw: RawSlotArray = [None; SLOT_CAPACITY];
        raw[0] = Some(DetailId(11));
        raw[2] = Some(DetailId(0));
        raw[3] = Some(DetailId(14));
        raw[9] = Some(DetailId(19));

        let slots = decode_slots(&raw);
        let positions: Vec<usize> = slots.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 3, 9]);
        assert_eq!(slots[1].detail_id, DetailId(14));
    }

    #[test]
    fn test_slot_positions_survive_encoding() {
        let mut raw: RawSlotArray = [None; SLOT_CAPACITY];
        raw[1] = Some(DetailId(4));
        raw[7] = Some(DetailId(5));
        let encoded = encode_slots(&decode_slots(&raw)).unwrap();
        assert_eq!(encoded, raw);
    }

    #[test]
    fn test_set_slot_rejects_out_of_range_position() {
        let mut raw: RawSlotArray = [None; SLOT_CAPACITY];
        let error = set_slot(&mut raw, SLOT_CAPACITY, Some(DetailId(1))).unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidPosition);
        assert_eq!(raw, [None; SLOT_CAPACITY]);
    }

    #[test]
    fn test_sets_round_trip_for_every_length() {
        for count in 0..=SET_CAPACITY {
            let sets = sample_sets(count);
            let decoded = decode_sets(&encode_sets(&sets).unwrap());
            assert_eq!(&*decoded, sets.as_slice(), "length {count}");
        }
    }

    #[test]
    fn test_first_absent_repetition_terminates_sets() {
        let mut raw = encode_sets(&sample_sets(5)).unwrap();
        raw[2] = Some(RawSet {
            repetitions: None,
            weight: Some(40.0),
        });
        assert_eq!(decode_sets(&raw).len(), 2);

        raw[2] = None;
        assert_eq!(decode_sets(&raw).len(), 2);
    }

    #[test]
    fn test_encode_sets_rejects_overflow() {
        let error = encode_sets(&sample_sets(SET_CAPACITY + 1)).unwrap_err();
        assert_eq!(error.code, ErrorCode::CapacityExceeded);
    }

    #[test]
    fn test_json_columns_pad_short_arrays() {
        let raw = slots_from_json("[3, null, 5]").unwrap();
        assert_eq!(raw[0], Some(DetailId(3)));
        assert_eq!(raw[2], Some(DetailId(5)));
        assert!(raw[3..].iter().all(Option::is_none));

        let sets = sets_from_json(r#"[{"repetitions":10,"weight":50.0}]"#).unwrap();
        assert_eq!(decode_sets(&sets).len(), 1);

        let error = slots_from_json("[1,2,3,4,5,6,7,8,9,10,11]").unwrap_err();
        assert_eq!(error.code, ErrorCode::CapacityExceeded);
        assert_eq!(
            slots_from_json("not json").unwrap_err().code,
            ErrorCode::SerializationError
        );
    }
}
