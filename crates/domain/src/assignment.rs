// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Itinerary assignment planning for one region.
//!
//! Given the deliverable stops of a region and the current artist roster,
//! this module recomputes which artist delivers which stop. The computation
//! is a pure function of its inputs: derived assignments are cleared up
//! front and rebuilt from scratch, so stale data cannot survive a pass.
//!
//! ## Rules (authoritative)
//!
//! - Stops are visited in slot `(date, time)` order, slot id as the final
//!   deterministic key.
//! - A stop may go to any `(artist, itinerary)` whose window contains the
//!   slot time; windows are half-open `[from, to)`.
//! - Among eligible windows the winner is the artist with the largest gap
//!   since their chronologically-last assignment in this pass. An artist
//!   without a prior assignment has an unbounded gap and always outranks
//!   artists that already have one.
//! - Gap ties are broken by iteration order over artists, then itineraries:
//!   the first encountered wins. With identical windows this degrades to
//!   round-robin in artist declaration order.
//! - A stop with no eligible window stays unassigned in this pass.

use crate::records::{Artist, Assignment};
use crate::types::{GiftId, Region, SchedulePoint, SlotId};

/// A deliverable stop: a reserved slot and the confirmed gift on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateStop {
    /// The reserved slot.
    pub slot_id: SlotId,
    /// The confirmed gift holding the slot.
    pub gift_id: GiftId,
    /// When the delivery happens.
    pub at: SchedulePoint,
}

/// Outcome counts of one planning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssignmentSummary {
    /// Stops placed into an itinerary.
    pub assigned: usize,
    /// Stops no window could take.
    pub unassigned: usize,
}

/// Gap since an artist's previous assignment, used as the fairness metric.
///
/// `Finite` orders by duration; `Unbounded` (no prior assignment) outranks
/// every finite gap. The derived `Ord` relies on that variant order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Gap {
    Finite(time::Duration),
    Unbounded,
}

/// Recomputes the assignments of every itinerary of `region` in place.
///
/// Itineraries of other regions on the same artists are left untouched.
/// Candidates are taken as given; filtering by slot status and gift status
/// is the caller's responsibility.
///
/// # Arguments
///
/// * `region` - The region under redistribution
/// * `candidates` - Deliverable stops in the region, in any order
/// * `artists` - The full artist roster, mutated in place
pub fn plan_itineraries(
    region: &Region,
    candidates: &[CandidateStop],
    artists: &mut [Artist],
) -> AssignmentSummary {
    let mut ordered: Vec<&CandidateStop> = candidates.iter().collect();
    ordered.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.slot_id.cmp(&b.slot_id)));

    // Derived output is disposable: clear this region's assignments before
    // rebuilding so the pass is a pure function of current inputs.
    for artist in &mut *artists {
        for itinerary in &mut artist.itineraries {
            if itinerary.region == *region {
                itinerary.assignments.clear();
            }
        }
    }

    let mut last_assigned: Vec<Option<time::PrimitiveDateTime>> = vec![None; artists.len()];
    let mut summary = AssignmentSummary::default();

    for stop in ordered {
        let winner = select_window(region, stop.at, artists, &last_assigned);

        if let Some((artist_index, itinerary_index)) = winner {
            artists[artist_index].itineraries[itinerary_index]
                .assignments
                .push(Assignment {
                    slot_id: stop.slot_id.clone(),
                    gift_id: stop.gift_id.clone(),
                });
            last_assigned[artist_index] = Some(stop.at.as_datetime());
            summary.assigned += 1;
        } else {
            summary.unassigned += 1;
        }
    }

    summary
}

/// Picks the `(artist, itinerary)` indices that win the given stop, if any
/// window is eligible.
fn select_window(
    region: &Region,
    at: SchedulePoint,
    artists: &[Artist],
    last_assigned: &[Option<time::PrimitiveDateTime>],
) -> Option<(usize, usize)> {
    let mut winner: Option<(usize, usize)> = None;
    let mut winner_gap: Option<Gap> = None;

    for (artist_index, artist) in artists.iter().enumerate() {
        let gap = last_assigned[artist_index]
            .map_or(Gap::Unbounded, |previous| {
                Gap::Finite(at.as_datetime() - previous)
            });

        for (itinerary_index, itinerary) in artist.itineraries.iter().enumerate() {
            if itinerary.region != *region || !itinerary.contains(at) {
                continue;
            }

            // Strictly-greater keeps the first encountered window on ties.
            if winner_gap.is_none_or(|best| gap > best) {
                winner = Some((artist_index, itinerary_index));
                winner_gap = Some(gap);
            }
        }
    }

    winner
}
