//! Arrival-time sequencing for a finalized tour.

use crate::traits::Stop;

/// One stop of the finalized itinerary, with its projected arrival time.
///
/// Entries preserve tour order exactly: entry i corresponds to tour
/// position i + 1 (position 0 is the start, which gets no entry).
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryEntry<Id> {
    pub stop_id: Id,
    pub location: (f64, f64),
    /// Projected arrival, unix epoch seconds.
    pub arrival_time: i64,
}

/// Walks the tour and stamps a projected arrival time on each stop.
///
/// A running clock starts at `departure` and advances by the duration-matrix
/// entry from the current location to the next. Timestamps are
/// non-decreasing; the last equals `departure` plus the total tour duration.
pub fn sequence<S: Stop>(
    tour: &[usize],
    stops: &[S],
    durations: &[Vec<i32>],
    departure: i64,
) -> Vec<ItineraryEntry<S::Id>> {
    let mut entries = Vec::with_capacity(tour.len().saturating_sub(1));
    let mut clock = departure;
    let mut current = 0;

    for &next in &tour[1..] {
        clock += durations[current][next] as i64;
        let stop = &stops[next - 1];
        entries.push(ItineraryEntry {
            stop_id: stop.id().clone(),
            location: stop.location(),
            arrival_time: clock,
        });
        current = next;
    }

    entries
}
