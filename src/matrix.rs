//! Travel-cost matrix construction.
//!
//! One batch lookup covers every ordered pair among the start location and
//! all stops, so a request costs O(1) collaborator calls regardless of stop
//! count.

use tracing::debug;

use crate::traits::{CostMatrixProvider, Stop, TransportError};

/// Sentinel cost for pairs the collaborator reported as unroutable.
///
/// Heuristics must never prefer a sentinel cell while any reachable
/// alternative exists. Sums over tours are carried in i64 so sentinel
/// entries cannot overflow.
pub const UNREACHABLE: i32 = i32::MAX;

/// Pairwise travel metrics for the start location and all stops.
///
/// Row/column 0 is the start; rows/columns 1..N follow the input stop
/// order. Durations are seconds, distances meters.
#[derive(Debug, Clone)]
pub struct CostMatrices {
    pub durations: Vec<Vec<i32>>,
    pub distances: Vec<Vec<i32>>,
}

impl CostMatrices {
    /// Number of locations covered (stops + 1 for the start).
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

/// Builds duration and distance matrices for the start and all stops.
///
/// Performs exactly one batch cost lookup. A pair the collaborator marks
/// non-routable becomes [`UNREACHABLE`] in both matrices; a transport-level
/// failure or a misshapen table fails the whole build.
pub fn build<S: Stop>(
    start: (f64, f64),
    stops: &[S],
    departure: i64,
    provider: &impl CostMatrixProvider,
) -> Result<CostMatrices, TransportError> {
    let mut locations = Vec::with_capacity(stops.len() + 1);
    locations.push(start);
    locations.extend(stops.iter().map(|stop| stop.location()));

    let table = provider.cost_table(&locations, &locations, departure)?;

    let n = locations.len();
    if table.len() != n || table.iter().any(|row| row.len() != n) {
        return Err(TransportError::new(format!(
            "cost table shape mismatch: expected {}x{}, got {} rows",
            n,
            n,
            table.len()
        )));
    }

    let mut durations = vec![vec![0; n]; n];
    let mut distances = vec![vec![0; n]; n];
    let mut unreachable_pairs = 0usize;

    for (i, row) in table.iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            if i == j {
                continue;
            }
            if cell.reachable {
                durations[i][j] = cell.duration_seconds;
                distances[i][j] = cell.distance_meters;
            } else {
                durations[i][j] = UNREACHABLE;
                distances[i][j] = UNREACHABLE;
                unreachable_pairs += 1;
            }
        }
    }

    debug!(locations = n, unreachable_pairs, "cost matrices built");

    Ok(CostMatrices {
        durations,
        distances,
    })
}
