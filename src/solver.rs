//! Tour construction and improvement.
//!
//! A tour is an ordered sequence of location indices, always starting at
//! index 0 (the start location) and visiting every stop index exactly once.
//! The tour is an open path: there is no closing edge back to the start.
//! All costs are read from the duration matrix; distances play no role in
//! ordering.

use tracing::debug;

/// Builds an initial tour with the nearest-neighbor heuristic.
///
/// From the start (index 0), repeatedly appends the unvisited stop with the
/// minimum duration from the current location. Ties break toward the lowest
/// index, so the result is deterministic. Unreachable candidates (sentinel
/// cost) lose every comparison against reachable ones and are only picked
/// when nothing reachable remains; routing problems surface later, at
/// directions assembly.
pub fn nearest_neighbor(durations: &[Vec<i32>]) -> Vec<usize> {
    let n = durations.len();
    let mut tour = Vec::with_capacity(n);
    tour.push(0);

    let mut visited = vec![false; n];
    visited[0] = true;
    let mut current = 0;

    for _ in 1..n {
        let mut best: Option<usize> = None;
        for candidate in 1..n {
            if visited[candidate] {
                continue;
            }
            let closer = match best {
                Some(chosen) => durations[current][candidate] < durations[current][chosen],
                None => true,
            };
            if closer {
                best = Some(candidate);
            }
        }
        if let Some(next) = best {
            tour.push(next);
            visited[next] = true;
            current = next;
        }
    }

    tour
}

/// Total open-path duration of a tour, in seconds.
pub fn tour_duration(tour: &[usize], durations: &[Vec<i32>]) -> i64 {
    tour.windows(2)
        .map(|pair| cost(durations, pair[0], pair[1]))
        .sum()
}

/// Improves a tour with 2-opt local search.
///
/// Scans every position pair 1 <= i < j <= N and reverses the segment
/// [i, j] whenever doing so strictly lowers total duration. Position 0 (the
/// start) never moves. Full passes repeat until a pass adopts no move, or
/// until `max_passes` is reached, in which case the best tour found so far
/// is returned.
///
/// Each candidate is evaluated with an exact O(1) delta. Duration matrices
/// are asymmetric in general, so reversing a segment changes the interior
/// edge directions as well as the two boundary edges; directional prefix
/// sums over the current tour supply the interior term and are refreshed in
/// O(N) after each adopted move.
pub fn two_opt(mut tour: Vec<usize>, durations: &[Vec<i32>], max_passes: usize) -> Vec<usize> {
    let n = tour.len();
    if n < 3 {
        return tour;
    }

    let (mut forward, mut backward) = edge_prefix_sums(&tour, durations);

    for pass in 0..max_passes {
        let mut improved = false;

        for i in 1..n - 1 {
            for j in i + 1..n {
                let delta = reversal_delta(&tour, durations, &forward, &backward, i, j);
                if delta < 0 {
                    tour[i..=j].reverse();
                    (forward, backward) = edge_prefix_sums(&tour, durations);
                    improved = true;
                }
            }
        }

        if !improved {
            debug!(
                passes = pass + 1,
                total_seconds = forward[n - 1],
                "local search converged"
            );
            return tour;
        }
    }

    debug!(
        max_passes,
        total_seconds = forward[n - 1],
        "local search pass cap reached"
    );
    tour
}

/// Exact duration change from reversing tour positions [i, j].
///
/// Removed: the edge into position i and (unless j is last) the edge out of
/// position j. Added: the same boundary edges after reversal. Interior
/// edges contribute their backward-minus-forward directional difference.
fn reversal_delta(
    tour: &[usize],
    durations: &[Vec<i32>],
    forward: &[i64],
    backward: &[i64],
    i: usize,
    j: usize,
) -> i64 {
    let before = tour[i - 1];
    let mut delta = cost(durations, before, tour[j]) - cost(durations, before, tour[i]);

    if let Some(&after) = tour.get(j + 1) {
        delta += cost(durations, tour[i], after) - cost(durations, tour[j], after);
    }

    delta + (backward[j] - backward[i]) - (forward[j] - forward[i])
}

/// Cumulative edge sums along the tour, in both directions.
///
/// `forward[k]` is the duration of the first k edges as traversed;
/// `backward[k]` is the duration of the same edges traversed in reverse.
fn edge_prefix_sums(tour: &[usize], durations: &[Vec<i32>]) -> (Vec<i64>, Vec<i64>) {
    let n = tour.len();
    let mut forward = vec![0i64; n];
    let mut backward = vec![0i64; n];

    for p in 1..n {
        forward[p] = forward[p - 1] + cost(durations, tour[p - 1], tour[p]);
        backward[p] = backward[p - 1] + cost(durations, tour[p], tour[p - 1]);
    }

    (forward, backward)
}

fn cost(durations: &[Vec<i32>], from: usize, to: usize) -> i64 {
    durations[from][to] as i64
}
