//! Engine entry point: one optimization request, start to route.
//!
//! The pipeline runs strictly downward: cost matrices -> nearest-neighbor
//! construction -> 2-opt improvement -> arrival sequencing -> one ordered
//! directions request. Nothing is retained between requests.

use std::fmt;

use tracing::{debug, info};

use crate::itinerary::{self, ItineraryEntry};
use crate::matrix;
use crate::solver;
use crate::traits::{
    CostMatrixProvider, DirectionsProvider, RouteData, Stop, TransportError, TravelMode,
};

#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Maximum number of full 2-opt improvement passes. When the cap is hit
    /// the best tour found so far is kept.
    pub improvement_passes: usize,
    /// Travel mode forwarded to the directions collaborator.
    pub travel_mode: TravelMode,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            improvement_passes: 100,
            travel_mode: TravelMode::Driving,
        }
    }
}

/// Why an optimization request failed, tagged with the stage that failed.
#[derive(Debug)]
pub enum PlanError {
    /// Rejected before any external call: empty stop list or an
    /// out-of-range start coordinate.
    InvalidInput(String),
    /// The batch cost lookup failed at the transport level.
    CostLookup(TransportError),
    /// The final directions request failed. Not retried.
    Directions(TransportError),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::InvalidInput(message) => write!(f, "invalid input: {}", message),
            PlanError::CostLookup(err) => write!(f, "cost lookup failed: {}", err),
            PlanError::Directions(err) => write!(f, "directions request failed: {}", err),
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanError::InvalidInput(_) => None,
            PlanError::CostLookup(err) | PlanError::Directions(err) => Some(err),
        }
    }
}

/// Result of one optimization request.
#[derive(Debug, Clone)]
pub struct TourPlan<Id> {
    /// Stops in final visiting order, each with a projected arrival time.
    pub itinerary: Vec<ItineraryEntry<Id>>,
    /// Raw route payload from the directions collaborator, unchanged.
    pub route: RouteData,
    /// Total travel time along the tour, in seconds.
    pub total_travel_seconds: i64,
}

/// Computes an optimized visiting order, timed itinerary, and route for the
/// given start location and stops.
///
/// Synchronous from the caller's perspective: returns only once every stage
/// has finished or failed. Requires N >= 1 stops. Individual unreachable
/// pairs are tolerated (see [`matrix::UNREACHABLE`]); only a transport-level
/// failure of the batch cost lookup or of the single directions call fails
/// the request. No partial result is ever returned and nothing is retried.
pub fn plan<S, M, D>(
    start: (f64, f64),
    stops: &[S],
    departure: i64,
    costs: &M,
    directions: &D,
    options: PlanOptions,
) -> Result<TourPlan<S::Id>, PlanError>
where
    S: Stop,
    M: CostMatrixProvider,
    D: DirectionsProvider,
{
    if stops.is_empty() {
        return Err(PlanError::InvalidInput("stop list is empty".to_string()));
    }
    let (lat, lng) = start;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(PlanError::InvalidInput(format!(
            "start location out of range: ({}, {})",
            lat, lng
        )));
    }

    info!(stops = stops.len(), departure, "planning route");

    let matrices =
        matrix::build(start, stops, departure, costs).map_err(PlanError::CostLookup)?;

    let initial = solver::nearest_neighbor(&matrices.durations);
    let tour = solver::two_opt(initial, &matrices.durations, options.improvement_passes);
    let total_travel_seconds = solver::tour_duration(&tour, &matrices.durations);
    debug!(total_travel_seconds, "tour finalized");

    let entries = itinerary::sequence(&tour, stops, &matrices.durations, departure);

    // Last stop is the destination; everything before it rides along as
    // ordered waypoints which the collaborator must not reorder.
    let ordered: Vec<(f64, f64)> = entries.iter().map(|entry| entry.location).collect();
    let destination = ordered[ordered.len() - 1];
    let waypoints = &ordered[..ordered.len() - 1];

    let route = directions
        .route(start, destination, waypoints, options.travel_mode)
        .map_err(PlanError::Directions)?;

    Ok(TourPlan {
        itinerary: entries,
        route,
        total_travel_seconds,
    })
}
