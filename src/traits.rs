//! Core domain traits for the errand route planner.
//!
//! These are intentionally minimal and provider-agnostic. Concrete adapters
//! (Google Maps, haversine estimation) implement them for their own wire
//! formats.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Unique identifier for planner entities.
pub trait Id: Clone + Eq + Hash {}

impl<T> Id for T where T: Clone + Eq + Hash {}

/// A candidate point of interest to be visited.
///
/// Stops are immutable once produced by place discovery; the planner only
/// reorders references to them.
pub trait Stop {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Display name.
    fn name(&self) -> &str;

    /// Human-readable address.
    fn address(&self) -> &str;

    /// Location coordinates (lat, lng).
    fn location(&self) -> (f64, f64);
}

/// Travel mode forwarded to the directions collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
    Transit,
}

/// One origin/destination cell of a batch cost lookup.
///
/// `reachable` is false when the collaborator reported a non-success status
/// for the pair; the metric fields are meaningless in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostCell {
    pub distance_meters: i32,
    pub duration_seconds: i32,
    pub reachable: bool,
}

/// Raw route payload from the directions collaborator.
///
/// The planner does not interpret geometry or steps; the payload is handed
/// back to the caller exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteData(pub serde_json::Value);

/// Transport-level failure from an external collaborator.
#[derive(Debug)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Provides pairwise travel costs for a set of locations in one batch call.
///
/// The response table is indexed in origins x destinations order and must
/// have exactly one cell per ordered pair.
pub trait CostMatrixProvider {
    fn cost_table(
        &self,
        origins: &[(f64, f64)],
        destinations: &[(f64, f64)],
        departure: i64,
    ) -> Result<Vec<Vec<CostCell>>, TransportError>;
}

/// Provides a turn-by-turn route through an ordered list of waypoints.
///
/// Waypoint order must be preserved exactly as given; the collaborator is
/// never asked to re-optimize it.
pub trait DirectionsProvider {
    fn route(
        &self,
        origin: (f64, f64),
        destination: (f64, f64),
        waypoints: &[(f64, f64)],
        mode: TravelMode,
    ) -> Result<RouteData, TransportError>;
}

/// Finds candidate points of interest around a center location.
pub trait PlaceProvider {
    fn nearby(
        &self,
        center: (f64, f64),
        keyword: &str,
        radius_meters: u32,
    ) -> Result<Vec<crate::places::Place>, TransportError>;
}
