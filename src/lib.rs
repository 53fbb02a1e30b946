//! voyager-planner — errand route optimization core.
//!
//! Orders a set of nearby stops into a time-minimal visiting sequence:
//! one batched travel-cost matrix, nearest-neighbor construction, 2-opt
//! improvement, projected arrival times, and a single ordered-waypoint
//! directions request.

pub mod traits;
pub mod matrix;
pub mod solver;
pub mod itinerary;
pub mod planner;
pub mod places;
pub mod google;
pub mod haversine;
