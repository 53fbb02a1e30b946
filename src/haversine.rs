//! Haversine cost provider (fallback when no routing collaborator is
//! available).
//!
//! Uses great-circle distance to estimate travel distance and time.
//! Less accurate than a road-network provider (ignores roads) but always
//! available and fully offline; every pair is reachable.

use crate::traits::{CostCell, CostMatrixProvider, TransportError};

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based cost table provider.
///
/// Estimates travel time using straight-line distance and an assumed speed.
/// Useful as a fallback when no directions collaborator is reachable, and
/// as a deterministic provider in tests.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Calculate haversine distance between two points in kilometers.
    fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
        let (lat1, lng1) = from;
        let (lat2, lng2) = to;

        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lng = (lng2 - lng1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    /// Convert distance in km to travel time in seconds.
    fn km_to_seconds(&self, km: f64) -> i32 {
        let hours = km / self.speed_kmh;
        (hours * 3600.0).round() as i32
    }
}

impl CostMatrixProvider for HaversineMatrix {
    fn cost_table(
        &self,
        origins: &[(f64, f64)],
        destinations: &[(f64, f64)],
        _departure: i64,
    ) -> Result<Vec<Vec<CostCell>>, TransportError> {
        let table = origins
            .iter()
            .map(|&from| {
                destinations
                    .iter()
                    .map(|&to| {
                        let km = Self::haversine_km(from, to);
                        CostCell {
                            distance_meters: (km * 1000.0).round() as i32,
                            duration_seconds: self.km_to_seconds(km),
                            reachable: true,
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(table)
    }
}
