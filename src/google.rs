//! Google Maps HTTP adapters for cost lookup, directions, and place search.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::places::Place;
use crate::traits::{
    CostCell, CostMatrixProvider, DirectionsProvider, PlaceProvider, RouteData, TransportError,
    TravelMode,
};

#[derive(Debug, Clone)]
pub struct GoogleMapsConfig {
    /// API key, injected explicitly rather than read from the environment.
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Upper bound on concurrent outbound requests across all optimization
    /// requests sharing this client.
    pub max_in_flight: usize,
}

impl GoogleMapsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            timeout_secs: 10,
            max_in_flight: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    config: GoogleMapsConfig,
    client: reqwest::blocking::Client,
    gate: Arc<RequestGate>,
}

impl GoogleMapsClient {
    pub fn new(config: GoogleMapsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let gate = Arc::new(RequestGate::new(config.max_in_flight.max(1)));

        Ok(Self {
            config,
            client,
            gate,
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let _permit = self.gate.acquire();
        let response = self
            .client
            .get(url)
            .query(params)
            .send()?
            .error_for_status()?;
        Ok(response.json::<T>()?)
    }
}

impl CostMatrixProvider for GoogleMapsClient {
    fn cost_table(
        &self,
        origins: &[(f64, f64)],
        destinations: &[(f64, f64)],
        departure: i64,
    ) -> Result<Vec<Vec<CostCell>>, TransportError> {
        let url = format!("{}/distancematrix/json", self.config.base_url);
        let params = [
            ("origins", join_coords(origins)),
            ("destinations", join_coords(destinations)),
            ("departure_time", departure.to_string()),
            ("key", self.config.api_key.clone()),
        ];

        let body: DistanceMatrixResponse = self.get_json(&url, &params)?;
        if body.status != "OK" {
            return Err(TransportError::new(format!(
                "distance matrix status {}",
                body.status
            )));
        }

        Ok(body
            .rows
            .into_iter()
            .map(|row| row.elements.into_iter().map(element_to_cell).collect())
            .collect())
    }
}

impl DirectionsProvider for GoogleMapsClient {
    fn route(
        &self,
        origin: (f64, f64),
        destination: (f64, f64),
        waypoints: &[(f64, f64)],
        mode: TravelMode,
    ) -> Result<RouteData, TransportError> {
        let url = format!("{}/directions/json", self.config.base_url);
        let mut params = vec![
            ("origin", format_coord(origin)),
            ("destination", format_coord(destination)),
            ("mode", travel_mode_param(mode).to_string()),
            ("key", self.config.api_key.clone()),
        ];
        if !waypoints.is_empty() {
            // Plain pipe-joined waypoints: no optimize: prefix, the visiting
            // order is already decided.
            params.push(("waypoints", join_coords(waypoints)));
        }

        let body: serde_json::Value = self.get_json(&url, &params)?;
        match body.get("status").and_then(|status| status.as_str()) {
            Some("OK") => Ok(RouteData(body)),
            Some(other) => Err(TransportError::new(format!("directions status {}", other))),
            None => Err(TransportError::new("directions response missing status")),
        }
    }
}

impl PlaceProvider for GoogleMapsClient {
    fn nearby(
        &self,
        center: (f64, f64),
        keyword: &str,
        radius_meters: u32,
    ) -> Result<Vec<Place>, TransportError> {
        let url = format!("{}/place/nearbysearch/json", self.config.base_url);
        let params = [
            ("location", format_coord(center)),
            ("radius", radius_meters.to_string()),
            ("keyword", keyword.to_string()),
            ("key", self.config.api_key.clone()),
        ];

        let body: NearbySearchResponse = self.get_json(&url, &params)?;
        match body.status.as_str() {
            "OK" | "ZERO_RESULTS" => {}
            other => {
                return Err(TransportError::new(format!("nearby search status {}", other)));
            }
        }

        Ok(body
            .results
            .into_iter()
            .map(|result| Place {
                place_id: result.place_id,
                name: result.name,
                address: result.vicinity.unwrap_or_default(),
                location: (result.geometry.location.lat, result.geometry.location.lng),
            })
            .collect())
    }
}

fn format_coord((lat, lng): (f64, f64)) -> String {
    format!("{:.6},{:.6}", lat, lng)
}

fn join_coords(locations: &[(f64, f64)]) -> String {
    locations
        .iter()
        .map(|&location| format_coord(location))
        .collect::<Vec<_>>()
        .join("|")
}

fn travel_mode_param(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Driving => "driving",
        TravelMode::Walking => "walking",
        TravelMode::Bicycling => "bicycling",
        TravelMode::Transit => "transit",
    }
}

fn element_to_cell(element: MatrixElement) -> CostCell {
    if element.status != "OK" {
        return CostCell {
            distance_meters: 0,
            duration_seconds: 0,
            reachable: false,
        };
    }

    let duration = element.duration_in_traffic.or(element.duration);
    match (element.distance, duration) {
        (Some(distance), Some(duration)) => CostCell {
            distance_meters: clamp_metric(distance.value),
            duration_seconds: clamp_metric(duration.value),
            reachable: true,
        },
        _ => CostCell {
            distance_meters: 0,
            duration_seconds: 0,
            reachable: false,
        },
    }
}

/// Keeps reported metrics clear of the unreachable sentinel (i32::MAX).
fn clamp_metric(value: i64) -> i32 {
    value.clamp(0, i32::MAX as i64 - 1) as i32
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MetricValue>,
    duration: Option<MetricValue>,
    duration_in_traffic: Option<MetricValue>,
}

#[derive(Debug, Deserialize)]
struct MetricValue {
    value: i64,
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    name: String,
    place_id: String,
    vicinity: Option<String>,
    geometry: NearbyGeometry,
}

#[derive(Debug, Deserialize)]
struct NearbyGeometry {
    location: NearbyPoint,
}

#[derive(Debug, Deserialize)]
struct NearbyPoint {
    lat: f64,
    lng: f64,
}

/// Counting gate bounding concurrent outbound requests process-wide.
///
/// Shared by every optimization request holding a clone of the client.
#[derive(Debug)]
struct RequestGate {
    permits: Mutex<usize>,
    released: Condvar,
}

impl RequestGate {
    fn new(limit: usize) -> Self {
        Self {
            permits: Mutex::new(limit),
            released: Condvar::new(),
        }
    }

    fn acquire(&self) -> GatePermit<'_> {
        let mut permits = self
            .permits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        while *permits == 0 {
            permits = self
                .released
                .wait(permits)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        *permits -= 1;
        GatePermit { gate: self }
    }

    fn release(&self) {
        let mut permits = self
            .permits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *permits += 1;
        drop(permits);
        self.released.notify_one();
    }
}

struct GatePermit<'a> {
    gate: &'a RequestGate,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
