//! End-to-end planner tests
//!
//! Full pipeline runs against mock collaborators: table-driven cost
//! provider and a recording directions provider.

use std::cell::{Cell, RefCell};

use voyager_planner::planner::{plan, PlanError, PlanOptions};
use voyager_planner::traits::{
    CostCell, CostMatrixProvider, DirectionsProvider, RouteData, Stop, TransportError, TravelMode,
};

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Clone, Debug)]
struct TestStop {
    id: String,
    location: (f64, f64),
}

fn stop(id: &str, lat: f64, lng: f64) -> TestStop {
    TestStop {
        id: id.to_string(),
        location: (lat, lng),
    }
}

impl Stop for TestStop {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn address(&self) -> &str {
        ""
    }

    fn location(&self) -> (f64, f64) {
        self.location
    }
}

/// Positional cost provider: cell (i, j) of the preset duration table maps
/// to the i-th origin and j-th destination. Counts batch calls.
struct TableCosts {
    durations: Vec<Vec<i32>>,
    unreachable: Vec<(usize, usize)>,
    fail: bool,
    calls: Cell<usize>,
}

impl TableCosts {
    fn new(durations: Vec<Vec<i32>>) -> Self {
        Self {
            durations,
            unreachable: Vec::new(),
            fail: false,
            calls: Cell::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            durations: Vec::new(),
            unreachable: Vec::new(),
            fail: true,
            calls: Cell::new(0),
        }
    }

    fn unreachable_pair(mut self, from: usize, to: usize) -> Self {
        self.unreachable.push((from, to));
        self
    }
}

impl CostMatrixProvider for TableCosts {
    fn cost_table(
        &self,
        origins: &[(f64, f64)],
        destinations: &[(f64, f64)],
        _departure: i64,
    ) -> Result<Vec<Vec<CostCell>>, TransportError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(TransportError::new("connection reset"));
        }

        assert_eq!(origins.len(), self.durations.len(), "unexpected batch size");
        assert_eq!(destinations.len(), self.durations.len());

        Ok((0..origins.len())
            .map(|i| {
                (0..destinations.len())
                    .map(|j| CostCell {
                        distance_meters: self.durations[i][j] * 10,
                        duration_seconds: self.durations[i][j],
                        reachable: !self.unreachable.contains(&(i, j)),
                    })
                    .collect()
            })
            .collect())
    }
}

/// Records every route request; optionally fails at the transport level.
struct RecordingDirections {
    fail: bool,
    requests: RefCell<Vec<((f64, f64), (f64, f64), Vec<(f64, f64)>)>>,
}

impl RecordingDirections {
    fn new() -> Self {
        Self {
            fail: false,
            requests: RefCell::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl DirectionsProvider for RecordingDirections {
    fn route(
        &self,
        origin: (f64, f64),
        destination: (f64, f64),
        waypoints: &[(f64, f64)],
        _mode: TravelMode,
    ) -> Result<RouteData, TransportError> {
        self.requests
            .borrow_mut()
            .push((origin, destination, waypoints.to_vec()));
        if self.fail {
            return Err(TransportError::new("directions unavailable"));
        }
        Ok(RouteData(serde_json::json!({
            "status": "OK",
            "routes": [],
        })))
    }
}

/// Three stops with symmetric durations: S=0, A=1, B=2, C=3, seconds.
fn scenario_durations() -> Vec<Vec<i32>> {
    vec![
        vec![0, 300, 500, 200],
        vec![300, 0, 250, 400],
        vec![500, 250, 0, 150],
        vec![200, 400, 150, 0],
    ]
}

fn scenario_stops() -> Vec<TestStop> {
    vec![
        stop("a", 1.0, 1.0),
        stop("b", 2.0, 2.0),
        stop("c", 3.0, 3.0),
    ]
}

const START: (f64, f64) = (0.5, 0.5);
const DEPARTURE: i64 = 1_700_000_000;

// ============================================================================
// Happy Path
// ============================================================================

#[test]
fn plan_orders_stops_and_stamps_arrivals() {
    let costs = TableCosts::new(scenario_durations());
    let directions = RecordingDirections::new();
    let stops = scenario_stops();

    let result = plan(
        START,
        &stops,
        DEPARTURE,
        &costs,
        &directions,
        PlanOptions::default(),
    )
    .expect("plan should succeed");

    let ids: Vec<&str> = result
        .itinerary
        .iter()
        .map(|entry| entry.stop_id.as_str())
        .collect();
    assert_eq!(ids, vec!["c", "b", "a"], "optimal order is S -> C -> B -> A");

    let arrivals: Vec<i64> = result
        .itinerary
        .iter()
        .map(|entry| entry.arrival_time)
        .collect();
    assert_eq!(
        arrivals,
        vec![DEPARTURE + 200, DEPARTURE + 350, DEPARTURE + 600]
    );
    assert_eq!(result.total_travel_seconds, 600);
}

#[test]
fn plan_issues_exactly_one_batch_cost_call() {
    let costs = TableCosts::new(scenario_durations());
    let directions = RecordingDirections::new();

    plan(
        START,
        &scenario_stops(),
        DEPARTURE,
        &costs,
        &directions,
        PlanOptions::default(),
    )
    .expect("plan should succeed");

    assert_eq!(costs.calls.get(), 1, "cost lookup must be one batch call");
    assert_eq!(directions.requests.borrow().len(), 1);
}

#[test]
fn plan_preserves_waypoint_order_for_directions() {
    let costs = TableCosts::new(scenario_durations());
    let directions = RecordingDirections::new();
    let stops = scenario_stops();

    let result = plan(
        START,
        &stops,
        DEPARTURE,
        &costs,
        &directions,
        PlanOptions::default(),
    )
    .expect("plan should succeed");

    let requests = directions.requests.borrow();
    let (origin, destination, waypoints) = &requests[0];

    assert_eq!(*origin, START);
    // Final order C, B, A: last itinerary stop is the destination, the rest
    // are waypoints in visiting order.
    assert_eq!(*destination, (1.0, 1.0));
    assert_eq!(*waypoints, vec![(3.0, 3.0), (2.0, 2.0)]);

    let itinerary_locations: Vec<(f64, f64)> = result
        .itinerary
        .iter()
        .map(|entry| entry.location)
        .collect();
    assert_eq!(itinerary_locations[..2], waypoints[..]);
    assert_eq!(itinerary_locations[2], *destination);
}

#[test]
fn plan_single_stop_goes_straight_to_destination() {
    let costs = TableCosts::new(vec![vec![0, 240], vec![240, 0]]);
    let directions = RecordingDirections::new();
    let stops = vec![stop("only", 4.0, 4.0)];

    let result = plan(
        START,
        &stops,
        DEPARTURE,
        &costs,
        &directions,
        PlanOptions::default(),
    )
    .expect("plan should succeed");

    assert_eq!(result.itinerary.len(), 1);
    assert_eq!(result.itinerary[0].arrival_time, DEPARTURE + 240);
    assert_eq!(result.total_travel_seconds, 240);

    let requests = directions.requests.borrow();
    let (_, destination, waypoints) = &requests[0];
    assert_eq!(*destination, (4.0, 4.0));
    assert!(waypoints.is_empty(), "single stop means no waypoints");
}

#[test]
fn plan_timestamps_are_non_decreasing() {
    // Asymmetric durations, including a zero-cost hop.
    let durations = vec![
        vec![0, 60, 300, 500],
        vec![90, 0, 0, 400],
        vec![300, 50, 0, 80],
        vec![500, 400, 70, 0],
    ];
    let costs = TableCosts::new(durations.clone());
    let directions = RecordingDirections::new();
    let stops = scenario_stops();

    let result = plan(
        START,
        &stops,
        DEPARTURE,
        &costs,
        &directions,
        PlanOptions::default(),
    )
    .expect("plan should succeed");

    let arrivals: Vec<i64> = result
        .itinerary
        .iter()
        .map(|entry| entry.arrival_time)
        .collect();
    assert!(arrivals.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(
        *arrivals.last().expect("itinerary is non-empty"),
        DEPARTURE + result.total_travel_seconds,
        "last arrival equals departure plus total tour duration"
    );
}

// ============================================================================
// Input Validation
// ============================================================================

#[test]
fn plan_rejects_empty_stop_list_before_any_call() {
    let costs = TableCosts::new(scenario_durations());
    let directions = RecordingDirections::new();
    let stops: Vec<TestStop> = Vec::new();

    let result = plan(
        START,
        &stops,
        DEPARTURE,
        &costs,
        &directions,
        PlanOptions::default(),
    );

    assert!(matches!(result, Err(PlanError::InvalidInput(_))));
    assert_eq!(costs.calls.get(), 0, "no collaborator call on invalid input");
    assert!(directions.requests.borrow().is_empty());
}

#[test]
fn plan_rejects_out_of_range_start() {
    let costs = TableCosts::new(scenario_durations());
    let directions = RecordingDirections::new();

    let result = plan(
        (95.0, 0.0),
        &scenario_stops(),
        DEPARTURE,
        &costs,
        &directions,
        PlanOptions::default(),
    );

    assert!(matches!(result, Err(PlanError::InvalidInput(_))));
    assert_eq!(costs.calls.get(), 0);
}

// ============================================================================
// Failure Propagation
// ============================================================================

#[test]
fn plan_fails_whole_request_on_cost_transport_failure() {
    let costs = TableCosts::failing();
    let directions = RecordingDirections::new();

    let result = plan(
        START,
        &scenario_stops(),
        DEPARTURE,
        &costs,
        &directions,
        PlanOptions::default(),
    );

    assert!(matches!(result, Err(PlanError::CostLookup(_))));
    assert!(
        directions.requests.borrow().is_empty(),
        "directions must not run after a failed cost lookup"
    );
}

#[test]
fn plan_fails_whole_request_on_directions_failure() {
    let costs = TableCosts::new(scenario_durations());
    let directions = RecordingDirections::failing();

    let result = plan(
        START,
        &scenario_stops(),
        DEPARTURE,
        &costs,
        &directions,
        PlanOptions::default(),
    );

    // One end-to-end failure, no partial itinerary.
    assert!(matches!(result, Err(PlanError::Directions(_))));
}

#[test]
fn plan_errors_name_the_failing_stage() {
    let costs = TableCosts::failing();
    let directions = RecordingDirections::new();

    let err = plan(
        START,
        &scenario_stops(),
        DEPARTURE,
        &costs,
        &directions,
        PlanOptions::default(),
    )
    .expect_err("cost lookup should fail");

    let message = err.to_string();
    assert!(message.contains("cost lookup"), "got: {}", message);
    assert!(message.contains("connection reset"), "got: {}", message);
}

// ============================================================================
// Partial Unreachability
// ============================================================================

#[test]
fn plan_places_fully_unreachable_stop_somewhere() {
    // Every pair involving stop B (index 2) is unroutable; the plan must
    // still cover all three stops.
    let costs = TableCosts::new(scenario_durations())
        .unreachable_pair(0, 2)
        .unreachable_pair(1, 2)
        .unreachable_pair(3, 2)
        .unreachable_pair(2, 0)
        .unreachable_pair(2, 1)
        .unreachable_pair(2, 3);
    let directions = RecordingDirections::new();
    let stops = scenario_stops();

    let result = plan(
        START,
        &stops,
        DEPARTURE,
        &costs,
        &directions,
        PlanOptions::default(),
    )
    .expect("partial unreachability must not fail the request");

    let mut ids: Vec<&str> = result
        .itinerary
        .iter()
        .map(|entry| entry.stop_id.as_str())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a", "b", "c"], "unreachable stop is still placed");
}
