//! Delivery cost and duration estimates for every transport method.

use std::{fmt, time::Duration};

use crate::{
    config::VehicleConfig,
    models::{Customer, GridPoint},
};

const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;

/// Supported ways of moving a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMethod {
    /// Road haulage over the grid, subject to traffic stops.
    Lorry,
    /// Waterway haulage over the grid.
    CanalBoat,
    /// Point-to-point flight with a fixed start-up delay.
    Helicopter,
}

impl TransportMethod {
    /// Every method in display order.
    pub const ALL: [TransportMethod; 3] = [
        TransportMethod::Lorry,
        TransportMethod::CanalBoat,
        TransportMethod::Helicopter,
    ];

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            TransportMethod::Lorry => "Lorry",
            TransportMethod::CanalBoat => "Canal boat",
            TransportMethod::Helicopter => "Helicopter",
        }
    }
}

impl fmt::Display for TransportMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Estimated cost and travel time for one method.
#[derive(Debug, Clone, PartialEq)]
pub struct TripQuote {
    /// Method the quote applies to.
    pub method: TransportMethod,
    /// Total travel time including delays.
    pub duration: Duration,
    /// Price in pounds, unrounded.
    pub cost: f64,
    /// Distance covered in grid units.
    pub distance: f64,
}

/// Quote every transport method for a delivery from `origin` to `customer`.
///
/// Results are always ordered lorry, canal boat, helicopter.
pub fn compute_quotes(
    customer: &Customer,
    origin: GridPoint,
    vehicles: &VehicleConfig,
) -> [TripQuote; 3] {
    let offsets = Offsets::between(origin, customer.location());
    [
        lorry_quote(offsets, vehicles),
        canal_boat_quote(offsets, vehicles),
        helicopter_quote(offsets, vehicles),
    ]
}

#[derive(Debug, Clone, Copy)]
struct Offsets {
    dx: f64,
    dy: f64,
}

impl Offsets {
    fn between(a: GridPoint, b: GridPoint) -> Self {
        Self {
            dx: (a.x as f64 - b.x as f64).abs(),
            dy: (a.y as f64 - b.y as f64).abs(),
        }
    }

    fn manhattan(self) -> f64 {
        self.dx + self.dy
    }

    fn euclidean(self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

fn lorry_quote(offsets: Offsets, vehicles: &VehicleConfig) -> TripQuote {
    let lorry = &vehicles.lorry;
    let distance = offsets.manhattan();
    let traffic_stops = (distance / lorry.traffic_delay_frequency).floor();
    let hours = distance / lorry.speed
        + traffic_stops * (lorry.traffic_delay_time / MINUTES_PER_HOUR);
    let cost = (1.0 / 12.0) * (distance.powi(2) - 95.0 * distance + 2880.0);
    TripQuote {
        method: TransportMethod::Lorry,
        duration: hours_to_duration(hours),
        cost,
        distance,
    }
}

fn canal_boat_quote(offsets: Offsets, vehicles: &VehicleConfig) -> TripQuote {
    let distance = offsets.manhattan();
    let hours = distance / vehicles.canal_boat.speed;
    let cost = (5.0 * distance) / 12.0 + 1280.0 / 12.0;
    TripQuote {
        method: TransportMethod::CanalBoat,
        duration: hours_to_duration(hours),
        cost,
        distance,
    }
}

fn helicopter_quote(offsets: Offsets, vehicles: &VehicleConfig) -> TripQuote {
    let helicopter = &vehicles.helicopter;
    let distance = offsets.euclidean();
    let hours = distance / helicopter.speed + helicopter.initial_delay / MINUTES_PER_HOUR;
    let cost = 0.5 * distance + 195.0;
    TripQuote {
        method: TransportMethod::Helicopter,
        duration: hours_to_duration(hours),
        cost,
        distance,
    }
}

fn hours_to_duration(hours: f64) -> Duration {
    Duration::try_from_secs_f64(hours * SECONDS_PER_HOUR).unwrap_or_default()
}

/// Render a duration as `HH:MM:SS`; hours keep counting past a day.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Render a price in pounds with two decimal places.
pub fn format_cost(cost: f64) -> String {
    format!("£{cost:.2}")
}
