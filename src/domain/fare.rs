// src/domain/fare.rs
//
// Deterministic fare arithmetic. No I/O; the same function backs both the
// /api/carpool/fare preview endpoint and server-side fare computation when
// a booking arrives without one.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

/// Seats the fuel cost is assumed to be split across (shared-vehicle model).
const SHARED_SEAT_DIVISOR: f64 = 3.0;

/// Pricing parameters. Currency-agnostic; values below are tuned for PKR.
#[derive(Debug, Clone)]
pub struct FareParams {
    pub fuel_price_per_liter: f64,
    /// Average vehicle mileage in km per liter.
    pub average_mileage_kmpl: f64,
    pub driver_profit_margin: f64,
    pub app_commission_rate: f64,
    /// Extra fraction of the fuel cost charged inside peak windows.
    pub peak_surcharge: f64,
    /// Peak windows as [start_hour, end_hour) pairs, 24h clock.
    pub peak_windows: Vec<(u32, u32)>,
    /// Per-km maintenance cost charged per seat.
    pub base_cost_per_km: f64,
    pub minimum_fare: f64,
}

impl Default for FareParams {
    fn default() -> Self {
        Self {
            fuel_price_per_liter: 270.0,
            average_mileage_kmpl: 12.0,
            driver_profit_margin: 0.15,
            app_commission_rate: 0.10,
            peak_surcharge: 0.20,
            peak_windows: vec![(7, 10), (17, 20)],
            base_cost_per_km: 3.0,
            minimum_fare: 100.0,
        }
    }
}

/// Itemized result for one quote. Per-seat figures are summed across legs
/// for two-way trips; `total_fare` is the per-seat fare times seat count.
#[derive(Debug, Clone, Serialize)]
pub struct FareBreakdown {
    pub base_cost_per_seat: f64,
    pub driver_profit_per_seat: f64,
    pub app_commission_per_seat: f64,
    pub final_fare_per_seat: f64,
    pub seats: u32,
    pub total_fare: f64,
}

#[derive(Debug, Clone, Copy)]
struct LegFare {
    base_cost_per_seat: f64,
    driver_profit_per_seat: f64,
    app_commission_per_seat: f64,
    final_fare_per_seat: f64,
}

impl FareParams {
    fn is_peak_hour(&self, hour: u32) -> bool {
        self.peak_windows
            .iter()
            .any(|&(start, end)| hour >= start && hour < end)
    }
}

/// Fare for a single leg, per seat.
fn leg_fare(params: &FareParams, distance_km: f64, departure: NaiveTime) -> LegFare {
    let mut fuel_cost = (distance_km / params.average_mileage_kmpl) * params.fuel_price_per_liter;
    if params.is_peak_hour(departure.hour()) {
        fuel_cost += fuel_cost * params.peak_surcharge;
    }

    let shared_fuel_per_seat = fuel_cost / SHARED_SEAT_DIVISOR;
    let maintenance_per_seat = distance_km * params.base_cost_per_km;
    let base_cost_per_seat = shared_fuel_per_seat + maintenance_per_seat;

    let driver_profit_per_seat = base_cost_per_seat * params.driver_profit_margin;
    let app_commission_per_seat =
        (base_cost_per_seat + driver_profit_per_seat) * params.app_commission_rate;

    let final_fare_per_seat = (base_cost_per_seat + driver_profit_per_seat + app_commission_per_seat)
        .max(params.minimum_fare);

    LegFare {
        base_cost_per_seat,
        driver_profit_per_seat,
        app_commission_per_seat,
        final_fare_per_seat,
    }
}

/// Quotes a trip. A `return_time` makes it two-way: the return leg is priced
/// independently, since it may cross into or out of a peak window.
pub fn quote(
    params: &FareParams,
    distance_km: f64,
    seats: u32,
    pickup_time: NaiveTime,
    return_time: Option<NaiveTime>,
) -> FareBreakdown {
    let mut legs = vec![leg_fare(params, distance_km, pickup_time)];
    if let Some(ret) = return_time {
        legs.push(leg_fare(params, distance_km, ret));
    }

    let base_cost_per_seat: f64 = legs.iter().map(|l| l.base_cost_per_seat).sum();
    let driver_profit_per_seat: f64 = legs.iter().map(|l| l.driver_profit_per_seat).sum();
    let app_commission_per_seat: f64 = legs.iter().map(|l| l.app_commission_per_seat).sum();
    let final_fare_per_seat: f64 = legs.iter().map(|l| l.final_fare_per_seat).sum();

    FareBreakdown {
        base_cost_per_seat,
        driver_profit_per_seat,
        app_commission_per_seat,
        final_fare_per_seat,
        seats,
        total_fare: final_fare_per_seat * seats as f64,
    }
}
