//! The seven booking questions.
//!
//! Every function reads the shared [`BookingTable`] and returns freshly built
//! result rows. Questions that can legitimately find no qualifying bookings
//! return `Option` (or an empty `Vec`) instead of failing.

use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use serde::Serialize;

use crate::{
    aggregate::{self, FareObservation, Measure, Reduction, WeightedPrice},
    config::{AnalysisConfig, CityPair},
    derive::{self, CabinClass},
    error::PipelineResult,
    loader::{Booking, BookingTable},
    select::{self, Extremum},
};

/// A booking paired with the derived fields most questions need.
#[derive(Debug, Clone)]
pub struct PricedBooking<'a> {
    pub booking: &'a Booking,
    pub route: String,
    pub price_per_traveler: f64,
}

pub fn price_bookings<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
) -> PipelineResult<Vec<PricedBooking<'a>>> {
    bookings
        .into_iter()
        .map(|booking| {
            Ok(PricedBooking {
                booking,
                route: booking.route(),
                price_per_traveler: booking.price_per_traveler()?,
            })
        })
        .collect()
}

fn fare(priced: &PricedBooking<'_>) -> f64 {
    priced.price_per_traveler
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteCount {
    pub route: String,
    pub count: usize,
}

pub fn top_routes(table: &BookingTable, limit: usize) -> Vec<RouteCount> {
    aggregate::value_counts(table.iter().map(Booking::route))
        .into_iter()
        .take(limit)
        .map(|(route, count)| RouteCount { route, count })
        .collect()
}

fn is_top_route(top: &[RouteCount], route: &str) -> bool {
    top.iter().any(|r| r.route == route)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePriceSummary {
    pub route: String,
    pub bookings: usize,
    pub mean_price_per_traveler: f64,
    pub median_price_per_traveler: f64,
}

pub fn route_price_summary(
    table: &BookingTable,
    top: &[RouteCount],
) -> PipelineResult<Vec<RoutePriceSummary>> {
    let priced = price_bookings(table)?
        .into_iter()
        .filter(|p| is_top_route(top, &p.route))
        .collect::<Vec<_>>();
    let measures = [
        Measure::new("mean", fare, Reduction::Mean),
        Measure::new("median", fare, Reduction::Median),
    ];
    let summary = aggregate::aggregate(&priced, |p| p.route.clone(), &measures);
    Ok(summary
        .rows
        .into_iter()
        .map(|row| RoutePriceSummary {
            bookings: row.rows,
            mean_price_per_traveler: row.values[0],
            median_price_per_traveler: row.values[1],
            route: row.key,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirlinePrice {
    pub route: String,
    pub airline: String,
    pub price: f64,
}

impl From<&WeightedPrice> for AirlinePrice {
    fn from(value: &WeightedPrice) -> Self {
        Self {
            route: value.route.clone(),
            airline: value.airline.clone(),
            price: value.weighted_avg_price,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AirlineExtremes {
    pub cheapest: Vec<AirlinePrice>,
    pub most_expensive: Vec<AirlinePrice>,
}

pub fn airline_price_extremes(
    table: &BookingTable,
    top: &[RouteCount],
    min_reasonable_price: f64,
) -> AirlineExtremes {
    let observations = table
        .iter()
        .filter(|b| is_top_route(top, &b.route()))
        .map(|b| FareObservation {
            route: b.route(),
            airline: b.merchant_name.clone(),
            cabin: b.cabin_group(),
            amount: b.order_total_amount,
            travelers: b.traveler_count,
        })
        .collect::<Vec<_>>();
    let weighted = aggregate::weighted_rollup(&observations, min_reasonable_price);
    let pick = |extremum| {
        select::select_per_group(&weighted, |w| w.route.clone(), |w| w.weighted_avg_price, extremum)
            .into_iter()
            .map(AirlinePrice::from)
            .collect::<Vec<_>>()
    };
    AirlineExtremes {
        cheapest: pick(Extremum::Min),
        most_expensive: pick(Extremum::Max),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripFrequency {
    pub pair: CityPair,
    pub year: i32,
    pub users: usize,
    pub bookings: usize,
    pub average_per_user: f64,
}

/// Mean bookings per user over both directions of `pair` departing in `year`.
pub fn average_trip_frequency(
    table: &BookingTable,
    pair: &CityPair,
    year: i32,
) -> Option<TripFrequency> {
    let matching = table.filter(|b| {
        b.departure_time.year() == year && b.connects(&pair.from, &pair.to)
    });
    let per_user = aggregate::aggregate(
        matching.iter(),
        |b| b.user_id.clone(),
        &[Measure::new("trips", |_: &Booking| 1.0, Reduction::Count)],
    );
    if per_user.is_empty() {
        info!(
            "No bookings between '{}' and '{}' in {year}",
            pair.from, pair.to
        );
        return None;
    }
    let trips = per_user.rows.iter().map(|r| r.values[0]).collect::<Vec<_>>();
    Some(TripFrequency {
        pair: pair.clone(),
        year,
        users: per_user.len(),
        bookings: matching.len(),
        average_per_user: Reduction::Mean.apply(&trips),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadTimeChoice {
    pub route: String,
    pub days_ahead: i64,
    pub avg_price_per_traveler: f64,
}

/// Lead time with the lowest mean price per traveler for each top route.
///
/// Only bookings emailed on or before departure and with an order amount
/// above `min_amount` take part. Ties go to the shorter lead time.
pub fn best_lead_times(
    table: &BookingTable,
    top: &[RouteCount],
    min_amount: f64,
) -> PipelineResult<Vec<LeadTimeChoice>> {
    let eligible = table.filter(|b| b.lead_time_days() >= 0 && b.order_total_amount > min_amount);
    debug!(
        "{} of {} booking(s) eligible for lead-time analysis",
        eligible.len(),
        table.len()
    );
    let priced = price_bookings(&eligible)?
        .into_iter()
        .filter(|p| is_top_route(top, &p.route))
        .collect::<Vec<_>>();
    let by_lead_time = aggregate::aggregate(
        &priced,
        |p| (p.route.clone(), p.booking.lead_time_days()),
        &[Measure::new("mean", fare, Reduction::Mean)],
    );
    Ok(select::select_per_group(
        &by_lead_time.rows,
        |row| row.key.0.clone(),
        |row| row.values[0],
        Extremum::Min,
    )
    .into_iter()
    .map(|row| LeadTimeChoice {
        route: row.key.0.clone(),
        days_ahead: row.key.1,
        avg_price_per_traveler: row.values[0],
    })
    .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CabinPrice {
    pub cabin: CabinClass,
    pub avg_price_per_traveler: f64,
    pub pct_vs_economy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CabinComparison {
    pub route: String,
    pub economy_present: bool,
    pub cabins: Vec<CabinPrice>,
}

/// Mean price per traveler per cabin group on the most frequent route, with
/// the percentage difference against Economy when Economy was sold.
pub fn cabin_price_comparison(table: &BookingTable) -> PipelineResult<Option<CabinComparison>> {
    let Some(popular) = top_routes(table, 1).into_iter().next() else {
        return Ok(None);
    };
    let on_route = table.filter(|b| b.route() == popular.route);
    let priced = price_bookings(&on_route)?;
    let by_cabin = aggregate::aggregate(
        &priced,
        |p| p.booking.cabin_group(),
        &[Measure::new("mean", fare, Reduction::Mean)],
    );
    let economy = by_cabin
        .rows
        .iter()
        .find(|row| row.key == CabinClass::Economy)
        .map(|row| row.values[0]);
    let cabins = by_cabin
        .rows
        .iter()
        .map(|row| CabinPrice {
            cabin: row.key,
            avg_price_per_traveler: row.values[0],
            pct_vs_economy: economy.map(|base| (row.values[0] - base) / base * 100.0),
        })
        .collect();
    Ok(Some(CabinComparison {
        route: popular.route,
        economy_present: economy.is_some(),
        cabins,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthPrice {
    pub pair: CityPair,
    pub month: u32,
    pub avg_price_per_traveler: f64,
}

/// Departure month with the lowest mean price per traveler over both
/// directions of `pair`.
pub fn cheapest_month(table: &BookingTable, pair: &CityPair) -> PipelineResult<Option<MonthPrice>> {
    let matching = table.filter(|b| b.connects(&pair.from, &pair.to));
    let priced = price_bookings(&matching)?;
    let monthly = aggregate::aggregate(
        &priced,
        |p| p.booking.departure_time.month(),
        &[Measure::new("mean", fare, Reduction::Mean)],
    );
    Ok(
        select::select_one(&monthly.rows, |row| row.values[0], Extremum::Min).map(|row| {
            MonthPrice {
                pair: pair.clone(),
                month: row.key,
                avg_price_per_traveler: row.values[0],
            }
        }),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheapestBooking {
    pub route: String,
    pub departure_date: NaiveDate,
    pub order_total_amount: f64,
    pub price_per_traveler: f64,
    pub airline: String,
}

/// The single booking with the lowest price per traveler on the directional
/// route `route.from -> route.to`.
pub fn cheapest_booking(
    table: &BookingTable,
    route: &CityPair,
) -> PipelineResult<Option<CheapestBooking>> {
    let key = derive::route(&route.from, &route.to);
    let on_route = table.filter(|b| b.route() == key);
    let priced = price_bookings(&on_route)?;
    Ok(
        select::select_one(&priced, |p| p.price_per_traveler, Extremum::Min).map(|p| {
            CheapestBooking {
                route: p.route.clone(),
                departure_date: p.booking.departure_time.date(),
                order_total_amount: p.booking.order_total_amount,
                price_per_traveler: p.price_per_traveler,
                airline: p.booking.merchant_name.clone(),
            }
        }),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalFindings {
    pub cheapest_month: Option<MonthPrice>,
    pub cheapest_booking: Option<CheapestBooking>,
}

/// Raw answers to all seven questions, before report shaping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Findings {
    pub top_routes: Vec<RouteCount>,
    pub route_prices: Vec<RoutePriceSummary>,
    pub airline_extremes: AirlineExtremes,
    pub trip_frequency: Option<TripFrequency>,
    pub lead_times: Vec<LeadTimeChoice>,
    pub cabin_comparison: Option<CabinComparison>,
    pub seasonal: SeasonalFindings,
}

pub fn run_all(table: &BookingTable, config: &AnalysisConfig) -> PipelineResult<Findings> {
    let top = top_routes(table, config.top_routes);
    info!("Analyzing {} booking(s) across {} top route(s)", table.len(), top.len());
    Ok(Findings {
        route_prices: route_price_summary(table, &top)?,
        airline_extremes: airline_price_extremes(table, &top, config.min_reasonable_price),
        trip_frequency: average_trip_frequency(
            table,
            &config.frequency_pair,
            config.frequency_year,
        ),
        lead_times: best_lead_times(table, &top, config.lead_time_min_amount)?,
        cabin_comparison: cabin_price_comparison(table)?,
        seasonal: SeasonalFindings {
            cheapest_month: cheapest_month(table, &config.seasonal_pair)?,
            cheapest_booking: cheapest_booking(table, &config.cheapest_booking_route)?,
        },
        top_routes: top,
    })
}
