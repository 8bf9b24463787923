//! Report assembly.
//!
//! Shapes [`Findings`] for display: joins the cheapest and most expensive
//! airline per route, rounds currency and percentages to two decimals and
//! renders each answer as a console table or as JSON. No filtering happens
//! here.

use anyhow::{Context, Result};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use serde::Serialize;

use crate::{
    analysis::{
        AirlineExtremes, CabinComparison, CabinPrice, CheapestBooking, Findings, LeadTimeChoice,
        MonthPrice, RouteCount, RoutePriceSummary, SeasonalFindings, TripFrequency,
    },
    loader::LoadReport,
    table::TableView,
};

const NO_DATA: &str = "No qualifying bookings.";

/// Rounds half-to-even at two decimal places.
pub fn round_currency(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

fn money(value: f64) -> String {
    format!("{:.2}", round_currency(value))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirlineComparisonRow {
    pub route: String,
    pub cheapest_airline: String,
    pub lowest_price: f64,
    pub most_expensive_airline: String,
    pub highest_price: f64,
}

/// Inner join of the cheapest and most expensive airline on route, sorted by route.
pub fn join_airline_extremes(extremes: &AirlineExtremes) -> Vec<AirlineComparisonRow> {
    let mut rows = extremes
        .cheapest
        .iter()
        .filter_map(|low| {
            extremes
                .most_expensive
                .iter()
                .find(|high| high.route == low.route)
                .map(|high| AirlineComparisonRow {
                    route: low.route.clone(),
                    cheapest_airline: low.airline.clone(),
                    lowest_price: round_currency(low.price),
                    most_expensive_airline: high.airline.clone(),
                    highest_price: round_currency(high.price),
                })
        })
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| a.route.cmp(&b.route));
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub load: LoadReport,
    pub top_routes: Vec<RouteCount>,
    pub route_prices: Vec<RoutePriceSummary>,
    pub airline_comparison: Vec<AirlineComparisonRow>,
    pub trip_frequency: Option<TripFrequency>,
    pub lead_times: Vec<LeadTimeChoice>,
    pub cabin_comparison: Option<CabinComparison>,
    pub seasonal: SeasonalFindings,
}

pub fn assemble(load: LoadReport, findings: Findings) -> Report {
    Report {
        load,
        airline_comparison: join_airline_extremes(&findings.airline_extremes),
        top_routes: findings.top_routes,
        route_prices: findings
            .route_prices
            .into_iter()
            .map(|row| RoutePriceSummary {
                mean_price_per_traveler: round_currency(row.mean_price_per_traveler),
                median_price_per_traveler: round_currency(row.median_price_per_traveler),
                ..row
            })
            .collect(),
        trip_frequency: findings.trip_frequency.map(|f| TripFrequency {
            average_per_user: round_currency(f.average_per_user),
            ..f
        }),
        lead_times: findings
            .lead_times
            .into_iter()
            .map(|row| LeadTimeChoice {
                avg_price_per_traveler: round_currency(row.avg_price_per_traveler),
                ..row
            })
            .collect(),
        cabin_comparison: findings.cabin_comparison.map(|c| CabinComparison {
            cabins: c
                .cabins
                .into_iter()
                .map(|cabin| CabinPrice {
                    avg_price_per_traveler: round_currency(cabin.avg_price_per_traveler),
                    pct_vs_economy: cabin.pct_vs_economy.map(round_currency),
                    ..cabin
                })
                .collect(),
            ..c
        }),
        seasonal: SeasonalFindings {
            cheapest_month: findings.seasonal.cheapest_month.map(|m| MonthPrice {
                avg_price_per_traveler: round_currency(m.avg_price_per_traveler),
                ..m
            }),
            cheapest_booking: findings.seasonal.cheapest_booking.map(|b| CheapestBooking {
                order_total_amount: round_currency(b.order_total_amount),
                price_per_traveler: round_currency(b.price_per_traveler),
                ..b
            }),
        },
    }
}

impl Report {
    pub fn render(&self) -> String {
        let sections = [
            format!(
                "Loaded {} booking(s) from {} row(s) ({} incomplete, {} non-positive dropped)\n",
                self.load.rows_kept,
                self.load.rows_read,
                self.load.incomplete_dropped,
                self.load.non_positive_dropped
            ),
            render_top_routes(&self.top_routes),
            render_route_prices(&self.route_prices),
            render_airline_comparison(&self.airline_comparison),
            render_trip_frequency(self.trip_frequency.as_ref()),
            render_lead_times(&self.lead_times),
            render_cabin_comparison(self.cabin_comparison.as_ref()),
            render_seasonal(&self.seasonal),
        ];
        sections.join("\n")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Serializing report to JSON")
    }
}

fn section(title: &str, table: TableView) -> String {
    if table.is_empty() {
        format!("{title}\n{NO_DATA}\n")
    } else {
        format!("{title}\n{}", table.render())
    }
}

pub fn render_top_routes(rows: &[RouteCount]) -> String {
    let mut table = TableView::new(["route", "bookings"]).right_align(&[1]);
    for row in rows {
        table.push_row(vec![row.route.clone(), row.count.to_string()]);
    }
    section("Top routes by booking count", table)
}

pub fn render_route_prices(rows: &[RoutePriceSummary]) -> String {
    let mut table =
        TableView::new(["route", "bookings", "mean", "median"]).right_align(&[1, 2, 3]);
    for row in rows {
        table.push_row(vec![
            row.route.clone(),
            row.bookings.to_string(),
            money(row.mean_price_per_traveler),
            money(row.median_price_per_traveler),
        ]);
    }
    section("Price per traveler on top routes", table)
}

pub fn render_airline_comparison(rows: &[AirlineComparisonRow]) -> String {
    let mut table = TableView::new([
        "route",
        "cheapest airline",
        "lowest price",
        "most expensive airline",
        "highest price",
    ])
    .right_align(&[2, 4]);
    for row in rows {
        table.push_row(vec![
            row.route.clone(),
            row.cheapest_airline.clone(),
            money(row.lowest_price),
            row.most_expensive_airline.clone(),
            money(row.highest_price),
        ]);
    }
    section("Cheapest and most expensive airlines on top routes", table)
}

pub fn render_trip_frequency(frequency: Option<&TripFrequency>) -> String {
    let title = "Average trips per user";
    match frequency {
        Some(f) => format!(
            "{title}\n{} <-> {} in {}: {:.2} trip(s) per user ({} booking(s), {} user(s))\n",
            f.pair.from, f.pair.to, f.year, f.average_per_user, f.bookings, f.users
        ),
        None => format!("{title}\n{NO_DATA}\n"),
    }
}

pub fn render_lead_times(rows: &[LeadTimeChoice]) -> String {
    let mut table =
        TableView::new(["route", "days booked ahead", "price per traveler"]).right_align(&[1, 2]);
    for row in rows {
        table.push_row(vec![
            row.route.clone(),
            row.days_ahead.to_string(),
            money(row.avg_price_per_traveler),
        ]);
    }
    section("Best time to book on top routes", table)
}

pub fn render_cabin_comparison(comparison: Option<&CabinComparison>) -> String {
    let Some(comparison) = comparison else {
        return format!("Price by cabin class\n{NO_DATA}\n");
    };
    let title = format!("Price by cabin class on {}", comparison.route);
    let mut table =
        TableView::new(["cabin class", "price per traveler", "vs economy"]).right_align(&[1, 2]);
    for cabin in &comparison.cabins {
        table.push_row(vec![
            cabin.cabin.to_string(),
            money(cabin.avg_price_per_traveler),
            cabin
                .pct_vs_economy
                .map(|pct| format!("{pct:+.2}%"))
                .unwrap_or_default(),
        ]);
    }
    let mut rendered = section(&title, table);
    if !comparison.economy_present {
        rendered.push_str("Economy class not sold on this route; showing raw averages.\n");
    }
    rendered
}

pub fn render_seasonal(seasonal: &SeasonalFindings) -> String {
    let month = match &seasonal.cheapest_month {
        Some(m) => format!(
            "Cheapest month for {} <-> {}: {} (avg {} per traveler)\n",
            m.pair.from,
            m.pair.to,
            month_name(m.month),
            money(m.avg_price_per_traveler)
        ),
        None => format!("Cheapest month: {NO_DATA}\n"),
    };
    let booking = match &seasonal.cheapest_booking {
        Some(b) => format!(
            "Cheapest booking on {}: departs {} for {} ({} per traveler, {})\n",
            b.route,
            b.departure_date.format("%Y-%m-%d"),
            money(b.order_total_amount),
            money(b.price_per_traveler),
            b.airline
        ),
        None => format!("Cheapest booking: {NO_DATA}\n"),
    };
    format!("Seasonal prices\n{month}{booking}")
}

fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    month
        .checked_sub(1)
        .and_then(|idx| NAMES.get(idx as usize))
        .copied()
        .unwrap_or("Unknown")
}
