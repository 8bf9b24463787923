mod common;

use fare_insights::{
    analysis::{self, RouteCount},
    config::{AnalysisConfig, CityPair},
    derive::CabinClass,
    loader::{BookingTable, LoadOptions, load_bookings},
    report,
    schema::Schema,
};
use proptest::prelude::*;

use common::{at, booking, fixture_path, table};

fn fixture() -> BookingTable {
    let (table, _) = load_bookings(
        &fixture_path("flights.csv"),
        &Schema::default(),
        &LoadOptions::default(),
    )
    .expect("load fixture");
    table
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-6
}

#[test]
fn opposite_directions_are_distinct_routes() {
    let bookings = table(vec![
        booking("NYC", "CHI", 100.0, 1),
        booking("CHI", "NYC", 100.0, 1),
    ]);
    let top = analysis::top_routes(&bookings, 10);
    assert_eq!(
        top,
        vec![
            RouteCount {
                route: "NYC -- CHI".into(),
                count: 1
            },
            RouteCount {
                route: "CHI -- NYC".into(),
                count: 1
            },
        ]
    );
}

#[test]
fn top_routes_rank_fixture_by_count() {
    let top = analysis::top_routes(&fixture(), 3);
    let routes = top.iter().map(|r| (r.route.as_str(), r.count)).collect::<Vec<_>>();
    assert_eq!(
        routes,
        vec![
            ("New York -- Chicago", 4),
            ("New York -- Boston", 3),
            ("Chicago -- New York", 2),
        ]
    );
}

#[test]
fn route_prices_report_mean_and_median() {
    let table = fixture();
    let top = analysis::top_routes(&table, 1);
    let prices = analysis::route_price_summary(&table, &top).unwrap();
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].bookings, 4);
    assert!(close(prices[0].mean_price_per_traveler, 240.0));
    assert!(close(prices[0].median_price_per_traveler, 230.0));
}

#[test]
fn airline_extremes_use_weighted_prices() {
    let table = fixture();
    let top = analysis::top_routes(&table, 1);
    let extremes = analysis::airline_price_extremes(&table, &top, 10.0);
    assert_eq!(extremes.cheapest.len(), 1);
    assert_eq!(extremes.cheapest[0].airline, "Spirit");
    assert!(close(extremes.cheapest[0].price, 150.0));
    assert_eq!(extremes.most_expensive[0].airline, "United");
    assert!(close(extremes.most_expensive[0].price, 305.0));
}

#[test]
fn trip_frequency_counts_both_directions_in_year() {
    let frequency = analysis::average_trip_frequency(
        &fixture(),
        &CityPair::new("New York", "Chicago"),
        2023,
    )
    .expect("bookings in 2023");
    assert_eq!(frequency.bookings, 5);
    assert_eq!(frequency.users, 3);
    assert_eq!(report::round_currency(frequency.average_per_user), 1.67);
}

#[test]
fn trip_frequency_without_bookings_is_none() {
    let table = fixture();
    assert!(
        analysis::average_trip_frequency(&table, &CityPair::new("New York", "Chicago"), 1999)
            .is_none()
    );
    assert!(
        analysis::average_trip_frequency(&table, &CityPair::new("Paris", "Rome"), 2023).is_none()
    );
}

#[test]
fn lead_times_ignore_emails_after_departure() {
    let mut late = booking("A", "B", 10.0, 1);
    late.email_time = at("2023-03-20");
    let mut early = booking("A", "B", 400.0, 1);
    early.email_time = at("2023-03-05");
    let bookings = table(vec![late, early]);
    let top = analysis::top_routes(&bookings, 10);
    let lead_times = analysis::best_lead_times(&bookings, &top, 0.0).unwrap();
    assert_eq!(lead_times.len(), 1);
    assert_eq!(lead_times[0].days_ahead, 10);
    assert!(close(lead_times[0].avg_price_per_traveler, 400.0));
}

#[test]
fn lead_times_pick_cheapest_bucket_per_route() {
    let table = fixture();
    let top = analysis::top_routes(&table, 10);
    let lead_times = analysis::best_lead_times(&table, &top, 30.0).unwrap();
    let find = |route: &str| {
        lead_times
            .iter()
            .find(|l| l.route == route)
            .map(|l| (l.days_ahead, l.avg_price_per_traveler))
    };
    assert_eq!(find("New York -- Chicago"), Some((30, 150.0)));
    assert_eq!(find("New York -- Boston"), Some((14, 90.0)));
    assert_eq!(find("Chicago -- New York"), Some((16, 150.0)));
}

#[test]
fn lead_time_amount_threshold_is_exclusive() {
    let bookings = table(vec![booking("A", "B", 30.0, 1)]);
    let top = analysis::top_routes(&bookings, 10);
    assert!(analysis::best_lead_times(&bookings, &top, 30.0).unwrap().is_empty());
}

#[test]
fn cabin_comparison_on_most_frequent_route() {
    let comparison = analysis::cabin_price_comparison(&fixture())
        .unwrap()
        .expect("bookings present");
    assert_eq!(comparison.route, "New York -- Chicago");
    assert!(comparison.economy_present);
    let economy = &comparison.cabins[0];
    assert_eq!(economy.cabin, CabinClass::Economy);
    assert_eq!(report::round_currency(economy.avg_price_per_traveler), 203.33);
    assert_eq!(economy.pct_vs_economy, Some(0.0));
    let business = comparison
        .cabins
        .iter()
        .find(|c| c.cabin == CabinClass::BusinessFirst)
        .unwrap();
    assert_eq!(business.pct_vs_economy.map(report::round_currency), Some(72.13));
}

#[test]
fn cabin_comparison_without_economy_has_no_percentages() {
    let mut first = booking("A", "B", 900.0, 1);
    first.cabin_class = "First".into();
    let mut main = booking("A", "B", 300.0, 1);
    main.cabin_class = "Main Cabin".into();
    let comparison = analysis::cabin_price_comparison(&table(vec![first, main]))
        .unwrap()
        .unwrap();
    assert!(!comparison.economy_present);
    assert!(comparison.cabins.iter().all(|c| c.pct_vs_economy.is_none()));
}

#[test]
fn seasonal_answers_on_fixture() {
    let table = fixture();
    let month = analysis::cheapest_month(&table, &CityPair::new("Chicago", "New York"))
        .unwrap()
        .expect("pair booked");
    assert_eq!(month.month, 6);
    assert!(close(month.avg_price_per_traveler, 150.0));

    let cheapest = analysis::cheapest_booking(&table, &CityPair::new("New York", "Boston"))
        .unwrap()
        .expect("route booked");
    assert_eq!(cheapest.departure_date.to_string(), "2023-04-03");
    assert_eq!(cheapest.order_total_amount, 180.0);
    assert_eq!(cheapest.airline, "Delta");

    let reverse = analysis::cheapest_booking(&table, &CityPair::new("Boston", "New York"))
        .unwrap()
        .expect("reverse booked");
    assert_eq!(reverse.order_total_amount, 110.0);
}

#[test]
fn empty_table_yields_empty_findings() {
    let empty = table(Vec::new());
    let findings = analysis::run_all(&empty, &AnalysisConfig::default()).unwrap();
    assert!(findings.top_routes.is_empty());
    assert!(findings.route_prices.is_empty());
    assert!(findings.airline_extremes.cheapest.is_empty());
    assert!(findings.trip_frequency.is_none());
    assert!(findings.lead_times.is_empty());
    assert!(findings.cabin_comparison.is_none());
    assert!(findings.seasonal.cheapest_month.is_none());
    assert!(findings.seasonal.cheapest_booking.is_none());
}

#[test]
fn run_all_is_repeatable() {
    let table = fixture();
    let config = AnalysisConfig::default();
    let first = analysis::run_all(&table, &config).unwrap();
    let second = analysis::run_all(&table, &config).unwrap();
    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn price_per_traveler_is_defined_for_every_kept_booking(
        rows in prop::collection::vec((-100.0f64..1000.0, -2i16..6), 0..40)
    ) {
        let bookings = rows
            .iter()
            .map(|(amount, travelers)| booking("A", "B", *amount, *travelers))
            .collect::<Vec<_>>();
        let table = table(bookings);
        let priced = analysis::price_bookings(&table).unwrap();
        prop_assert_eq!(priced.len(), table.len());
        prop_assert!(priced.iter().all(|p| p.price_per_traveler.is_finite() && p.price_per_traveler > 0.0));
    }
}
