use fare_insights::select::{Extremum, select_one, select_per_group};

#[derive(Debug, PartialEq)]
struct Quote {
    route: &'static str,
    airline: &'static str,
    price: f64,
}

fn quote(route: &'static str, airline: &'static str, price: f64) -> Quote {
    Quote {
        route,
        airline,
        price,
    }
}

#[test]
fn ties_go_to_the_first_row_seen() {
    let quotes = vec![
        quote("A -- B", "Delta", 100.0),
        quote("A -- B", "United", 100.0),
        quote("A -- B", "Spirit", 150.0),
    ];
    let cheapest = select_one(&quotes, |q| q.price, Extremum::Min).unwrap();
    assert_eq!(cheapest.airline, "Delta");

    let reversed = quotes.iter().rev().collect::<Vec<_>>();
    let cheapest = select_one(reversed.iter().copied(), |q| q.price, Extremum::Min).unwrap();
    assert_eq!(cheapest.airline, "United");
}

#[test]
fn repeated_selection_is_deterministic() {
    let quotes = vec![
        quote("A -- B", "Delta", 90.0),
        quote("C -- D", "Alaska", 40.0),
        quote("A -- B", "United", 90.0),
        quote("C -- D", "JetBlue", 40.0),
    ];
    let first = select_per_group(&quotes, |q| q.route, |q| q.price, Extremum::Max);
    for _ in 0..10 {
        let again = select_per_group(&quotes, |q| q.route, |q| q.price, Extremum::Max);
        assert_eq!(first, again);
    }
    let airlines = first.iter().map(|q| q.airline).collect::<Vec<_>>();
    assert_eq!(airlines, vec!["Delta", "Alaska"]);
}

#[test]
fn per_group_picks_min_and_max_independently() {
    let quotes = vec![
        quote("A -- B", "Delta", 120.0),
        quote("A -- B", "Spirit", 80.0),
        quote("A -- B", "United", 300.0),
        quote("B -- A", "Delta", 95.0),
    ];
    let low = select_per_group(&quotes, |q| q.route, |q| q.price, Extremum::Min);
    let high = select_per_group(&quotes, |q| q.route, |q| q.price, Extremum::Max);
    assert_eq!(low.iter().map(|q| q.airline).collect::<Vec<_>>(), vec!["Spirit", "Delta"]);
    assert_eq!(high.iter().map(|q| q.airline).collect::<Vec<_>>(), vec!["United", "Delta"]);
}

#[test]
fn empty_groups_select_nothing() {
    let quotes: Vec<Quote> = Vec::new();
    assert!(select_one(&quotes, |q| q.price, Extremum::Min).is_none());
    assert!(select_per_group(&quotes, |q| q.route, |q| q.price, Extremum::Min).is_empty());

    let nan_only = vec![quote("A -- B", "Delta", f64::NAN)];
    assert!(select_one(&nan_only, |q| q.price, Extremum::Max).is_none());
}
