use fare_insights::{
    aggregate::{self, FareObservation, Measure, Reduction, cabin_buckets, weighted_rollup},
    derive::CabinClass,
};

fn obs(airline: &str, cabin: CabinClass, amount: f64, travelers: i16) -> FareObservation {
    FareObservation {
        route: "New York -- Chicago".to_string(),
        airline: airline.to_string(),
        cabin,
        amount,
        travelers,
    }
}

#[test]
fn weighted_rollup_favours_the_bucket_with_more_travelers() {
    let observations = vec![
        obs("Delta", CabinClass::Economy, 50.0, 5),
        obs("Delta", CabinClass::BusinessFirst, 300.0, 1),
    ];
    let rollup = weighted_rollup(&observations, 10.0);
    assert_eq!(rollup.len(), 1);
    assert!((rollup[0].weighted_avg_price - 58.333_333).abs() < 1e-4);

    let simple_mean = Reduction::Mean.apply(&[50.0 / 5.0, 300.0]);
    assert_eq!(simple_mean, 155.0);
}

#[test]
fn single_bucket_airlines_have_unit_weight() {
    let observations = vec![
        obs("Delta", CabinClass::Economy, 200.0, 2),
        obs("United", CabinClass::Economy, 150.0, 1),
    ];
    let buckets = cabin_buckets(&observations, 10.0);
    assert_eq!(buckets.len(), 2);
    assert!(buckets.iter().all(|b| b.weight == 1.0));

    let rollup = weighted_rollup(&observations, 10.0);
    assert_eq!(rollup[0].airline, "Delta");
    assert_eq!(rollup[0].weighted_avg_price, 100.0);
    assert_eq!(rollup[1].weighted_avg_price, 150.0);
}

#[test]
fn cheap_buckets_are_dropped_before_weighting() {
    let observations = vec![
        obs("Delta", CabinClass::Economy, 5.0, 1),
        obs("Delta", CabinClass::BusinessFirst, 400.0, 1),
        obs("Spirit", CabinClass::Economy, 9.0, 3),
    ];
    let rollup = weighted_rollup(&observations, 10.0);
    assert_eq!(rollup.len(), 1);
    assert_eq!(rollup[0].airline, "Delta");
    assert_eq!(rollup[0].weighted_avg_price, 400.0);
}

#[test]
fn weights_sum_to_one_within_each_airline() {
    let observations = vec![
        obs("Delta", CabinClass::Economy, 300.0, 3),
        obs("Delta", CabinClass::MainCabin, 250.0, 1),
        obs("Delta", CabinClass::BusinessFirst, 900.0, 2),
        obs("United", CabinClass::Economy, 120.0, 1),
        obs("United", CabinClass::BusinessFirst, 700.0, 1),
    ];
    let buckets = cabin_buckets(&observations, 10.0);
    for airline in ["Delta", "United"] {
        let total = buckets
            .iter()
            .filter(|b| b.airline == airline)
            .map(|b| b.weight)
            .sum::<f64>();
        assert!((total - 1.0).abs() < 1e-9, "{airline} weights sum to {total}");
    }
}

struct Sample {
    group: &'static str,
    value: f64,
}

fn one(_: &Sample) -> f64 {
    1.0
}

fn sample_value(sample: &Sample) -> f64 {
    sample.value
}

#[test]
fn aggregate_orders_groups_by_key() {
    let rows = [("b", 4.0), ("a", 1.0), ("b", 2.0), ("a", 3.0), ("c", 10.0)]
        .into_iter()
        .map(|(group, value)| Sample { group, value })
        .collect::<Vec<_>>();
    let table = aggregate::aggregate(
        &rows,
        |row| row.group,
        &[
            Measure::new("count", one, Reduction::Count),
            Measure::new("mean", sample_value, Reduction::Mean),
            Measure::new("median", sample_value, Reduction::Median),
        ],
    );
    let keys = table.rows.iter().map(|r| r.key).collect::<Vec<_>>();
    assert_eq!(keys, vec!["a", "b", "c"]);
    let b = &table.rows[1];
    assert_eq!(b.rows, 2);
    assert_eq!(table.value(b, "count"), Some(2.0));
    assert_eq!(table.value(b, "mean"), Some(3.0));
    assert_eq!(table.value(b, "median"), Some(3.0));
    assert_eq!(table.value(b, "sum"), None);
}
