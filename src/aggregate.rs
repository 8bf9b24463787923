//! Aggregation engine.
//!
//! [`aggregate`] groups rows by a key and reduces one or more numeric
//! measures per group. Output rows are ordered by key. Every group holds at
//! least one row, so every reduction is defined.
//!
//! [`weighted_rollup`] is the two-level fare aggregation used for airline
//! comparisons: per (route, airline, cabin bucket) averages weighted by
//! traveler share inside their (route, airline) group.

use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
};

use itertools::Itertools;
use log::debug;
use serde::Serialize;

use crate::derive::CabinClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reduction {
    Count,
    Sum,
    Mean,
    Median,
}

impl Reduction {
    pub fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Reduction::Count => values.len() as f64,
            Reduction::Sum => values.iter().sum(),
            Reduction::Mean => {
                if values.is_empty() {
                    f64::NAN
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            Reduction::Median => median(values),
        }
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let sorted = values.iter().copied().sorted_by(f64::total_cmp).collect::<Vec<_>>();
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// A named numeric column extracted from each row and reduced per group.
pub struct Measure<T> {
    pub name: &'static str,
    pub source: fn(&T) -> f64,
    pub reduction: Reduction,
}

impl<T> Measure<T> {
    pub fn new(name: &'static str, source: fn(&T) -> f64, reduction: Reduction) -> Self {
        Self {
            name,
            source,
            reduction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow<K> {
    pub key: K,
    pub rows: usize,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable<K> {
    pub names: Vec<&'static str>,
    pub rows: Vec<AggregateRow<K>>,
}

impl<K> AggregateTable<K> {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| *n == name)
    }

    /// Value of `name` for `row`; `None` when the column is not part of this table.
    pub fn value(&self, row: &AggregateRow<K>, name: &str) -> Option<f64> {
        self.column_index(name).and_then(|idx| row.values.get(idx).copied())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Groups rows by key, preserving input order inside each group.
pub fn group_by<'a, T, K, KF>(rows: impl IntoIterator<Item = &'a T>, key: KF) -> BTreeMap<K, Vec<&'a T>>
where
    T: 'a,
    K: Ord,
    KF: Fn(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'a T>> = BTreeMap::new();
    for row in rows {
        groups.entry(key(row)).or_default().push(row);
    }
    groups
}

pub fn aggregate<'a, T, K, KF>(
    rows: impl IntoIterator<Item = &'a T>,
    key: KF,
    measures: &[Measure<T>],
) -> AggregateTable<K>
where
    T: 'a,
    K: Ord,
    KF: Fn(&T) -> K,
{
    let groups = group_by(rows, key);
    debug!("Aggregated into {} group(s)", groups.len());
    let rows = groups
        .into_iter()
        .map(|(key, members)| {
            let values = measures
                .iter()
                .map(|measure| {
                    let column = members.iter().map(|row| (measure.source)(*row)).collect::<Vec<_>>();
                    measure.reduction.apply(&column)
                })
                .collect();
            AggregateRow {
                key,
                rows: members.len(),
                values,
            }
        })
        .collect();
    AggregateTable {
        names: measures.iter().map(|m| m.name).collect(),
        rows,
    }
}

/// Frequency of each key, most frequent first. Equal counts keep the order in
/// which the keys first appeared.
pub fn value_counts<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match positions.get(&key) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                positions.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    // stable sort keeps first-appearance order for ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// One booking's contribution to the airline fare rollup.
#[derive(Debug, Clone, PartialEq)]
pub struct FareObservation {
    pub route: String,
    pub airline: String,
    pub cabin: CabinClass,
    pub amount: f64,
    pub travelers: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CabinBucket {
    pub route: String,
    pub airline: String,
    pub cabin: CabinClass,
    pub total_amount: f64,
    pub travelers: i64,
    pub avg_price_per_traveler: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedPrice {
    pub route: String,
    pub airline: String,
    pub weighted_avg_price: f64,
}

/// Per-cabin buckets for each (route, airline), before weighting.
///
/// Buckets whose average price per traveler falls below `min_price` are
/// discarded; weights are the bucket's share of the travelers that remain in
/// its (route, airline) group.
pub fn cabin_buckets(observations: &[FareObservation], min_price: f64) -> Vec<CabinBucket> {
    let grouped = group_by(observations, |o| (o.route.clone(), o.airline.clone(), o.cabin));
    let mut buckets = grouped
        .into_iter()
        .filter_map(|((route, airline, cabin), members)| {
            let total_amount = members.iter().map(|o| o.amount).sum::<f64>();
            let travelers = members.iter().map(|o| i64::from(o.travelers)).sum::<i64>();
            if travelers <= 0 {
                return None;
            }
            let avg_price_per_traveler = total_amount / travelers as f64;
            (avg_price_per_traveler >= min_price).then_some(CabinBucket {
                route,
                airline,
                cabin,
                total_amount,
                travelers,
                avg_price_per_traveler,
                weight: 0.0,
            })
        })
        .collect::<Vec<_>>();

    let mut group_travelers: HashMap<(String, String), i64> = HashMap::new();
    for bucket in &buckets {
        *group_travelers
            .entry((bucket.route.clone(), bucket.airline.clone()))
            .or_insert(0) += bucket.travelers;
    }
    for bucket in &mut buckets {
        let total = group_travelers
            .get(&(bucket.route.clone(), bucket.airline.clone()))
            .copied()
            .unwrap_or(bucket.travelers);
        bucket.weight = bucket.travelers as f64 / total as f64;
    }
    buckets
}

/// Traveler-weighted average price per (route, airline), ordered by route then airline.
pub fn weighted_rollup(observations: &[FareObservation], min_price: f64) -> Vec<WeightedPrice> {
    let buckets = cabin_buckets(observations, min_price);
    debug!(
        "Weighted rollup kept {} cabin bucket(s) from {} observation(s)",
        buckets.len(),
        observations.len()
    );
    group_by(&buckets, |b| (b.route.clone(), b.airline.clone()))
        .into_iter()
        .map(|((route, airline), members)| WeightedPrice {
            route,
            airline,
            weighted_avg_price: members
                .iter()
                .map(|b| b.avg_price_per_traveler * b.weight)
                .sum(),
        })
        .collect()
}
