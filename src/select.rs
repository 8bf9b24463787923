//! Selector/Ranker.
//!
//! Picks the extremal row per group. Ties go to the row that appears first in
//! the input, so results depend on input order and are reproducible for a
//! given order. Rows whose comparison value is NaN are never selected.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

impl Extremum {
    fn improves(&self, candidate: f64, current: f64) -> bool {
        match self {
            Extremum::Min => candidate < current,
            Extremum::Max => candidate > current,
        }
    }
}

/// The extremal row of `rows`, or `None` when there is nothing to choose from.
pub fn select_one<'a, T, VF>(
    rows: impl IntoIterator<Item = &'a T>,
    value: VF,
    extremum: Extremum,
) -> Option<&'a T>
where
    T: 'a,
    VF: Fn(&T) -> f64,
{
    let mut best: Option<(&'a T, f64)> = None;
    for row in rows {
        let candidate = value(row);
        if candidate.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if !extremum.improves(candidate, current) => {}
            _ => best = Some((row, candidate)),
        }
    }
    best.map(|(row, _)| row)
}

/// One extremal row per group, in order of each group's first appearance.
pub fn select_per_group<'a, T, K, KF, VF>(
    rows: impl IntoIterator<Item = &'a T>,
    key: KF,
    value: VF,
    extremum: Extremum,
) -> Vec<&'a T>
where
    T: 'a,
    K: Eq + Hash,
    KF: Fn(&T) -> K,
    VF: Fn(&T) -> f64,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut winners: Vec<(&'a T, f64)> = Vec::new();
    for row in rows {
        let candidate = value(row);
        if candidate.is_nan() {
            continue;
        }
        let group = key(row);
        match positions.get(&group) {
            Some(&idx) => {
                if extremum.improves(candidate, winners[idx].1) {
                    winners[idx] = (row, candidate);
                }
            }
            None => {
                positions.insert(group, winners.len());
                winners.push((row, candidate));
            }
        }
    }
    winners.into_iter().map(|(row, _)| row).collect()
}
