//! `DerivedView`: ordered key → measure pairs produced by an aggregation.

use std::collections::BTreeMap;

use serde::Serialize;

/// An aggregated mapping from a grouping key to a measure.
///
/// Keys are unique. Order is decided by the aggregation that built the view
/// (ascending keys for dates and labels, canonical order for weekdays) and is
/// preserved as-is for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DerivedView<K, M> {
    entries: Vec<(K, M)>,
}

impl<K, M> DerivedView<K, M> {
    /// Build from pairs already in their final order.
    ///
    /// Callers guarantee key uniqueness.
    pub(crate) fn from_ordered(entries: Vec<(K, M)>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn entries(&self) -> &[(K, M)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &M)> {
        self.entries.iter().map(|(k, m)| (k, m))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn measures(&self) -> impl Iterator<Item = &M> {
        self.entries.iter().map(|(_, m)| m)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn map_measures<N>(self, mut f: impl FnMut(&K, M) -> N) -> DerivedView<K, N> {
        DerivedView {
            entries: self
                .entries
                .into_iter()
                .map(|(k, m)| {
                    let n = f(&k, m);
                    (k, n)
                })
                .collect(),
        }
    }
}

impl<K: PartialEq, M> DerivedView<K, M> {
    pub fn get(&self, key: &K) -> Option<&M> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, m)| m)
    }
}

impl<K: Ord, M> From<BTreeMap<K, M>> for DerivedView<K, M> {
    /// Ascending by key.
    fn from(map: BTreeMap<K, M>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }
}

impl<K> DerivedView<K, usize> {
    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

impl<K: Clone> DerivedView<K, usize> {
    /// Re-expand a count view into one key per counted record, in view order.
    pub fn flatten(&self) -> Vec<K> {
        self.entries
            .iter()
            .flat_map(|(k, n)| std::iter::repeat_n(k.clone(), *n))
            .collect()
    }
}

/// Tally keys into a count view, ascending by key.
pub fn count_keys<K: Ord>(keys: impl IntoIterator<Item = K>) -> DerivedView<K, usize> {
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts.into()
}
