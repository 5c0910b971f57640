//! Bounded, most-correlated-first neighbor list.

use serde::{Deserialize, Serialize};

use crate::data::UserId;

/// A candidate neighbor and its correlation weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Pearson-style correlation weight
    pub weight: f64,
    /// Neighbor user
    pub user: UserId,
}

/// Top-K neighbors of one user, sorted by descending weight.
///
/// Ties keep insertion order: of two equal weights, the one offered first
/// ranks first and the one offered last is the first to be dropped.
///
/// # Examples
///
/// ```
/// use usercf::recommend::NeighborList;
///
/// let mut list = NeighborList::new(2);
/// list.offer(0.2, 7);
/// list.offer(0.9, 3);
/// list.offer(0.5, 4);
///
/// let users: Vec<usize> = list.iter().map(|n| n.user).collect();
/// assert_eq!(users, vec![3, 4]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborList {
    capacity: usize,
    entries: Vec<Neighbor>,
}

impl NeighborList {
    /// Create an empty list that keeps at most `capacity` neighbors.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity.min(64)),
        }
    }

    /// Offer a candidate. Returns `true` if it is in the list afterwards.
    ///
    /// A NaN weight is never retained.
    pub fn offer(&mut self, weight: f64, user: UserId) -> bool {
        if weight.is_nan() {
            return false;
        }

        let pos = self.entries.partition_point(|n| n.weight >= weight);
        if pos >= self.capacity {
            return false;
        }

        self.entries.insert(pos, Neighbor { weight, user });
        self.entries.truncate(self.capacity);
        true
    }

    /// Maximum number of neighbors.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of neighbors held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no candidate qualified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Neighbors, most correlated first.
    #[must_use]
    pub fn as_slice(&self) -> &[Neighbor] {
        &self.entries
    }

    /// Iterate neighbors, most correlated first.
    pub fn iter(&self) -> std::slice::Iter<'_, Neighbor> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a NeighborList {
    type Item = &'a Neighbor;
    type IntoIter = std::slice::Iter<'a, Neighbor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(list: &NeighborList) -> Vec<UserId> {
        list.iter().map(|n| n.user).collect()
    }

    #[test]
    fn test_keeps_descending_order() {
        let mut list = NeighborList::new(5);
        for (w, u) in [(0.1, 1), (0.7, 2), (-0.4, 3), (0.3, 4)] {
            assert!(list.offer(w, u));
        }
        assert_eq!(users(&list), vec![2, 4, 1, 3]);
        assert!(list
            .as_slice()
            .windows(2)
            .all(|w| w[0].weight >= w[1].weight));
    }

    #[test]
    fn test_drops_least_correlated() {
        let mut list = NeighborList::new(2);
        list.offer(0.5, 1);
        list.offer(0.6, 2);
        assert!(list.offer(0.9, 3));
        assert!(!list.offer(0.1, 4));
        assert_eq!(users(&list), vec![3, 2]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_ties_favor_first_offered() {
        let mut list = NeighborList::new(2);
        list.offer(0.5, 10);
        list.offer(0.5, 11);
        assert!(!list.offer(0.5, 12));
        assert_eq!(users(&list), vec![10, 11]);

        assert!(list.offer(0.8, 13));
        assert_eq!(users(&list), vec![13, 10]);
    }

    #[test]
    fn test_nan_rejected() {
        let mut list = NeighborList::new(3);
        assert!(!list.offer(f64::NAN, 1));
        assert!(list.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_nothing() {
        let mut list = NeighborList::new(0);
        assert!(!list.offer(1.0, 1));
        assert!(list.is_empty());
        assert_eq!(list.capacity(), 0);
    }

    #[test]
    fn test_negative_weights_rank_last() {
        let mut list = NeighborList::new(1);
        list.offer(-0.9, 1);
        list.offer(-0.1, 2);
        assert_eq!(users(&list), vec![2]);
    }
}
