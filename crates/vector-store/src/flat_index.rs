use crate::error::{Result, VectorStoreError};
use std::cmp::Ordering;

/// A search hit: insertion position of the stored vector and its squared
/// Euclidean distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Append-only exhaustive index over squared L2 distance.
///
/// The dimension is fixed by the first insert. Positions are assigned in
/// insertion order starting at 0 and never change.
#[derive(Debug, Default, Clone)]
pub struct FlatIndex {
    dimension: Option<usize>,
    // Row-major, `len() * dimension` floats.
    data: Vec<f32>,
    len: usize,
}

impl FlatIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed dimension, `None` until the first insert.
    #[must_use]
    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a batch. Every vector is validated before anything is stored,
    /// so a failed insert leaves the index untouched.
    pub fn insert(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        let Some(first) = vectors.first() else {
            return Ok(());
        };
        let expected = self.dimension.unwrap_or(first.len());
        if expected == 0 {
            return Err(VectorStoreError::IndexError(
                "cannot index zero-length vectors".to_string(),
            ));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(VectorStoreError::InvalidDimension {
                expected,
                actual: bad.len(),
            });
        }

        self.data.reserve(vectors.len() * expected);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        self.dimension = Some(expected);
        self.len += vectors.len();
        Ok(())
    }

    /// Up to `k` nearest stored vectors, closest first. Equal distances are
    /// ordered by position.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let Some(dimension) = self.dimension else {
            return Ok(vec![]);
        };
        if k == 0 {
            return Ok(vec![]);
        }
        if query.len() != dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: dimension,
                actual: query.len(),
            });
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(dimension)
            .enumerate()
            .map(|(position, stored)| Neighbor {
                position,
                distance: squared_l2(query, stored),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }
}

/// Squared Euclidean distance. Slices are expected to have equal length.
#[must_use]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_basic() {
        let mut index = FlatIndex::new();
        assert_eq!(index.dimension(), None);
        assert!(index.is_empty());

        index
            .insert(&[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.9, 0.1, 0.0]])
            .unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.dimension(), Some(3));

        let results = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        let positions: Vec<usize> = results.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![0, 2]);
        assert_eq!(results[0].distance, 0.0);
    }

    #[test]
    fn search_returns_at_most_len() {
        let mut index = FlatIndex::new();
        index.insert(&[vec![0.0], vec![2.0]]).unwrap();
        assert_eq!(index.search(&[0.0], 10).unwrap().len(), 2);
        assert!(index.search(&[0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn empty_index_searches_to_nothing() {
        let index = FlatIndex::new();
        assert!(index.search(&[1.0, 2.0], 5).unwrap().is_empty());
    }

    #[test]
    fn ties_break_by_position() {
        let mut index = FlatIndex::new();
        index
            .insert(&[vec![0.0, 1.0], vec![1.0, 0.0], vec![0.0, -1.0]])
            .unwrap();
        let results = index.search(&[0.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = results.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert!(results.iter().all(|n| n.distance == 1.0));
    }

    #[test]
    fn mismatched_batch_leaves_index_unchanged() {
        let mut index = FlatIndex::new();
        index.insert(&[vec![1.0, 1.0]]).unwrap();

        let err = index
            .insert(&[vec![0.0, 0.0], vec![0.0, 0.0, 0.0]])
            .unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::InvalidDimension {
                expected: 2,
                actual: 3
            }
        ));
        assert_eq!(index.len(), 1);
        assert_eq!(index.search(&[0.0, 0.0], 5).unwrap().len(), 1);
    }

    #[test]
    fn first_batch_must_agree_with_itself() {
        let mut index = FlatIndex::new();
        assert!(index.insert(&[vec![1.0], vec![1.0, 2.0]]).is_err());
        assert_eq!(index.dimension(), None);
        assert!(index.is_empty());
    }

    #[test]
    fn query_dimension_is_checked() {
        let mut index = FlatIndex::new();
        index.insert(&[vec![1.0, 0.0]]).unwrap();
        assert!(matches!(
            index.search(&[1.0], 1),
            Err(VectorStoreError::InvalidDimension {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn zero_length_vectors_are_rejected() {
        let mut index = FlatIndex::new();
        assert!(index.insert(&[vec![]]).is_err());
        assert!(index.insert(&[]).is_ok());
        assert!(index.is_empty());
    }

    #[test]
    fn squared_l2_has_no_root() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }
}
