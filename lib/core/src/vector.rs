use serde::{Deserialize, Serialize};

/// An ordered, positional vector of model input features
///
/// Position `i` holds the value of the `i`-th column of the schema the
/// vector was built against. Column names are not carried here; the
/// classifier consumes positions only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    data: Vec<f64>,
}

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// All-zero vector of the given dimension
    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f64]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.data.get(index).copied()
    }

    /// Dot product with a weight slice of the same dimension
    ///
    /// Returns `None` when dimensions differ.
    #[inline]
    pub fn dot(&self, weights: &[f64]) -> Option<f64> {
        if self.data.len() != weights.len() {
            return None;
        }
        Some(self.data.iter().zip(weights).map(|(x, w)| x * w).sum())
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(data: Vec<f64>) -> Self {
        Self::new(data)
    }
}
