//! Tumor classifier integration
//!
//! Wraps the pre-trained scan classifier behind a trait so the web layer can
//! share one loaded instance and tests can substitute a mock.

pub mod mock;
pub mod onnx;

pub use mock::MockClassifier;
pub use onnx::OnnxClassifier;

use crate::image::InputTensor;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;

pub const CLASS_COUNT: usize = 3;

/// Class probabilities in the fixed order no-tumor, tumor, unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProbabilityVector([f32; CLASS_COUNT]);

impl ProbabilityVector {
    pub fn new(values: [f32; CLASS_COUNT]) -> Self {
        Self(values)
    }

    pub fn from_slice(values: &[f32]) -> Result<Self> {
        let values: [f32; CLASS_COUNT] = values.try_into().map_err(|_| {
            Error::Model(format!(
                "Classifier returned {} values, expected {}",
                values.len(),
                CLASS_COUNT
            ))
        })?;
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f32; CLASS_COUNT] {
        &self.0
    }

    pub fn no_tumor(&self) -> f32 {
        self.0[0]
    }

    pub fn tumor(&self) -> f32 {
        self.0[1]
    }

    pub fn unsupported(&self) -> f32 {
        self.0[2]
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn predict(&self, tensor: InputTensor) -> Result<ProbabilityVector>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_requires_three_values() {
        let probs = ProbabilityVector::from_slice(&[0.1, 0.85, 0.05]).unwrap();
        assert_eq!(probs.tumor(), 0.85);
        assert_eq!(probs.no_tumor(), 0.1);
        assert_eq!(probs.unsupported(), 0.05);

        assert!(matches!(
            ProbabilityVector::from_slice(&[0.5, 0.5]),
            Err(Error::Model(_))
        ));
        assert!(ProbabilityVector::from_slice(&[0.25; 4]).is_err());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let probs = ProbabilityVector::new([0.0, 0.0, 1.0]);
        assert_eq!(serde_json::to_string(&probs).unwrap(), "[0.0,0.0,1.0]");
    }
}
