use super::{Classifier, ProbabilityVector};
use crate::image::{InputTensor, TENSOR_SHAPE};
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tract_onnx::prelude::*;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// Classifier backed by an ONNX export of the trained network.
///
/// The plan is optimized once at load time and only read afterwards, so a
/// single instance is shared across all sessions without locking.
#[derive(Clone)]
pub struct OnnxClassifier {
    plan: Arc<Plan>,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path) -> Result<Self> {
        tracing::info!("Loading classifier from {}", model_path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(model_path)
            .and_then(|model| model.with_input_fact(0, f32::fact(TENSOR_SHAPE).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                Error::Model(format!(
                    "Failed to load model {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        Ok(Self {
            plan: Arc::new(plan),
        })
    }

    fn run(plan: &Plan, tensor: InputTensor) -> Result<ProbabilityVector> {
        let input = Tensor::from_shape(&TENSOR_SHAPE, tensor.data())
            .map_err(|e| Error::Model(format!("Failed to build input tensor: {}", e)))?;

        let outputs = plan
            .run(tvec!(input.into_tvalue()))
            .map_err(|e| Error::Model(format!("Inference failed: {}", e)))?;

        let output = outputs
            .first()
            .ok_or_else(|| Error::Model("Model produced no outputs".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| Error::Model(format!("Unexpected output type: {}", e)))?;

        let values: Vec<f32> = view.iter().copied().collect();
        ProbabilityVector::from_slice(&values)
    }
}

#[async_trait]
impl Classifier for OnnxClassifier {
    async fn predict(&self, tensor: InputTensor) -> Result<ProbabilityVector> {
        let plan = Arc::clone(&self.plan);
        tokio::task::spawn_blocking(move || Self::run(&plan, tensor))
            .await
            .map_err(|e| Error::Invariant(format!("Inference task join error: {}", e)))?
    }
}
