use super::{Classifier, ProbabilityVector};
use crate::image::InputTensor;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockClassifier {
    responses: Arc<Mutex<Vec<ProbabilityVector>>>,
    should_fail: Arc<Mutex<bool>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, values: [f32; 3]) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(ProbabilityVector::new(values));
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn predict(&self, _tensor: InputTensor) -> Result<ProbabilityVector> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        if *self.should_fail.lock().unwrap() {
            return Err(Error::Model("Mock inference failure".to_string()));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(ProbabilityVector::new([1.0, 0.0, 0.0]))
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index])
        }
    }
}
