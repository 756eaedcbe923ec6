//! Scan upload handling and classifier input preparation
//!
//! Turns an uploaded image into the fixed-size single-channel tensor the
//! tumor classifier expects.

pub mod format;
pub mod preprocessor;

pub use format::{sniff_format, UploadFormat};
pub use preprocessor::{preprocess, preprocess_blocking};

use crate::{Error, Result};
use base64::Engine as _;

/// Side length the classifier was trained on.
pub const IMG_SIZE: u32 = 128;
pub const TENSOR_SHAPE: [usize; 4] = [1, IMG_SIZE as usize, IMG_SIZE as usize, 1];
pub const TENSOR_LEN: usize = (IMG_SIZE * IMG_SIZE) as usize;

/// Raw upload, owned by a single request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub declared_format: UploadFormat,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let declared_format = UploadFormat::from_file_name(&file_name)?;
        if bytes.is_empty() {
            return Err(Error::UnsupportedFormat(format!("'{}' is empty", file_name)));
        }

        Ok(Self {
            file_name,
            declared_format,
            bytes,
        })
    }

    /// Inline `data:` URL for showing the upload back to the user.
    pub fn preview_data_url(&self) -> String {
        let format = sniff_format(&self.bytes).unwrap_or(self.declared_format);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", format.mime(), encoded)
    }
}

/// NHWC tensor of shape `(1, 128, 128, 1)` with values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
}

impl InputTensor {
    pub fn new(data: Vec<f32>) -> Result<Self> {
        if data.len() != TENSOR_LEN {
            return Err(Error::Invariant(format!(
                "Input tensor needs {} values, got {}",
                TENSOR_LEN,
                data.len()
            )));
        }
        Ok(Self { data })
    }

    pub fn shape(&self) -> [usize; 4] {
        TENSOR_SHAPE
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}
