use crate::{Error, Result};
use serde::Serialize;

/// Upload formats accepted by the scan uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFormat {
    Jpeg,
    Png,
}

impl UploadFormat {
    /// Resolve the declared format from an uploaded file's name.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            _ => Err(Error::UnsupportedFormat(format!(
                "'{}' (accepted: jpg, jpeg, png)",
                file_name
            ))),
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Identify the actual encoding from magic bytes.
pub fn sniff_format(bytes: &[u8]) -> Option<UploadFormat> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some(UploadFormat::Jpeg),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(UploadFormat::Png),
        _ => {
            tracing::debug!(
                "Unrecognized upload signature (first 4 bytes: {:02X?})",
                &bytes[..bytes.len().min(4)]
            );
            None
        }
    }
}
