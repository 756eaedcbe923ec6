//! Scan analysis pipeline: upload, tensor, probabilities, diagnosis.

use crate::classifier::Classifier;
use crate::diagnosis::Diagnosis;
use crate::image::{preprocess_blocking, UploadedImage};
use crate::{Error, Result};
use std::path::Path;

pub async fn analyze(classifier: &dyn Classifier, upload: &UploadedImage) -> Result<Diagnosis> {
    let tensor = preprocess_blocking(upload.bytes.clone()).await?;
    let probabilities = classifier.predict(tensor).await?;
    let diagnosis = Diagnosis::from_probabilities(probabilities);

    tracing::info!(
        "Analyzed {} ({} bytes): {} at {}",
        upload.file_name,
        upload.bytes.len(),
        diagnosis.verdict,
        diagnosis.confidence_text()
    );

    Ok(diagnosis)
}

/// Analyze an image on local disk.
pub async fn analyze_file(classifier: &dyn Classifier, path: &Path) -> Result<Diagnosis> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::UnsupportedFormat(format!("invalid path {}", path.display())))?
        .to_string();
    let bytes = tokio::fs::read(path).await?;

    let upload = UploadedImage::new(file_name, bytes)?;
    analyze(classifier, &upload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::MockClassifier;
    use crate::diagnosis::Verdict;
    use image::{DynamicImage, ImageFormat, Luma, GrayImage};

    fn png_scan() -> Vec<u8> {
        let img = GrayImage::from_pixel(64, 64, Luma([90]));
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_analyze_runs_classifier_once() {
        let classifier = MockClassifier::new().with_response([0.1, 0.85, 0.05]);
        let upload = UploadedImage::new("scan.png", png_scan()).unwrap();

        let diagnosis = analyze(&classifier, &upload).await.unwrap();

        assert_eq!(diagnosis.verdict, Verdict::Tumor);
        assert_eq!(diagnosis.confidence_text(), "85.00%");
        assert_eq!(classifier.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_upload_never_reaches_classifier() {
        let classifier = MockClassifier::new();
        let upload = UploadedImage::new("scan.jpg", b"not really a jpeg".to_vec()).unwrap();

        let err = analyze(&classifier, &upload).await.unwrap_err();

        assert!(matches!(err, Error::Image(_)));
        assert_eq!(classifier.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_classifier_failure_propagates() {
        let classifier = MockClassifier::new().with_failure(true);
        let upload = UploadedImage::new("scan.png", png_scan()).unwrap();

        let err = analyze(&classifier, &upload).await.unwrap_err();
        assert!(matches!(err, Error::Model(_)));
    }

    #[tokio::test]
    async fn test_analyze_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patient.png");
        std::fs::write(&path, png_scan()).unwrap();

        let classifier = MockClassifier::new().with_response([0.0, 0.0, 1.0]);
        let diagnosis = analyze_file(&classifier, &path).await.unwrap();
        assert_eq!(diagnosis.verdict, Verdict::Unsupported);
    }

    #[tokio::test]
    async fn test_analyze_file_rejects_unaccepted_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patient.tiff");
        std::fs::write(&path, png_scan()).unwrap();

        let err = analyze_file(&MockClassifier::new(), &path).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
