//! Interpretation of classifier output
//!
//! Maps a three-class probability vector to a verdict, the tumor gauge and
//! the downloadable plain-text report. Everything here is pure.

use crate::classifier::ProbabilityVector;
use serde::Serialize;
use std::fmt;

pub const REPORT_FILE_NAME: &str = "neuroscan_report.txt";
pub const REPORT_MIME: &str = "text/plain";

pub const UNSUPPORTED_REPORT: &str =
    "Image is not a valid MRI scan. Please upload a proper MRI scan for analysis.";

const REPORT_HEADER: &str = "NeuroScan AI Brain Tumor Detection Report\n\
                             ---------------------------------------\n";

const TUMOR_FINDINGS: &str = "Findings: \n\
    The AI model detected a brain tumor in the provided MRI scan with a high confidence level.\n\
    It is highly recommended to consult a qualified radiologist or neurologist for further evaluation.\n\
    This report serves as a support tool and does not replace professional medical diagnosis.\n";

const NO_TUMOR_FINDINGS: &str = "Findings: \n\
    No brain tumor was detected in the MRI scan based on current AI model analysis.\n";

const REPORT_FOOTER: &str = "\nThank you for using NeuroScan AI.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    NoTumor,
    Tumor,
    Unsupported,
}

impl Verdict {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::NoTumor,
            1 => Self::Tumor,
            _ => Self::Unsupported,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoTumor => "No Tumor",
            Self::Tumor => "Tumor",
            Self::Unsupported => "Unsupported Image",
        }
    }

    /// Result line shown above the gauge.
    pub fn banner(&self) -> &'static str {
        match self {
            Self::NoTumor => "✅ Prediction: No Tumor Detected",
            Self::Tumor => "🚨 Prediction: Tumor Detected",
            Self::Unsupported => "⚠️ Image not supported. Please upload a valid MRI scan.",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Index of the largest value.
///
/// Scans left to right and only moves on a strictly greater value, so ties
/// resolve to the lowest index. NaN entries are skipped; an all-NaN slice
/// yields 0.
pub fn argmax(values: &[f32]) -> usize {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index).unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub verdict: Verdict,
    /// Probability of the chosen class, times 100.
    pub confidence: f64,
    pub probabilities: ProbabilityVector,
}

impl Diagnosis {
    pub fn from_probabilities(probabilities: ProbabilityVector) -> Self {
        let index = argmax(probabilities.values());
        let verdict = Verdict::from_index(index);
        let confidence = f64::from(probabilities.values()[index]) * 100.0;

        Self {
            verdict,
            confidence,
            probabilities,
        }
    }

    /// Confidence with exactly two decimals and a percent sign.
    pub fn confidence_text(&self) -> String {
        format!("{:.2}%", self.confidence)
    }

    pub fn gauge(&self) -> Gauge {
        Gauge::from_probabilities(&self.probabilities)
    }

    pub fn report(&self) -> Report {
        if self.verdict == Verdict::Unsupported {
            return Report {
                text: UNSUPPORTED_REPORT.to_string(),
            };
        }

        let findings = match self.verdict {
            Verdict::Tumor => TUMOR_FINDINGS,
            _ => NO_TUMOR_FINDINGS,
        };

        let text = format!(
            "{}Prediction: {}\nConfidence: {}\n\n{}{}",
            REPORT_HEADER,
            self.verdict.label(),
            self.confidence_text(),
            findings,
            REPORT_FOOTER
        );

        Report { text }
    }
}

/// Immutable report text offered for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    text: String,
}

impl Report {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn file_name(&self) -> &'static str {
        REPORT_FILE_NAME
    }

    pub fn mime(&self) -> &'static str {
        REPORT_MIME
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeBand {
    Green,
    Orange,
    Red,
}

/// Tumor probability dial, 0 to 100. Always tracks the tumor class,
/// whatever the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gauge {
    pub value: f64,
    pub band: GaugeBand,
}

impl Gauge {
    pub fn from_probabilities(probabilities: &ProbabilityVector) -> Self {
        let value = (f64::from(probabilities.tumor()) * 100.0).clamp(0.0, 100.0);
        let band = if value < 40.0 {
            GaugeBand::Green
        } else if value < 70.0 {
            GaugeBand::Orange
        } else {
            GaugeBand::Red
        };
        Self { value, band }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn diagnose(values: [f32; 3]) -> Diagnosis {
        Diagnosis::from_probabilities(ProbabilityVector::new(values))
    }

    #[test]
    fn test_argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 0.85, 0.05]), 1);
        assert_eq!(argmax(&[0.0, 0.0, 1.0]), 2);
        assert_eq!(argmax(&[0.7, 0.2, 0.1]), 0);
    }

    #[test]
    fn test_argmax_ties_resolve_to_lowest_index() {
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), 0);
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]), 0);
    }

    #[test]
    fn test_argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.3, 0.7]), 2);
        assert_eq!(argmax(&[0.9, f32::NAN, 0.1]), 0);
        assert_eq!(argmax(&[f32::NAN, f32::NAN, f32::NAN]), 0);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_tumor_example() {
        let diagnosis = diagnose([0.1, 0.85, 0.05]);

        assert_eq!(diagnosis.verdict, Verdict::Tumor);
        assert_eq!(diagnosis.confidence_text(), "85.00%");

        let report = diagnosis.report();
        assert!(report.as_str().contains("Tumor"));
        assert!(report.as_str().contains("consult"));
    }

    #[test]
    fn test_tumor_report_text() {
        let report = diagnose([0.1, 0.85, 0.05]).report();

        assert_eq!(
            report.as_str(),
            "NeuroScan AI Brain Tumor Detection Report\n\
             ---------------------------------------\n\
             Prediction: Tumor\n\
             Confidence: 85.00%\n\
             \n\
             Findings: \n\
             The AI model detected a brain tumor in the provided MRI scan with a high confidence level.\n\
             It is highly recommended to consult a qualified radiologist or neurologist for further evaluation.\n\
             This report serves as a support tool and does not replace professional medical diagnosis.\n\
             \n\
             Thank you for using NeuroScan AI."
        );
    }

    #[test]
    fn test_no_tumor_report_text() {
        let report = diagnose([0.9, 0.06, 0.04]).report();

        assert_eq!(
            report.as_str(),
            "NeuroScan AI Brain Tumor Detection Report\n\
             ---------------------------------------\n\
             Prediction: No Tumor\n\
             Confidence: 90.00%\n\
             \n\
             Findings: \n\
             No brain tumor was detected in the MRI scan based on current AI model analysis.\n\
             \n\
             Thank you for using NeuroScan AI."
        );
        assert!(!report.as_str().contains("consult"));
    }

    #[test]
    fn test_unsupported_report_is_fixed_sentence() {
        let diagnosis = diagnose([0.0, 0.0, 1.0]);
        assert_eq!(diagnosis.verdict, Verdict::Unsupported);

        let report = diagnosis.report();
        assert_eq!(report.as_str(), UNSUPPORTED_REPORT);
        assert!(!report.as_str().contains('%'));
        assert!(!report.as_str().contains("Findings"));
    }

    #[test]
    fn test_exact_tie_resolves_to_no_tumor() {
        let diagnosis = diagnose([0.5, 0.5, 0.0]);
        assert_eq!(diagnosis.verdict, Verdict::NoTumor);
        assert_eq!(diagnosis.confidence_text(), "50.00%");
        assert!(!diagnosis.report().as_str().contains("consult"));
    }

    #[test]
    fn test_confidence_uses_two_decimals() {
        assert_eq!(diagnose([0.12345, 0.8, 0.07655]).confidence_text(), "80.00%");
        assert_eq!(diagnose([0.987654, 0.01, 0.002346]).confidence_text(), "98.77%");
        assert_eq!(diagnose([1.0, 0.0, 0.0]).confidence_text(), "100.00%");
    }

    #[test]
    fn test_consult_marker_tracks_verdict() {
        for values in [[0.2, 0.7, 0.1], [0.0, 1.0, 0.0], [0.3, 0.35, 0.35]] {
            let diagnosis = diagnose(values);
            assert_eq!(diagnosis.verdict, Verdict::Tumor);
            assert!(diagnosis.report().as_str().contains("consult"));
        }
        for values in [[0.6, 0.3, 0.1], [0.34, 0.33, 0.33]] {
            let diagnosis = diagnose(values);
            assert_eq!(diagnosis.verdict, Verdict::NoTumor);
            assert!(!diagnosis.report().as_str().contains("consult"));
        }
    }

    #[test]
    fn test_gauge_follows_tumor_probability() {
        let gauge = diagnose([0.7, 0.25, 0.05]).gauge();
        assert_eq!(gauge.band, GaugeBand::Green);
        assert!((gauge.value - 25.0).abs() < 1e-4);

        assert_eq!(diagnose([0.5, 0.4, 0.1]).gauge().band, GaugeBand::Orange);
        assert_eq!(diagnose([0.1, 0.85, 0.05]).gauge().band, GaugeBand::Red);
        assert_eq!(diagnose([0.0, 0.0, 1.0]).gauge().band, GaugeBand::Green);
    }

    #[test]
    fn test_verdict_labels_and_banners() {
        assert_eq!(Verdict::from_index(0).label(), "No Tumor");
        assert_eq!(Verdict::from_index(1).to_string(), "Tumor");
        assert_eq!(Verdict::from_index(2).label(), "Unsupported Image");
        assert!(Verdict::Tumor.banner().contains("Tumor Detected"));
    }

    #[test]
    fn test_report_artifact_metadata() {
        let report = diagnose([0.9, 0.05, 0.05]).report();
        assert_eq!(report.file_name(), "neuroscan_report.txt");
        assert_eq!(report.mime(), "text/plain");
        assert_eq!(report.to_string(), report.as_str());
    }
}
