//! NeuroScan AI - brain tumor detection from MRI scans
//!
//! Classifies an uploaded MRI slice as no tumor, tumor or unsupported image
//! with a pretrained ONNX model, produces a downloadable report, and offers a
//! NeuroBot chat assistant backed by OpenRouter. Served as a small web app
//! behind a demo login.

pub mod app;
pub mod chat;
pub mod classifier;
pub mod diagnosis;
pub mod error;
pub mod image;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod web;

pub use error::{Error, Result};
