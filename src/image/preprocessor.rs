use super::{InputTensor, IMG_SIZE};
use crate::{Error, Result};
use image::{DynamicImage, GrayImage, Luma};

/// Decode, convert to grayscale, resize to 128x128 and scale into `[0, 1]`.
///
/// Any decodable image works; whether it actually is an MRI scan is left to
/// the classifier's "unsupported" class.
pub fn preprocess(bytes: &[u8]) -> Result<InputTensor> {
    let decoded = image::load_from_memory(bytes)?;
    let gray = to_grayscale(&decoded);
    let resized = resize_bilinear(&gray, IMG_SIZE, IMG_SIZE);

    let data = resized
        .pixels()
        .map(|pixel| f32::from(pixel[0]) / 255.0)
        .collect();

    InputTensor::new(data)
}

/// Runs [`preprocess`] on the blocking pool.
pub async fn preprocess_blocking(bytes: Vec<u8>) -> Result<InputTensor> {
    tokio::task::spawn_blocking(move || preprocess(&bytes))
        .await
        .map_err(|e| Error::Invariant(format!("Preprocessing task join error: {}", e)))?
}

fn to_grayscale(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }

    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([luma_bt601(r, g, b)])
    })
}

/// Two source taps along one axis and the weight of the second.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tap {
    low: u32,
    high: u32,
    weight: f32,
}

/// Half-pixel-centre linear taps, clamped to the edge. No antialiasing
/// widening on downscale: every output sample reads exactly two inputs.
fn linear_taps(src_len: u32, dst_len: u32) -> Vec<Tap> {
    let scale = f64::from(src_len) / f64::from(dst_len);
    let last = src_len.saturating_sub(1);

    (0..dst_len)
        .map(|dst| {
            let pos = (f64::from(dst) + 0.5) * scale - 0.5;
            let floor = pos.floor();
            let (low, weight) = if floor < 0.0 {
                (0, 0.0)
            } else if floor >= f64::from(last) {
                (last, 0.0)
            } else {
                (floor as u32, (pos - floor) as f32)
            };
            Tap {
                low,
                high: (low + 1).min(last),
                weight,
            }
        })
        .collect()
}

/// Bilinear resize matching OpenCV's `INTER_LINEAR` sampling grid.
fn resize_bilinear(src: &GrayImage, width: u32, height: u32) -> GrayImage {
    let x_taps = linear_taps(src.width(), width);
    let y_taps = linear_taps(src.height(), height);
    let at = |x: u32, y: u32| f32::from(src.get_pixel(x, y)[0]);

    GrayImage::from_fn(width, height, |x, y| {
        let tx = x_taps[x as usize];
        let ty = y_taps[y as usize];

        let top = at(tx.low, ty.low) * (1.0 - tx.weight) + at(tx.high, ty.low) * tx.weight;
        let bottom = at(tx.low, ty.high) * (1.0 - tx.weight) + at(tx.high, ty.high) * tx.weight;
        let value = top * (1.0 - ty.weight) + bottom * ty.weight;

        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

// BT.601 weights in 16.16 fixed point, rounded.
fn luma_bt601(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000;
    (weighted >> 16) as u8
}
