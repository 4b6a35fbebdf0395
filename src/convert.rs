use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use rawloader::{RawImageData, RawLoader};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("raw decode failed: {0}")]
    Decode(String),
    #[error("jpeg encode failed: {0}")]
    Encode(String),
}

/// Makes sure a browser-displayable JPEG sits next to `raw_path` and returns
/// its path. An already-present sibling is reused as-is; nothing is
/// re-encoded or overwritten.
pub fn ensure_jpeg_sibling(raw_path: &Path, jpeg_quality: u8) -> Result<PathBuf, ConvertError> {
    let jpeg_path = raw_path.with_extension("jpg");
    if jpeg_path.exists() {
        return Ok(jpeg_path);
    }

    eprintln!(
        "[convert] {} -> {}",
        raw_path.display(),
        jpeg_path.display()
    );
    let rgb = decode_raw(raw_path)?;

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality);
    encoder
        .encode_image(&DynamicImage::ImageRgb8(rgb))
        .map_err(|e| ConvertError::Encode(e.to_string()))?;
    fs::write(&jpeg_path, &buf)?;
    Ok(jpeg_path)
}

/// Decodes a raw file into a half-resolution RGB image: each 2x2 CFA block
/// collapses into one pixel, with black/white level normalization, camera
/// white balance, and sRGB gamma applied.
fn decode_raw(path: &Path) -> Result<RgbImage, ConvertError> {
    let decoder = RawLoader::new();
    let raw = decoder
        .decode_file(path)
        .map_err(|e| ConvertError::Decode(e.to_string()))?;

    if raw.cpp != 1 {
        return Err(ConvertError::Decode(format!(
            "unsupported raw layout ({} samples per pixel)",
            raw.cpp
        )));
    }
    if raw.width < 2 || raw.height < 2 {
        return Err(ConvertError::Decode(format!(
            "sensor data too small ({}x{})",
            raw.width, raw.height
        )));
    }

    let data: Vec<u16> = match &raw.data {
        RawImageData::Integer(values) => values.clone(),
        RawImageData::Float(values) => values
            .iter()
            .map(|&v| (v * 65535.0).clamp(0.0, 65535.0) as u16)
            .collect(),
    };
    if data.len() < raw.width * raw.height {
        return Err(ConvertError::Decode("truncated sensor data".into()));
    }

    let wb = white_balance(&raw.wb_coeffs);
    let out_width = raw.width / 2;
    let out_height = raw.height / 2;
    let mut out = RgbImage::new(out_width as u32, out_height as u32);

    for by in 0..out_height {
        for bx in 0..out_width {
            let mut acc = [0.0f32; 3];
            let mut counts = [0u32; 3];
            for dy in 0..2 {
                for dx in 0..2 {
                    let y = by * 2 + dy;
                    let x = bx * 2 + dx;
                    let cfa_index = raw.cfa.color_at(y, x);
                    // Index 3 is the second green site on Bayer sensors.
                    let channel = match cfa_index {
                        0 => 0,
                        2 => 2,
                        _ => 1,
                    };
                    let black = raw.blacklevels[cfa_index] as f32;
                    let white = raw.whitelevels[cfa_index] as f32;
                    let range = (white - black).max(1.0);
                    let value = data[y * raw.width + x] as f32;
                    let normalized = ((value - black) / range).clamp(0.0, 1.0);
                    acc[channel] += normalized * wb[cfa_index];
                    counts[channel] += 1;
                }
            }
            let pixel = Rgb([
                to_srgb_byte(acc[0], counts[0]),
                to_srgb_byte(acc[1], counts[1]),
                to_srgb_byte(acc[2], counts[2]),
            ]);
            out.put_pixel(bx as u32, by as u32, pixel);
        }
    }
    Ok(out)
}

/// As-shot white balance multipliers normalized so green is 1.0; cameras
/// that report nothing usable get neutral coefficients.
fn white_balance(coeffs: &[f32; 4]) -> [f32; 4] {
    let usable = |v: f32| v.is_finite() && v > 0.0;
    if !usable(coeffs[0]) || !usable(coeffs[1]) || !usable(coeffs[2]) {
        return [1.0, 1.0, 1.0, 1.0];
    }
    let green = coeffs[1];
    let second_green = if usable(coeffs[3]) { coeffs[3] } else { green };
    [
        coeffs[0] / green,
        1.0,
        coeffs[2] / green,
        second_green / green,
    ]
}

fn to_srgb_byte(sum: f32, count: u32) -> u8 {
    let linear = if count > 0 { sum / count as f32 } else { 0.0 };
    let gamma = linear.clamp(0.0, 1.0).powf(1.0 / 2.2);
    (gamma * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn existing_sibling_short_circuits() {
        let tmp = TempDir::new().unwrap();
        let raw = tmp.path().join("shot.cr2");
        let jpeg = tmp.path().join("shot.jpg");
        fs::write(&raw, "not a real raw file").unwrap();
        fs::write(&jpeg, "existing jpeg bytes").unwrap();

        let result = ensure_jpeg_sibling(&raw, 92).unwrap();
        assert_eq!(result, jpeg);
        // Sibling was reused, not rewritten.
        assert_eq!(fs::read(&jpeg).unwrap(), b"existing jpeg bytes");
    }

    #[test]
    fn undecodable_raw_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let raw = tmp.path().join("shot.cr2");
        fs::write(&raw, "not a real raw file").unwrap();

        let result = ensure_jpeg_sibling(&raw, 92);
        assert!(matches!(result, Err(ConvertError::Decode(_))));
        // No partial output left behind.
        assert!(!tmp.path().join("shot.jpg").exists());
    }

    #[test]
    fn white_balance_normalizes_to_green() {
        let wb = white_balance(&[2.0, 1.0, 1.5, 1.0]);
        assert_eq!(wb, [2.0, 1.0, 1.5, 1.0]);

        let wb = white_balance(&[4.0, 2.0, 3.0, f32::NAN]);
        assert_eq!(wb, [2.0, 1.0, 1.5, 1.0]);
    }

    #[test]
    fn missing_white_balance_falls_back_to_neutral() {
        assert_eq!(white_balance(&[0.0, 0.0, 0.0, 0.0]), [1.0; 4]);
        assert_eq!(white_balance(&[f32::NAN; 4]), [1.0; 4]);
    }
}
