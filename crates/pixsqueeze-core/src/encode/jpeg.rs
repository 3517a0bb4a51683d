//! JPEG encoding with a fractional quality factor.
//!
//! JPEG has no alpha channel, so translucent pixels are composited over a
//! white background before encoding.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::EncodeError;

/// Map a quality factor in [0, 1] to the JPEG 1-100 scale.
///
/// Out-of-range and NaN inputs are clamped.
pub fn jpeg_quality(quality: f64) -> u8 {
    if quality.is_nan() {
        return 100;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode RGBA pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - Quality factor in [0, 1], 1 being best
///
/// Callers are expected to have validated the buffer length.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: f64,
) -> Result<Vec<u8>, EncodeError> {
    let rgb = flatten_on_white(pixels);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));

    encoder
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: "JPEG",
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

/// Drop the alpha channel by blending each pixel over white.
fn flatten_on_white(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let alpha = u32::from(px[3]);
        for &channel in &px[..3] {
            let blended = (u32::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_rgba(width: usize, height: usize) -> Vec<u8> {
        [128u8, 128, 128, 255].repeat(width * height)
    }

    #[test]
    fn test_encode_jpeg_basic() {
        let jpeg_bytes = encode_jpeg(&gray_rgba(100, 100), 100, 100, 0.9).unwrap();

        // Check JPEG magic bytes (SOI marker)
        assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8]);

        // Check JPEG ends with EOI marker
        let len = jpeg_bytes.len();
        assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.92), 92);
        assert_eq!(jpeg_quality(0.5), 50);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(-3.0), 1);
        assert_eq!(jpeg_quality(7.0), 100);
        assert_eq!(jpeg_quality(f64::NAN), 100);
    }

    #[test]
    fn test_flatten_opaque_is_identity() {
        assert_eq!(flatten_on_white(&[10, 20, 30, 255]), vec![10, 20, 30]);
    }

    #[test]
    fn test_flatten_transparent_is_white() {
        assert_eq!(flatten_on_white(&[0, 0, 0, 0]), vec![255, 255, 255]);
    }

    #[test]
    fn test_flatten_half_alpha_blends() {
        let rgb = flatten_on_white(&[0, 0, 0, 128]);
        assert!(rgb.iter().all(|&c| (126..=128).contains(&c)));
    }

    #[test]
    fn test_encode_jpeg_gradient() {
        let width = 100;
        let height = 100;
        let mut pixels = Vec::with_capacity(width * height * 4);

        for y in 0..height {
            for x in 0..width {
                pixels.push((x * 255 / width) as u8);
                pixels.push((y * 255 / height) as u8);
                pixels.push(128);
                pixels.push(255);
            }
        }

        let jpeg_bytes = encode_jpeg(&pixels, width as u32, height as u32, 0.9).unwrap();
        // Gradient images should produce reasonable file sizes
        assert!(jpeg_bytes.len() > 500);
        assert!(jpeg_bytes.len() < 50000);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
