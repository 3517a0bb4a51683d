//! Lossless encoders. These keep the alpha channel and ignore quality.

use std::io::Cursor;

use image::codecs::bmp::BmpEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageResult};

use super::{EncodeError, OutputFormat};

pub(super) fn encode_lossless(
    format: OutputFormat,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Cursor::new(Vec::new());
    let result: ImageResult<()> = match format {
        OutputFormat::Png => {
            PngEncoder::new(&mut buffer).write_image(pixels, width, height, ExtendedColorType::Rgba8)
        }
        OutputFormat::WebP => WebPEncoder::new_lossless(&mut buffer).write_image(
            pixels,
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        OutputFormat::Bmp => {
            BmpEncoder::new(&mut buffer).write_image(pixels, width, height, ExtendedColorType::Rgba8)
        }
        OutputFormat::Jpeg => {
            return Err(EncodeError::EncodingFailed {
                format: format.name(),
                message: "not a lossless format".to_string(),
            })
        }
    };

    result.map_err(|e| EncodeError::EncodingFailed {
        format: format.name(),
        message: e.to_string(),
    })?;
    Ok(buffer.into_inner())
}
