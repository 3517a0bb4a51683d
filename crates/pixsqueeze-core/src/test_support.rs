//! Fixture builders shared by the unit tests. Everything is generated in
//! code so the tests carry no binary files.

use std::io::Cursor;

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::file::ImageFile;

/// Smooth RGB gradient, 3 bytes per pixel.
pub fn gradient_rgb(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push(((x * 255) / width.max(1)) as u8);
            pixels.push(((y * 255) / height.max(1)) as u8);
            pixels.push(128);
        }
    }
    pixels
}

/// Deterministic pseudo-random RGB noise. Noise defeats entropy coding, so
/// JPEG size tracks quality closely.
pub fn noise_rgb(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    (0..width * height * 3)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

pub fn encode_test_jpeg(pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
    encode_test_jpeg_with_quality(pixels, width, height, 90)
}

pub fn encode_test_jpeg_with_quality(pixels: &[u8], width: u32, height: u32, quality: u8) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buffer.into_inner()
}

pub fn encode_test_png(pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buffer.into_inner()
}

/// Insert an EXIF APP1 segment carrying only an orientation tag right after
/// the JPEG SOI marker.
pub fn with_exif_orientation(jpeg: &[u8], code: u16) -> Vec<u8> {
    assert_eq!(&jpeg[0..2], &[0xFF, 0xD8], "not a JPEG");

    let mut tiff = Vec::new();
    // Little-endian TIFF header, first IFD at offset 8
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    // One entry: Orientation (0x0112), SHORT, count 1
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&code.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    // No next IFD
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let segment_len = (2 + 6 + tiff.len()) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + segment_len as usize + 2);
    out.extend_from_slice(&jpeg[0..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Single-frame GIF. There is no GIF output encoder, so this only builds sources.
pub fn encode_test_gif(pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
    let rgba: Vec<u8> = pixels
        .chunks_exact(3)
        .flat_map(|px| [px[0], px[1], px[2], 255])
        .collect();
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder
            .encode(&rgba, width, height, ExtendedColorType::Rgba8)
            .unwrap();
    }
    bytes
}

pub fn jpeg_file(name: &str, bytes: Vec<u8>) -> ImageFile {
    ImageFile::new(name, "image/jpeg", bytes).with_last_modified(1_700_000_000_000)
}

pub fn png_file(name: &str, bytes: Vec<u8>) -> ImageFile {
    ImageFile::new(name, "image/png", bytes).with_last_modified(1_700_000_000_000)
}
