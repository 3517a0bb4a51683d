//! Proportional downscaling of pixel surfaces.
//!
//! Provides resize operations using the `image` crate's algorithms.
//! All functions return new `PixelSurface` instances without modifying the input.

use super::{DecodeError, FilterType, PixelSurface};

/// Resize a surface to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::EmptyImage` if a target dimension is zero and
/// `DecodeError::CorruptedFile` if the pixel buffer does not match the
/// surface dimensions.
pub fn resize(
    surface: &PixelSurface,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<PixelSurface, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    // Fast path: if dimensions match, just clone
    if surface.width == width && surface.height == height {
        return Ok(surface.clone());
    }

    let view = surface
        .as_rgba_view()
        .ok_or_else(|| DecodeError::CorruptedFile("Pixel buffer size mismatch".to_string()))?;

    let resized = image::imageops::resize(&view, width, height, filter.to_image_filter());

    Ok(PixelSurface::from_rgba_image(resized))
}

/// Shrink a surface so its longer edge equals `max_edge`, preserving aspect
/// ratio. Surfaces that already fit are returned unchanged: this never
/// upscales.
///
/// # Errors
///
/// Returns `DecodeError::EmptyImage` if `max_edge` is zero.
pub fn resize_to_fit(
    surface: &PixelSurface,
    max_edge: u32,
    filter: FilterType,
) -> Result<PixelSurface, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::EmptyImage {
            width: 0,
            height: 0,
        });
    }

    let (src_width, src_height) = surface.dimensions();

    // If already fits, just clone
    if src_width <= max_edge && src_height <= max_edge {
        return Ok(surface.clone());
    }

    let (new_width, new_height) = calculate_fit_dimensions(src_width, src_height, max_edge);

    resize(surface, new_width, new_height, filter)
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
pub fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        // Landscape or square: constrain by width
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        // Portrait: constrain by height
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: The longer edge equals the ceiling whenever downscaling happens.
        #[test]
        fn prop_fit_hits_ceiling_on_longer_edge(
            width in 1u32..=8000,
            height in 1u32..=8000,
            max_edge in 1u32..=4000,
        ) {
            prop_assume!(width > max_edge || height > max_edge);

            let (w, h) = calculate_fit_dimensions(width, height, max_edge);
            prop_assert_eq!(w.max(h), max_edge);
            prop_assert!(w >= 1 && h >= 1);
        }

        /// Property: Orientation of the aspect ratio is preserved.
        #[test]
        fn prop_fit_preserves_landscape_or_portrait(
            width in 1u32..=8000,
            height in 1u32..=8000,
            max_edge in 1u32..=4000,
        ) {
            let (w, h) = calculate_fit_dimensions(width, height, max_edge);
            if width >= height {
                prop_assert!(w >= h);
            } else {
                prop_assert!(h >= w);
            }
        }
    }
}
