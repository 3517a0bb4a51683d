//! EXIF orientation: reading the tag and undoing the transform it describes.
//!
//! The eight EXIF codes are expressed as a fixed table of
//! [`OrientationTransform`]s. Rendering applies the table entry once, before
//! any resize, so everything downstream sees a canonically oriented surface.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (mirror across the main diagonal).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (mirror across the anti-diagonal).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

/// Clockwise rotation applied by an orientation transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

/// The pixel operations that bring an oriented image upright.
///
/// Rotation is applied first, then the flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationTransform {
    pub rotate: Rotation,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl OrientationTransform {
    const fn new(rotate: Rotation, flip_horizontal: bool, flip_vertical: bool) -> Self {
        Self {
            rotate,
            flip_horizontal,
            flip_vertical,
        }
    }

    /// Apply this transform to a decoded image.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        let img = match self.rotate {
            Rotation::None => img,
            Rotation::Cw90 => img.rotate90(),
            Rotation::Cw180 => img.rotate180(),
            Rotation::Cw270 => img.rotate270(),
        };
        let img = if self.flip_horizontal { img.fliph() } else { img };
        if self.flip_vertical {
            img.flipv()
        } else {
            img
        }
    }
}

/// Transform table indexed by `code - 1`.
const TRANSFORMS: [OrientationTransform; 8] = [
    OrientationTransform::new(Rotation::None, false, false),
    OrientationTransform::new(Rotation::None, true, false),
    OrientationTransform::new(Rotation::Cw180, false, false),
    OrientationTransform::new(Rotation::None, false, true),
    OrientationTransform::new(Rotation::Cw90, true, false),
    OrientationTransform::new(Rotation::Cw90, false, false),
    OrientationTransform::new(Rotation::Cw270, true, false),
    OrientationTransform::new(Rotation::Cw270, false, false),
];

impl Orientation {
    /// Look up an orientation by its EXIF code. Codes outside 1..=8 yield `None`.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Orientation::Normal),
            2 => Some(Orientation::FlipHorizontal),
            3 => Some(Orientation::Rotate180),
            4 => Some(Orientation::FlipVertical),
            5 => Some(Orientation::Transpose),
            6 => Some(Orientation::Rotate90CW),
            7 => Some(Orientation::Transverse),
            8 => Some(Orientation::Rotate270CW),
            _ => None,
        }
    }

    /// The EXIF code (1-8).
    pub fn code(self) -> u8 {
        self as u8
    }

    /// The pixel operations that undo this orientation.
    pub fn transform(self) -> OrientationTransform {
        TRANSFORMS[usize::from(self.code() - 1)]
    }

    /// Apply the correcting transform to an image.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        if self == Orientation::Normal {
            return img;
        }
        self.transform().apply(img)
    }
}

impl TryFrom<u32> for Orientation {
    type Error = OrientationReadError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Orientation::from_code(value).ok_or(OrientationReadError::InvalidCode(value))
    }
}

impl From<Orientation> for u32 {
    fn from(value: Orientation) -> Self {
        u32::from(value.code())
    }
}

/// Metadata problems encountered while looking for the orientation tag.
///
/// Never fatal: callers of [`read_orientation`] get "no transform" instead.
#[derive(Debug, Error)]
pub enum OrientationReadError {
    /// The container or its EXIF block could not be parsed.
    #[error("Malformed EXIF metadata: {0}")]
    Malformed(String),

    /// The orientation field is present but not an unsigned integer.
    #[error("Orientation tag has a non-integer value")]
    NotAnInteger,

    /// The orientation field holds a value outside 1..=8.
    #[error("Orientation code {0} is outside 1..=8")]
    InvalidCode(u32),
}

/// Read the EXIF orientation tag from raw file bytes without decoding pixels.
///
/// Returns `Ok(None)` when the file carries no EXIF block or no orientation
/// field. Files without any EXIF at all are not an error.
pub fn try_read_orientation(bytes: &[u8]) -> Result<Option<Orientation>, OrientationReadError> {
    let mut cursor = Cursor::new(bytes);
    let exif = match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(None),
        Err(e) => return Err(OrientationReadError::Malformed(e.to_string())),
    };

    let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) else {
        return Ok(None);
    };
    let code = field
        .value
        .get_uint(0)
        .ok_or(OrientationReadError::NotAnInteger)?;
    Orientation::try_from(code).map(Some)
}

/// Read the EXIF orientation tag, treating any metadata problem as "absent".
pub fn read_orientation(bytes: &[u8]) -> Option<Orientation> {
    match try_read_orientation(bytes) {
        Ok(orientation) => orientation,
        Err(e) => {
            log::debug!("ignoring orientation metadata: {e}");
            None
        }
    }
}
