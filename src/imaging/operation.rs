//! Transform operations applied to a decoded image.

use image::imageops::FilterType;
use image::DynamicImage;
use std::fmt;

/// Clockwise rotation angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Angle {
    Deg90,
    Deg180,
    Deg270,
}

impl Angle {
    pub fn degrees(self) -> u16 {
        match self {
            Angle::Deg90 => 90,
            Angle::Deg180 => 180,
            Angle::Deg270 => 270,
        }
    }
}

impl TryFrom<i64> for Angle {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            90 => Ok(Angle::Deg90),
            180 => Ok(Angle::Deg180),
            270 => Ok(Angle::Deg270),
            other => Err(other),
        }
    }
}

/// A single-step image edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Rotate(Angle),
    /// Exact output size; aspect ratio is not preserved.
    Resize { width: u32, height: u32 },
    Grayscale,
}

impl Operation {
    pub fn apply(&self, img: DynamicImage) -> DynamicImage {
        match *self {
            Operation::Rotate(Angle::Deg90) => img.rotate90(),
            Operation::Rotate(Angle::Deg180) => img.rotate180(),
            Operation::Rotate(Angle::Deg270) => img.rotate270(),
            Operation::Resize { width, height } => {
                img.resize_exact(width, height, FilterType::Lanczos3)
            }
            Operation::Grayscale => img.grayscale(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Rotate(angle) => write!(f, "rotate({})", angle.degrees()),
            Operation::Resize { width, height } => write!(f, "resize({}x{})", width, height),
            Operation::Grayscale => write!(f, "grayscale"),
        }
    }
}
