use crate::ConvertError;
use derive_more::{Add, AddAssign, Deref, Display, From, Into, Sub, Sum};

/// Number of PDF points in one inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// A length in PDF points (1/72 of an inch)
#[derive(
    Debug, Copy, Clone, Default, PartialEq, PartialOrd, Add, AddAssign, Sub, Sum, From, Into, Deref,
    Display,
)]
pub struct Pt(pub f32);

/// The resolution images are placed on the page with, in dots (pixels) per inch.
///
/// Each page is sized so that one source pixel covers `72 / dpi` points along
/// that axis. The default of 72 dpi in both directions maps one pixel to one point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Resolution {
    pub x: f32,
    pub y: f32,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::uniform(POINTS_PER_INCH)
    }
}

impl Resolution {
    /// The same resolution along both axes
    pub fn uniform(dpi: f32) -> Resolution {
        Resolution { x: dpi, y: dpi }
    }

    /// Separate horizontal and vertical resolutions
    pub fn new(x: f32, y: f32) -> Resolution {
        Resolution { x, y }
    }

    /// Fails unless both axes are finite and above zero
    pub fn validate(&self) -> Result<(), ConvertError> {
        let usable = |dpi: f32| dpi.is_finite() && dpi > 0.0;
        if usable(self.x) && usable(self.y) {
            Ok(())
        } else {
            Err(ConvertError::InvalidResolution {
                x: self.x,
                y: self.y,
            })
        }
    }

    /// Convert a pixel size into a page size in points
    pub fn page_size(&self, width: u32, height: u32) -> (Pt, Pt) {
        (
            Pt(width as f32 * POINTS_PER_INCH / self.x),
            Pt(height as f32 * POINTS_PER_INCH / self.y),
        )
    }
}
