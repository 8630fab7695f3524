//! Which compression each kind of image is written with.
//!
//! The policy is a table keyed by colour model and alpha presence rather than
//! branching scattered through the encoder. Alpha channels are not part of the
//! table at all: soft masks are always written with [MASK_COMPRESSION].

use crate::{ColorMode, ColorModel};
use derive_more::Display;
use pdf_writer::Filter;

/// How an image stream is compressed
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
pub enum Compression {
    /// DCT (JPEG) compression
    #[display("lossy")]
    Lossy,
    /// Flate (zlib) compression
    #[display("lossless")]
    Lossless,
}

impl Compression {
    /// The PDF stream filter that decodes data compressed this way
    pub fn filter(self) -> Filter {
        match self {
            Compression::Lossy => Filter::DctDecode,
            Compression::Lossless => Filter::FlateDecode,
        }
    }
}

/// Soft masks must reproduce alpha values exactly, so they never go through DCT
pub const MASK_COMPRESSION: Compression = Compression::Lossless;

/// Base image compression by `(colour model, has alpha)`
const POLICY: &[(ColorModel, bool, Compression)] = &[
    (ColorModel::Gray, false, Compression::Lossy),
    (ColorModel::Rgb, false, Compression::Lossy),
    (ColorModel::Gray, true, Compression::Lossless),
    (ColorModel::Rgb, true, Compression::Lossless),
    (ColorModel::Indexed, false, Compression::Lossless),
    (ColorModel::Indexed, true, Compression::Lossless),
    (ColorModel::Bilevel, false, Compression::Lossless),
    (ColorModel::Cmyk, false, Compression::Lossless),
];

/// Look up the default compression for the colour data of an image in `mode`.
/// Returns [None] for modes the table doesn't cover.
pub fn base_compression(mode: ColorMode) -> Option<Compression> {
    POLICY
        .iter()
        .find(|(model, alpha, _)| *model == mode.model && *alpha == mode.alpha)
        .map(|&(_, _, compression)| compression)
}

/// The filters chosen for one image
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FilterPlan {
    pub base: Compression,
    /// Present exactly when the image has alpha
    pub mask: Option<Compression>,
}

impl FilterPlan {
    /// Pick the filters for an image, honouring an explicit override of the base
    /// compression. Returns [None] if `mode` isn't covered by the policy.
    pub fn for_mode(mode: ColorMode, base_override: Option<Compression>) -> Option<FilterPlan> {
        let default = base_compression(mode)?;
        Some(FilterPlan {
            base: base_override.unwrap_or(default),
            mask: mode.alpha.then_some(MASK_COMPRESSION),
        })
    }
}

/// Settings that control how image data is compressed
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Encoding {
    /// Forces the base image compression, bypassing the policy table
    pub compression: Option<Compression>,
    /// JPEG quality used for lossy compression, 1 to 100
    pub jpeg_quality: u8,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding {
            compression: None,
            jpeg_quality: 75,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_continuous_tone_images_are_lossy() {
        assert_eq!(
            base_compression(ColorMode::opaque(ColorModel::Gray)),
            Some(Compression::Lossy)
        );
        assert_eq!(
            base_compression(ColorMode::opaque(ColorModel::Rgb)),
            Some(Compression::Lossy)
        );
    }

    #[test]
    fn alpha_forces_lossless_base_and_mask() {
        for model in [ColorModel::Gray, ColorModel::Rgb, ColorModel::Indexed] {
            let plan = FilterPlan::for_mode(ColorMode::with_alpha(model), None).unwrap();
            assert_eq!(plan.base, Compression::Lossless);
            assert_eq!(plan.mask, Some(Compression::Lossless));
        }
    }

    #[test]
    fn indexed_images_are_always_lossless() {
        for alpha in [false, true] {
            let mode = ColorMode {
                model: ColorModel::Indexed,
                alpha,
            };
            assert_eq!(base_compression(mode), Some(Compression::Lossless));
        }
    }

    #[test]
    fn override_never_touches_the_mask() {
        let plan = FilterPlan::for_mode(
            ColorMode::with_alpha(ColorModel::Rgb),
            Some(Compression::Lossy),
        )
        .unwrap();
        assert_eq!(plan.base, Compression::Lossy);
        assert_eq!(plan.mask, Some(Compression::Lossless));
    }

    #[test]
    fn opaque_images_get_no_mask() {
        let plan = FilterPlan::for_mode(ColorMode::opaque(ColorModel::Rgb), None).unwrap();
        assert_eq!(plan.mask, None);
    }

    #[test]
    fn modes_outside_the_table_have_no_plan() {
        assert_eq!(
            FilterPlan::for_mode(ColorMode::with_alpha(ColorModel::Cmyk), None),
            None
        );
    }
}
