//! Source images accepted by the converter.
//!
//! Most images arrive as an [image::DynamicImage] straight from a decoder. The
//! `image` crate has no notion of palette, bilevel or CMYK buffers, so those
//! are described by the small types in this module instead.

use crate::ConvertError;
use image::{ColorType, DynamicImage, GenericImageView, GrayImage, ImageBuffer, Pixel};
use std::fmt;

/// How colour is stored in an image, independent of transparency
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ColorModel {
    /// One bit per pixel, black or white
    Bilevel,
    /// 8-bit luminance
    Gray,
    /// 8-bit red, green, blue
    Rgb,
    /// 8-bit cyan, magenta, yellow, black
    Cmyk,
    /// 8-bit indices into an RGB palette
    Indexed,
}

/// A colour model together with whether the image carries an alpha channel
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ColorMode {
    pub model: ColorModel,
    pub alpha: bool,
}

impl ColorMode {
    pub const fn opaque(model: ColorModel) -> ColorMode {
        ColorMode {
            model,
            alpha: false,
        }
    }

    pub const fn with_alpha(model: ColorModel) -> ColorMode {
        ColorMode { model, alpha: true }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match (self.model, self.alpha) {
            (ColorModel::Bilevel, false) => "1",
            (ColorModel::Bilevel, true) => "1A",
            (ColorModel::Gray, false) => "L",
            (ColorModel::Gray, true) => "LA",
            (ColorModel::Rgb, false) => "RGB",
            (ColorModel::Rgb, true) => "RGBA",
            (ColorModel::Cmyk, false) => "CMYK",
            (ColorModel::Cmyk, true) => "CMYKA",
            (ColorModel::Indexed, false) => "P",
            (ColorModel::Indexed, true) => "PA",
        };
        f.write_str(name)
    }
}

/// A palette image: one byte per pixel indexing into an RGB colour table.
///
/// Transparency follows PNG `tRNS` semantics: entry `i` of the table is the
/// alpha of palette colour `i`, and colours past the end of the table are opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    indices: Vec<u8>,
    palette: Vec<[u8; 3]>,
    transparency: Option<Vec<u8>>,
}

impl IndexedImage {
    /// Build a palette image, checking that every index refers to a palette entry
    pub fn new(
        width: u32,
        height: u32,
        indices: Vec<u8>,
        palette: Vec<[u8; 3]>,
    ) -> Result<IndexedImage, ConvertError> {
        if palette.is_empty() || palette.len() > 256 {
            return Err(ConvertError::MalformedImage(format!(
                "palette must hold 1 to 256 colours, got {}",
                palette.len()
            )));
        }
        let expected = width as usize * height as usize;
        if indices.len() != expected {
            return Err(ConvertError::MalformedImage(format!(
                "expected {expected} palette indices for a {width}x{height} image, got {}",
                indices.len()
            )));
        }
        if let Some(index) = indices.iter().find(|&&i| i as usize >= palette.len()) {
            return Err(ConvertError::MalformedImage(format!(
                "palette index {index} is out of range for a palette of {} colours",
                palette.len()
            )));
        }

        Ok(IndexedImage {
            width,
            height,
            indices,
            palette,
            transparency: None,
        })
    }

    /// Attach per-palette-entry alpha values
    pub fn with_transparency(mut self, alphas: Vec<u8>) -> Result<IndexedImage, ConvertError> {
        if alphas.len() > self.palette.len() {
            return Err(ConvertError::MalformedImage(format!(
                "transparency table has {} entries but the palette only has {}",
                alphas.len(),
                self.palette.len()
            )));
        }
        self.transparency = Some(alphas);
        Ok(self)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn palette(&self) -> &[[u8; 3]] {
        &self.palette
    }

    pub fn transparency(&self) -> Option<&[u8]> {
        self.transparency.as_deref()
    }

    /// The alpha value of a palette entry
    pub fn alpha_of(&self, index: u8) -> u8 {
        self.transparency
            .as_ref()
            .and_then(|t| t.get(index as usize).copied())
            .unwrap_or(u8::MAX)
    }
}

/// An 8-bit CMYK image, four interleaved bytes per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct CmykImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CmykImage {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<CmykImage, ConvertError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(ConvertError::MalformedImage(format!(
                "expected {expected} bytes for a {width}x{height} CMYK image, got {}",
                data.len()
            )));
        }
        Ok(CmykImage {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }
}

/// A decoded image that can be placed on a page
#[derive(Debug, Clone)]
pub enum Raster {
    /// Anything the `image` crate decoded. Only 8-bit gray, gray + alpha, RGB
    /// and RGBA buffers can be saved.
    Dynamic(DynamicImage),
    /// Black and white; samples at or above 128 are white
    Bilevel(GrayImage),
    Indexed(IndexedImage),
    Cmyk(CmykImage),
}

impl Raster {
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Raster::Dynamic(image) => image.dimensions(),
            Raster::Bilevel(image) => image.dimensions(),
            Raster::Indexed(image) => (image.width(), image.height()),
            Raster::Cmyk(image) => (image.width(), image.height()),
        }
    }

    /// Work out the colour mode of the image, failing for pixel layouts that
    /// can't be represented in the output
    pub fn mode(&self) -> Result<ColorMode, ConvertError> {
        match self {
            Raster::Dynamic(image) => match image.color() {
                ColorType::L8 => Ok(ColorMode::opaque(ColorModel::Gray)),
                ColorType::La8 => Ok(ColorMode::with_alpha(ColorModel::Gray)),
                ColorType::Rgb8 => Ok(ColorMode::opaque(ColorModel::Rgb)),
                ColorType::Rgba8 => Ok(ColorMode::with_alpha(ColorModel::Rgb)),
                other => Err(ConvertError::UnsupportedMode(format!("{other:?}"))),
            },
            Raster::Bilevel(_) => Ok(ColorMode::opaque(ColorModel::Bilevel)),
            Raster::Indexed(image) => Ok(ColorMode {
                model: ColorModel::Indexed,
                alpha: image.transparency.is_some(),
            }),
            Raster::Cmyk(_) => Ok(ColorMode::opaque(ColorModel::Cmyk)),
        }
    }
}

/// The samples of `image` for exactly `width * height` pixels.
///
/// [ImageBuffer::from_raw] accepts buffers longer than that; whatever trails
/// the last pixel is not part of the image.
pub(crate) fn pixel_samples<P: Pixel>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
) -> &[P::Subpixel] {
    let (width, height) = image.dimensions();
    let len = width as usize * height as usize * P::CHANNEL_COUNT as usize;
    &image.as_raw()[..len]
}

impl From<DynamicImage> for Raster {
    fn from(image: DynamicImage) -> Self {
        Raster::Dynamic(image)
    }
}

impl From<IndexedImage> for Raster {
    fn from(image: IndexedImage) -> Self {
        Raster::Indexed(image)
    }
}

impl From<CmykImage> for Raster {
    fn from(image: CmykImage) -> Self {
        Raster::Cmyk(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, LumaA, Rgb, Rgba};

    #[test]
    fn eight_bit_layouts_are_recognized() {
        let cases = [
            (
                DynamicImage::ImageLuma8(ImageBuffer::from_pixel(2, 2, Luma([0]))),
                "L",
            ),
            (
                DynamicImage::ImageLumaA8(ImageBuffer::from_pixel(2, 2, LumaA([0, 0]))),
                "LA",
            ),
            (
                DynamicImage::ImageRgb8(ImageBuffer::from_pixel(2, 2, Rgb([0, 0, 0]))),
                "RGB",
            ),
            (
                DynamicImage::ImageRgba8(ImageBuffer::from_pixel(2, 2, Rgba([0, 0, 0, 0]))),
                "RGBA",
            ),
        ];
        for (image, name) in cases {
            let mode = Raster::from(image).mode().expect("mode is supported");
            assert_eq!(mode.to_string(), name);
        }
    }

    #[test]
    fn sixteen_bit_layouts_are_rejected() {
        let image = DynamicImage::ImageRgb16(ImageBuffer::from_pixel(1, 1, Rgb([0u16, 0, 0])));
        match Raster::from(image).mode() {
            Err(ConvertError::UnsupportedMode(name)) => assert_eq!(name, "Rgb16"),
            other => panic!("expected an unsupported mode, got {other:?}"),
        }
    }

    #[test]
    fn indexed_mode_reports_alpha_only_with_a_transparency_table() {
        let image = IndexedImage::new(2, 1, vec![0, 1], vec![[0, 0, 0], [255, 255, 255]]).unwrap();
        assert_eq!(
            Raster::from(image.clone()).mode().unwrap(),
            ColorMode::opaque(ColorModel::Indexed)
        );

        let image = image.with_transparency(vec![0]).unwrap();
        assert_eq!(
            Raster::from(image).mode().unwrap(),
            ColorMode::with_alpha(ColorModel::Indexed)
        );
    }

    #[test]
    fn palette_entries_past_the_transparency_table_are_opaque() {
        let image = IndexedImage::new(1, 1, vec![0], vec![[1, 2, 3], [4, 5, 6], [7, 8, 9]])
            .unwrap()
            .with_transparency(vec![0, 128])
            .unwrap();
        assert_eq!(image.alpha_of(0), 0);
        assert_eq!(image.alpha_of(1), 128);
        assert_eq!(image.alpha_of(2), 255);
    }

    #[test]
    fn out_of_range_palette_indices_are_malformed() {
        let result = IndexedImage::new(2, 1, vec![0, 2], vec![[0, 0, 0], [1, 1, 1]]);
        assert!(matches!(result, Err(ConvertError::MalformedImage(_))));
    }

    #[test]
    fn cmyk_buffer_length_must_match_dimensions() {
        assert!(CmykImage::new(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            CmykImage::new(2, 2, vec![0; 15]),
            Err(ConvertError::MalformedImage(_))
        ));
    }

    #[test]
    fn trailing_buffer_bytes_are_not_samples() {
        let image = GrayImage::from_raw(2, 2, vec![1, 2, 3, 4, 5]).unwrap();
        assert_eq!(pixel_samples(&image), &[1, 2, 3, 4]);
    }
}
