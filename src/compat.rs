//! Drop-in entry points for code written against an imaging library's PDF save hook.
//!
//! [save] and [save_all] take the hook's arguments in the hook's order (image,
//! output, file name, encoder options) and hand off to the crate-level
//! [crate::save_all]. [PdfEncoder] plugs the converter in wherever the `image`
//! crate accepts an [ImageEncoder].

use crate::{Compression, ConvertError, Info, Raster, Resolution, SaveOptions};
use chrono::{DateTime, FixedOffset};
use image::error::{
    ImageFormatHint, ParameterError, ParameterErrorKind, UnsupportedError, UnsupportedErrorKind,
};
use image::{
    ColorType, DynamicImage, GrayAlphaImage, GrayImage, ImageEncoder, ImageError, ImageResult,
    RgbImage, RgbaImage,
};
use std::io::Write;
use std::path::Path;

/// Encoder options, named after the keyword options the save hook understands
#[derive(Debug, Clone, Default)]
pub struct EncoderInfo {
    /// Resolution in dpi for both axes. Defaults to 72.
    pub resolution: Option<f32>,
    /// Separate horizontal and vertical resolutions; wins over `resolution`
    pub dpi: Option<(f32, f32)>,
    /// Defaults to the stem of the output file name
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Defaults to the time of writing
    pub creation_date: Option<DateTime<FixedOffset>>,
    /// Defaults to the creation date
    pub mod_date: Option<DateTime<FixedOffset>>,
    /// Extra pages written after the first image by [save_all]
    pub append_images: Vec<Raster>,
    pub compression: Option<Compression>,
    pub quality: Option<u8>,
}

impl EncoderInfo {
    fn options(&self, filename: &str) -> SaveOptions {
        let resolution = match (self.dpi, self.resolution) {
            (Some((x, y)), _) => Resolution::new(x, y),
            (None, Some(dpi)) => Resolution::uniform(dpi),
            (None, None) => Resolution::default(),
        };

        let info = Info {
            title: self.title.clone().or_else(|| {
                Path::new(filename)
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .filter(|stem| !stem.is_empty())
                    .map(str::to_string)
            }),
            author: self.author.clone(),
            subject: self.subject.clone(),
            keywords: self.keywords.clone(),
            creator: self.creator.clone(),
            producer: self.producer.clone(),
            creation_date: self.creation_date,
            modified_date: self.mod_date,
        };

        let mut options = SaveOptions {
            resolution,
            info: Some(info),
            ..SaveOptions::default()
        };
        options.encoding.compression = self.compression;
        if let Some(quality) = self.quality {
            options.encoding.jpeg_quality = quality;
        }
        options
    }
}

/// Save `im` as a single page PDF
pub fn save<W: Write>(
    im: &Raster,
    fp: W,
    filename: &str,
    encoderinfo: &EncoderInfo,
) -> Result<(), ConvertError> {
    crate::save(im, fp, &encoderinfo.options(filename))
}

/// Save `im` followed by every image in `encoderinfo.append_images`, one page each
pub fn save_all<W: Write>(
    im: &Raster,
    fp: W,
    filename: &str,
    encoderinfo: &EncoderInfo,
) -> Result<(), ConvertError> {
    let images = std::iter::once(im).chain(encoderinfo.append_images.iter());
    crate::save_all(images, fp, &encoderinfo.options(filename))
}

/// An [ImageEncoder] that writes a one page PDF
pub struct PdfEncoder<W: Write> {
    w: W,
    options: SaveOptions,
}

impl<W: Write> PdfEncoder<W> {
    pub fn new(w: W) -> PdfEncoder<W> {
        PdfEncoder::with_options(w, SaveOptions::default())
    }

    pub fn with_options(w: W, options: SaveOptions) -> PdfEncoder<W> {
        PdfEncoder { w, options }
    }
}

impl<W: Write> ImageEncoder for PdfEncoder<W> {
    fn write_image(
        self,
        buf: &[u8],
        width: u32,
        height: u32,
        color_type: ColorType,
    ) -> ImageResult<()> {
        if !matches!(
            color_type,
            ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8
        ) {
            return Err(ImageError::Unsupported(
                UnsupportedError::from_format_and_kind(
                    ImageFormatHint::Name("PDF".to_string()),
                    UnsupportedErrorKind::Color(color_type.into()),
                ),
            ));
        }
        let expected = width as usize * height as usize * color_type.bytes_per_pixel() as usize;
        if buf.len() != expected {
            return Err(dimension_mismatch());
        }

        let buf = buf.to_vec();
        let image = match color_type {
            ColorType::L8 => GrayImage::from_raw(width, height, buf).map(DynamicImage::ImageLuma8),
            ColorType::La8 => {
                GrayAlphaImage::from_raw(width, height, buf).map(DynamicImage::ImageLumaA8)
            }
            ColorType::Rgb8 => RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8),
            _ => RgbaImage::from_raw(width, height, buf).map(DynamicImage::ImageRgba8),
        }
        .ok_or_else(dimension_mismatch)?;

        crate::save(&Raster::from(image), self.w, &self.options).map_err(Into::into)
    }
}

fn dimension_mismatch() -> ImageError {
    ImageError::Parameter(ParameterError::from_kind(
        ParameterErrorKind::DimensionMismatch,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpi_wins_over_resolution() {
        let info = EncoderInfo {
            resolution: Some(200.0),
            dpi: Some((75.0, 150.0)),
            ..EncoderInfo::default()
        };
        assert_eq!(
            info.options("out.pdf").resolution,
            Resolution::new(75.0, 150.0)
        );
    }

    #[test]
    fn resolution_defaults_to_72_dpi() {
        let options = EncoderInfo::default().options("out.pdf");
        assert_eq!(options.resolution, Resolution::uniform(72.0));
    }

    #[test]
    fn title_defaults_to_the_file_stem() {
        let options = EncoderInfo::default().options("/tmp/scans/receipt.pdf");
        assert_eq!(
            options.info.and_then(|i| i.title).as_deref(),
            Some("receipt")
        );

        let info = EncoderInfo {
            title: Some("Explicit".to_string()),
            ..EncoderInfo::default()
        };
        let options = info.options("receipt.pdf");
        assert_eq!(
            options.info.and_then(|i| i.title).as_deref(),
            Some("Explicit")
        );
    }

    #[test]
    fn encoder_writes_a_pdf() {
        let mut out = Vec::new();
        let pixels = vec![0u8, 0, 0, 0, 255, 255, 255, 255];
        PdfEncoder::new(&mut out)
            .write_image(&pixels, 2, 1, ColorType::Rgba8)
            .expect("rgba is supported");
        assert!(out.starts_with(b"%PDF-"));
    }

    #[test]
    fn encoder_reports_unsupported_layouts_through_image_errors() {
        let mut out = Vec::new();
        let pixels = vec![0u8; 4];
        let result = PdfEncoder::new(&mut out).write_image(&pixels, 1, 1, ColorType::L16);
        assert!(matches!(result, Err(ImageError::Unsupported(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn encoder_checks_buffer_size() {
        for len in [3, 5] {
            let mut out = Vec::new();
            let pixels = vec![0u8; len];
            let result = PdfEncoder::new(&mut out).write_image(&pixels, 2, 2, ColorType::L8);
            assert!(matches!(result, Err(ImageError::Parameter(_))), "{len} bytes");
            assert!(out.is_empty());
        }
    }
}
