//! Encoding of source images into image XObjects and their soft masks.

use crate::alpha::{extract_alpha, AlphaChannel};
use crate::filter::{Compression, Encoding, FilterPlan, MASK_COMPRESSION};
use crate::raster::pixel_samples;
use crate::refs::{ObjectReferences, RefType};
use crate::{ColorMode, ColorModel, ConvertError, Raster};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, GrayImage, ImageEncoder};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Finish, Name, Pdf, Ref, Str};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ColorSpace {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    /// An RGB palette, three bytes per entry
    Indexed { lookup: Vec<u8> },
}

/// Uncompressed colour samples laid out the way the XObject will describe them
struct Samples<'a> {
    color_space: ColorSpace,
    bits_per_component: i32,
    data: Cow<'a, [u8]>,
}

impl<'a> Samples<'a> {
    fn gray<D: Into<Cow<'a, [u8]>>>(data: D) -> Samples<'a> {
        Samples {
            color_space: ColorSpace::DeviceGray,
            bits_per_component: 8,
            data: data.into(),
        }
    }

    fn rgb<D: Into<Cow<'a, [u8]>>>(data: D) -> Samples<'a> {
        Samples {
            color_space: ColorSpace::DeviceRgb,
            bits_per_component: 8,
            data: data.into(),
        }
    }

    fn jpeg_color_type(&self) -> Option<ColorType> {
        match (&self.color_space, self.bits_per_component) {
            (ColorSpace::DeviceGray, 8) => Some(ColorType::L8),
            (ColorSpace::DeviceRgb, 8) => Some(ColorType::Rgb8),
            _ => None,
        }
    }
}

/// A compressed stream plus what a reader needs to interpret it
#[derive(Debug, Clone)]
pub(crate) struct EncodedStream {
    pub compression: Compression,
    pub color_space: ColorSpace,
    pub bits_per_component: i32,
    pub bytes: Vec<u8>,
}

impl EncodedStream {
    fn flate(samples: Samples<'_>) -> EncodedStream {
        let level = CompressionLevel::DefaultLevel as u8;
        EncodedStream {
            compression: Compression::Lossless,
            bytes: compress_to_vec_zlib(&samples.data, level),
            color_space: samples.color_space,
            bits_per_component: samples.bits_per_component,
        }
    }

    fn dct(
        samples: Samples<'_>,
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<EncodedStream, ConvertError> {
        let color_type = samples.jpeg_color_type().ok_or_else(|| {
            ConvertError::UnsupportedMode(format!("{:?}", samples.color_space))
        })?;

        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
        encoder.write_image(&samples.data, width, height, color_type)?;

        Ok(EncodedStream {
            compression: Compression::Lossy,
            color_space: samples.color_space,
            bits_per_component: samples.bits_per_component,
            bytes,
        })
    }

    fn mask(alpha: &AlphaChannel) -> EncodedStream {
        let stream = EncodedStream::flate(Samples::gray(alpha.samples.as_slice()));
        debug_assert_eq!(stream.compression, MASK_COMPRESSION);
        stream
    }
}

/// An image ready to be written into a document: the colour data and, for
/// images with alpha, a soft mask that is always losslessly compressed
#[derive(Debug, Clone)]
pub(crate) struct ImageXObject {
    pub width: u32,
    pub height: u32,
    pub base: EncodedStream,
    pub mask: Option<EncodedStream>,
}

impl ImageXObject {
    pub fn encode(raster: &Raster, encoding: &Encoding) -> Result<ImageXObject, ConvertError> {
        let mode = raster.mode()?;
        let plan = FilterPlan::for_mode(mode, encoding.compression)
            .ok_or_else(|| ConvertError::UnsupportedMode(mode.to_string()))?;
        let (width, height) = raster.dimensions();

        if plan.base == Compression::Lossy && (mode.alpha || mode.model == ColorModel::Indexed) {
            log::warn!("forcing lossy compression of a {mode} image; colour data may change");
        }
        log::debug!(
            "encoding {width}x{height} {mode} image: base {}, mask {}",
            plan.base,
            plan.mask
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        let mask = plan
            .mask
            .and_then(|_| extract_alpha(raster))
            .map(|alpha| EncodedStream::mask(&alpha));

        let base = match plan.base {
            Compression::Lossless => EncodedStream::flate(native_samples(raster)?),
            Compression::Lossy => EncodedStream::dct(
                continuous_tone_samples(raster, mode)?,
                width,
                height,
                encoding.jpeg_quality,
            )?,
        };

        log::trace!(
            "encoded image to {} bytes ({} mask bytes)",
            base.bytes.len(),
            mask.as_ref().map(|m| m.bytes.len()).unwrap_or_default()
        );

        Ok(ImageXObject {
            width,
            height,
            base,
            mask,
        })
    }

    /// Write the image (and its soft mask, if any) for the page at `page_index`,
    /// returning the reference of the image XObject
    pub fn write(&self, refs: &mut ObjectReferences, page_index: usize, writer: &mut Pdf) -> Ref {
        let id = refs.gen(RefType::Image(page_index));
        let mask_id = self
            .mask
            .as_ref()
            .map(|_| refs.gen(RefType::SoftMask(page_index)));

        let mut image = writer.image_xobject(id, self.base.bytes.as_slice());
        image.filter(self.base.compression.filter());
        image.width(self.width as i32);
        image.height(self.height as i32);
        match &self.base.color_space {
            ColorSpace::DeviceGray => {
                image.color_space().device_gray();
            }
            ColorSpace::DeviceRgb => {
                image.color_space().device_rgb();
            }
            ColorSpace::DeviceCmyk => {
                image.color_space().device_cmyk();
            }
            ColorSpace::Indexed { lookup } => {
                let hival = (lookup.len() / 3) as i32 - 1;
                let mut array = image.insert(Name(b"ColorSpace")).array();
                array.item(Name(b"Indexed"));
                array.item(Name(b"DeviceRGB"));
                array.item(hival);
                array.item(Str(lookup.as_slice()));
                array.finish();
            }
        }
        image.bits_per_component(self.base.bits_per_component);
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        if let (Some(mask), Some(mask_id)) = (&self.mask, mask_id) {
            let mut s_mask = writer.image_xobject(mask_id, mask.bytes.as_slice());
            s_mask.filter(mask.compression.filter());
            s_mask.width(self.width as i32);
            s_mask.height(self.height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(mask.bits_per_component);
            s_mask.finish();
        }

        id
    }
}

/// Colour samples in the image's own representation, alpha dropped
fn native_samples(raster: &Raster) -> Result<Samples<'_>, ConvertError> {
    let samples = match raster {
        Raster::Dynamic(DynamicImage::ImageLuma8(image)) => {
            Samples::gray(pixel_samples(image))
        }
        Raster::Dynamic(DynamicImage::ImageLumaA8(image)) => Samples::gray(
            pixel_samples(image)
                .chunks_exact(2)
                .map(|px| px[0])
                .collect::<Vec<_>>(),
        ),
        Raster::Dynamic(DynamicImage::ImageRgb8(image)) => Samples::rgb(pixel_samples(image)),
        Raster::Dynamic(DynamicImage::ImageRgba8(image)) => Samples::rgb(
            pixel_samples(image)
                .chunks_exact(4)
                .flat_map(|px| &px[..3])
                .copied()
                .collect::<Vec<_>>(),
        ),
        Raster::Dynamic(image) => {
            return Err(ConvertError::UnsupportedMode(format!("{:?}", image.color())))
        }
        Raster::Bilevel(image) => Samples {
            color_space: ColorSpace::DeviceGray,
            bits_per_component: 1,
            data: Cow::Owned(pack_bilevel(image)),
        },
        Raster::Indexed(image) => Samples {
            color_space: ColorSpace::Indexed {
                lookup: image.palette().iter().flatten().copied().collect(),
            },
            bits_per_component: 8,
            data: Cow::Borrowed(image.indices()),
        },
        Raster::Cmyk(image) => Samples {
            color_space: ColorSpace::DeviceCmyk,
            bits_per_component: 8,
            data: Cow::Borrowed(image.as_raw()),
        },
    };
    Ok(samples)
}

/// 8-bit gray or RGB samples, the only layouts the JPEG encoder takes
fn continuous_tone_samples(raster: &Raster, mode: ColorMode) -> Result<Samples<'_>, ConvertError> {
    match raster {
        Raster::Bilevel(image) => Ok(Samples::gray(
            pixel_samples(image)
                .iter()
                .map(|&s| if s >= 128 { u8::MAX } else { 0 })
                .collect::<Vec<_>>(),
        )),
        Raster::Indexed(image) => Ok(Samples::rgb(
            image
                .indices()
                .iter()
                .flat_map(|&i| image.palette()[i as usize])
                .collect::<Vec<_>>(),
        )),
        Raster::Cmyk(_) => Err(ConvertError::UnsupportedCompression {
            mode,
            compression: Compression::Lossy,
        }),
        Raster::Dynamic(_) => native_samples(raster),
    }
}

/// Pack a bilevel image to one bit per pixel, rows padded to whole bytes,
/// with set bits meaning white
fn pack_bilevel(image: &GrayImage) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let row_bytes = (width as usize + 7) / 8;
    let mut packed = vec![0u8; row_bytes * height as usize];
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[0] >= 128 {
            packed[y as usize * row_bytes + x as usize / 8] |= 0x80 >> (x % 8);
        }
    }
    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexedImage;
    use image::{GenericImageView, ImageBuffer, Luma, Rgb, Rgba};
    use miniz_oxide::inflate::decompress_to_vec_zlib;

    fn inflate(stream: &EncodedStream) -> Vec<u8> {
        assert_eq!(stream.compression, Compression::Lossless);
        decompress_to_vec_zlib(&stream.bytes).expect("stream inflates")
    }

    #[test]
    fn opaque_rgb_is_jpeg_without_mask() {
        let image = ImageBuffer::from_pixel(16, 8, Rgb([200, 100, 50]));
        let raster = Raster::from(DynamicImage::ImageRgb8(image));
        let xobject = ImageXObject::encode(&raster, &Encoding::default()).unwrap();

        assert_eq!(xobject.base.compression, Compression::Lossy);
        assert_eq!(xobject.base.color_space, ColorSpace::DeviceRgb);
        assert!(xobject.mask.is_none());

        let decoded =
            image::load_from_memory_with_format(&xobject.base.bytes, image::ImageFormat::Jpeg)
                .expect("valid jpeg");
        assert_eq!(decoded.dimensions(), (16, 8));
    }

    #[test]
    fn rgba_keeps_colour_under_transparent_pixels() {
        let image = ImageBuffer::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([255, 0, 0, 0])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let raster = Raster::from(DynamicImage::ImageRgba8(image));
        let xobject = ImageXObject::encode(&raster, &Encoding::default()).unwrap();

        assert_eq!(inflate(&xobject.base), vec![255, 0, 0, 0, 0, 255]);
        let mask = xobject.mask.as_ref().expect("rgba has a mask");
        assert_eq!(mask.color_space, ColorSpace::DeviceGray);
        assert_eq!(inflate(mask), vec![0, 255]);
    }

    #[test]
    fn lossy_override_leaves_the_mask_lossless() {
        let image = ImageBuffer::from_pixel(8, 8, Rgba([10, 20, 30, 77]));
        let raster = Raster::from(DynamicImage::ImageRgba8(image));
        let encoding = Encoding {
            compression: Some(Compression::Lossy),
            ..Encoding::default()
        };
        let xobject = ImageXObject::encode(&raster, &encoding).unwrap();

        assert_eq!(xobject.base.compression, Compression::Lossy);
        assert_eq!(inflate(xobject.mask.as_ref().unwrap()), vec![77; 64]);
    }

    #[test]
    fn indexed_images_carry_their_palette() {
        let palette = vec![[255, 0, 0], [0, 255, 0]];
        let image = IndexedImage::new(3, 1, vec![0, 1, 1], palette).unwrap();
        let xobject = ImageXObject::encode(&Raster::from(image), &Encoding::default()).unwrap();

        assert_eq!(
            xobject.base.color_space,
            ColorSpace::Indexed {
                lookup: vec![255, 0, 0, 0, 255, 0]
            }
        );
        assert_eq!(inflate(&xobject.base), vec![0, 1, 1]);
        assert!(xobject.mask.is_none());
    }

    #[test]
    fn lossy_indexed_images_expand_to_rgb() {
        let image = IndexedImage::new(8, 8, vec![1; 64], vec![[0, 0, 0], [0, 0, 255]]).unwrap();
        let encoding = Encoding {
            compression: Some(Compression::Lossy),
            ..Encoding::default()
        };
        let xobject = ImageXObject::encode(&Raster::from(image), &encoding).unwrap();
        assert_eq!(xobject.base.color_space, ColorSpace::DeviceRgb);
        assert_eq!(xobject.base.compression, Compression::Lossy);
    }

    #[test]
    fn bilevel_rows_are_padded_to_bytes() {
        let image = GrayImage::from_fn(10, 2, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        assert_eq!(
            pack_bilevel(&image),
            vec![0b1010_1010, 0b1000_0000, 0b0101_0101, 0b0100_0000]
        );

        let xobject = ImageXObject::encode(&Raster::Bilevel(image), &Encoding::default()).unwrap();
        assert_eq!(xobject.base.bits_per_component, 1);
        assert_eq!(xobject.base.compression, Compression::Lossless);
    }

    #[test]
    fn lossy_cmyk_is_refused() {
        let raster = Raster::from(crate::CmykImage::new(1, 1, vec![0, 0, 0, 255]).unwrap());
        let encoding = Encoding {
            compression: Some(Compression::Lossy),
            ..Encoding::default()
        };
        assert!(matches!(
            ImageXObject::encode(&raster, &encoding),
            Err(ConvertError::UnsupportedCompression { .. })
        ));
    }
}
