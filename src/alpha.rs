use crate::raster::pixel_samples;
use crate::Raster;
use image::DynamicImage;

/// The alpha band of an image, one byte per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaChannel {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<u8>,
}

/// Project the alpha band out of `raster` without touching the colour data.
/// Returns [None] for images without alpha.
pub fn extract_alpha(raster: &Raster) -> Option<AlphaChannel> {
    let (width, height) = raster.dimensions();
    let samples: Vec<u8> = match raster {
        Raster::Dynamic(DynamicImage::ImageLumaA8(image)) => {
            pixel_samples(image).chunks_exact(2).map(|px| px[1]).collect()
        }
        Raster::Dynamic(DynamicImage::ImageRgba8(image)) => {
            pixel_samples(image).chunks_exact(4).map(|px| px[3]).collect()
        }
        Raster::Indexed(image) if image.transparency().is_some() => image
            .indices()
            .iter()
            .map(|&index| image.alpha_of(index))
            .collect(),
        _ => return None,
    };

    Some(AlphaChannel {
        width,
        height,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexedImage;
    use image::{ImageBuffer, LumaA, Rgb, Rgba};

    #[test]
    fn rgba_alpha_is_copied_exactly() {
        let image = ImageBuffer::from_fn(3, 2, |x, y| Rgba([10, 20, 30, (x * 100 + y) as u8]));
        let raster = Raster::from(DynamicImage::ImageRgba8(image));

        let alpha = extract_alpha(&raster).expect("image has alpha");
        assert_eq!((alpha.width, alpha.height), (3, 2));
        assert_eq!(alpha.samples, vec![0, 100, 200, 1, 101, 201]);
    }

    #[test]
    fn gray_alpha_takes_the_second_band() {
        let image = ImageBuffer::from_pixel(2, 1, LumaA([7, 42]));
        let raster = Raster::from(DynamicImage::ImageLumaA8(image));
        assert_eq!(extract_alpha(&raster).unwrap().samples, vec![42, 42]);
    }

    #[test]
    fn indexed_alpha_comes_from_the_transparency_table() {
        let image = IndexedImage::new(4, 1, vec![0, 1, 2, 1], vec![[0; 3], [1; 3], [2; 3]])
            .unwrap()
            .with_transparency(vec![0, 64])
            .unwrap();
        let alpha = extract_alpha(&Raster::from(image)).unwrap();
        assert_eq!(alpha.samples, vec![0, 64, 255, 64]);
    }

    #[test]
    fn opaque_images_have_no_alpha() {
        let image = ImageBuffer::from_pixel(2, 2, Rgb([1, 2, 3]));
        assert_eq!(extract_alpha(&Raster::from(DynamicImage::ImageRgb8(image))), None);
    }

    #[test]
    fn extraction_leaves_the_source_untouched() {
        let image = ImageBuffer::from_pixel(1, 1, Rgba([1, 2, 3, 4]));
        let raster = Raster::from(DynamicImage::ImageRgba8(image.clone()));
        let _ = extract_alpha(&raster);
        match raster {
            Raster::Dynamic(DynamicImage::ImageRgba8(after)) => assert_eq!(after, image),
            _ => unreachable!(),
        }
    }
}
