use crate::{ConvertError, Document, Page, Raster, SaveOptions};
use image::{DynamicImage, Frames};
use std::io::Write;

fn document_from<'a>(options: &SaveOptions) -> Result<Document<'a>, ConvertError> {
    options.resolution.validate()?;
    let mut doc = Document::new();
    doc.set_encoding(options.encoding);
    if let Some(info) = &options.info {
        doc.set_info(info.clone());
    }
    Ok(doc)
}

/// Write a single image as a one page PDF.
///
/// Fails with [ConvertError::UnsupportedMode] if the image's pixel layout can't be
/// represented; nothing is written to `destination` in that case.
pub fn save<W: Write>(
    image: &Raster,
    destination: W,
    options: &SaveOptions,
) -> Result<(), ConvertError> {
    save_all(std::iter::once(image), destination, options)
}

/// Write a sequence of images as a PDF with one page per image, in order.
///
/// Fails with [ConvertError::EmptyInput] if `images` is empty, and with
/// [ConvertError::InvalidResolution] or [ConvertError::EmptyImage] when a page
/// would have no area.
pub fn save_all<'a, I, W>(
    images: I,
    destination: W,
    options: &SaveOptions,
) -> Result<(), ConvertError>
where
    I: IntoIterator<Item = &'a Raster>,
    W: Write,
{
    let mut doc = document_from(options)?;
    for image in images {
        doc.add_page(Page::new(image, options.resolution));
    }
    log::debug!("saving {} image(s) as PDF", doc.page_count());
    doc.write(destination)
}

/// Write every frame of an animation as its own page.
///
/// Frames are decoded one at a time as they're added; a decoding failure is
/// returned as [ConvertError::Encoding] before anything is written.
pub fn save_frames<W: Write>(
    frames: Frames<'_>,
    destination: W,
    options: &SaveOptions,
) -> Result<(), ConvertError> {
    let mut doc = document_from(options)?;
    for frame in frames {
        let raster = Raster::from(DynamicImage::ImageRgba8(frame?.into_buffer()));
        doc.add_page(Page::owned(raster, options.resolution));
    }
    log::debug!("saving {} frame(s) as PDF", doc.page_count());
    doc.write(destination)
}
