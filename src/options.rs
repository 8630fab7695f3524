use crate::{Compression, Encoding, Info, Resolution};

/// Everything that can be tweaked when saving images as a PDF.
///
/// ```
/// use image_to_pdf::{Compression, Info, SaveOptions};
///
/// let options = SaveOptions::new()
///     .resolution(300.0)
///     .compression(Compression::Lossless)
///     .info(Info::new().title("Scans"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// How many image pixels make up an inch on the page
    pub resolution: Resolution,
    /// Compression override and JPEG quality for the colour data
    pub encoding: Encoding,
    /// Document metadata. No information dictionary is written if [None].
    pub info: Option<Info>,
}

impl SaveOptions {
    /// 72 dpi, compression chosen per image, no metadata
    pub fn new() -> SaveOptions {
        SaveOptions::default()
    }

    /// Use the same resolution, in dpi, along both axes. Checked when saving;
    /// anything but a positive, finite value is refused.
    pub fn resolution(mut self, dpi: f32) -> Self {
        self.resolution = Resolution::uniform(dpi);
        self
    }

    /// Use separate horizontal and vertical resolutions, in dpi
    pub fn dpi(mut self, x: f32, y: f32) -> Self {
        self.resolution = Resolution::new(x, y);
        self
    }

    /// Force the compression of image colour data instead of choosing it per image.
    /// Soft masks stay lossless regardless.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.encoding.compression = Some(compression);
        self
    }

    /// JPEG quality for lossy compression, 1 to 100
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.encoding.jpeg_quality = quality;
        self
    }

    /// Write `info` as the document information dictionary
    pub fn info(mut self, info: Info) -> Self {
        self.info = Some(info);
        self
    }
}
