use crate::{ColorMode, Compression};
use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The image's pixel layout isn't one that can be written to a PDF
    #[error("cannot save mode {0}")]
    UnsupportedMode(String),

    /// An explicit compression override can't be applied to the image's mode
    #[error("cannot save mode {mode} with {compression} compression")]
    UnsupportedCompression {
        mode: ColorMode,
        compression: Compression,
    },

    /// A document needs at least one page
    #[error("no images to save")]
    EmptyInput,

    /// Page sizes are only defined for positive, finite resolutions
    #[error("invalid resolution {x} x {y} dpi")]
    InvalidResolution { x: f32, y: f32 },

    /// An image without any pixels can't be drawn as a page
    #[error("cannot save an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    /// A hand-built raster whose buffer doesn't match its description
    #[error("malformed image: {0}")]
    MalformedImage(String),

    #[error(transparent)]
    /// [image] failed to encode or decode pixel data
    Encoding(#[from] image::ImageError),

    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),
}

impl From<ConvertError> for image::ImageError {
    fn from(error: ConvertError) -> Self {
        use image::error::{
            ImageFormatHint, ParameterError, ParameterErrorKind, UnsupportedError,
            UnsupportedErrorKind,
        };

        match error {
            ConvertError::Encoding(e) => e,
            ConvertError::Io(e) => image::ImageError::IoError(e),
            e @ (ConvertError::UnsupportedMode(_)
            | ConvertError::UnsupportedCompression { .. }) => {
                image::ImageError::Unsupported(UnsupportedError::from_format_and_kind(
                    ImageFormatHint::Name("PDF".to_string()),
                    UnsupportedErrorKind::GenericFeature(e.to_string()),
                ))
            }
            e @ (ConvertError::EmptyInput
            | ConvertError::MalformedImage(_)
            | ConvertError::InvalidResolution { .. }
            | ConvertError::EmptyImage { .. }) => {
                image::ImageError::Parameter(ParameterError::from_kind(
                    ParameterErrorKind::Generic(e.to_string()),
                ))
            }
        }
    }
}
