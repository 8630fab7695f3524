//! Convert raster images into PDF documents without losing transparency.
//!
//! Each image becomes one page sized from its pixel dimensions. Opaque gray and
//! RGB images are JPEG (DCT) compressed; palette images and anything with an
//! alpha channel are Flate compressed, and the alpha channel is written as a
//! separate, always lossless, soft mask.
//!
//! ```no_run
//! use image_to_pdf::{save, Raster, SaveOptions};
//!
//! let image = image::open("logo.png").unwrap();
//! let out = std::fs::File::create("logo.pdf").unwrap();
//! save(&Raster::from(image), out, &SaveOptions::default()).unwrap();
//! ```

mod alpha;
pub use alpha::*;

/// Entry points shaped like an imaging library's PDF save hook
pub mod compat;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod filter;
pub use filter::*;

mod info;
pub use info::*;

mod options;
pub use options::*;

mod page;
pub use page::*;

mod raster;
pub use raster::*;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod save;
pub use save::*;

mod units;
pub use units::*;

mod xobject;

/// Re-export PDF-writer functionality, mostly for inspecting [pdf_writer::Filter]s
pub use pdf_writer;
