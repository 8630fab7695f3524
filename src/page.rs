use crate::filter::Encoding;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::units::*;
use crate::xobject::ImageXObject;
use crate::{ConvertError, Raster};
use pdf_writer::{Content, Finish, Name, Pdf};
use std::borrow::Cow;

/// Name the page's image XObject is registered under in its resources
const IMAGE_RESOURCE: Name<'static> = Name(b"image");

/// A page showing a single image that fills it edge to edge
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub raster: Cow<'a, Raster>,
    pub resolution: Resolution,
    /// The size of the page, derived from the image size and resolution
    pub media_box: Rect,
}

impl<'a> Page<'a> {
    /// Create a page for an image the caller keeps ownership of
    pub fn new(raster: &'a Raster, resolution: Resolution) -> Page<'a> {
        Page::with_raster(Cow::Borrowed(raster), resolution)
    }

    pub fn with_raster(raster: Cow<'a, Raster>, resolution: Resolution) -> Page<'a> {
        let (width, height) = resolution.page_size(raster.width(), raster.height());
        Page {
            raster,
            resolution,
            media_box: Rect::from_size(width, height),
        }
    }

    /// Make sure the page can be written: the image's mode is supported, it has
    /// pixels, and the resolution gives it a real size
    pub fn validate(&self) -> Result<(), ConvertError> {
        self.raster.mode()?;
        let (width, height) = self.raster.dimensions();
        if width == 0 || height == 0 {
            return Err(ConvertError::EmptyImage { width, height });
        }
        self.resolution.validate()
    }

    /// Draws the image over the whole media box
    fn render(&self) -> Vec<u8> {
        let mut content = Content::new();
        content.save_state();
        content.transform([
            *self.media_box.width(),
            0.0,
            0.0,
            *self.media_box.height(),
            *self.media_box.x1,
            *self.media_box.y1,
        ]);
        content.x_object(IMAGE_RESOURCE);
        content.restore_state();
        content.finish()
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        encoding: &Encoding,
        writer: &mut Pdf,
    ) -> Result<(), ConvertError> {
        let image = ImageXObject::encode(&self.raster, encoding)?;
        let image_id = image.write(refs, page_index, writer);

        let id = refs.get_or_gen(RefType::Page(page_index));
        let parent = refs.get_or_gen(RefType::PageTree);
        let content_id = refs.gen(RefType::ContentForPage(page_index));

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.parent(parent);
        page.contents(content_id);
        page.resources()
            .x_objects()
            .pair(IMAGE_RESOURCE, image_id);
        page.finish();

        let rendered = self.render();
        writer.stream(content_id, rendered.as_slice());

        Ok(())
    }
}

impl Page<'static> {
    /// Create a page that owns its image
    pub fn owned(raster: Raster, resolution: Resolution) -> Page<'static> {
        Page::with_raster(Cow::Owned(raster), resolution)
    }
}
