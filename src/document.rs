use crate::{
    filter::Encoding,
    info::Info,
    page::Page,
    refs::{ObjectReferences, RefType},
    ConvertError,
};
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Pdf, Ref};
use std::io::Write;

/// An ordered set of image pages, written out as one PDF by [Document::write]
#[derive(Default)]
pub struct Document<'a> {
    pub info: Option<Info>,
    pub encoding: Encoding,
    pub pages: Arena<Page<'a>>,
    pub page_order: Vec<Id<Page<'a>>>,
}

impl<'a> Document<'a> {
    pub fn new() -> Document<'a> {
        Document::default()
    }

    /// Attach metadata. Documents without it get no `/Info` entry in the trailer.
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Sets how image data gets compressed
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    /// Add a page to the end of the document, returning its id
    pub fn add_page(&mut self, page: Page<'a>) -> Id<Page<'a>> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    pub fn page_count(&self) -> usize {
        self.page_order.len()
    }


    /// Write the entire document to the writer.
    ///
    /// Every image is encoded and the whole file is assembled in memory before anything
    /// is written, so a failure (an unsupported image, an encoder error) leaves `w`
    /// untouched. The cost is that large documents are held in memory in full.
    pub fn write<W: Write>(self, mut w: W) -> Result<(), ConvertError> {
        let Document {
            info,
            encoding,
            pages,
            page_order,
        } = self;

        if page_order.is_empty() {
            return Err(ConvertError::EmptyInput);
        }

        // check every page up front so nothing gets encoded for a document that can't be written
        let pages: Vec<&Page> = page_order
            .iter()
            .filter_map(|id| pages.get(*id))
            .collect();
        for page in pages.iter() {
            page.validate()?;
        }

        let mut refs = ObjectReferences::new();

        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = info {
            info.write(&mut refs, &mut writer);
        }

        let page_refs: Vec<Ref> = (0..pages.len())
            .map(|i| refs.gen(RefType::Page(i)))
            .collect();

        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        for (page_index, page) in pages.iter().enumerate() {
            log::debug!(
                "writing page {} of {} ({} x {} pt)",
                page_index + 1,
                pages.len(),
                page.media_box.width(),
                page.media_box.height()
            );
            page.write(&mut refs, page_index, &encoding, &mut writer)?;
        }

        let mut catalog = writer.catalog(catalog_id);
        catalog.pages(page_tree_id);
        catalog.finish();

        let bytes = writer.finish();
        log::debug!("writing {} byte document", bytes.len());
        w.write_all(bytes.as_slice())?;
        w.flush().map_err(Into::into)
    }
}
