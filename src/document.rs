use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use log::debug;

use crate::annotations::{LinkRect, PageAnnotations};
use crate::embedded_files::EmbeddedFiles;
use crate::writer::{OutputTarget, PdfWriter};
use crate::{Attachment, DocumentOptions, Error, Object, ObjectId, Result, Stream, dictionary};

/// PDF document under construction.
///
/// Pages are written in order; each page's content is buffered until the document
/// is finished. Attachments can be registered for the whole document, linked from
/// pages, or embedded straight away with [`Document::embed_attachment`].
pub struct Document {
    writer: PdfWriter,
    options: DocumentOptions,
    pages_id: ObjectId,
    attachments: EmbeddedFiles,
    annotations: PageAnnotations,
}

impl Document {
    pub fn new(options: DocumentOptions) -> Document {
        let mut writer = PdfWriter::new(&options.version, options.compression_level);
        let pages_id = writer.reserve_object_id();
        Document {
            writer,
            options,
            pages_id,
            attachments: EmbeddedFiles::new(),
            annotations: PageAnnotations::new(),
        }
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Start a new page; subsequent content goes to it. Returns the 1-based page number.
    pub fn add_page(&mut self) -> u32 {
        let page = self.writer.begin_page();
        self.writer.set_target(OutputTarget::Page);
        page
    }

    /// Number of the current page, 0 before the first page.
    pub fn page(&self) -> u32 {
        self.writer.page_count()
    }

    /// Append raw content stream operators to the current page.
    pub fn write_content(&mut self, content: &[u8]) -> Result<()> {
        if self.page() == 0 {
            return Err(Error::NoPage);
        }
        self.writer.out(content);
        Ok(())
    }

    pub fn page_content(&self, page: u32) -> Result<&[u8]> {
        self.writer.page_content(page).ok_or(Error::PageNumberNotFound(page))
    }

    /// Set the document-level attachments. Only the last call is kept.
    pub fn set_attachments(&mut self, attachments: Vec<Attachment>) {
        self.attachments.set(attachments);
    }

    pub fn attachments(&self) -> &EmbeddedFiles {
        &self.attachments
    }

    /// Link `attachment` from the rectangle at `x`, `y` (top left corner, measured
    /// from the top of the page) of size `w` x `h` on the current page, all in user units.
    ///
    /// Nothing is drawn; the link only makes the region clickable. A missing attachment
    /// is ignored. An attachment linked several times is embedded once.
    pub fn add_attachment_annotation<A>(&mut self, attachment: A, x: f64, y: f64, w: f64, h: f64) -> Result<()>
    where
        A: Into<Option<Rc<Attachment>>>,
    {
        let page = self.page();
        if page == 0 {
            return Err(Error::NoPage);
        }
        let k = self.options.unit.scale();
        let (_, page_height) = self.options.page_size.dimensions();
        let rect = LinkRect::new(x * k, page_height - y * k, w * k, h * k);
        self.annotations.add(page, attachment, rect);
        Ok(())
    }

    pub fn annotations(&self) -> &PageAnnotations {
        &self.annotations
    }

    /// Embed `attachment` now, even in the middle of a page, and return the object
    /// number of its file specification.
    pub fn embed_attachment(&mut self, attachment: &Attachment) -> Result<u32> {
        self.writer.embed(attachment)
    }

    /// Write all remaining objects and return the complete file.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.writer.set_target(OutputTarget::Document);
        self.attachments.embed_all(&mut self.writer)?;
        self.annotations.embed_all(&mut self.writer)?;

        let (width, height) = self.options.page_size.dimensions();
        let mut kids = Vec::new();
        for page in 1..=self.writer.page_count() {
            kids.push(Object::Reference(self.write_page(page, width, height)?));
        }

        self.writer.begin_object(self.pages_id);
        let count = kids.len();
        self.writer.write_object(&Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }))?;
        self.writer.end_object();

        let info_id = self.writer.new_object();
        self.writer.write_object(&Object::Dictionary(dictionary! {
            "Producer" => Object::string_literal(concat!("pdfembed ", env!("CARGO_PKG_VERSION"))),
        }))?;
        self.writer.end_object();

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
            "Names" => dictionary! { "EmbeddedFiles" => self.attachments.names_tree() },
        };
        let associated = self.attachments.associated_files();
        if !associated.is_empty() {
            catalog.set("AF", associated.into_iter().map(Object::Reference).collect::<Vec<_>>());
        }
        let catalog_id = self.writer.new_object();
        self.writer.write_object(&Object::Dictionary(catalog))?;
        self.writer.end_object();

        debug!(
            "finished document with {} pages and {} objects",
            self.writer.page_count(),
            self.writer.max_id()
        );
        Ok(self.writer.finish(catalog_id, Some(info_id))?)
    }

    fn write_page(&mut self, page: u32, width: f64, height: f64) -> Result<ObjectId> {
        let content = self.page_content(page)?.to_vec();
        let mut stream = Stream::new(dictionary! {}, content);
        if self.options.compress_pages {
            stream.compress(self.options.compression_level)?;
        }
        let content_id = self.writer.new_object();
        self.writer.write_object(&Object::Stream(stream))?;
        self.writer.end_object();

        let mut dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Real(width), Object::Real(height)],
            "Resources" => dictionary! {},
            "Contents" => content_id,
        };
        let links = self.annotations.links(page);
        if !links.is_empty() {
            dict.set("Annots", links.into_iter().map(Object::Dictionary).collect::<Vec<_>>());
        }

        let page_id = self.writer.new_object();
        self.writer.write_object(&Object::Dictionary(dict))?;
        self.writer.end_object();
        Ok(page_id)
    }

    /// Save PDF document to specified file path.
    #[inline]
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<File> {
        let mut file = BufWriter::new(File::create(path)?);
        self.save_to(&mut file)?;
        file.into_inner().map_err(|err| Error::IO(err.into_error()))
    }

    /// Save PDF to arbitrary target
    #[inline]
    pub fn save_to<W: Write>(self, target: &mut W) -> Result<()> {
        target.write_all(&self.finish()?)?;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new(DocumentOptions::default())
    }
}
