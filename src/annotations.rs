use std::collections::{BTreeMap, HashSet};
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, trace, warn};

use crate::writer::{PdfWriter, Writer};
use crate::{Attachment, Dictionary, Object, Result, dictionary};

/// Placement of a link in page space: points, origin at the bottom left.
///
/// `y` is the top edge of the link, already flipped from top-down layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LinkRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        LinkRect { x, y, width, height }
    }

    /// `[llx lly urx ury]` with `lly <= ury`, whatever the sign of the height.
    pub fn to_pdf_rect(&self) -> [f64; 4] {
        let mut lly = self.y - self.height;
        let mut ury = self.y;
        if lly > ury {
            std::mem::swap(&mut lly, &mut ury);
        }
        [self.x, lly, self.x + self.width, ury]
    }
}

#[derive(Debug, Clone)]
struct AttachmentLink {
    attachment: Rc<Attachment>,
    rect: LinkRect,
}

/// File-attachment annotations, grouped by page.
///
/// Links hold shared references to caller-owned attachments. An attachment linked
/// from several places is embedded once and every link points at the same file
/// specification.
#[derive(Debug, Default, Clone)]
pub struct PageAnnotations {
    pages: BTreeMap<u32, Vec<AttachmentLink>>,
}

impl PageAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a link to `attachment` on `page`. A missing attachment is ignored.
    pub fn add<A>(&mut self, page: u32, attachment: A, rect: LinkRect)
    where
        A: Into<Option<Rc<Attachment>>>,
    {
        let Some(attachment) = attachment.into() else {
            warn!("ignoring attachment annotation without an attachment on page {}", page);
            return;
        };
        self.pages
            .entry(page)
            .or_default()
            .push(AttachmentLink { attachment, rect });
    }

    /// Number of links on `page`.
    pub fn count(&self, page: u32) -> usize {
        self.pages.get(&page).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.values().all(Vec::is_empty)
    }

    /// Embed every attachment referenced from any page, each instance exactly once.
    ///
    /// Returns the number of distinct attachments visited.
    pub fn embed_all(&self, writer: &mut PdfWriter) -> Result<usize> {
        let mut seen = HashSet::new();
        for link in self.pages.values().flatten() {
            if !seen.insert(link.attachment.id()) {
                trace!("{} already processed in this pass", link.attachment.filename);
                continue;
            }
            writer.embed(&link.attachment)?;
        }
        debug!("embedded {} annotation attachments", seen.len());
        Ok(seen.len())
    }

    /// Annotation dictionaries for `page`, in the order the links were added.
    ///
    /// Attachments must have been embedded first; an attachment without an object
    /// number is skipped.
    pub fn links(&self, page: u32) -> Vec<Dictionary> {
        let Some(links) = self.pages.get(&page) else {
            return Vec::new();
        };
        links
            .iter()
            .filter_map(|link| {
                let number = link.attachment.object_number();
                if number.is_none() {
                    warn!("{} is linked on page {} but was never embedded", link.attachment.filename, page);
                }
                number.map(|number| annotation(link, number))
            })
            .collect()
    }

    /// Serialize the annotation dictionaries of `page`, one per line.
    pub fn write_links(&self, page: u32, out: &mut dyn Write) -> io::Result<()> {
        for link in self.links(page) {
            Writer::write_dictionary(out, &link)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

fn annotation(link: &AttachmentLink, number: u32) -> Dictionary {
    let attachment = &link.attachment;
    let rect = link.rect.to_pdf_rect().iter().copied().map(Object::Real).collect::<Vec<_>>();
    let mut dict = dictionary! {
        "Type" => "Annot",
        "Subtype" => "FileAttachment",
        "Rect" => rect,
        "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
        "Contents" => Object::text_string(&attachment.description),
        "T" => Object::text_string(&attachment.filename),
        "Name" => "PushPin",
        "FS" => Object::Reference((number, 0)),
    };
    if attachment.relationship.is_specified() {
        dict.set("AF", vec![Object::Reference((number, 0))]);
    }
    dict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Relationship;

    #[test]
    fn rect_is_ordered_for_positive_height() {
        assert_eq!(LinkRect::new(10.0, 700.0, 50.0, 20.0).to_pdf_rect(), [10.0, 680.0, 60.0, 700.0]);
    }

    #[test]
    fn rect_is_ordered_for_negative_height() {
        assert_eq!(LinkRect::new(10.0, 700.0, 50.0, -20.0).to_pdf_rect(), [10.0, 700.0, 60.0, 720.0]);
    }

    #[test]
    fn rect_is_ordered_for_any_geometry() {
        for &(y, height) in &[(0.0, 0.0), (-5.0, 3.0), (-5.0, -3.0), (842.0, 900.0), (1.5, -0.25)] {
            let [_, lly, _, ury] = LinkRect::new(0.0, y, 1.0, height).to_pdf_rect();
            assert!(lly <= ury, "y={} height={}", y, height);
        }
    }

    #[test]
    fn missing_attachment_is_ignored() {
        let mut annotations = PageAnnotations::new();
        annotations.add(1, None::<Rc<Attachment>>, LinkRect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(annotations.count(1), 0);
        assert!(annotations.is_empty());
    }

    #[test]
    fn shared_attachment_is_embedded_once() {
        let shared = Rc::new(Attachment::new("shared.txt", b"shared".to_vec()));
        let mut annotations = PageAnnotations::new();
        annotations.add(1, shared.clone(), LinkRect::new(0.0, 100.0, 10.0, 10.0));
        annotations.add(2, shared.clone(), LinkRect::new(0.0, 200.0, 10.0, 10.0));
        annotations.add(2, Some(shared.clone()), LinkRect::new(20.0, 200.0, 10.0, 10.0));

        let mut writer = PdfWriter::new("1.7", 6);
        assert_eq!(annotations.embed_all(&mut writer).unwrap(), 1);
        assert_eq!(writer.max_id(), 2);
        assert_eq!(shared.object_number(), Some(2));

        let fs: Vec<_> = [1, 2]
            .iter()
            .flat_map(|&page| annotations.links(page))
            .map(|link| link.get(b"FS").and_then(Object::as_reference).unwrap())
            .collect();
        assert_eq!(fs, vec![(2, 0), (2, 0), (2, 0)]);
    }

    #[test]
    fn equal_content_is_not_deduplicated() {
        let first = Rc::new(Attachment::new("same.txt", b"same".to_vec()));
        let second = Rc::new(Attachment::new("same.txt", b"same".to_vec()));
        let mut annotations = PageAnnotations::new();
        annotations.add(1, first.clone(), LinkRect::new(0.0, 0.0, 1.0, 1.0));
        annotations.add(1, second.clone(), LinkRect::new(0.0, 0.0, 1.0, 1.0));

        let mut writer = PdfWriter::new("1.7", 6);
        assert_eq!(annotations.embed_all(&mut writer).unwrap(), 2);
        assert_ne!(first.object_number(), second.object_number());
    }

    #[test]
    fn already_embedded_attachment_is_not_written_again() {
        let attachment = Rc::new(Attachment::new("early.txt", b"early".to_vec()));
        let mut writer = PdfWriter::new("1.7", 6);
        writer.embed(&attachment).unwrap();

        let mut annotations = PageAnnotations::new();
        annotations.add(1, attachment.clone(), LinkRect::new(0.0, 0.0, 1.0, 1.0));
        annotations.embed_all(&mut writer).unwrap();
        assert_eq!(writer.max_id(), 2);
    }

    #[test]
    fn link_dictionary_layout() {
        let attachment = Rc::new(Attachment::new("doc.txt", b"doc".to_vec()));
        let mut annotations = PageAnnotations::new();
        annotations.add(1, attachment, LinkRect::new(28.35, 813.54, 56.69, 28.35));

        let mut writer = PdfWriter::new("1.7", 6);
        annotations.embed_all(&mut writer).unwrap();

        let mut out = Vec::new();
        annotations.write_links(1, &mut out).unwrap();
        let text = String::from_utf8_lossy(&out).into_owned();
        assert!(text.starts_with(
            "<</Type/Annot/Subtype/FileAttachment/Rect[28.35 785.19 85.04 813.54]/Border[0 0 0]/Contents("
        ));
        assert!(text.ends_with("/Name/PushPin/FS 2 0 R>>\n"));
        assert!(!text.contains("/AF"));
    }

    #[test]
    fn related_attachment_gets_an_af_array() {
        let attachment = Rc::new(
            Attachment::new("source.csv", b"a,b".to_vec()).with_relationship(Relationship::Source),
        );
        let mut annotations = PageAnnotations::new();
        annotations.add(3, attachment, LinkRect::new(0.0, 10.0, 5.0, 5.0));

        let mut writer = PdfWriter::new("1.7", 6);
        annotations.embed_all(&mut writer).unwrap();

        let links = annotations.links(3);
        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0].get(b"AF").unwrap(),
            &Object::Array(vec![Object::Reference((2, 0))])
        );
        assert!(annotations.links(1).is_empty());
    }
}
