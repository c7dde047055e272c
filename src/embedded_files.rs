use log::debug;

use crate::writer::PdfWriter;
use crate::{Attachment, Dictionary, Object, ObjectId, Result, dictionary};

/// Document-level attachments, listed in the catalog's `/EmbeddedFiles` name tree.
///
/// The registry owns its own copies of the attachments. Only the most recent call
/// to [`EmbeddedFiles::set`] counts; earlier sets are discarded.
#[derive(Debug, Default, Clone)]
pub struct EmbeddedFiles {
    attachments: Vec<Attachment>,
}

impl EmbeddedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current attachments with `attachments`.
    pub fn set(&mut self, attachments: Vec<Attachment>) {
        self.attachments = attachments;
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attachment> {
        self.attachments.iter()
    }

    /// Embed every attachment, in order. Object numbers are recorded on the stored copies.
    pub fn embed_all(&self, writer: &mut PdfWriter) -> Result<()> {
        for attachment in &self.attachments {
            writer.embed(attachment)?;
        }
        debug!("embedded {} document attachments", self.attachments.len());
        Ok(())
    }

    /// Body of the `/EmbeddedFiles` name tree: `<< /Names [(Attachement1) 5 0 R ...] >>`.
    ///
    /// The tree is produced even when there are no attachments, with an empty array.
    pub fn names_tree(&self) -> Dictionary {
        let names = self
            .attachments
            .iter()
            .enumerate()
            .flat_map(|(index, attachment)| {
                [
                    Object::string_literal(format!("Attachement{}", index + 1)),
                    Object::Reference((attachment.object_number().unwrap_or(0), 0)),
                ]
            })
            .collect::<Vec<_>>();
        dictionary! { "Names" => names }
    }

    /// File specifications for the catalog's `/AF` array: embedded attachments
    /// that declare a relationship, in registration order.
    pub fn associated_files(&self) -> Vec<ObjectId> {
        self.attachments
            .iter()
            .filter(|attachment| attachment.relationship.is_specified())
            .filter_map(|attachment| attachment.object_number())
            .map(|number| (number, 0))
            .collect()
    }

    /// [`associated_files`](Self::associated_files) as space-separated references, e.g. `12 0 R 15 0 R`.
    pub fn associated_files_array(&self) -> String {
        self.associated_files()
            .iter()
            .map(|(number, generation)| format!("{} {} R", number, generation))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
