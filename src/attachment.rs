use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ModDate;

/// How an embedded file relates to the visual content of the document,
/// advertised to readers through `/AFRelationship`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relationship {
    /// Not advertised: no `/AFRelationship` entry and no `/AF` membership.
    #[default]
    Unspecified,
    Data,
    Source,
    Alternative,
    Supplement,
}

impl Relationship {
    /// The PDF name for this relationship, `None` when unspecified.
    pub fn as_name(&self) -> Option<&'static str> {
        match self {
            Relationship::Unspecified => None,
            Relationship::Data => Some("Data"),
            Relationship::Source => Some("Source"),
            Relationship::Alternative => Some("Alternative"),
            Relationship::Supplement => Some("Supplement"),
        }
    }

    pub fn is_specified(&self) -> bool {
        *self != Relationship::Unspecified
    }
}

/// Identity of an [`Attachment`] instance, independent of its content.
///
/// Two attachments with identical bytes are still distinct files in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttachmentId(u64);

impl AttachmentId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        AttachmentId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A file to embed in a PDF document, either for the document as a whole
/// or behind a file-attachment annotation on a page.
///
/// Once written, the attachment remembers the object number of its file
/// specification and is never written again. Annotations on several pages can
/// share one `Rc<Attachment>`; its content is then embedded only once.
pub struct Attachment {
    id: AttachmentId,
    content: Vec<u8>,
    /// Displayed name of the attachment.
    pub filename: String,
    /// Media type such as `image/png`; empty when unknown.
    pub mimetype: String,
    /// Shown by readers for annotations, and may be edited by them.
    pub description: String,
    pub relationship: Relationship,
    pub modification_time: Option<ModDate>,
    object_number: Cell<u32>,
}

impl Attachment {
    pub fn new<S: Into<String>>(filename: S, content: Vec<u8>) -> Attachment {
        Attachment {
            id: AttachmentId::next(),
            content,
            filename: filename.into(),
            mimetype: String::new(),
            description: String::new(),
            relationship: Relationship::Unspecified,
            modification_time: None,
            object_number: Cell::new(0),
        }
    }

    pub fn with_mimetype<S: Into<String>>(mut self, mimetype: S) -> Attachment {
        self.mimetype = mimetype.into();
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Attachment {
        self.description = description.into();
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Attachment {
        self.relationship = relationship;
        self
    }

    pub fn with_modification_time<D: Into<ModDate>>(mut self, date: D) -> Attachment {
        self.modification_time = Some(date.into());
        self
    }

    pub fn id(&self) -> AttachmentId {
        self.id
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Object number of the file specification, once the attachment has been embedded.
    pub fn object_number(&self) -> Option<u32> {
        match self.object_number.get() {
            0 => None,
            number => Some(number),
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.object_number.get() != 0
    }

    /// Record the file specification's object number. Only the first call has an effect.
    pub(crate) fn set_object_number(&self, number: u32) {
        if self.object_number.get() == 0 {
            self.object_number.set(number);
        }
    }
}

/// Copies get their own identity but keep the object number, like a value copy
/// of an attachment that may already have been embedded.
impl Clone for Attachment {
    fn clone(&self) -> Self {
        Attachment {
            id: AttachmentId::next(),
            content: self.content.clone(),
            filename: self.filename.clone(),
            mimetype: self.mimetype.clone(),
            description: self.description.clone(),
            relationship: self.relationship,
            modification_time: self.modification_time,
            object_number: self.object_number.clone(),
        }
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("id", &self.id)
            .field("filename", &self.filename)
            .field("mimetype", &self.mimetype)
            .field("size", &self.content.len())
            .field("relationship", &self.relationship)
            .field("object_number", &self.object_number())
            .finish()
    }
}
