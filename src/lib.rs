//! Embed files into PDF documents.
//!
//! Attachments are written as compressed `/EmbeddedFile` streams with a `/Filespec`
//! dictionary, and are reachable either from the catalog's `/EmbeddedFiles` name tree
//! and `/AF` array, or from `/FileAttachment` annotations placed on pages.

mod object;
pub use crate::object::{Dictionary, Object, ObjectId, Stream, StringFormat};

mod attachment;
mod datetime;
mod document;
mod embed;
pub mod encodings;
mod error;
pub mod filters;
mod options;
mod writer;
mod xref;

pub mod annotations;
pub mod embedded_files;

pub use crate::annotations::{LinkRect, PageAnnotations};
pub use crate::attachment::{Attachment, AttachmentId, Relationship};
pub use crate::datetime::ModDate;
pub use crate::document::Document;
pub use crate::embedded_files::EmbeddedFiles;
pub use crate::error::{Error, Result};
pub use crate::options::{DocumentOptions, DocumentOptionsBuilder, PageSize, Unit};
pub use crate::writer::{OutputTarget, PdfWriter, TargetGuard, Writer};
pub use crate::xref::{Xref, XrefEntry};
