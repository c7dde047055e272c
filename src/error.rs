use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An Object has the wrong type, e.g. the Object is an Array where a Name would be expected.
    #[error("object has wrong type; expected type {expected} but found type {found}")]
    ObjectType {
        expected: &'static str,
        found: &'static str,
    },
    /// Dictionary key was not found.
    #[error("missing required dictionary key \"{0}\"")]
    DictKey(String),
    /// A page-scoped operation was attempted before any page was added.
    #[error("no page is open; call add_page first")]
    NoPage,
    /// Page number was not found in document.
    #[error("page {0} does not exist")]
    PageNumberNotFound(u32),
    /// A timestamp could not be represented as a UTC date time.
    #[error("timestamp is out of the representable date range")]
    DateOutOfRange,
    /// IO error, raised by the deflate encoder or the output sink.
    #[error("I/O error: {0}")]
    IO(#[from] std::io::Error),
}
