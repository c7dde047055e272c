use std::io::{Result, Write};
use std::ops::{Deref, DerefMut};

use log::warn;

use super::Object::*;
use super::{Dictionary, Object, ObjectId, Stream, StringFormat};
use crate::xref::*;

/// Where [`PdfWriter`] currently sends its output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// The main sequence of indirect objects.
    #[default]
    Document,
    /// The content buffer of the most recently opened page.
    Page,
}

/// Sequential writer for the body of a PDF file.
///
/// Indirect objects are numbered in the order they are allocated and written to the
/// main buffer, while page content is accumulated in one buffer per page until the
/// pages themselves are serialized. All output goes to the buffer selected by the
/// current [`OutputTarget`].
#[derive(Debug)]
pub struct PdfWriter {
    buffer: Vec<u8>,
    pages: Vec<Vec<u8>>,
    target: OutputTarget,
    xref: Xref,
    max_id: u32,
    compression_level: u32,
}

impl PdfWriter {
    pub fn new(version: &str, compression_level: u32) -> PdfWriter {
        let mut buffer = Vec::with_capacity(4096);
        buffer.extend_from_slice(format!("%PDF-{}\n", version).as_bytes());
        buffer.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
        PdfWriter {
            buffer,
            pages: Vec::new(),
            target: OutputTarget::Document,
            xref: Xref::new(),
            max_id: 0,
            compression_level,
        }
    }

    pub fn target(&self) -> OutputTarget {
        self.target
    }

    pub fn set_target(&mut self, target: OutputTarget) {
        self.target = target;
    }

    /// Switch to `target` until the returned guard is dropped.
    ///
    /// The previous target is restored on every exit path, including early returns
    /// through `?`, so callers can write objects while a page is being assembled.
    pub fn scoped_target(&mut self, target: OutputTarget) -> TargetGuard<'_> {
        let saved = std::mem::replace(&mut self.target, target);
        TargetGuard { writer: self, saved }
    }

    pub fn compression_level(&self) -> u32 {
        self.compression_level
    }

    /// Highest object number handed out so far.
    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    /// Allocate the next object number without writing anything.
    pub fn reserve_object_id(&mut self) -> ObjectId {
        self.max_id += 1;
        (self.max_id, 0)
    }

    /// Allocate the next object number and write its `obj` header.
    pub fn new_object(&mut self) -> ObjectId {
        let id = self.reserve_object_id();
        self.begin_object(id);
        id
    }

    /// Write the header of an object whose number was reserved earlier.
    pub fn begin_object(&mut self, id: ObjectId) {
        if self.target != OutputTarget::Document {
            warn!("object {} is being started while output goes to a page buffer", id.0);
        }
        let offset = u32::try_from(self.buffer.len()).unwrap_or(u32::MAX);
        self.xref.insert(
            id.0,
            XrefEntry::Normal {
                offset,
                generation: id.1,
            },
        );
        self.out(format!("{} {} obj\n", id.0, id.1).as_bytes());
    }

    pub fn end_object(&mut self) {
        self.out(b"\nendobj\n");
    }

    /// Append raw bytes to the current target.
    pub fn out(&mut self, bytes: &[u8]) {
        match self.target {
            OutputTarget::Document => self.buffer.extend_from_slice(bytes),
            OutputTarget::Page => match self.pages.last_mut() {
                Some(page) => page.extend_from_slice(bytes),
                None => {
                    warn!("no page is open, writing page output to the document body");
                    self.buffer.extend_from_slice(bytes)
                }
            },
        }
    }

    /// Serialize `object` to the current target.
    pub fn write_object(&mut self, object: &Object) -> Result<()> {
        Writer::write_object(self, object)
    }

    /// Write a stream body, already encoded, with its `stream`/`endstream` delimiters.
    pub fn put_stream(&mut self, content: &[u8]) {
        self.out(b"\nstream\n");
        self.out(content);
        self.out(b"\nendstream");
    }

    /// Open a new page content buffer and return its 1-based page number.
    pub fn begin_page(&mut self) -> u32 {
        self.pages.push(Vec::new());
        self.page_count()
    }

    pub fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    pub fn page_content(&self, page: u32) -> Option<&[u8]> {
        let index = usize::try_from(page).ok()?.checked_sub(1)?;
        self.pages.get(index).map(Vec::as_slice)
    }

    /// The main object sequence written so far.
    pub fn body(&self) -> &[u8] {
        &self.buffer
    }

    /// Write the cross-reference table and trailer and return the complete file.
    pub fn finish(mut self, root: ObjectId, info: Option<ObjectId>) -> Result<Vec<u8>> {
        self.target = OutputTarget::Document;
        let xref_start = self.buffer.len();
        self.xref.write_to(&mut self.buffer)?;

        let mut trailer = Dictionary::new();
        trailer.set("Size", self.xref.size());
        trailer.set("Root", root);
        if let Some(info) = info {
            trailer.set("Info", info);
        }
        self.buffer.extend_from_slice(b"trailer\n");
        Writer::write_dictionary(&mut self.buffer, &trailer)?;
        write!(self.buffer, "\nstartxref\n{}\n%%EOF\n", xref_start)?;
        Ok(self.buffer)
    }
}

impl Write for PdfWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.out(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Restores the saved [`OutputTarget`] of a [`PdfWriter`] when dropped.
pub struct TargetGuard<'a> {
    writer: &'a mut PdfWriter,
    saved: OutputTarget,
}

impl TargetGuard<'_> {
    /// The target that will be restored.
    pub fn saved_target(&self) -> OutputTarget {
        self.saved
    }
}

impl Deref for TargetGuard<'_> {
    type Target = PdfWriter;

    fn deref(&self) -> &PdfWriter {
        self.writer
    }
}

impl DerefMut for TargetGuard<'_> {
    fn deref_mut(&mut self) -> &mut PdfWriter {
        self.writer
    }
}

impl Drop for TargetGuard<'_> {
    fn drop(&mut self) {
        self.writer.target = self.saved;
    }
}

pub struct Writer;

impl Writer {
    fn need_separator(object: &Object) -> bool {
        matches!(*object, Null | Boolean(_) | Integer(_) | Real(_) | Reference(_))
    }

    /// Serialize `object` into a fresh byte vector.
    pub fn to_bytes(object: &Object) -> Vec<u8> {
        let mut bytes = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = Writer::write_object(&mut bytes, object);
        bytes
    }

    pub fn write_object(file: &mut dyn Write, object: &Object) -> Result<()> {
        match *object {
            Null => file.write_all(b"null"),
            Boolean(ref value) => {
                if *value {
                    file.write_all(b"true")
                } else {
                    file.write_all(b"false")
                }
            }
            Integer(ref value) => file.write_all(itoa::Buffer::new().format(*value).as_bytes()),
            Real(ref value) => write!(file, "{:.2}", *value),
            Name(ref name) => Writer::write_name(file, name),
            String(ref text, ref format) => Writer::write_string(file, text, format),
            Array(ref array) => Writer::write_array(file, array),
            Object::Dictionary(ref dict) => Writer::write_dictionary(file, dict),
            Object::Stream(ref stream) => Writer::write_stream(file, stream),
            Reference(ref id) => write!(file, "{} {} R", id.0, id.1),
        }
    }

    fn write_name(file: &mut dyn Write, name: &[u8]) -> Result<()> {
        file.write_all(b"/")?;
        for &byte in name {
            // white-space and delimiter chars are encoded to # sequences
            // also encode bytes outside of the range 33 (!) to 126 (~)
            if b" \t\n\r\x0C()<>[]{}/%#".contains(&byte) || !(33..=126).contains(&byte) {
                write!(file, "#{:02X}", byte)?;
            } else {
                file.write_all(&[byte])?;
            }
        }
        Ok(())
    }

    fn write_string(file: &mut dyn Write, text: &[u8], format: &StringFormat) -> Result<()> {
        match *format {
            // Within a Literal string, backslash (\) and unbalanced parentheses should be escaped.
            // This rule apply to each individual byte in a string object,
            // whether the string is interpreted as single-byte or multiple-byte character codes.
            // If an end-of-line marker appears within a literal string without a preceding backslash, the result is equivalent to \n.
            // So \r also need be escaped.
            StringFormat::Literal => {
                let mut escape_indice = Vec::new();
                let mut parentheses = Vec::new();
                for (index, &byte) in text.iter().enumerate() {
                    match byte {
                        b'(' => parentheses.push(index),
                        b')' => {
                            if parentheses.pop().is_none() {
                                escape_indice.push(index);
                            }
                        }
                        b'\\' | b'\r' => escape_indice.push(index),
                        _ => continue,
                    }
                }
                escape_indice.append(&mut parentheses);

                file.write_all(b"(")?;
                if escape_indice.is_empty() {
                    file.write_all(text)?;
                } else {
                    for (index, &byte) in text.iter().enumerate() {
                        if escape_indice.contains(&index) {
                            file.write_all(b"\\")?;
                            file.write_all(&[if byte == b'\r' { b'r' } else { byte }])?;
                        } else {
                            file.write_all(&[byte])?;
                        }
                    }
                }
                file.write_all(b")")?;
            }
            StringFormat::Hexadecimal => {
                file.write_all(b"<")?;
                for &byte in text {
                    write!(file, "{:02x}", byte)?;
                }
                file.write_all(b">")?;
            }
        }
        Ok(())
    }

    fn write_array(file: &mut dyn Write, array: &[Object]) -> Result<()> {
        file.write_all(b"[")?;
        let mut first = true;
        for object in array {
            if first {
                first = false;
            } else if Writer::need_separator(object) {
                file.write_all(b" ")?;
            }
            Writer::write_object(file, object)?;
        }
        file.write_all(b"]")?;
        Ok(())
    }

    pub fn write_dictionary(file: &mut dyn Write, dictionary: &Dictionary) -> Result<()> {
        file.write_all(b"<<")?;
        for (key, value) in dictionary {
            Writer::write_name(file, key)?;
            if Writer::need_separator(value) {
                file.write_all(b" ")?;
            }
            Writer::write_object(file, value)?;
        }
        file.write_all(b">>")?;
        Ok(())
    }

    fn write_stream(file: &mut dyn Write, stream: &Stream) -> Result<()> {
        Writer::write_dictionary(file, &stream.dict)?;
        file.write_all(b"\nstream\n")?;
        file.write_all(&stream.content)?;
        file.write_all(b"\nendstream")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary;

    fn render(object: &Object) -> std::string::String {
        std::string::String::from_utf8(Writer::to_bytes(object)).unwrap()
    }

    #[test]
    fn names_escape_delimiters() {
        assert_eq!(render(&Object::from("image/png")), "/image#2Fpng");
        assert_eq!(render(&Name(b"name \t".to_vec())), "/name#20#09");
        assert_eq!(render(&Object::from("PushPin")), "/PushPin");
    }

    #[test]
    fn strings_escape_unbalanced_parentheses() {
        assert_eq!(render(&Object::string_literal("text((\r)")), r"(text\((\r))");
        assert_eq!(render(&Object::string_literal("a)b")), "(a\\)b)");
        assert_eq!(
            render(&String(vec![0xAB, 0x01], StringFormat::Hexadecimal)),
            "<ab01>"
        );
    }

    #[test]
    fn dictionaries_only_separate_where_needed() {
        let dict = dictionary! {
            "Type" => "Annot",
            "Rect" => vec![Real(10.0), Real(20.5), Real(30.0), Real(40.25)],
            "FS" => Reference((12, 0)),
            "Border" => vec![Integer(0), Integer(0), Integer(0)],
        };
        assert_eq!(
            render(&Object::Dictionary(dict)),
            "<</Type/Annot/Rect[10.00 20.50 30.00 40.25]/FS 12 0 R/Border[0 0 0]>>"
        );
    }

    #[test]
    fn objects_are_numbered_sequentially() {
        let mut writer = PdfWriter::new("1.7", 6);
        let first = writer.new_object();
        writer.write_object(&Integer(7)).unwrap();
        writer.end_object();
        let second = writer.new_object();
        writer.end_object();
        assert_eq!(first, (1, 0));
        assert_eq!(second, (2, 0));

        let body = std::string::String::from_utf8_lossy(writer.body()).into_owned();
        assert!(body.contains("1 0 obj\n7\nendobj\n2 0 obj\n"));
    }

    #[test]
    fn output_follows_the_target() {
        let mut writer = PdfWriter::new("1.7", 6);
        let page = writer.begin_page();
        writer.set_target(OutputTarget::Page);
        writer.out(b"0 0 m");
        assert_eq!(writer.page_content(page), Some(&b"0 0 m"[..]));
        assert!(!writer.body().ends_with(b"0 0 m"));
        assert_eq!(writer.page_content(0), None);
        assert_eq!(writer.page_content(2), None);
    }

    #[test]
    fn scoped_target_restores_on_drop() {
        let mut writer = PdfWriter::new("1.7", 6);
        writer.begin_page();
        writer.set_target(OutputTarget::Page);
        {
            let mut guard = writer.scoped_target(OutputTarget::Document);
            assert_eq!(guard.target(), OutputTarget::Document);
            assert_eq!(guard.saved_target(), OutputTarget::Page);
            guard.out(b"% body");
        }
        assert_eq!(writer.target(), OutputTarget::Page);
        assert!(writer.body().ends_with(b"% body"));
    }

    #[test]
    fn scoped_target_restores_on_early_return() {
        fn failing(writer: &mut PdfWriter) -> Result<()> {
            let mut guard = writer.scoped_target(OutputTarget::Document);
            guard.out(b"partial");
            Err(std::io::Error::other("sink failed"))
        }

        let mut writer = PdfWriter::new("1.7", 6);
        writer.begin_page();
        writer.set_target(OutputTarget::Page);
        assert!(failing(&mut writer).is_err());
        assert_eq!(writer.target(), OutputTarget::Page);
    }

    #[test]
    fn finish_writes_xref_and_trailer() {
        let mut writer = PdfWriter::new("1.7", 6);
        let root = writer.new_object();
        writer.write_object(&Object::Dictionary(dictionary! { "Type" => "Catalog" })).unwrap();
        writer.end_object();
        let bytes = writer.finish(root, None).unwrap();
        let text = std::string::String::from_utf8_lossy(&bytes).into_owned();

        assert!(text.starts_with("%PDF-1.7\n"));
        assert!(text.contains("xref\n0 2\n0000000000 65535 f \n"));
        assert!(text.contains("trailer\n<</Size 2/Root 1 0 R>>"));
        assert!(text.ends_with("%%EOF\n"));
    }
}
