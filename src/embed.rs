use log::{debug, trace};

use crate::filters;
use crate::writer::{OutputTarget, PdfWriter};
use crate::{Attachment, Dictionary, Object, ObjectId, Result, Stream, StringFormat, dictionary};

impl PdfWriter {
    /// Embed `attachment` as an `/EmbeddedFile` stream followed by its `/Filespec`.
    ///
    /// Returns the object number of the file specification, which is the number every
    /// name tree, `/AF` array and annotation must refer to. An attachment that already
    /// carries an object number is left untouched and its number returned.
    ///
    /// Both objects always go to the main object sequence, whatever the current
    /// output target; the target is restored before returning.
    pub fn embed(&mut self, attachment: &Attachment) -> Result<u32> {
        if let Some(number) = attachment.object_number() {
            trace!("{} is already embedded as object {}", attachment.filename, number);
            return Ok(number);
        }

        let mut writer = self.scoped_target(OutputTarget::Document);
        let stream_id = writer.write_embedded_file(attachment)?;

        let filespec_id = writer.new_object();
        writer.write_object(&Object::Dictionary(filespec(attachment, stream_id)))?;
        writer.end_object();

        attachment.set_object_number(filespec_id.0);
        debug!(
            "embedded {} ({} bytes) as stream {} with filespec {}",
            attachment.filename,
            attachment.content().len(),
            stream_id.0,
            filespec_id.0
        );
        Ok(filespec_id.0)
    }

    fn write_embedded_file(&mut self, attachment: &Attachment) -> Result<ObjectId> {
        let content = attachment.content();
        let compressed = filters::compress(content, self.compression_level())?;

        let mut params = dictionary! {
            "CheckSum" => Object::String(filters::digest(content).to_vec(), StringFormat::Hexadecimal),
            "Size" => content.len(),
        };
        if let Some(date) = attachment.modification_time {
            params.set("ModDate", date);
        }

        let mut dict = dictionary! { "Type" => "EmbeddedFile" };
        if !attachment.mimetype.is_empty() {
            dict.set("Subtype", attachment.mimetype.as_str());
        }
        dict.set("Filter", "FlateDecode");
        dict.set("Params", params);

        let id = self.new_object();
        self.write_object(&Object::Stream(Stream::new(dict, compressed)))?;
        self.end_object();
        Ok(id)
    }
}

fn filespec(attachment: &Attachment, stream_id: ObjectId) -> Dictionary {
    let mut dict = dictionary! {
        "Type" => "Filespec",
        "F" => Object::string_literal(""),
        "UF" => Object::text_string(&attachment.filename),
        "EF" => dictionary! { "F" => stream_id },
    };
    if let Some(relationship) = attachment.relationship.as_name() {
        dict.set("AFRelationship", relationship);
    }
    dict.set("Desc", Object::text_string(&attachment.description));
    dict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModDate, Relationship};
    use chrono::prelude::*;

    fn body(writer: &PdfWriter) -> String {
        String::from_utf8_lossy(writer.body()).into_owned()
    }

    #[test]
    fn embedded_file_dictionary() {
        let date = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let attachment = Attachment::new("logo.png", b"hello world".to_vec())
            .with_mimetype("image/png")
            .with_modification_time(date);
        let mut writer = PdfWriter::new("1.7", 6);
        assert_eq!(writer.embed(&attachment).unwrap(), 2);

        let body = body(&writer);
        assert!(body.contains("1 0 obj\n<</Type/EmbeddedFile/Subtype/image#2Fpng/Filter/FlateDecode"));
        assert!(
            body.contains("/Params<</CheckSum<5eb63bbbe01eeed093cb22bb8f5acdc3>/Size 11/ModDate(D:20200102030405)>>")
        );
        assert!(body.contains("\nendstream\nendobj\n2 0 obj\n<</Type/Filespec/F()/UF(\u{FFFD}"));
        assert!(body.contains("/EF<</F 1 0 R>>"));
    }

    #[test]
    fn optional_entries_are_omitted() {
        let attachment = Attachment::new("raw", Vec::new());
        let mut writer = PdfWriter::new("1.7", 6);
        writer.embed(&attachment).unwrap();

        let body = body(&writer);
        assert!(!body.contains("/Subtype"));
        assert!(!body.contains("/ModDate"));
        assert!(!body.contains("/AFRelationship"));
        assert!(body.contains("/Size 0"));
    }

    #[test]
    fn relationship_is_written_on_the_filespec() {
        let attachment = Attachment::new("data.xml", b"<a/>".to_vec()).with_relationship(Relationship::Data);
        let mut writer = PdfWriter::new("1.7", 6);
        writer.embed(&attachment).unwrap();
        assert!(body(&writer).contains("/AFRelationship/Data/Desc("));
    }

    #[test]
    fn length_is_the_compressed_length() {
        let content = b"abc".repeat(500);
        let attachment = Attachment::new("abc.txt", content.clone());
        let mut writer = PdfWriter::new("1.7", 6);
        writer.embed(&attachment).unwrap();

        let compressed_len = filters::compress(&content, 6).unwrap().len();
        assert!(body(&writer).contains(&format!("/Length {}", compressed_len)));
        assert!(body(&writer).contains("/Size 1500"));
    }

    #[test]
    fn second_embed_is_a_no_op() {
        let attachment = Attachment::new("once.txt", b"once".to_vec());
        let mut writer = PdfWriter::new("1.7", 6);
        let first = writer.embed(&attachment).unwrap();
        let written = writer.body().len();

        assert_eq!(writer.embed(&attachment).unwrap(), first);
        assert_eq!(writer.body().len(), written);
        assert_eq!(writer.max_id(), 2);
    }

    #[test]
    fn embedding_mid_page_leaves_page_content_alone() {
        let attachment = Attachment::new("page.txt", b"page".to_vec());
        let mut writer = PdfWriter::new("1.7", 6);
        let page = writer.begin_page();
        writer.set_target(OutputTarget::Page);
        writer.out(b"BT ");

        writer.embed(&attachment).unwrap();
        writer.out(b"ET");

        assert_eq!(writer.target(), OutputTarget::Page);
        assert_eq!(writer.page_content(page), Some(&b"BT ET"[..]));
        assert!(body(&writer).contains("/Type/Filespec"));
    }

    #[test]
    fn mod_date_uses_utc() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let date: ModDate = offset.with_ymd_and_hms(2022, 6, 30, 22, 0, 0).unwrap().into();
        let attachment = Attachment::new("late.txt", b"x".to_vec()).with_modification_time(date);
        let mut writer = PdfWriter::new("1.7", 6);
        writer.embed(&attachment).unwrap();
        assert!(body(&writer).contains("/ModDate(D:20220701030000)"));
    }
}
