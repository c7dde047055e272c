/// Encode `text` as a PDF text string: UTF-16BE preceded by the `FE FF` byte order mark.
pub fn text_string(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 + text.len() * 2);
    bytes.extend_from_slice(&[0xFE, 0xFF]);
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    bytes
}

#[test]
fn text_string_has_bom_and_big_endian_units() {
    assert_eq!(text_string("Az"), vec![0xFE, 0xFF, 0x00, 0x41, 0x00, 0x7A]);
    assert_eq!(text_string(""), vec![0xFE, 0xFF]);
}

#[test]
fn text_string_encodes_surrogate_pairs() {
    // U+1F4CE PAPERCLIP
    assert_eq!(text_string("📎"), vec![0xFE, 0xFF, 0xD8, 0x3D, 0xDC, 0xCE]);
}
