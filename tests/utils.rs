use flate2::read::ZlibDecoder;
use std::io::Read;

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Lossy text view of PDF output, good enough for matching ASCII syntax.
#[allow(dead_code)]
pub fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[allow(dead_code)]
pub fn inflate(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut output).expect("valid zlib stream");
    output
}

/// Payload of the first stream that follows `marker` in `pdf`.
#[allow(dead_code)]
pub fn stream_after<'a>(pdf: &'a [u8], marker: &[u8]) -> &'a [u8] {
    let start = find(pdf, marker).expect("marker present");
    let body = start + find(&pdf[start..], b"\nstream\n").expect("stream keyword") + b"\nstream\n".len();
    let end = body + find(&pdf[body..], b"\nendstream").expect("endstream keyword");
    &pdf[body..end]
}

#[allow(dead_code)]
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
