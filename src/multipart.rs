//! `multipart/form-data` body encoding.
//!
//! Fields are written in the order they are added, each prefixed by the
//! form's boundary. The encoding is byte-for-byte fixed: text parts always
//! carry `text/plain; charset=ISO-8859-1` and `8bit` transfer encoding, and
//! binary parts are typed by [`mime_type_for`], a first-byte sniff.
//!
//! # Example
//!
//! ```
//! use courier::MultipartForm;
//!
//! let mut form = MultipartForm::new();
//! form.add_text_field("caption", "sunset");
//! form.add_data_field("photo", &[0xFF, 0xD8, 0xFF, 0xE0]);
//!
//! let boundary = form.boundary().to_string();
//! let body = form.into_body();
//! assert!(body.ends_with(format!("--{boundary}--").as_bytes()));
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

const OCTET_STREAM: &str = "application/octet-stream";

/// First-byte signatures used to type binary parts.
const MIME_SIGNATURES: &[(u8, &str)] = &[
    (0xFF, "image/jpeg"),
    (0x89, "image/png"),
    (0x47, "image/gif"),
    (0x49, "image/tiff"),
    (0x4D, "image/tiff"),
    (0x25, "application/pdf"),
    (0xD0, "application/vnd"),
    (0x46, "text/plain"),
];

/// Guesses a MIME type from the first byte of `data`.
///
/// This is a coarse heuristic, not a file-type detector: only one byte is
/// inspected. Anything unrecognized, including an empty payload, is
/// `application/octet-stream`.
#[must_use]
pub fn mime_type_for(data: &[u8]) -> &'static str {
    let Some(first) = data.first() else {
        return OCTET_STREAM;
    };

    MIME_SIGNATURES
        .iter()
        .find(|(signature, _)| signature == first)
        .map_or(OCTET_STREAM, |(_, mime)| *mime)
}

/// An in-progress `multipart/form-data` body.
///
/// The boundary is a random UUID chosen when the form is created and shared
/// by every field. Call [`into_body`](Self::into_body) once all fields are
/// added to append the closing delimiter.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    body: BytesMut,
    field_count: usize,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(Uuid::new_v4().to_string().to_uppercase())
    }

    /// Creates a form with a caller-chosen boundary.
    ///
    /// The boundary must not occur inside any field value.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: BytesMut::new(),
            field_count: 0,
        }
    }

    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Number of fields added so far.
    #[must_use]
    pub const fn field_count(&self) -> usize {
        self.field_count
    }

    /// Appends a text part.
    pub fn add_text_field(&mut self, name: &str, value: &str) {
        self.put_delimiter();
        self.put_line(&format!("Content-Disposition: form-data; name=\"{name}\""));
        self.put_line("Content-Type: text/plain; charset=ISO-8859-1");
        self.put_line("Content-Transfer-Encoding: 8bit");
        self.put_line("");
        self.put_line(value);
        self.field_count += 1;
    }

    /// Appends a binary part. `name` doubles as the part's filename.
    pub fn add_data_field(&mut self, name: &str, data: &[u8]) {
        self.put_delimiter();
        self.put_line(&format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}\""
        ));
        self.put_line(&format!("Content-Type: {}", mime_type_for(data)));
        self.put_line("");
        self.body.put_slice(data);
        self.body.put_slice(b"\r\n");
        self.field_count += 1;
    }

    /// Finishes the form, appending `--<boundary>--` with no trailing line break.
    #[must_use]
    pub fn into_body(mut self) -> Bytes {
        self.body.put_slice(b"--");
        self.body.put_slice(self.boundary.as_bytes());
        self.body.put_slice(b"--");
        self.body.freeze()
    }

    fn put_delimiter(&mut self) {
        let line = format!("--{}", self.boundary);
        self.put_line(&line);
    }

    fn put_line(&mut self, line: &str) {
        self.body.put_slice(line.as_bytes());
        self.body.put_slice(b"\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_signatures() {
        assert_eq!(mime_type_for(&[0xFF, 0xD8]), "image/jpeg");
        assert_eq!(mime_type_for(&[0x89, b'P', b'N', b'G']), "image/png");
        assert_eq!(mime_type_for(b"GIF89a"), "image/gif");
        assert_eq!(mime_type_for(b"II*\0"), "image/tiff");
        assert_eq!(mime_type_for(b"MM\0*"), "image/tiff");
        assert_eq!(mime_type_for(b"%PDF-1.7"), "application/pdf");
        assert_eq!(mime_type_for(&[0xD0, 0xCF, 0x11, 0xE0]), "application/vnd");
        assert_eq!(mime_type_for(b"F"), "text/plain");
    }

    #[test]
    fn test_mime_type_defaults_to_octet_stream() {
        assert_eq!(mime_type_for(&[0x00]), "application/octet-stream");
        assert_eq!(mime_type_for(b"{\"json\":true}"), "application/octet-stream");
        assert_eq!(mime_type_for(&[]), "application/octet-stream");
    }

    #[test]
    fn test_mime_type_only_inspects_first_byte() {
        // "Fancy" starts with 'F' (0x46) and nothing else matters
        assert_eq!(mime_type_for(b"Fancy binary blob"), "text/plain");
    }

    #[test]
    fn test_text_field_bytes() {
        let mut form = MultipartForm::with_boundary("XYZ");
        form.add_text_field("title", "hello");
        let body = form.into_body();
        assert_eq!(
            &body[..],
            b"--XYZ\r\n\
              Content-Disposition: form-data; name=\"title\"\r\n\
              Content-Type: text/plain; charset=ISO-8859-1\r\n\
              Content-Transfer-Encoding: 8bit\r\n\
              \r\n\
              hello\r\n\
              --XYZ--"
        );
    }

    #[test]
    fn test_data_field_bytes() {
        let mut form = MultipartForm::with_boundary("XYZ");
        form.add_data_field("avatar", &[0x89, 0x01, 0x02]);
        let body = form.into_body();

        let mut expected = Vec::new();
        expected.extend_from_slice(
            b"--XYZ\r\n\
              Content-Disposition: form-data; name=\"avatar\"; filename=\"avatar\"\r\n\
              Content-Type: image/png\r\n\
              \r\n",
        );
        expected.extend_from_slice(&[0x89, 0x01, 0x02]);
        expected.extend_from_slice(b"\r\n--XYZ--");
        assert_eq!(&body[..], &expected[..]);
    }

    #[test]
    fn test_empty_form_is_only_closing_delimiter() {
        let form = MultipartForm::with_boundary("B");
        assert_eq!(&form.into_body()[..], b"--B--");
    }

    #[test]
    fn test_fields_keep_insertion_order() {
        let mut form = MultipartForm::with_boundary("B");
        form.add_text_field("a", "1");
        form.add_data_field("b", &[0x00]);
        form.add_text_field("c", "3");
        assert_eq!(form.field_count(), 3);

        let body = String::from_utf8_lossy(&form.into_body()).into_owned();
        let a = body.find("name=\"a\"").unwrap();
        let b = body.find("name=\"b\"").unwrap();
        let c = body.find("name=\"c\"").unwrap();
        assert!(a < b && b < c);
        assert!(body.ends_with("--B--"));
        assert!(!body.ends_with("\r\n"));
    }

    #[test]
    fn test_boundary_is_random_uuid_per_form() {
        let first = MultipartForm::new();
        let second = MultipartForm::new();
        assert_ne!(first.boundary(), second.boundary());
        assert!(Uuid::parse_str(first.boundary()).is_ok());
    }

    #[test]
    fn test_boundary_stable_across_fields() {
        let mut form = MultipartForm::new();
        let boundary = form.boundary().to_string();
        form.add_text_field("a", "x");
        form.add_text_field("b", "y");
        let body = String::from_utf8(form.into_body().to_vec()).unwrap();
        assert_eq!(body.matches(&format!("--{boundary}\r\n")).count(), 2);
        assert!(body.ends_with(&format!("--{boundary}--")));
    }

    #[test]
    fn test_content_type() {
        let form = MultipartForm::with_boundary("abc");
        assert_eq!(form.content_type(), "multipart/form-data; boundary=abc");
    }
}
