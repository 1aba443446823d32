//! Minimal `multipart/form-data` encoder.
//!
//! The validate endpoint takes its fields as a multipart form (the evidence
//! may be a file), and `ureq` only ships raw body sends — so the form body
//! is assembled here. Text fields and at most a handful of file parts; no
//! streaming, the whole body is built in memory like every other request we
//! make.

/// A multipart form body under construction.
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    /// Start a form with a boundary derived from the current time. The
    /// boundary only has to be absent from the payload; evidence text is
    /// short prose, so a timestamped marker is sufficient.
    pub fn new() -> Self {
        let stamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);
        Self {
            boundary: format!("attest-form-{stamp:x}"),
            body: Vec::new(),
        }
    }

    /// Append a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part();
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Append a file part with an `application/octet-stream` content type.
    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.open_part();
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Close the form and return `(content_type, body)` ready for sending.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        let content_type = format!("multipart/form-data; boundary={}", self.boundary);
        (content_type, self.body)
    }

    fn open_part(&mut self) {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fields_are_framed_by_the_boundary() {
        let (content_type, body) = MultipartForm::new()
            .text("checklist_id", "CTRL-7")
            .text("evidence_text", "We encrypt all data")
            .finish();

        let body = String::from_utf8(body).unwrap();
        let boundary = content_type
            .split("boundary=")
            .nth(1)
            .expect("content type carries the boundary");

        assert!(content_type.starts_with("multipart/form-data"));
        assert!(body.contains(&format!("--{boundary}\r\n")));
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
        assert!(body.contains("name=\"checklist_id\"\r\n\r\nCTRL-7\r\n"));
        assert!(body.contains("We encrypt all data"));
    }

    #[test]
    fn file_part_carries_filename_and_content_type() {
        let (_, body) = MultipartForm::new()
            .file("evidence_file", "audit.pdf", b"%PDF-1.4")
            .finish();

        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("filename=\"audit.pdf\""));
        assert!(body.contains("Content-Type: application/octet-stream"));
        assert!(body.contains("%PDF-1.4"));
    }
}
