//! Files sent to the services.

/// A file uploaded as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name sent with the part.
    pub filename: String,
    /// MIME type sent with the part.
    pub content_type: String,
    /// File content.
    pub data: Vec<u8>,
}

impl Document {
    /// Creates a document, guessing the content type from the file extension.
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = content_type_for(&filename);
        Self {
            filename,
            content_type,
            data,
        }
    }

    /// Creates a PDF document.
    pub fn pdf(data: Vec<u8>) -> Self {
        Self::new("document.pdf", data)
    }

    /// Overrides the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Returns the lowercase file extension, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.filename)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub(crate) fn extension_of(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn content_type_for(filename: &str) -> String {
    match extension_of(filename).as_deref() {
        Some("pdf") => mime::APPLICATION_PDF.to_string(),
        Some("png") => mime::IMAGE_PNG.to_string(),
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG.to_string(),
        Some("gif") => mime::IMAGE_GIF.to_string(),
        Some("webp") => "image/webp".to_string(),
        Some("txt") => mime::TEXT_PLAIN.to_string(),
        Some("csv") => mime::TEXT_CSV.to_string(),
        Some("html" | "htm") => mime::TEXT_HTML.to_string(),
        _ => mime::APPLICATION_OCTET_STREAM.to_string(),
    }
}

/// Image output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// WebP.
    #[default]
    Webp,
    /// PNG.
    Png,
    /// JPEG.
    Jpeg,
}

impl ImageFormat {
    /// Value sent to the services.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Webp => "webp",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }

    /// MIME type of the format.
    pub fn mime_type(&self) -> String {
        match self {
            ImageFormat::Webp => "image/webp".to_string(),
            ImageFormat::Png => mime::IMAGE_PNG.to_string(),
            ImageFormat::Jpeg => mime::IMAGE_JPEG.to_string(),
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_guess() {
        assert_eq!(Document::new("a.PDF", vec![]).content_type, "application/pdf");
        assert_eq!(Document::new("b.jpg", vec![]).content_type, "image/jpeg");
        assert_eq!(Document::new("c.webp", vec![]).content_type, "image/webp");
        assert_eq!(
            Document::new("d.docx", vec![]).content_type,
            "application/octet-stream"
        );
        assert_eq!(Document::new("noext", vec![]).extension(), None);
    }

    #[test]
    fn test_with_content_type() {
        let doc = Document::new("report.docx", vec![1, 2])
            .with_content_type("application/vnd.openxmlformats-officedocument.wordprocessingml.document");
        assert!(doc.content_type.contains("wordprocessingml"));
        assert_eq!(doc.extension().as_deref(), Some("docx"));
    }
}
