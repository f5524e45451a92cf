//! Office document to PDF conversion service.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::document::{extension_of, Document};
use super::endpoint::ServiceEndpoint;
use super::ServiceClient;
use crate::config::ServiceDescriptor;
use crate::errors::{ServicesCloudError, ServicesCloudResult};
use crate::transport::{HttpTransport, MultipartPart};

/// File extensions accepted by the conversion service.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "bib", "doc", "xml", "docx", "fodt", "html", "ltx", "txt", "odt", "ott", "pdb", "psw",
    "rtf", "sdw", "stw", "sxw", "uot", "vor", "wps", "epub", "emf", "fodg", "met", "odd",
    "otg", "std", "svg", "svm", "swf", "sxd", "tiff", "xhtml", "xpm", "fodp", "potm",
    "pot", "pptx", "pps", "ppt", "pwp", "sda", "sdd", "sti", "sxi", "uop", "wmf", "csv",
    "dbf", "dif", "fods", "ods", "ots", "pxl", "sdc", "slk", "stc", "sxc", "uos", "xls",
    "xlt", "xlsx", "odg", "otp", "odp", "odf",
];

/// Client for the office2pdf service.
#[derive(Debug, Clone)]
pub struct Office2PdfClient {
    endpoint: ServiceEndpoint,
}

impl Office2PdfClient {
    /// Returns true if the service is known to accept files with this name's
    /// extension. Advisory only: [`convert`](Self::convert) sends any file.
    pub fn is_supported(filename: &str) -> bool {
        extension_of(filename)
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Converts an office document to PDF and returns the PDF bytes.
    #[instrument(skip(self, document), fields(filename = %document.filename, size = document.data.len()))]
    pub async fn convert(&self, document: Document) -> ServicesCloudResult<Vec<u8>> {
        if document.is_empty() {
            return Err(ServicesCloudError::validation("The document is empty"));
        }

        let part = MultipartPart::file(
            "file",
            document.filename,
            document.content_type,
            document.data,
        );
        let response = self.endpoint.post_multipart("convert", vec![part]).await?;

        Ok(response.body)
    }
}

#[async_trait]
impl ServiceClient for Office2PdfClient {
    const DESCRIPTOR: ServiceDescriptor = ServiceDescriptor::new("office2pdf", "v1");

    fn new(base_url: String, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint: ServiceEndpoint::new(base_url, transport),
        }
    }

    fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }

    fn transport(&self) -> &Arc<dyn HttpTransport> {
        self.endpoint.transport()
    }

    async fn check_service_health(&self) -> bool {
        self.endpoint.check_health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockResponse, MockTransport};

    fn client(mock: &Arc<MockTransport>) -> Office2PdfClient {
        Office2PdfClient::new("https://gw/office2pdf/v1/".to_string(), mock.clone())
    }

    #[test]
    fn test_is_supported() {
        assert!(Office2PdfClient::is_supported("report.DOCX"));
        assert!(Office2PdfClient::is_supported("sheet.xlsx"));
        assert!(!Office2PdfClient::is_supported("archive.zip"));
        assert!(!Office2PdfClient::is_supported("README"));
    }

    #[tokio::test]
    async fn test_convert_posts_file() {
        let mock = Arc::new(MockTransport::new());
        mock.queue(MockResponse::bytes(b"%PDF-1.7".to_vec(), "application/pdf"));

        let pdf = client(&mock)
            .convert(Document::new("letter.docx", b"PK..".to_vec()))
            .await
            .unwrap();

        assert_eq!(pdf, b"%PDF-1.7");
        let request = mock.last_request().unwrap();
        assert_eq!(request.url, "https://gw/office2pdf/v1/convert");
        assert_eq!(request.form_fields(), vec!["file"]);
    }

    #[tokio::test]
    async fn test_convert_rejects_empty_document_before_sending() {
        let mock = Arc::new(MockTransport::new());

        let empty = client(&mock).convert(Document::new("a.docx", vec![])).await;

        assert!(matches!(empty, Err(ServicesCloudError::Validation { .. })));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_convert_leaves_format_check_to_service() {
        let mock = Arc::new(MockTransport::new());
        mock.queue(MockResponse::error(415, "Unsupported file type"));
        mock.queue(MockResponse::bytes(b"%PDF-1.7".to_vec(), "application/pdf"));
        let client = client(&mock);

        let rejected = client.convert(Document::new("a.zip", vec![1])).await;
        let converted = client.convert(Document::new("README", b"notes".to_vec())).await;

        match rejected {
            Err(ServicesCloudError::Api { status, message }) => {
                assert_eq!(status, 415);
                assert_eq!(message, "Unsupported file type");
            }
            other => panic!("Expected API error, got {:?}", other),
        }
        assert_eq!(converted.unwrap(), b"%PDF-1.7");
        assert_eq!(mock.request_count(), 2);
    }
}
