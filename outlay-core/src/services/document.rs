//! Document service - list, upload, download, delete

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{Document, MAX_UPLOAD_BYTES};
use crate::gateway::{ApiGateway, ApiRequest};
use crate::ports::{FilePart, Method, RequestBody};

pub struct DocumentService {
    gateway: Arc<ApiGateway>,
}

impl DocumentService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub fn list(&self) -> Result<Vec<Document>> {
        self.gateway.get("/documents")?.envelope()
    }

    /// Upload a document as multipart form data. The 5 MB cap is checked
    /// before any request is made.
    pub fn upload(&self, file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<Document> {
        if bytes.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(Error::config("File size exceeds the 5MB limit"));
        }

        let request = ApiRequest {
            method: Method::Post,
            path: "/documents/upload".to_string(),
            query: Vec::new(),
            body: RequestBody::Multipart(FilePart {
                field: "file".to_string(),
                file_name: file_name.to_string(),
                mime_type: mime_type.to_string(),
                bytes,
            }),
        };

        self.gateway.send(request)?.envelope()
    }

    /// Download document content as raw bytes (no envelope)
    pub fn download(&self, id: &str) -> Result<Vec<u8>> {
        let response = self.gateway.get(format!("/documents/{}/download", id))?;
        Ok(response.body)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.gateway.delete(format!("/documents/{}", id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::ports::{HttpTransport, NullNotifier, TransportError, TransportRequest, TransportResponse};
    use std::time::Duration;

    struct NoDispatch;

    impl HttpTransport for NoDispatch {
        fn execute(
            &self,
            request: &TransportRequest,
        ) -> std::result::Result<TransportResponse, TransportError> {
            panic!("no request expected, got {}", request.url);
        }
    }

    #[test]
    fn test_oversized_upload_rejected_before_dispatch() {
        let gateway = ApiGateway::new(
            vec!["http://a".to_string()],
            Duration::from_secs(5),
            Arc::new(NoDispatch),
            Arc::new(MemoryStore::new()),
            Arc::new(NullNotifier),
        )
        .unwrap();
        let service = DocumentService::new(Arc::new(gateway));

        let too_big = vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize];
        let err = service.upload("big.bin", "application/octet-stream", too_big);
        assert!(matches!(err, Err(Error::Config(_))));
    }
}
