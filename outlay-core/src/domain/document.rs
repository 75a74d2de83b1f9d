//! Document domain model

use serde::{Deserialize, Serialize};

/// Metadata for a stored document; the content lives behind the
/// download endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub id: String,
    pub file_name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

/// Client-side upload cap enforced before any request is made
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_wire_shape() {
        let json = r#"{"id": "d1", "fileName": "receipt.pdf", "size": 2048}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.file_name, "receipt.pdf");
        assert_eq!(doc.size, 2048);
        assert!(doc.upload_date.is_none());
    }
}
