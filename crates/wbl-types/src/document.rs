use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// JSON document shape shared by waybills and master waybills.
///
/// Every field is optional on decode; unknown fields are ignored. The record
/// store never looks at this shape, it is only consulted when document
/// validation is switched on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WayBillDocument {
    #[serde(rename = "wayBillID")]
    pub way_bill_id: String,
    pub created_date: String,
    pub last_modified_date: String,
    pub status: String,
    pub created_by: String,
    pub pending_with: String,
    pub palettes: Vec<String>,
}

impl WayBillDocument {
    /// Decode a document from raw JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, TypeError> {
        serde_json::from_slice(bytes).map_err(|e| TypeError::MalformedDocument(e.to_string()))
    }

    /// The identifier embedded in the document, if one was given.
    pub fn embedded_id(&self) -> Option<&str> {
        if self.way_bill_id.is_empty() {
            None
        } else {
            Some(&self.way_bill_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_document() {
        let json = br#"{
            "wayBillID": "123456",
            "createdDate": "2016-10-09",
            "lastModifiedDate": "2016-10-10",
            "status": "CREATED",
            "createdBy": "shipper",
            "pendingWith": "carrier",
            "palettes": ["p1", "p2"]
        }"#;
        let doc = WayBillDocument::from_json(json).unwrap();
        assert_eq!(doc.embedded_id(), Some("123456"));
        assert_eq!(doc.pending_with, "carrier");
        assert_eq!(doc.palettes, vec!["p1", "p2"]);
    }

    #[test]
    fn missing_fields_default() {
        let doc = WayBillDocument::from_json(br#"{"status":"NEW","extra":1}"#).unwrap();
        assert_eq!(doc.embedded_id(), None);
        assert_eq!(doc.status, "NEW");
        assert!(doc.palettes.is_empty());
    }

    #[test]
    fn non_json_is_malformed() {
        let err = WayBillDocument::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, TypeError::MalformedDocument(_)));
    }
}
