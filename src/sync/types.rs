//! # Sync Data Model
//!
//! Records as served by the database, and the transient shapes exchanged with
//! the recognizer. Field names follow the JSON contracts of both collaborators.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Opaque record identifier, passed through verbatim between collaborators
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unprocessed image awaiting transcription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Id")]
    pub id: RecordId,

    /// Annotation document; its structure is owned by the database
    #[serde(rename = "PiFF", default)]
    pub piff: Value,

    /// Image location, absolute or relative to the file server
    #[serde(rename = "Url")]
    pub url: String,

    #[serde(rename = "Filename", default)]
    pub filename: String,

    #[serde(rename = "Annotated", default)]
    pub annotated: bool,

    #[serde(rename = "Corrected", default)]
    pub corrected: bool,

    #[serde(rename = "SentToReco", default)]
    pub sent_to_reco: bool,

    #[serde(rename = "Unreadable", default)]
    pub unreadable: bool,

    #[serde(rename = "Annotator", default)]
    pub annotator: String,
}

impl Record {
    /// Minimal record with unset flags
    pub fn new(id: impl Into<RecordId>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            piff: Value::Null,
            url: url.into(),
            filename: String::new(),
            annotated: false,
            corrected: false,
            sent_to_reco: false,
            unreadable: false,
            annotator: String::new(),
        }
    }
}

/// A bounded page of records, at most `page_size` long
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    records: Vec<Record>,
    page_size: usize,
}

impl Batch {
    pub fn new(records: Vec<Record>, page_size: usize) -> Self {
        Self { records, page_size }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// A full page means more records may remain; anything shorter means the
    /// source is drained.
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.page_size
    }
}

/// One image to recognize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionItem {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Url")]
    pub url: String,
}

/// Ordered request sent to the recognizer, one item per batch record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecognitionRequest {
    pub items: Vec<RecognitionItem>,
}

impl RecognitionRequest {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.items.iter().map(|item| &item.id)
    }
}

/// A transcription suggested by the recognizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Value")]
    pub value: String,
}

impl Transcription {
    pub fn new(id: impl Into<RecordId>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Transcriptions returned for a request; order need not match the request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecognitionResult {
    pub transcriptions: Vec<Transcription>,
}

impl RecognitionResult {
    pub fn len(&self) -> usize {
        self.transcriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcriptions.is_empty()
    }

    pub fn ids(&self) -> HashSet<&RecordId> {
        self.transcriptions.iter().map(|t| &t.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_decodes_database_shape() {
        let payload = json!({
            "Id": "AAECAw==",
            "PiFF": {"Meta": {"Type": "line", "URL": ""}, "Location": [], "Data": []},
            "Url": "/images/line_1.png",
            "Filename": "line_1.png",
            "Annotated": false,
            "Corrected": false,
            "SentToReco": true,
            "Unreadable": false,
            "Annotator": ""
        });

        let record: Record = serde_json::from_value(payload).unwrap();
        assert_eq!(record.id.as_str(), "AAECAw==");
        assert_eq!(record.url, "/images/line_1.png");
        assert!(record.sent_to_reco);
        assert_eq!(record.piff["Meta"]["Type"], "line");
    }

    #[test]
    fn test_record_tolerates_missing_optional_fields() {
        let record: Record =
            serde_json::from_value(json!({"Id": "x", "Url": "/a.png"})).unwrap();
        assert_eq!(record, Record::new("x", "/a.png"));
    }

    #[test]
    fn test_record_requires_id_and_url() {
        assert!(serde_json::from_value::<Record>(json!({"Url": "/a.png"})).is_err());
        assert!(serde_json::from_value::<Record>(json!({"Id": "x"})).is_err());
    }

    #[test]
    fn test_batch_fullness() {
        let full = Batch::new(vec![Record::new("a", "/a"), Record::new("b", "/b")], 2);
        let partial = Batch::new(vec![Record::new("a", "/a")], 2);
        let empty = Batch::new(Vec::new(), 2);

        assert!(full.is_full());
        assert!(!partial.is_full());
        assert!(!empty.is_full());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_request_serializes_as_plain_array() {
        let request = RecognitionRequest {
            items: vec![RecognitionItem {
                id: RecordId::from("a"),
                url: "https://files/a.png".to_string(),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!([{"Id": "a", "Url": "https://files/a.png"}]));
    }

    #[test]
    fn test_result_decodes_plain_array() {
        let result: RecognitionResult =
            serde_json::from_value(json!([{"Id": "b", "Value": "hello"}, {"Id": "a", "Value": "world"}]))
                .unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.ids().contains(&RecordId::from("a")));
    }
}
