//! Audit records for produced documents

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::types::ResolvedDocument;

/// A fully resolved document as it was handed to the export sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub id: String,
    /// Creation time in Unix milliseconds
    pub ts: i64,
    #[serde(flatten)]
    pub document: ResolvedDocument,
    /// SHA-256 over the resolved fields, see [`hash_document`]
    #[serde(default)]
    pub content_hash: String,
}

impl ExportRecord {
    /// Create a new record for `document`
    pub fn new(document: ResolvedDocument) -> Self {
        let content_hash = hash_document(&document);
        Self {
            id: Uuid::new_v4().to_string(),
            ts: Utc::now().timestamp_millis(),
            document,
            content_hash,
        }
    }

    /// Check that the stored hash still matches the resolved fields.
    ///
    /// Records written before hashing existed carry an empty hash and are
    /// reported as unverifiable rather than tampered.
    pub fn verify(&self) -> Result<(), String> {
        if self.content_hash.is_empty() {
            return Err(format!("Record {} has no content hash", self.id));
        }
        let actual = hash_document(&self.document);
        if actual != self.content_hash {
            return Err(format!(
                "Record {} was modified: expected {}, got {}",
                self.id, self.content_hash, actual
            ));
        }
        Ok(())
    }
}

/// Compute the SHA-256 hex digest of a resolved document.
///
/// Each field is length-prefixed so that moving text between fields
/// changes the digest.
pub fn hash_document(document: &ResolvedDocument) -> String {
    let mut hasher = Sha256::new();
    for field in document.fields() {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResolvedDocument {
        ResolvedDocument {
            title: "Termo de Mudança".to_string(),
            body: "Eu, Maria, declaro...".to_string(),
            signer1: "Maria".to_string(),
            signer2: "Síndico".to_string(),
        }
    }

    #[test]
    fn test_new_record_verifies() {
        let record = ExportRecord::new(sample());
        assert!(record.verify().is_ok());
        assert_eq!(record.content_hash.len(), 64);
    }

    #[test]
    fn test_tamper_detection() {
        let mut record = ExportRecord::new(sample());
        record.document.body = "Eu, Mallory, declaro...".to_string();
        assert!(record.verify().is_err());
    }

    #[test]
    fn test_legacy_record_without_hash() {
        let json = r#"{"id":"x","ts":1,"title":"T","body":"B","signer1":"","signer2":""}"#;
        let record: ExportRecord = serde_json::from_str(json).unwrap();
        assert!(record.content_hash.is_empty());
        assert!(record.verify().is_err());
    }

    #[test]
    fn test_field_boundaries_affect_hash() {
        let a = ResolvedDocument {
            title: "ab".to_string(),
            body: "c".to_string(),
            ..Default::default()
        };
        let b = ResolvedDocument {
            title: "a".to_string(),
            body: "bc".to_string(),
            ..Default::default()
        };
        assert_ne!(hash_document(&a), hash_document(&b));
    }
}
