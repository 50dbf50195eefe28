//! Response bodies returned by the extraction backend.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier assigned by `/upload`. The backend may send it as a string or
/// an integer; either way it is used verbatim in the `/process` path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Ok(DocumentId(s)),
            RawId::Number(n) => Ok(DocumentId(n.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub document_id: DocumentId,
}

/// Body of `/process/{id}`. Field entries stay as raw JSON until a check
/// looks them up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

/// One extracted data point with its provenance metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub source_snippet: String,
    #[serde(default)]
    pub exact_source_text: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default = "default_extraction_type")]
    pub extraction_type: String,
}

fn default_extraction_type() -> String {
    "unknown".to_string()
}

impl ExtractedField {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}
