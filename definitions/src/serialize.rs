//! RON encoding of definition documents.
//!
//! Reading and writing files is left to the caller; this module only turns
//! a [`DocumentFile`] into text and back. Sibling order is kept as written.

use serde::{Deserialize, Serialize};

use crate::definition::Definition;
use crate::error::StoreError;

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

/// Errors raised while encoding, decoding or loading a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to encode document: {0}")]
    Encode(#[from] ron::Error),
    #[error("failed to decode document: {0}")]
    Decode(#[from] ron::error::SpannedError),
    #[error("unsupported document version {found}")]
    UnsupportedVersion { found: u32 },
    #[error("invalid document: {0}")]
    Invalid(#[from] StoreError),
}

/// On-disk shape of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub version: u32,
    /// Root-level definitions in display order.
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

impl DocumentFile {
    pub fn new(definitions: Vec<Definition>) -> Self {
        Self {
            version: FORMAT_VERSION,
            definitions,
        }
    }
}

/// Encodes any serializable value as pretty RON.
pub fn encode<T: Serialize>(value: &T) -> Result<String, DocumentError> {
    Ok(ron::ser::to_string_pretty(
        value,
        ron::ser::PrettyConfig::default(),
    )?)
}

/// Decodes a value from RON text.
pub fn decode<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, DocumentError> {
    Ok(ron::from_str(text)?)
}

/// Encodes a document.
pub fn encode_document(file: &DocumentFile) -> Result<String, DocumentError> {
    encode(file)
}

/// Decodes a document, rejecting versions newer than this build.
pub fn decode_document(text: &str) -> Result<DocumentFile, DocumentError> {
    let file: DocumentFile = decode(text)?;
    if file.version > FORMAT_VERSION {
        return Err(DocumentError::UnsupportedVersion {
            found: file.version,
        });
    }
    Ok(file)
}
