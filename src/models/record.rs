//! Import record model
//!
//! Represents a single exported HTTP request/response pair, one CSV row.

/// Request half of an exported row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestRecord {
    /// Host name
    pub host: String,
    /// HTTP method, stored as exported (no normalisation)
    pub method: String,
    /// Request path
    pub path: String,
    /// Declared body length
    pub length: i64,
    /// Port number
    pub port: i64,
    /// Raw request bytes
    pub raw: Vec<u8>,
    /// Whether the request went over TLS
    pub is_tls: bool,
    /// Query string without the leading `?`
    pub query: String,
    /// File extensions column. Parsed, never written to the project.
    pub file_extensions: String,
    /// How the request was altered before storage
    pub alteration: String,
    /// Whether the request was edited
    pub edited: bool,
    /// Request this one was copied from, if any
    pub parent_id: Option<i64>,
    /// Creation timestamp
    pub created_at: i64,
}

/// Response half of an exported row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseRecord {
    /// Identifier in the exporting project. Parsed, never written.
    pub id: Option<i64>,
    /// HTTP status code
    pub status_code: i64,
    /// Raw response bytes
    pub raw: Vec<u8>,
    /// Declared body length
    pub length: i64,
    /// How the response was altered before storage
    pub alteration: String,
    /// Whether the response was edited
    pub edited: bool,
    /// Response this one was copied from, if any
    pub parent_id: Option<i64>,
    /// Creation timestamp
    pub created_at: i64,
}

/// One exported request together with the response it produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRecord {
    /// Identifier in the exporting project. Parsed, never written.
    pub id: i64,
    /// Provenance tag shared by the request and response raw rows
    pub source: String,
    pub request: RequestRecord,
    pub response: ResponseRecord,
}

impl ImportRecord {
    /// Host of the request, used to label log lines
    pub fn host(&self) -> &str {
        &self.request.host
    }
}

/// Identifiers generated while importing one record, in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportedIds {
    pub raw_response_id: i64,
    pub response_id: i64,
    pub raw_request_id: i64,
    pub metadata_id: i64,
    pub request_id: i64,
    pub intercept_id: i64,
}
