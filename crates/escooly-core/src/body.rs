//! Request body model.
//!
//! Callers say up front whether a form field is text or a file. The HTTP
//! layer switches to multipart encoding when, and only when, a form holds at
//! least one [`FormField::Binary`].

use std::path::PathBuf;

use serde_json::{Map, Value};

/// Default MIME type for file parts that do not declare one.
pub const DEFAULT_FILE_TYPE: &str = "application/octet-stream";

/// Default file name for file parts that do not declare one.
pub const DEFAULT_FILE_NAME: &str = "file";

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/json`.
    Json(Value),
    /// Named fields; multipart if any field is binary, JSON otherwise.
    Form(Vec<(String, FormField)>),
}

impl RequestBody {
    /// Start an empty form.
    pub fn form() -> Self {
        RequestBody::Form(Vec::new())
    }

    /// Append a text field. No-op on a JSON body.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let RequestBody::Form(fields) = &mut self {
            fields.push((name.into(), FormField::Text(value.into())));
        }
        self
    }

    /// Append a file field. No-op on a JSON body.
    pub fn file(mut self, name: impl Into<String>, part: FilePart) -> Self {
        if let RequestBody::Form(fields) = &mut self {
            fields.push((name.into(), FormField::Binary(part)));
        }
        self
    }

    /// True if this body must be sent as multipart form data.
    pub fn is_multipart(&self) -> bool {
        match self {
            RequestBody::Json(_) => false,
            RequestBody::Form(fields) => fields
                .iter()
                .any(|(_, field)| matches!(field, FormField::Binary(_))),
        }
    }

    /// JSON rendering of a body that has no binary fields.
    ///
    /// Returns `None` for multipart bodies.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            RequestBody::Json(value) => Some(value.clone()),
            RequestBody::Form(_) if self.is_multipart() => None,
            RequestBody::Form(fields) => {
                let map: Map<String, Value> = fields
                    .iter()
                    .filter_map(|(name, field)| match field {
                        FormField::Text(text) => Some((name.clone(), Value::String(text.clone()))),
                        FormField::Binary(_) => None,
                    })
                    .collect();
                Some(Value::Object(map))
            }
        }
    }
}

/// One form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text(String),
    Binary(FilePart),
}

/// A file attached to a form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub source: FileSource,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
}

/// Where the bytes of a [`FilePart`] come from.
#[derive(Debug, Clone, PartialEq)]
pub enum FileSource {
    /// Read from disk when the request is sent.
    Path(PathBuf),
    /// Already in memory.
    Bytes(Vec<u8>),
}

impl FilePart {
    /// A part backed by a file on disk; the file name defaults to the path's.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string);
        Self {
            source: FileSource::Path(path),
            mime_type: None,
            file_name,
        }
    }

    /// A part backed by in-memory bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: FileSource::Bytes(bytes.into()),
            mime_type: None,
            file_name: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// MIME type to send, defaulting to `application/octet-stream`.
    pub fn mime_type_or_default(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(DEFAULT_FILE_TYPE)
    }

    /// File name to send, defaulting to `file`.
    pub fn file_name_or_default(&self) -> &str {
        self.file_name.as_deref().unwrap_or(DEFAULT_FILE_NAME)
    }
}
