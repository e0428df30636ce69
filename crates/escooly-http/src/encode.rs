//! Request body encoding.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::trace;

use escooly_core::error::{Error, InvalidInputError};
use escooly_core::{FilePart, FileSource, FormField, RequestBody};

/// A body ready to hand to reqwest.
pub(crate) enum EncodedBody {
    Json(Value),
    Multipart(Form),
}

/// Encode a body, switching to multipart when a form carries a file.
pub(crate) async fn encode(body: RequestBody) -> Result<EncodedBody, Error> {
    let is_multipart = body.is_multipart();
    match body {
        RequestBody::Form(fields) if is_multipart => {
            multipart(fields).await.map(EncodedBody::Multipart)
        }
        other => Ok(EncodedBody::Json(other.to_json().unwrap_or(Value::Null))),
    }
}

async fn multipart(fields: Vec<(String, FormField)>) -> Result<Form, Error> {
    let mut form = Form::new();
    for (name, field) in fields {
        form = match field {
            FormField::Text(text) => form.text(name, text),
            FormField::Binary(part) => {
                let part = file_part(&name, part).await?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

async fn file_part(name: &str, part: FilePart) -> Result<Part, Error> {
    let file_name = part.file_name_or_default().to_string();
    let mime_type = part.mime_type_or_default().to_string();

    let bytes = match part.source {
        FileSource::Bytes(bytes) => bytes,
        FileSource::Path(path) => tokio::fs::read(&path).await.map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: format!("cannot read '{}' for field '{}': {}", path.display(), name, e),
            })
        })?,
    };

    trace!(field = name, %file_name, %mime_type, size = bytes.len(), "file part");

    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(&mime_type)
        .map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: format!("invalid MIME type '{}' for field '{}': {}", mime_type, name, e),
            })
        })
}
