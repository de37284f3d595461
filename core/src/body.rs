//! Request body serialization: a JSON text body, or a multipart form when
//! files are attached.

use serde::Serialize;

use crate::error::Error;
use crate::http::Attachment;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Name of the multipart field carrying the serialized message.
pub const MESSAGE_FIELD: &str = "body";

/// Serialize a message to JSON text. `None` stays `None`.
pub fn serialize_obj<M: Serialize>(message: Option<&M>) -> Result<Option<String>, Error> {
    message
        .map(|m| serde_json::to_string(m).map_err(Error::Serialization))
        .transpose()
}

/// A serialized request body, independent of the transport sending it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// JSON text, or no body at all when the message was absent.
    Json(Option<String>),
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn build<M: Serialize>(
        message: Option<&M>,
        files: &[Attachment],
        files_field_name: &str,
    ) -> Result<Self, Error> {
        let message = serialize_obj(message)?;
        if files.is_empty() {
            return Ok(RequestBody::Json(message));
        }
        if files_field_name.is_empty() {
            return Err(Error::InvalidRequest(
                "files_field_name is required when files are attached".to_string(),
            ));
        }

        let mut form = MultipartForm::default();
        for file in files {
            form.parts.push(FormPart {
                name: files_field_name.to_string(),
                filename: file.filename.clone(),
                content_type: Some(FILE_CONTENT_TYPE.to_string()),
                data: file.data.clone(),
            });
        }
        form.parts.push(FormPart {
            name: MESSAGE_FIELD.to_string(),
            filename: None,
            content_type: None,
            data: message.unwrap_or_else(|| "null".to_string()).into_bytes(),
        });
        Ok(RequestBody::Multipart(form))
    }
}

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub parts: Vec<FormPart>,
}

impl MultipartForm {
    /// A fresh random boundary.
    pub fn boundary() -> String {
        format!("post-core-{}", uuid::Uuid::new_v4().simple())
    }

    pub fn content_type(boundary: &str) -> String {
        format!("multipart/form-data; boundary={boundary}")
    }

    /// Render the form. The layout matches reqwest's so both transports send
    /// the same bytes apart from the boundary.
    pub fn encode(&self, boundary: &str) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            out.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"",
                    escape_quoted(&part.name)
                )
                .as_bytes(),
            );
            if let Some(filename) = &part.filename {
                out.extend_from_slice(
                    format!("; filename=\"{}\"", escape_quoted(filename)).as_bytes(),
                );
            }
            if let Some(content_type) = &part.content_type {
                out.extend_from_slice(format!("\r\nContent-Type: {content_type}").as_bytes());
            }
            out.extend_from_slice(b"\r\n\r\n");
            out.extend_from_slice(&part.data);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        out
    }
}

fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
