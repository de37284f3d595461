//! Fetch-style transport over `reqwest`: a response always comes back as a
//! value and a failed status is detected with an explicit check.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

use super::{caller_headers, SendError, Transport};
use crate::body::{MultipartForm, RequestBody, JSON_CONTENT_TYPE};
use crate::http::{normalize_headers, status_text, OutboundRequest, RawResponse};

#[derive(Debug, Clone, Default)]
pub struct FetchTransport {
    client: reqwest::Client,
}

impl FetchTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for FetchTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, SendError> {
        let mut builder = self.client.post(&request.url);
        // An invalid name or value is held by the builder and reported by
        // `send` as a transport fault.
        for (name, value) in caller_headers(request) {
            builder = builder.header(name, value);
        }

        builder = match &request.body {
            RequestBody::Json(text) => {
                let builder = builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE);
                match text {
                    Some(text) => builder.body(text.clone()),
                    None => builder,
                }
            }
            RequestBody::Multipart(form) => builder.multipart(native_form(form)?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = normalize_headers(response.headers());
        let body = response.text().await?;
        let raw = RawResponse {
            url: request.url.clone(),
            status: status.as_u16(),
            status_text: status_text(status),
            headers,
            body,
        };

        if !status.is_success() {
            return Err(SendError::Status(raw));
        }
        Ok(raw)
    }
}

fn native_form(form: &MultipartForm) -> Result<Form, reqwest::Error> {
    let mut native = Form::new();
    for part in &form.parts {
        let mut native_part = Part::bytes(part.data.clone());
        if let Some(filename) = &part.filename {
            native_part = native_part.file_name(filename.clone());
        }
        if let Some(content_type) = &part.content_type {
            native_part = native_part.mime_str(content_type)?;
        }
        native = native.part(part.name.clone(), native_part);
    }
    Ok(native)
}
