use reqwest::Client;
use std::time::Duration;

use crate::error::TransportError;
use crate::models::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, attachment: Attachment },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// A fully described request. Kept as plain data so the executor can replay it
/// on every attempt and tests can inspect exactly what a client would send.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Replaces any header with the same (case-insensitive) name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    pub fn form(mut self, name: &str, value: impl ToString) -> Self {
        self.push_form_field(name, value.to_string());
        self
    }

    pub fn push_form_field(&mut self, name: &str, value: String) {
        match &mut self.body {
            RequestBody::Form(fields) => fields.push((name.to_string(), value)),
            RequestBody::Multipart(parts) => parts.push(FormPart::Text {
                name: name.to_string(),
                value,
            }),
            RequestBody::Json(serde_json::Value::Object(map)) => {
                map.insert(name.to_string(), serde_json::Value::String(value));
            }
            RequestBody::Json(_) => {
                log::warn!("Field '{}' not added to non-object JSON body of {}", name, self.url);
            }
            RequestBody::Empty => self.body = RequestBody::Form(vec![(name.to_string(), value)]),
        }
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn text_part(mut self, name: &str, value: impl ToString) -> Self {
        self.parts_mut().push(FormPart::Text {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn file_part(mut self, name: &str, attachment: Attachment) -> Self {
        self.parts_mut().push(FormPart::File {
            name: name.to_string(),
            attachment,
        });
        self
    }

    fn parts_mut(&mut self) -> &mut Vec<FormPart> {
        if !matches!(self.body, RequestBody::Multipart(_)) {
            // Promote any plain form fields so nothing is dropped.
            let carried = match std::mem::replace(&mut self.body, RequestBody::Empty) {
                RequestBody::Form(fields) => fields
                    .into_iter()
                    .map(|(name, value)| FormPart::Text { name, value })
                    .collect(),
                _ => Vec::new(),
            };
            self.body = RequestBody::Multipart(carried);
        }
        match &mut self.body {
            RequestBody::Multipart(parts) => parts,
            _ => unreachable!("body was just set to multipart"),
        }
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Looks a field up in a form or multipart body.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(fields) => fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            RequestBody::Multipart(parts) => parts.iter().find_map(|p| match p {
                FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
                _ => None,
            }),
            _ => None,
        }
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One HTTP exchange. Non-2xx statuses are returned as responses, not errors;
/// the executor decides what they mean.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<HttpResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Some(Duration::from_secs(60)))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    fn build(&self, request: &ApiRequest) -> Result<reqwest::RequestBuilder, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    form = match part {
                        FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                        FormPart::File { name, attachment } => {
                            let file = reqwest::multipart::Part::bytes(attachment.bytes.clone())
                                .file_name(attachment.file_name.clone())
                                .mime_str(&attachment.mime)
                                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                            form.part(name.clone(), file)
                        }
                    };
                }
                builder.multipart(form)
            }
        };
        Ok(builder)
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<HttpResponse, TransportError> {
        let resp = self.build(request)?.send().await.map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(map_reqwest_error)?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_builder() {
        TransportError::InvalidRequest(e.to_string())
    } else {
        TransportError::Connection(e.to_string())
    }
}
