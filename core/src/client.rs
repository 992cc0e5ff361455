//! Request builder, response parser and executor for one REST collection.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. Both
//! are pure; the high-level `list`/`create`/`update`/`remove` methods glue
//! them together through the configured `Transport`. Success is decided by
//! status code alone, per operation:
//!
//! | op     | accepted statuses |
//! |--------|-------------------|
//! | list   | 200               |
//! | create | 200, 201          |
//! | update | 200               |
//! | remove | 200, 204          |
//!
//! Write responses are never decoded. Nothing is retried.

use std::fmt;
use std::marker::PhantomData;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::resource::Resource;
use crate::transport::{Transport, UreqTransport};
use crate::types::Post;

/// Characters escaped when an id is placed into a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const LIST_OK: &[u16] = &[200];
const CREATE_OK: &[u16] = &[200, 201];
const UPDATE_OK: &[u16] = &[200];
const REMOVE_OK: &[u16] = &[200, 204];

/// Client for the posts collection.
pub type PostClient<T = UreqTransport> = ResourceClient<Post, T>;

/// Stateless client for the collection of `R` at `{base_url}{R::PATH}`.
pub struct ResourceClient<R, T> {
    endpoint: String,
    transport: T,
    _resource: PhantomData<fn() -> R>,
}

// Manual impls: `R` is only a marker and needs neither bound.
impl<R, T: Clone> Clone for ResourceClient<R, T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            transport: self.transport.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R, T: fmt::Debug> fmt::Debug for ResourceClient<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("endpoint", &self.endpoint)
            .field("transport", &self.transport)
            .finish()
    }
}

impl<R: Resource> ResourceClient<R, UreqTransport> {
    /// Client over a blocking `ureq` transport built from `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config, UreqTransport::new(config))
    }
}

impl<R: Resource, T> ResourceClient<R, T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self {
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), R::PATH),
            transport,
            _resource: PhantomData,
        }
    }

    /// Absolute URL of the collection.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.endpoint, utf8_percent_encode(id, PATH_SEGMENT))
    }

    pub fn build_list(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.endpoint.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, fields: &R::Fields) -> Result<HttpRequest, ClientError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.endpoint.clone(),
            headers: json_headers(),
            body: Some(encode(fields)?),
        })
    }

    pub fn build_update(&self, id: &str, fields: &R::Fields) -> Result<HttpRequest, ClientError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: self.item_url(id),
            headers: json_headers(),
            body: Some(encode(fields)?),
        })
    }

    pub fn build_remove(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<R>, ClientError> {
        check_status(&response, LIST_OK)?;
        serde_json::from_str(&response.body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<(), ClientError> {
        check_status(&response, CREATE_OK)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<(), ClientError> {
        check_status(&response, UPDATE_OK)
    }

    pub fn parse_remove(&self, response: HttpResponse) -> Result<(), ClientError> {
        check_status(&response, REMOVE_OK)
    }
}

impl<R: Resource, T: Transport> ResourceClient<R, T> {
    /// `GET {endpoint}`.
    pub fn list(&self) -> Result<Vec<R>, ClientError> {
        let response = self.send(self.build_list())?;
        let records = self.parse_list(response).inspect_err(|e| log_failure("list", e))?;
        debug!(count = records.len(), "listed records");
        Ok(records)
    }

    /// `POST {endpoint}` with `fields` as JSON.
    pub fn create(&self, fields: &R::Fields) -> Result<(), ClientError> {
        let response = self.send(self.build_create(fields)?)?;
        self.parse_create(response).inspect_err(|e| log_failure("create", e))
    }

    /// `PUT {endpoint}/{id}` with `fields` as JSON.
    pub fn update(&self, id: &str, fields: &R::Fields) -> Result<(), ClientError> {
        let response = self.send(self.build_update(id, fields)?)?;
        self.parse_update(response).inspect_err(|e| log_failure("update", e))
    }

    /// `DELETE {endpoint}/{id}`.
    pub fn remove(&self, id: &str) -> Result<(), ClientError> {
        let response = self.send(self.build_remove(id))?;
        self.parse_remove(response).inspect_err(|e| log_failure("remove", e))
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self
            .transport
            .execute(request)
            .inspect_err(|e| warn!(error = %e, "transport failure"))?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn encode<F: serde::Serialize>(fields: &F) -> Result<String, ClientError> {
    serde_json::to_string(fields).map_err(|e| ClientError::Encode(e.to_string()))
}

fn check_status(response: &HttpResponse, accepted: &[u16]) -> Result<(), ClientError> {
    if accepted.contains(&response.status) {
        Ok(())
    } else {
        Err(ClientError::Http(response.status))
    }
}

fn log_failure(op: &'static str, error: &ClientError) {
    warn!(op, error = %error, "operation failed");
}
