//! Request dispatch shared by every resource service.
//!
//! # Design
//! `ApiService` owns the transport, the base URL and the authentication
//! headers, all fixed at construction. Services hold it behind an `Arc` and
//! only ever call `request`, `request_as` and `validate`; they never
//! reconfigure or close it.
//!
//! Status handling: 404 becomes `NotFound`, any other non-2xx becomes
//! `HttpError`, and a 2xx body is returned as parsed JSON without further
//! interpretation.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::payload::Payload;
use crate::validation::{self, Schema};

/// Root of the Finolog v1 API.
pub const BASE_URL: &str = "https://api.finolog.ru/v1/";

/// Header carrying the API token on every request.
pub const TOKEN_HEADER: &str = "Api-Token";

pub struct ApiService {
    transport: Box<dyn Transport>,
    base_url: String,
    headers: Vec<(String, String)>,
}

impl ApiService {
    pub fn new(api_token: &str, base_url: &str, transport: Box<dyn Transport>) -> Self {
        let base_url = format!("{}/", base_url.trim_end_matches('/'));
        let headers = vec![
            (TOKEN_HEADER.to_string(), api_token.to_string()),
            ("content-type".to_string(), "application/json".to_string()),
        ];
        Self {
            transport,
            base_url,
            headers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `payload` as the JSON body of `method base_url + path`.
    pub fn request(&self, method: HttpMethod, path: &str, payload: &Payload) -> Result<Value, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let request = HttpRequest {
            method,
            path: format!("{}{}", self.base_url, path),
            headers: self.headers.clone(),
            body: Some(body),
        };

        debug!(%method, path, "sending request");
        let response = self.transport.execute(request)?;
        debug!(%method, path, status = response.status, "received response");

        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Like `request`, then map the JSON into `T`.
    pub fn request_as<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &Payload,
    ) -> Result<T, ApiError> {
        let value = self.request(method, path, payload)?;
        decode(value)
    }

    pub fn validate(&self, payload: &Payload, schema: &Schema) -> Result<(), ApiError> {
        validation::validate(payload, schema)
    }

    pub fn validate_each(&self, label: &str, items: &[Payload], schema: &Schema) -> Result<(), ApiError> {
        validation::validate_each(label, items, schema)
    }
}

/// Map a parsed response into a record, keeping the raw JSON on mismatch.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    T::deserialize(&value).map_err(|e| ApiError::UnexpectedShape {
        message: e.to_string(),
        body: value.to_string(),
    })
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(ApiError::NotFound {
            body: response.body.clone(),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
