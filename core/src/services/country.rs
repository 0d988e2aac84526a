//! Country reference data. Not scoped to a business account.

use std::sync::Arc;

use crate::api::ApiService;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::payload::Payload;
use crate::types::Country;

/// `country`, shared by all business accounts.
#[derive(Clone)]
pub struct CountryService {
    api: Arc<ApiService>,
    uri: String,
}

impl CountryService {
    pub fn new(api: Arc<ApiService>) -> Self {
        Self {
            api,
            uri: "country".to_string(),
        }
    }

    pub fn get_countries(&self) -> Result<Vec<Country>, ApiError> {
        self.api.request_as(HttpMethod::Get, &self.uri, &Payload::new())
    }
}
