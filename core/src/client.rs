//! Entry point bundling the four resource services.
//!
//! # Design
//! `FinologClient` builds one `ApiService` (transport, base URL, token header)
//! and shares it by `Arc` with every service. The contractor, document and
//! requisite services are bound to the client's `biz_id`; reaching another
//! business account takes a new client. `close` drops the shared transport
//! and its connection pool.

use std::sync::Arc;

use tracing::debug;

use crate::api::{ApiService, BASE_URL};
use crate::config::{self, Config};
use crate::error::ApiError;
use crate::http::{Transport, UreqTransport};
use crate::services::{ContractorService, CountryService, DocumentService, RequisiteService};

/// Blocking client for one Finolog business account.
#[derive(Clone)]
pub struct FinologClient {
    biz_id: i64,
    contractor: ContractorService,
    document: DocumentService,
    requisite: RequisiteService,
    country: CountryService,
}

impl FinologClient {
    pub fn new(api_token: &str, biz_id: i64) -> Self {
        Self::with_base_url(api_token, biz_id, BASE_URL)
    }

    /// Point the client at another deployment of the v1 API.
    pub fn with_base_url(api_token: &str, biz_id: i64, base_url: &str) -> Self {
        Self::with_transport(api_token, biz_id, base_url, Box::new(UreqTransport::new()))
    }

    pub fn with_transport(api_token: &str, biz_id: i64, base_url: &str, transport: Box<dyn Transport>) -> Self {
        let api = Arc::new(ApiService::new(api_token, base_url, transport));
        debug!(biz_id, base_url = api.base_url(), "finolog client ready");
        Self {
            biz_id,
            contractor: ContractorService::new(Arc::clone(&api), biz_id),
            document: DocumentService::new(Arc::clone(&api), biz_id),
            requisite: RequisiteService::new(Arc::clone(&api), biz_id),
            country: CountryService::new(api),
        }
    }

    /// Build from a token and a textual business-account id.
    ///
    /// Fails with `InvalidId` before any I/O when `biz_id` is not an integer.
    pub fn parse(api_token: &str, biz_id: &str) -> Result<Self, ApiError> {
        let biz_id = config::parse_id("biz_id", biz_id)?;
        Ok(Self::new(api_token, biz_id))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_base_url(&config.api_token, config.biz_id, &config.base_url)
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::from_config(&Config::from_env()?))
    }

    pub fn biz_id(&self) -> i64 {
        self.biz_id
    }

    pub fn contractor(&self) -> &ContractorService {
        &self.contractor
    }

    pub fn document(&self) -> &DocumentService {
        &self.document
    }

    pub fn requisite(&self) -> &RequisiteService {
        &self.requisite
    }

    pub fn country(&self) -> &CountryService {
        &self.country
    }

    /// Release the shared transport.
    ///
    /// Clones of this client keep the transport alive until they are closed
    /// or dropped too.
    pub fn close(self) {
        debug!(biz_id = self.biz_id, "closing finolog client");
    }
}
