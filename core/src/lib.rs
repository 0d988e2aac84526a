//! Blocking client SDK for the Finolog accounting API.
//!
//! # Overview
//! Builds JSON payloads, validates them client-side against per-operation
//! schemas, sends them to `https://api.finolog.ru/v1/` and maps responses
//! into typed records.
//!
//! ```no_run
//! use finolog::{FinologClient, Payload};
//!
//! let client = FinologClient::new("api-token", 42);
//! let contractors = client
//!     .contractor()
//!     .get_contractors(Payload::new().with("is_bizzed", true))?;
//! println!("{} contractors", contractors.len());
//! client.close();
//! # Ok::<(), finolog::ApiError>(())
//! ```
//!
//! # Design
//! - `ApiService` is the only component that talks to the network; resource
//!   services compose it rather than extend it.
//! - `Transport` is the I/O seam. `UreqTransport` is the default; tests plug
//!   in an in-memory transport.
//! - Filters travel as a JSON body even on GET, as the remote API expects.
//! - Validation failures, missing required values and invalid ids are all
//!   raised before a request is sent.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod payload;
pub mod services;
pub mod types;
pub mod validation;

#[cfg(test)]
mod testing;

pub use api::{ApiService, BASE_URL};
pub use client::FinologClient;
pub use config::Config;
pub use error::{ApiError, FieldError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use payload::Payload;
pub use services::{ContractorLookup, ContractorService, CountryService, DocumentService, RequisiteService};
pub use types::{
    CatalogItem, Contractor, ContractorSummary, Country, Document, DocumentItem, DocumentPackage, DocumentPdf,
    Requisite,
};
pub use validation::{FieldRule, FieldType, Schema};
