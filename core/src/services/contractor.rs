//! Contractors: the counterparties of a business account.
//!
//! # Design
//! Create and update share one field schema without `id`, since ids are
//! assigned server-side. `get_or_create_by_inn` is the only operation that
//! issues two requests: a filtered list, then a create when nothing matched.
//! Both go through the same validated paths as the public calls.

use std::sync::Arc;

use tracing::info;

use super::{item_path, validate_update};
use crate::api::ApiService;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::payload::Payload;
use crate::types::Contractor;
use crate::validation::{FieldRule, FieldType, Schema};

/// Filters accepted by `get_contractors`.
///
/// `with` is a comma-separated list of related entities to embed:
/// `requisites`, `debts`, `autoeditor`.
pub const LIST_FILTERS: &Schema = &[
    FieldRule::new("email", FieldType::String),
    FieldRule::new("inn", FieldType::String),
    FieldRule::new("with", FieldType::String),
    FieldRule::new("page", FieldType::Integer),
    FieldRule::new("pagesize", FieldType::Integer),
    FieldRule::new("query", FieldType::String),
    FieldRule::new("ids", FieldType::String),
    FieldRule::new("is_bizzed", FieldType::Boolean),
];

/// Fields accepted on create and update.
pub const FIELDS: &Schema = &[
    FieldRule::new("name", FieldType::String),
    FieldRule::new("email", FieldType::String),
    FieldRule::new("phone", FieldType::String),
    FieldRule::new("person", FieldType::String),
    FieldRule::new("description", FieldType::String),
    FieldRule::new("group_id", FieldType::Integer),
];

/// Outcome of `get_or_create_by_inn`.
///
/// The `inn` filter does not guarantee uniqueness, so `Existing` may hold
/// several contractors.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractorLookup {
    Created(Contractor),
    Existing(Vec<Contractor>),
}

impl ContractorLookup {
    pub fn created(&self) -> bool {
        matches!(self, ContractorLookup::Created(_))
    }

    pub fn into_contractors(self) -> Vec<Contractor> {
        match self {
            ContractorLookup::Created(contractor) => vec![contractor],
            ContractorLookup::Existing(contractors) => contractors,
        }
    }
}

/// `biz/{biz_id}/contractor`
#[derive(Clone)]
pub struct ContractorService {
    api: Arc<ApiService>,
    uri: String,
}

impl ContractorService {
    pub fn new(api: Arc<ApiService>, biz_id: i64) -> Self {
        Self {
            api,
            uri: format!("biz/{biz_id}/contractor"),
        }
    }

    pub fn get_contractors(&self, mut filters: Payload) -> Result<Vec<Contractor>, ApiError> {
        self.api.validate(&filters, LIST_FILTERS)?;
        filters.stringify_bool("is_bizzed");
        self.api.request_as(HttpMethod::Get, &self.uri, &filters)
    }

    pub fn get_contractor(&self, id: i64) -> Result<Contractor, ApiError> {
        self.api
            .request_as(HttpMethod::Get, &item_path(&self.uri, id), &Payload::new())
    }

    pub fn create_contractor(&self, name: &str, mut fields: Payload) -> Result<Contractor, ApiError> {
        fields.insert("name", name);
        self.create(fields)
    }

    pub fn update_contractor(&self, id: i64, fields: Payload) -> Result<Contractor, ApiError> {
        validate_update(&self.api, id, &fields, FIELDS)?;
        self.api.request_as(HttpMethod::Put, &item_path(&self.uri, id), &fields)
    }

    /// The response carries the contractor's last state.
    pub fn delete_contractor(&self, id: i64) -> Result<Contractor, ApiError> {
        self.api
            .request_as(HttpMethod::Delete, &item_path(&self.uri, id), &Payload::new())
    }

    /// Find contractors by tax id, creating one from `defaults` if none match.
    ///
    /// `defaults` must carry `name`. Matches are returned with their
    /// requisites embedded.
    pub fn get_or_create_by_inn(&self, inn: &str, defaults: Payload) -> Result<ContractorLookup, ApiError> {
        let filters = Payload::new().with("inn", inn).with("with", "requisites");
        let matches = self.get_contractors(filters)?;
        if !matches.is_empty() {
            return Ok(ContractorLookup::Existing(matches));
        }

        if !defaults.contains_key("name") {
            return Err(ApiError::MissingField("name".to_string()));
        }
        let contractor = self.create(defaults)?;
        info!(inn, id = contractor.id, "created contractor for unmatched inn");
        Ok(ContractorLookup::Created(contractor))
    }

    fn create(&self, fields: Payload) -> Result<Contractor, ApiError> {
        self.api.validate(&fields, FIELDS)?;
        self.api.request_as(HttpMethod::Post, &self.uri, &fields)
    }
}
