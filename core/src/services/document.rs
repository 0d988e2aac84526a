//! Documents (invoices and shipments) and their rendered PDFs.
//!
//! # Design
//! Lines are passed to `create_document` separately from the document
//! fields and are validated per element, so violations name the offending
//! line as `items[i].field`. The PDF endpoint returns a file descriptor whose
//! field names do not match their meaning; see `DocumentPdf`.

use std::sync::Arc;

use serde_json::Value;

use super::{item_path, validate_update};
use crate::api::ApiService;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::payload::Payload;
use crate::types::{Document, DocumentPdf};
use crate::validation::{self, FieldRule, FieldType, Schema};

/// Filters accepted by `get_documents`.
///
/// `kind` is `invoice` or `shipment`; `template` narrows a kind to
/// `ru`/`international` (invoices) or `stock`/`asset` (shipments).
pub const LIST_FILTERS: &Schema = &[
    FieldRule::new("page", FieldType::Integer),
    FieldRule::new("pagesize", FieldType::Integer),
    FieldRule::new("query", FieldType::String),
    FieldRule::new("item_id", FieldType::Integer),
    FieldRule::new("kind", FieldType::String),
    FieldRule::new("template", FieldType::String),
];

pub const PDF_FILTERS: &Schema = &[FieldRule::new("no_sign", FieldType::Boolean)];

/// Document fields accepted on create and update. Lines travel separately
/// as `items` on create, so `items` here is reported as unknown.
pub const FIELDS: &Schema = &[
    FieldRule::new("kind", FieldType::String),
    FieldRule::new("vat_type", FieldType::String),
    FieldRule::new("type", FieldType::String),
    FieldRule::new("date", FieldType::String),
    FieldRule::new("template", FieldType::String),
    FieldRule::new("from_contractor_id", FieldType::Integer),
    FieldRule::new("from_requisite_id", FieldType::Integer),
    FieldRule::new("to_contractor_id", FieldType::Integer),
    FieldRule::new("to_requisite_id", FieldType::Integer),
    FieldRule::new("to_contractor_draft", FieldType::String),
    FieldRule::new("number", FieldType::String),
    FieldRule::new("status", FieldType::String),
    FieldRule::new("comment", FieldType::String),
    FieldRule::new("description", FieldType::String),
    FieldRule::new("model_type", FieldType::String),
    FieldRule::new("model_id", FieldType::Integer),
];

/// One line of `items` on create. New lines use `id: -1`.
pub const ITEM_FIELDS: &Schema = &[
    FieldRule::new("id", FieldType::Integer),
    FieldRule::new("item_id", FieldType::Integer),
    FieldRule::new("count", FieldType::Number),
    FieldRule::new("vat", FieldType::Integer),
    FieldRule::new("price", FieldType::Number),
    FieldRule::new("price_currency_id", FieldType::Integer),
    FieldRule::new("amortization", FieldType::Integer),
    FieldRule::new("item_name", FieldType::String),
];

/// `biz/{biz_id}/orders/document`
#[derive(Clone)]
pub struct DocumentService {
    api: Arc<ApiService>,
    uri: String,
}

impl DocumentService {
    pub fn new(api: Arc<ApiService>, biz_id: i64) -> Self {
        Self {
            api,
            uri: format!("biz/{biz_id}/orders/document"),
        }
    }

    pub fn get_documents(&self, filters: Payload) -> Result<Vec<Document>, ApiError> {
        self.api.validate(&filters, LIST_FILTERS)?;
        self.api.request_as(HttpMethod::Get, &self.uri, &filters)
    }

    pub fn get_document(&self, id: i64) -> Result<Document, ApiError> {
        self.api
            .request_as(HttpMethod::Get, &item_path(&self.uri, id), &Payload::new())
    }

    /// Generate the invoice PDF. `no_sign` hides stamp and signature.
    pub fn get_document_pdf(&self, id: i64, no_sign: Option<bool>) -> Result<DocumentPdf, ApiError> {
        let mut filters = Payload::new();
        if let Some(no_sign) = no_sign {
            filters.insert("no_sign", no_sign);
        }
        self.api.validate(&filters, PDF_FILTERS)?;
        filters.stringify_bool("no_sign");

        let path = format!("{}/pdf/invoice", item_path(&self.uri, id));
        self.api.request_as(HttpMethod::Get, &path, &filters)
    }

    /// Create a document from a non-empty list of line `items`.
    ///
    /// Document fields and every line are validated together, so one error
    /// lists all violations.
    pub fn create_document(&self, items: Vec<Payload>, mut fields: Payload) -> Result<Document, ApiError> {
        if items.is_empty() {
            return Err(ApiError::MissingField("items".to_string()));
        }
        validation::merge([
            self.api.validate_each("items", &items, ITEM_FIELDS),
            self.api.validate(&fields, FIELDS),
        ])?;

        fields.insert("items", Value::Array(items.into_iter().map(Value::from).collect()));
        self.api.request_as(HttpMethod::Post, &self.uri, &fields)
    }

    pub fn update_document(&self, id: i64, fields: Payload) -> Result<Document, ApiError> {
        validate_update(&self.api, id, &fields, FIELDS)?;
        self.api.request_as(HttpMethod::Put, &item_path(&self.uri, id), &fields)
    }

    pub fn delete_document(&self, id: i64) -> Result<Document, ApiError> {
        self.api
            .request_as(HttpMethod::Delete, &item_path(&self.uri, id), &Payload::new())
    }
}
