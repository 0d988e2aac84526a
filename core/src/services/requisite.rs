//! Requisites: the legal and banking details attached to a contractor.
//!
//! # Design
//! Russian registry identifiers have fixed lengths, so the schema carries
//! length bounds on top of the type rules. Length is measured in characters
//! and only checked once the type check has passed.

use std::sync::Arc;

use super::{item_path, validate_update};
use crate::api::ApiService;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::payload::Payload;
use crate::types::Requisite;
use crate::validation::{FieldRule, FieldType, Schema};

pub const LIST_FILTERS: &Schema = &[
    FieldRule::new("contractor_id", FieldType::Integer),
    FieldRule::new("ids", FieldType::String),
    FieldRule::new("is_bizzed", FieldType::Boolean),
];

/// Fields accepted on create and update, with Russian registry lengths:
/// INN 10-12, KPP 9, account 20-28, BIC 9.
pub const FIELDS: &Schema = &[
    FieldRule::new("contractor_id", FieldType::Integer),
    FieldRule::new("name", FieldType::String),
    FieldRule::new("description", FieldType::String),
    FieldRule::new("full_name", FieldType::String),
    FieldRule::new("inn", FieldType::String).with_length(10, 12),
    FieldRule::new("kpp", FieldType::String).with_length(9, 9),
    FieldRule::new("bank_account", FieldType::String).with_length(20, 28),
    FieldRule::new("bank_bic", FieldType::String).with_length(9, 9),
    FieldRule::new("address_postal_index", FieldType::String),
    FieldRule::new("address_city", FieldType::String),
    FieldRule::new("address_street", FieldType::String),
    FieldRule::new("country_id", FieldType::Integer),
    FieldRule::new("phone", FieldType::String),
    FieldRule::new("email", FieldType::String),
    FieldRule::new("web", FieldType::String),
    FieldRule::new("bank_iban", FieldType::String),
    FieldRule::new("bank_mfo", FieldType::String),
];

/// `biz/{biz_id}/requisite`
#[derive(Clone)]
pub struct RequisiteService {
    api: Arc<ApiService>,
    uri: String,
}

impl RequisiteService {
    pub fn new(api: Arc<ApiService>, biz_id: i64) -> Self {
        Self {
            api,
            uri: format!("biz/{biz_id}/requisite"),
        }
    }

    pub fn get_requisites(&self, mut filters: Payload) -> Result<Vec<Requisite>, ApiError> {
        self.api.validate(&filters, LIST_FILTERS)?;
        filters.stringify_bool("is_bizzed");
        self.api.request_as(HttpMethod::Get, &self.uri, &filters)
    }

    pub fn get_requisite(&self, id: i64) -> Result<Requisite, ApiError> {
        self.api
            .request_as(HttpMethod::Get, &item_path(&self.uri, id), &Payload::new())
    }

    pub fn create_requisite(&self, contractor_id: i64, name: &str, mut fields: Payload) -> Result<Requisite, ApiError> {
        fields.insert("contractor_id", contractor_id);
        fields.insert("name", name);
        self.api.validate(&fields, FIELDS)?;
        self.api.request_as(HttpMethod::Post, &self.uri, &fields)
    }

    pub fn update_requisite(&self, id: i64, fields: Payload) -> Result<Requisite, ApiError> {
        validate_update(&self.api, id, &fields, FIELDS)?;
        self.api.request_as(HttpMethod::Put, &item_path(&self.uri, id), &fields)
    }

    pub fn delete_requisite(&self, id: i64) -> Result<Requisite, ApiError> {
        self.api
            .request_as(HttpMethod::Delete, &item_path(&self.uri, id), &Payload::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::testing::{api, requisite_json, RecordingTransport};
    use serde_json::json;

    fn service(transport: &RecordingTransport) -> RequisiteService {
        RequisiteService::new(api(transport), 42)
    }

    #[test]
    fn list_filters_by_contractor() {
        let transport = RecordingTransport::new();
        transport.respond(200, &json!([requisite_json(11, 7)]).to_string());
        let filters = Payload::new().with("contractor_id", 7).with("is_bizzed", true);
        let requisites = service(&transport).get_requisites(filters).unwrap();
        assert_eq!(requisites[0].contractor_id, 7);
        assert_eq!(transport.sent_body(0), json!({"contractor_id": 7, "is_bizzed": "true"}));
        assert_eq!(transport.single_request().path, "https://api.finolog.ru/v1/biz/42/requisite");
    }

    #[test]
    fn create_merges_positional_fields() {
        let transport = RecordingTransport::new();
        transport.respond(200, &requisite_json(11, 7).to_string());
        let fields = Payload::new().with("inn", "7701234567").with("kpp", "770101001");
        let requisite = service(&transport).create_requisite(7, "Main", fields).unwrap();
        assert_eq!(requisite.id, 11);
        assert_eq!(
            transport.sent_body(0),
            json!({"contractor_id": 7, "name": "Main", "inn": "7701234567", "kpp": "770101001"})
        );
    }

    #[test]
    fn create_reports_every_length_violation_before_sending() {
        let transport = RecordingTransport::new();
        let fields = Payload::new()
            .with("inn", "123")
            .with("kpp", "1234567890")
            .with("bank_account", "1".repeat(29))
            .with("bank_bic", "12345678");
        let err = service(&transport).create_requisite(7, "Main", fields).unwrap_err();

        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields.len(), 4);
        for field in ["inn", "kpp", "bank_account", "bank_bic"] {
            assert!(fields.contains(&field), "{field} missing from {fields:?}");
        }
        assert!(err
            .field_errors()
            .contains(&FieldError::new("bank_account", "must be at most 28 characters long, got 29")));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn bank_account_bounds_are_inclusive() {
        let transport = RecordingTransport::new();
        for len in [20, 28] {
            transport.respond(200, &requisite_json(11, 7).to_string());
            let fields = Payload::new().with("bank_account", "4".repeat(len));
            assert!(service(&transport).update_requisite(11, fields).is_ok(), "length {len}");
        }
    }

    #[test]
    fn update_sends_put_to_singular_path() {
        let transport = RecordingTransport::new();
        transport.respond(200, &requisite_json(11, 7).to_string());
        service(&transport)
            .update_requisite(11, Payload::new().with("web", "https://acme.test"))
            .unwrap();
        let sent = transport.single_request();
        assert_eq!(sent.method, HttpMethod::Put);
        assert_eq!(sent.path, "https://api.finolog.ru/v1/biz/42/requisite/11");
        assert_eq!(transport.sent_body(0), json!({"web": "https://acme.test"}));
    }

    #[test]
    fn update_rejects_mismatched_id_alongside_length_violations() {
        let transport = RecordingTransport::new();
        let fields = Payload::new().with("id", 12).with("kpp", "1");
        let err = service(&transport).update_requisite(11, fields).unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["id", "kpp"]);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn get_and_delete_map_single_record() {
        let transport = RecordingTransport::new();
        transport.respond(200, &requisite_json(11, 7).to_string());
        transport.respond(200, &requisite_json(11, 7).to_string());
        let service = service(&transport);
        assert_eq!(service.get_requisite(11).unwrap().id, 11);
        assert_eq!(service.delete_requisite(11).unwrap().id, 11);

        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[1].method, HttpMethod::Delete);
        assert_eq!(requests[1].path, "https://api.finolog.ru/v1/biz/42/requisite/11");
    }

    #[test]
    fn delete_not_found() {
        let transport = RecordingTransport::new();
        transport.respond(404, "");
        let err = service(&transport).delete_requisite(11).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }
}
