//! One service per Finolog REST resource.
//!
//! Every service holds a shared `ApiService` and a base path computed once at
//! construction. Business-account scoped services bake `biz_id` into that
//! path, so a service can never target another account.

pub mod contractor;
pub mod country;
pub mod document;
pub mod requisite;

pub use contractor::{ContractorLookup, ContractorService};
pub use country::CountryService;
pub use document::DocumentService;
pub use requisite::RequisiteService;

use serde_json::Value;

use crate::api::ApiService;
use crate::error::{ApiError, FieldError};
use crate::payload::Payload;
use crate::validation::{self, Schema};

/// Validate update `fields` for the record `id`.
///
/// The schemas carry no `id`, since ids are assigned server-side. A caller
/// `id` is tolerated only when it names the record being updated; every
/// other field is checked against `schema`. The wire body stays `fields`.
fn validate_update(api: &ApiService, id: i64, fields: &Payload, schema: &Schema) -> Result<(), ApiError> {
    let mut rest = fields.clone();
    let id_check = match rest.remove("id") {
        Some(value) if value != Value::from(id) => Err(ApiError::Validation(vec![FieldError::new(
            "id",
            format!("must match the updated record id {id}, got {value}"),
        )])),
        _ => Ok(()),
    };
    validation::merge([id_check, api.validate(&rest, schema)])
}

fn item_path(base: &str, id: i64) -> String {
    format!("{base}/{id}")
}
