//! Records returned by the Finolog API.
//!
//! # Design
//! These are read-only snapshots built only by deserializing a response.
//! Fields the API may omit or null are `Option`; a missing non-optional field
//! is a shape mismatch. Extra fields are ignored so additive API changes do
//! not break existing callers.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-date, per-currency balance snapshot of a contractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractorSummary {
    pub date: NaiveDate,
    pub currency_id: i64,
    pub balance: f64,
    pub incoming: f64,
    pub outcoming: f64,
    pub base_balance: f64,
    pub base_incoming: f64,
    pub base_outcoming: f64,
    pub contractor_id: i64,
}

/// A counterparty (customer or vendor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contractor {
    pub id: i64,
    pub biz_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub person: Option<String>,
    pub description: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
    pub created_by_id: i64,
    pub updated_by_id: i64,
    #[serde(default, with = "timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,
    pub deleted_by_id: Option<i64>,
    pub alien_id: Option<i64>,
    pub is_bizzed: bool,
    pub group_id: Option<i64>,
    pub autoeditor_id: Option<i64>,
    #[serde(default)]
    pub summary: Vec<ContractorSummary>,
    /// Present when the request asked for `with=requisites`.
    #[serde(default)]
    pub requisites: Vec<Requisite>,
}

impl Contractor {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Banking and legal details belonging to one contractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requisite {
    pub id: i64,
    pub contractor_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub full_name: Option<String>,
    pub inn: Option<String>,
    pub kpp: Option<String>,
    pub bank_name: Option<String>,
    pub bank_bic: Option<String>,
    pub bank_ks: Option<String>,
    pub bank_account: Option<String>,
    pub address_postal_index: Option<String>,
    pub address_city: Option<String>,
    pub address_street: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
    pub created_by_id: i64,
    pub updated_by_id: i64,
    #[serde(default, with = "timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,
    pub deleted_by_id: Option<i64>,
    pub email: Option<String>,
    pub web: Option<String>,
    pub phone: Option<String>,
    pub is_bizzed: bool,
    pub bank_iban: Option<String>,
    pub bank_mfo: Option<String>,
    pub country_id: Option<i64>,
    pub biz_id: i64,
}

/// Static country reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub code: String,
    pub default_currency_id: i64,
    pub name: String,
}

/// Catalog entry (good or service) referenced by a document line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub biz_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub sku: Option<Value>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub price_currency_id: i64,
    pub is_archived: bool,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
    pub created_by_id: i64,
    pub updated_by_id: i64,
    #[serde(default, with = "timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,
    pub deleted_by_id: Option<i64>,
    pub vat: i64,
    pub unit_id: Option<i64>,
    pub initial_count: Option<Value>,
    pub initial_price: Option<Value>,
    pub initial_currency_id: Option<Value>,
    #[serde(default)]
    pub can_edit_initial_balance: bool,
}

/// One priced line of a document package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentItem {
    pub id: i64,
    pub package_id: i64,
    pub item_id: i64,
    pub count: f64,
    pub price: f64,
    pub price_currency_id: i64,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
    #[serde(default, with = "timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,
    pub created_by_id: i64,
    pub updated_by_id: i64,
    pub deleted_by_id: Option<i64>,
    pub vat: i64,
    pub editable: bool,
    pub project_id: Option<i64>,
    pub item_name: String,
    pub item_sku: Option<Value>,
    pub item_type: String,
    pub amortization: Option<Value>,
    pub item: Option<CatalogItem>,
}

/// The priced line items of a document with their totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPackage {
    pub id: i64,
    pub biz_id: i64,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
    #[serde(default, with = "timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,
    pub created_by_id: i64,
    pub updated_by_id: i64,
    pub deleted_by_id: Option<i64>,
    pub currency_id: i64,
    pub total_price: f64,
    pub total_vat: f64,
    pub base_total_price: f64,
    pub vat_type: String,
    pub base_total_vat: f64,
    #[serde(default)]
    pub items: Vec<DocumentItem>,
}

/// An invoice or shipment linking two contractor/requisite pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub biz_id: i64,
    /// `invoice` or `shipment`.
    pub kind: String,
    pub from_contractor_id: Option<i64>,
    pub from_requisite_id: Option<i64>,
    pub to_contractor_id: Option<i64>,
    pub to_requisite_id: Option<i64>,
    pub package_id: i64,
    pub number: String,
    pub date: String,
    pub comment: Option<String>,
    pub description: Option<String>,
    /// `draft`, `published`, `viewed`, `paid` or `wrong`.
    pub status: String,
    pub token: String,
    pub pdf: Option<Value>,
    pub payload: Option<Value>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
    #[serde(default, with = "timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,
    pub created_by_id: i64,
    pub updated_by_id: i64,
    pub deleted_by_id: Option<i64>,
    pub template: String,
    pub file_id: Option<i64>,
    pub model_id: Option<i64>,
    pub model_type: Option<String>,
    pub to_contractor_draft: Option<String>,
    /// Direction: `in` or `out`.
    #[serde(rename = "type")]
    pub direction: String,
    pub qr_code_string: Option<String>,
    pub package: Option<DocumentPackage>,
    pub from_contractor: Option<Contractor>,
    pub from_requisite: Option<Requisite>,
    pub to_contractor: Option<Contractor>,
    pub to_requisite: Option<Requisite>,
    pub file: Option<Value>,
}

/// Descriptor of a generated document PDF.
///
/// The wire names are aliased: the owning document's `model_id` and
/// `model_type` land in `id` and `type`, and the file's own `id` lands in
/// `biz_id`. Kept as-is for compatibility with the live API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPdf {
    #[serde(rename = "model_id")]
    pub id: i64,
    #[serde(rename = "model_type")]
    pub r#type: String,
    pub created_by_id: i64,
    pub original_name: String,
    pub size: i64,
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "id")]
    pub biz_id: i64,
    pub url: String,
}

/// Finolog timestamps arrive as `YYYY-MM-DD HH:MM:SS`; RFC 3339 is accepted too.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp {raw:?}")))
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp {raw:?}"))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn requisite_json() -> Value {
        json!({
            "id": 11, "contractor_id": 7, "name": "Main", "description": null,
            "full_name": "Acme LLC", "inn": "7701234567", "kpp": "770101001",
            "bank_name": null, "bank_bic": null, "bank_ks": null, "bank_account": null,
            "address_postal_index": null, "address_city": null, "address_street": null,
            "created_at": "2024-03-01 09:30:00", "updated_at": "2024-03-01 09:30:00",
            "created_by_id": 1, "updated_by_id": 1, "deleted_at": null, "deleted_by_id": null,
            "email": null, "web": null, "phone": null, "is_bizzed": false,
            "bank_iban": null, "bank_mfo": null, "country_id": 1, "biz_id": 42
        })
    }

    #[test]
    fn contractor_with_embedded_requisites() {
        let raw = json!({
            "id": 7, "biz_id": 42, "name": "Acme", "email": null, "phone": null,
            "person": null, "description": null,
            "created_at": "2024-03-01 09:30:00", "updated_at": "2024-03-02T10:00:00+00:00",
            "created_by_id": 1, "updated_by_id": 1, "deleted_at": null,
            "deleted_by_id": null, "alien_id": null, "is_bizzed": false,
            "group_id": null, "autoeditor_id": null,
            "summary": [{
                "date": "2024-03-01", "currency_id": 1, "balance": 10.5,
                "incoming": 20, "outcoming": 9.5, "base_balance": 10.5,
                "base_incoming": 20, "base_outcoming": 9.5, "contractor_id": 7
            }],
            "requisites": [requisite_json()],
            "some_new_field": true
        });
        let contractor: Contractor = serde_json::from_value(raw).unwrap();
        assert_eq!(contractor.name, "Acme");
        assert_eq!(contractor.summary[0].balance, 10.5);
        assert_eq!(contractor.requisites[0].inn.as_deref(), Some("7701234567"));
        assert_eq!(contractor.updated_at.to_string(), "2024-03-02 10:00:00");
        assert!(!contractor.is_deleted());
    }

    #[test]
    fn contractor_missing_name_is_rejected() {
        let raw = json!({"id": 7, "biz_id": 42});
        assert!(serde_json::from_value::<Contractor>(raw).is_err());
    }

    #[test]
    fn requisite_deleted_at_parses() {
        let mut raw = requisite_json();
        raw["deleted_at"] = json!("2024-04-01 00:00:00");
        let requisite: Requisite = serde_json::from_value(raw).unwrap();
        assert!(requisite.deleted_at.is_some());
    }

    #[test]
    fn document_pdf_preserves_field_aliasing() {
        let raw = json!({
            "id": 900, "model_id": 55, "model_type": "Document", "created_by_id": 1,
            "original_name": "invoice-55.pdf", "size": 2048,
            "created_at": "2024-03-01 09:30:00", "updated_at": "2024-03-01 09:30:00",
            "url": "https://files.example/invoice-55.pdf"
        });
        let pdf: DocumentPdf = serde_json::from_value(raw).unwrap();
        assert_eq!(pdf.id, 55);
        assert_eq!(pdf.r#type, "Document");
        assert_eq!(pdf.biz_id, 900);

        let back = serde_json::to_value(&pdf).unwrap();
        assert_eq!(back["model_id"], 55);
        assert_eq!(back["id"], 900);
    }

    #[test]
    fn timestamp_rejects_garbage() {
        assert!(timestamp::parse("yesterday").is_none());
        let mut raw = requisite_json();
        raw["created_at"] = json!("01/03/2024");
        assert!(serde_json::from_value::<Requisite>(raw).is_err());
    }
}
