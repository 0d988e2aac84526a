//! In-memory records for the emulated business accounts.
//!
//! Records are kept as JSON objects in the exact wire shape the real API
//! returns, so handlers can filter, patch and echo them directly.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::{json, Map, Value};

pub type Record = Map<String, Value>;

/// Author id stamped on every record; the mock has a single user.
pub const USER_ID: i64 = 1;

#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    pub contractors: BTreeMap<i64, Record>,
    pub requisites: BTreeMap<i64, Record>,
    pub documents: BTreeMap<i64, Record>,
}

pub fn now() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn into_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

pub fn countries() -> Value {
    json!([
        {"id": 1, "code": "RU", "default_currency_id": 1, "name": "Russia"},
        {"id": 2, "code": "KZ", "default_currency_id": 4, "name": "Kazakhstan"},
        {"id": 3, "code": "BY", "default_currency_id": 5, "name": "Belarus"},
    ])
}

impl Store {
    pub fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Copy every `allowed` key present in `fields` onto `record`.
    pub fn patch(record: &mut Record, fields: &Record, allowed: &[&str]) {
        for key in allowed {
            if let Some(value) = fields.get(*key) {
                record.insert((*key).to_string(), value.clone());
            }
        }
        record.insert("updated_at".to_string(), Value::String(now()));
    }

    pub fn mark_deleted(record: &mut Record) {
        record.insert("deleted_at".to_string(), Value::String(now()));
        record.insert("deleted_by_id".to_string(), json!(USER_ID));
    }

    pub fn new_contractor(&mut self, biz_id: i64, fields: &Record) -> Record {
        let id = self.allocate_id();
        let stamp = now();
        let mut record = into_record(json!({
            "id": id, "biz_id": biz_id, "name": "", "email": null, "phone": null,
            "person": null, "description": null, "created_at": stamp, "updated_at": stamp,
            "created_by_id": USER_ID, "updated_by_id": USER_ID, "deleted_at": null,
            "deleted_by_id": null, "alien_id": null, "is_bizzed": false, "group_id": null,
            "autoeditor_id": null, "summary": []
        }));
        Self::patch(&mut record, fields, CONTRACTOR_FIELDS);
        self.contractors.insert(id, record.clone());
        record
    }

    pub fn new_requisite(&mut self, biz_id: i64, fields: &Record) -> Record {
        let id = self.allocate_id();
        let stamp = now();
        let mut record = into_record(json!({
            "id": id, "contractor_id": 0, "name": "", "description": null, "full_name": null,
            "inn": null, "kpp": null, "bank_name": null, "bank_bic": null, "bank_ks": null,
            "bank_account": null, "address_postal_index": null, "address_city": null,
            "address_street": null, "created_at": stamp, "updated_at": stamp,
            "created_by_id": USER_ID, "updated_by_id": USER_ID, "deleted_at": null,
            "deleted_by_id": null, "email": null, "web": null, "phone": null,
            "is_bizzed": false, "bank_iban": null, "bank_mfo": null, "country_id": 1,
            "biz_id": biz_id
        }));
        Self::patch(&mut record, fields, REQUISITE_FIELDS);
        self.requisites.insert(id, record.clone());
        record
    }

    pub fn new_document(&mut self, biz_id: i64, fields: &Record, items: &[Value]) -> Record {
        let id = self.allocate_id();
        let package_id = self.allocate_id();
        let stamp = now();

        let mut total = 0.0;
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let line_id = self.allocate_id();
            let count = item.get("count").and_then(Value::as_f64).unwrap_or(1.0);
            let price = item.get("price").and_then(Value::as_f64).unwrap_or(0.0);
            total += count * price;
            lines.push(json!({
                "id": line_id, "package_id": package_id,
                "item_id": item.get("item_id").cloned().unwrap_or(json!(0)),
                "count": count, "price": price,
                "price_currency_id": item.get("price_currency_id").cloned().unwrap_or(json!(1)),
                "created_at": stamp, "updated_at": stamp, "deleted_at": null,
                "created_by_id": USER_ID, "updated_by_id": USER_ID, "deleted_by_id": null,
                "vat": item.get("vat").cloned().unwrap_or(json!(0)),
                "editable": true, "project_id": null,
                "item_name": item.get("item_name").cloned().unwrap_or(json!("")),
                "item_sku": null, "item_type": "good",
                "amortization": item.get("amortization").cloned().unwrap_or(Value::Null),
                "item": null
            }));
        }
        let vat_type = fields.get("vat_type").cloned().unwrap_or(json!("none"));

        let package = json!({
            "id": package_id, "biz_id": biz_id, "created_at": stamp, "updated_at": stamp,
            "deleted_at": null, "created_by_id": USER_ID, "updated_by_id": USER_ID,
            "deleted_by_id": null, "currency_id": 1, "total_price": total, "total_vat": 0,
            "base_total_price": total, "vat_type": vat_type, "base_total_vat": 0,
            "items": lines
        });

        let mut record = into_record(json!({
            "id": id, "biz_id": biz_id, "kind": "invoice", "from_contractor_id": null,
            "from_requisite_id": null, "to_contractor_id": null, "to_requisite_id": null,
            "package_id": package_id, "number": id.to_string(), "date": today(),
            "comment": null, "description": null, "status": "draft",
            "token": format!("doc-{id}"), "pdf": null, "payload": null,
            "created_at": stamp, "updated_at": stamp, "deleted_at": null,
            "created_by_id": USER_ID, "updated_by_id": USER_ID, "deleted_by_id": null,
            "template": "ru", "file_id": null, "model_id": null, "model_type": null,
            "to_contractor_draft": null, "type": "out", "qr_code_string": null,
            "package": package,
            "from_contractor": null, "from_requisite": null, "to_contractor": null,
            "to_requisite": null, "file": null
        }));
        Self::patch(&mut record, fields, DOCUMENT_FIELDS);
        self.documents.insert(id, record.clone());
        record
    }

    /// Attach the file descriptor of a freshly rendered invoice.
    pub fn render_pdf(&mut self, document_id: i64, no_sign: bool) -> Option<Value> {
        let file_id = self.allocate_id();
        let document = self.documents.get_mut(&document_id)?;
        let number = document.get("number").and_then(Value::as_str).unwrap_or_default().to_string();
        let stamp = now();
        document.insert("file_id".to_string(), json!(file_id));

        let suffix = if no_sign { "-unsigned" } else { "" };
        let name = format!("invoice-{number}{suffix}.pdf");
        let size = if no_sign { 1024 } else { 2048 };
        Some(json!({
            "id": file_id, "model_id": document_id, "model_type": "Document",
            "created_by_id": USER_ID, "original_name": name,
            "size": size,
            "created_at": stamp, "updated_at": stamp,
            "url": format!("https://files.finolog.test/{file_id}/{name}")
        }))
    }
}

pub const CONTRACTOR_FIELDS: &[&str] = &["name", "email", "phone", "person", "description", "group_id"];

pub const REQUISITE_FIELDS: &[&str] = &[
    "contractor_id",
    "name",
    "description",
    "full_name",
    "inn",
    "kpp",
    "bank_account",
    "bank_bic",
    "address_postal_index",
    "address_city",
    "address_street",
    "country_id",
    "phone",
    "email",
    "web",
    "bank_iban",
    "bank_mfo",
];

pub const DOCUMENT_FIELDS: &[&str] = &[
    "kind",
    "type",
    "date",
    "template",
    "from_contractor_id",
    "from_requisite_id",
    "to_contractor_id",
    "to_requisite_id",
    "to_contractor_draft",
    "number",
    "status",
    "comment",
    "description",
    "model_type",
    "model_id",
];
