//! In-memory emulation of the Finolog v1 REST API.
//!
//! Serves the contractor, requisite, document and country resources under
//! `/v1/`, scoped per business account. Behaves like the remote service in
//! the ways the client depends on: the `Api-Token` header is required,
//! filters are read from the JSON body even on GET, boolean filters must be
//! the strings `"true"`/`"false"`, and unknown ids answer 404.

// Store records are wide `json!` literals.
#![recursion_limit = "256"]

pub mod store;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

use store::{Record, Store, CONTRACTOR_FIELDS, DOCUMENT_FIELDS, REQUISITE_FIELDS};

pub type Db = Arc<RwLock<Store>>;

type Reply = Result<Json<Value>, Failure>;

/// An error response with a JSON `message` body.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "No query results for model")
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/v1/country", get(list_countries))
        .route("/v1/biz/{biz_id}/contractor", get(list_contractors).post(create_contractor))
        .route(
            "/v1/biz/{biz_id}/contractor/{id}",
            get(get_contractor).put(update_contractor).delete(delete_contractor),
        )
        .route("/v1/biz/{biz_id}/requisite", get(list_requisites).post(create_requisite))
        .route(
            "/v1/biz/{biz_id}/requisite/{id}",
            get(get_requisite).put(update_requisite).delete(delete_requisite),
        )
        .route("/v1/biz/{biz_id}/orders/document", get(list_documents).post(create_document))
        .route(
            "/v1/biz/{biz_id}/orders/document/{id}",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/v1/biz/{biz_id}/orders/document/{id}/pdf/invoice", get(document_pdf))
        .layer(middleware::from_fn(require_token))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_token(request: Request, next: Next) -> Response {
    match request.headers().get("api-token") {
        Some(token) if !token.is_empty() => next.run(request).await,
        _ => Failure::new(StatusCode::UNAUTHORIZED, "Unauthenticated.").into_response(),
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Parse the JSON body; an empty body is an empty object.
fn body_fields(body: &Bytes) -> Result<Record, Failure> {
    if body.is_empty() {
        return Ok(Record::new());
    }
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(Failure::new(StatusCode::BAD_REQUEST, "body must be a JSON object")),
    }
}

/// Read a boolean filter, which the API only accepts as `"true"`/`"false"`.
fn flag(fields: &Record, name: &str) -> Result<Option<bool>, Failure> {
    match fields.get(name) {
        None => Ok(None),
        Some(Value::String(s)) if s == "true" => Ok(Some(true)),
        Some(Value::String(s)) if s == "false" => Ok(Some(false)),
        Some(_) => Err(Failure::invalid(format!("The {name} field must be \"true\" or \"false\"."))),
    }
}

fn text<'a>(fields: &'a Record, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(Value::as_str)
}

fn required_text<'a>(fields: &'a Record, name: &str) -> Result<&'a str, Failure> {
    match text(fields, name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Failure::invalid(format!("The {name} field is required."))),
    }
}

fn id_list(fields: &Record) -> Option<Vec<i64>> {
    text(fields, "ids").map(|ids| ids.split(',').filter_map(|id| id.trim().parse().ok()).collect())
}

/// Apply `page` (1-based) and `pagesize` filters.
fn paginate(records: Vec<Value>, fields: &Record) -> Vec<Value> {
    let Some(size) = fields.get("pagesize").and_then(Value::as_u64) else {
        return records;
    };
    let page = fields.get("page").and_then(Value::as_u64).unwrap_or(1).max(1);
    records
        .into_iter()
        .skip(((page - 1) * size) as usize)
        .take(size as usize)
        .collect()
}

fn owned_by(record: &Record, biz_id: i64) -> bool {
    record.get("biz_id").and_then(Value::as_i64) == Some(biz_id)
}

fn find(records: &std::collections::BTreeMap<i64, Record>, biz_id: i64, id: i64) -> Result<Record, Failure> {
    records
        .get(&id)
        .filter(|record| owned_by(record, biz_id))
        .cloned()
        .ok_or_else(Failure::not_found)
}

// ---------------------------------------------------------------------------
// Countries
// ---------------------------------------------------------------------------

async fn list_countries() -> Json<Value> {
    Json(store::countries())
}

// ---------------------------------------------------------------------------
// Contractors
// ---------------------------------------------------------------------------

async fn list_contractors(State(db): State<Db>, Path(biz_id): Path<i64>, body: Bytes) -> Reply {
    let fields = body_fields(&body)?;
    let is_bizzed = flag(&fields, "is_bizzed")?;
    let ids = id_list(&fields);
    let embed_requisites = text(&fields, "with").is_some_and(|with| with.split(',').any(|w| w.trim() == "requisites"));

    let store = db.read().await;
    let requisites_of = |contractor_id: i64| -> Vec<Value> {
        store
            .requisites
            .values()
            .filter(|r| r.get("contractor_id").and_then(Value::as_i64) == Some(contractor_id))
            .map(|r| Value::Object(r.clone()))
            .collect()
    };

    let mut matches = Vec::new();
    for (id, contractor) in store.contractors.iter().filter(|(_, c)| owned_by(c, biz_id)) {
        if let Some(inn) = text(&fields, "inn") {
            let has_inn = requisites_of(*id).iter().any(|r| r.get("inn").and_then(Value::as_str) == Some(inn));
            if !has_inn {
                continue;
            }
        }
        if text(&fields, "email").is_some_and(|email| text(contractor, "email") != Some(email)) {
            continue;
        }
        if let Some(query) = text(&fields, "query") {
            let name = text(contractor, "name").unwrap_or_default().to_lowercase();
            if !name.contains(&query.to_lowercase()) {
                continue;
            }
        }
        if ids.as_ref().is_some_and(|ids| !ids.contains(id)) {
            continue;
        }
        if is_bizzed.is_some_and(|flag| contractor.get("is_bizzed") != Some(&Value::Bool(flag))) {
            continue;
        }

        let mut record = contractor.clone();
        if embed_requisites {
            record.insert("requisites".to_string(), Value::Array(requisites_of(*id)));
        }
        matches.push(Value::Object(record));
    }

    Ok(Json(Value::Array(paginate(matches, &fields))))
}

async fn create_contractor(State(db): State<Db>, Path(biz_id): Path<i64>, body: Bytes) -> Reply {
    let fields = body_fields(&body)?;
    required_text(&fields, "name")?;
    let record = db.write().await.new_contractor(biz_id, &fields);
    info!(biz_id, id = ?record.get("id"), "contractor created");
    Ok(Json(Value::Object(record)))
}

async fn get_contractor(State(db): State<Db>, Path((biz_id, id)): Path<(i64, i64)>) -> Reply {
    let store = db.read().await;
    Ok(Json(Value::Object(find(&store.contractors, biz_id, id)?)))
}

async fn update_contractor(State(db): State<Db>, Path((biz_id, id)): Path<(i64, i64)>, body: Bytes) -> Reply {
    let fields = body_fields(&body)?;
    let mut store = db.write().await;
    find(&store.contractors, biz_id, id)?;
    let record = store.contractors.get_mut(&id).ok_or_else(Failure::not_found)?;
    Store::patch(record, &fields, CONTRACTOR_FIELDS);
    Ok(Json(Value::Object(record.clone())))
}

async fn delete_contractor(State(db): State<Db>, Path((biz_id, id)): Path<(i64, i64)>) -> Reply {
    let mut store = db.write().await;
    let mut record = find(&store.contractors, biz_id, id)?;
    store.contractors.remove(&id);
    store.requisites.retain(|_, r| r.get("contractor_id").and_then(Value::as_i64) != Some(id));
    Store::mark_deleted(&mut record);
    info!(biz_id, id, "contractor deleted");
    Ok(Json(Value::Object(record)))
}

// ---------------------------------------------------------------------------
// Requisites
// ---------------------------------------------------------------------------

async fn list_requisites(State(db): State<Db>, Path(biz_id): Path<i64>, body: Bytes) -> Reply {
    let fields = body_fields(&body)?;
    let is_bizzed = flag(&fields, "is_bizzed")?;
    let ids = id_list(&fields);
    let contractor_id = fields.get("contractor_id").and_then(Value::as_i64);

    let store = db.read().await;
    let matches = store
        .requisites
        .iter()
        .filter(|(_, r)| owned_by(r, biz_id))
        .filter(|(_, r)| contractor_id.is_none() || r.get("contractor_id").and_then(Value::as_i64) == contractor_id)
        .filter(|(id, _)| ids.as_ref().map_or(true, |ids| ids.contains(*id)))
        .filter(|(_, r)| is_bizzed.map_or(true, |flag| r.get("is_bizzed") == Some(&Value::Bool(flag))))
        .map(|(_, r)| Value::Object(r.clone()))
        .collect();
    Ok(Json(Value::Array(matches)))
}

async fn create_requisite(State(db): State<Db>, Path(biz_id): Path<i64>, body: Bytes) -> Reply {
    let fields = body_fields(&body)?;
    required_text(&fields, "name")?;
    let contractor_id = fields
        .get("contractor_id")
        .and_then(Value::as_i64)
        .ok_or_else(|| Failure::invalid("The contractor_id field is required."))?;

    let mut store = db.write().await;
    if find(&store.contractors, biz_id, contractor_id).is_err() {
        return Err(Failure::invalid("The selected contractor_id is invalid."));
    }
    let record = store.new_requisite(biz_id, &fields);
    info!(biz_id, contractor_id, "requisite created");
    Ok(Json(Value::Object(record)))
}

async fn get_requisite(State(db): State<Db>, Path((biz_id, id)): Path<(i64, i64)>) -> Reply {
    let store = db.read().await;
    Ok(Json(Value::Object(find(&store.requisites, biz_id, id)?)))
}

async fn update_requisite(State(db): State<Db>, Path((biz_id, id)): Path<(i64, i64)>, body: Bytes) -> Reply {
    let fields = body_fields(&body)?;
    let mut store = db.write().await;
    find(&store.requisites, biz_id, id)?;
    let record = store.requisites.get_mut(&id).ok_or_else(Failure::not_found)?;
    Store::patch(record, &fields, REQUISITE_FIELDS);
    Ok(Json(Value::Object(record.clone())))
}

async fn delete_requisite(State(db): State<Db>, Path((biz_id, id)): Path<(i64, i64)>) -> Reply {
    let mut store = db.write().await;
    let mut record = find(&store.requisites, biz_id, id)?;
    store.requisites.remove(&id);
    Store::mark_deleted(&mut record);
    Ok(Json(Value::Object(record)))
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

fn has_item(document: &Record, item_id: i64) -> bool {
    document
        .get("package")
        .and_then(|p| p.get("items"))
        .and_then(Value::as_array)
        .is_some_and(|items| items.iter().any(|i| i.get("item_id").and_then(Value::as_i64) == Some(item_id)))
}

async fn list_documents(State(db): State<Db>, Path(biz_id): Path<i64>, body: Bytes) -> Reply {
    let fields = body_fields(&body)?;
    let kind = text(&fields, "kind");
    let template = text(&fields, "template");
    let query = text(&fields, "query");
    let item_id = fields.get("item_id").and_then(Value::as_i64);

    let store = db.read().await;
    let matches = store
        .documents
        .values()
        .filter(|d| owned_by(d, biz_id))
        .filter(|d| kind.is_none() || text(d, "kind") == kind)
        .filter(|d| template.is_none() || text(d, "template") == template)
        .filter(|d| query.map_or(true, |q| text(d, "number").unwrap_or_default().contains(q)))
        .filter(|d| item_id.map_or(true, |item_id| has_item(d, item_id)))
        .map(|d| Value::Object(d.clone()))
        .collect();
    Ok(Json(Value::Array(paginate(matches, &fields))))
}

async fn create_document(State(db): State<Db>, Path(biz_id): Path<i64>, body: Bytes) -> Reply {
    let fields = body_fields(&body)?;
    let items = match fields.get("items").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items.clone(),
        _ => return Err(Failure::invalid("The items field is required.")),
    };
    let record = db.write().await.new_document(biz_id, &fields, &items);
    info!(biz_id, id = ?record.get("id"), lines = items.len(), "document created");
    Ok(Json(Value::Object(record)))
}

async fn get_document(State(db): State<Db>, Path((biz_id, id)): Path<(i64, i64)>) -> Reply {
    let store = db.read().await;
    Ok(Json(Value::Object(find(&store.documents, biz_id, id)?)))
}

async fn update_document(State(db): State<Db>, Path((biz_id, id)): Path<(i64, i64)>, body: Bytes) -> Reply {
    let fields = body_fields(&body)?;
    let mut store = db.write().await;
    find(&store.documents, biz_id, id)?;
    let record = store.documents.get_mut(&id).ok_or_else(Failure::not_found)?;
    Store::patch(record, &fields, DOCUMENT_FIELDS);
    Ok(Json(Value::Object(record.clone())))
}

async fn delete_document(State(db): State<Db>, Path((biz_id, id)): Path<(i64, i64)>) -> Reply {
    let mut store = db.write().await;
    let mut record = find(&store.documents, biz_id, id)?;
    store.documents.remove(&id);
    Store::mark_deleted(&mut record);
    Ok(Json(Value::Object(record)))
}

async fn document_pdf(State(db): State<Db>, Path((biz_id, id)): Path<(i64, i64)>, body: Bytes) -> Reply {
    let fields = body_fields(&body)?;
    let no_sign = flag(&fields, "no_sign")?.unwrap_or(false);
    let mut store = db.write().await;
    find(&store.documents, biz_id, id)?;
    store.render_pdf(id, no_sign).map(Json).ok_or_else(Failure::not_found)
}
