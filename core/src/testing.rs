//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::api::{ApiService, BASE_URL};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};

#[derive(Default)]
struct State {
    responses: VecDeque<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// Records every request and answers from a queue of canned responses.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    state: Arc<Mutex<State>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request.
    pub fn respond(&self, status: u16, body: &str) {
        self.state.lock().unwrap().responses.push_back(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn single_request(&self) -> HttpRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request, got {requests:?}");
        requests.into_iter().next().unwrap()
    }

    pub fn sent_body(&self, index: usize) -> serde_json::Value {
        let request = &self.requests()[index];
        serde_json::from_str(request.body.as_deref().unwrap_or("null")).unwrap()
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        state
            .responses
            .pop_front()
            .ok_or_else(|| ApiError::Transport("no canned response queued".to_string()))
    }
}

/// An `ApiService` against the production base URL backed by `transport`.
pub fn api(transport: &RecordingTransport) -> Arc<ApiService> {
    Arc::new(ApiService::new("secret", BASE_URL, Box::new(transport.clone())))
}

pub fn contractor_json(id: i64, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id, "biz_id": 42, "name": name, "email": null, "phone": null,
        "person": null, "description": null,
        "created_at": "2024-03-01 09:30:00", "updated_at": "2024-03-01 09:30:00",
        "created_by_id": 1, "updated_by_id": 1, "deleted_at": null,
        "deleted_by_id": null, "alien_id": null, "is_bizzed": false,
        "group_id": null, "autoeditor_id": null, "summary": []
    })
}

pub fn requisite_json(id: i64, contractor_id: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id, "contractor_id": contractor_id, "name": "Main", "description": null,
        "full_name": null, "inn": "7701234567", "kpp": null, "bank_name": null,
        "bank_bic": null, "bank_ks": null, "bank_account": null,
        "address_postal_index": null, "address_city": null, "address_street": null,
        "created_at": "2024-03-01 09:30:00", "updated_at": "2024-03-01 09:30:00",
        "created_by_id": 1, "updated_by_id": 1, "deleted_at": null, "deleted_by_id": null,
        "email": null, "web": null, "phone": null, "is_bizzed": false,
        "bank_iban": null, "bank_mfo": null, "country_id": 1, "biz_id": 42
    })
}

pub fn document_json(id: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id, "biz_id": 42, "kind": "invoice", "from_contractor_id": 7,
        "from_requisite_id": 11, "to_contractor_id": 8, "to_requisite_id": null,
        "package_id": 3, "number": "INV-1", "date": "2024-03-01", "comment": null,
        "description": null, "status": "draft", "token": "tok", "pdf": null,
        "payload": null, "created_at": "2024-03-01 09:30:00",
        "updated_at": "2024-03-01 09:30:00", "deleted_at": null, "created_by_id": 1,
        "updated_by_id": 1, "deleted_by_id": null, "template": "ru", "file_id": null,
        "model_id": null, "model_type": null, "to_contractor_draft": null,
        "type": "out", "qr_code_string": null, "package": null,
        "from_contractor": null, "from_requisite": null, "to_contractor": null,
        "to_requisite": null, "file": null
    })
}
