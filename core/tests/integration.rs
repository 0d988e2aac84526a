//! Full client lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every resource
//! service over real HTTP through the default `UreqTransport`.

use finolog::{ApiError, ContractorLookup, FinologClient, Payload};

fn start_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/v1/")
}

#[test]
fn full_lifecycle() {
    let base_url = start_mock_server();
    let client = FinologClient::with_base_url("test-token", 7, &base_url);

    // Step 1: countries are account-agnostic.
    let countries = client.country().get_countries().unwrap();
    assert!(countries.iter().any(|c| c.code == "RU"));

    // Step 2: unknown inn creates a contractor from defaults.
    let lookup = client
        .contractor()
        .get_or_create_by_inn("7701234567", Payload::new().with("name", "Acme").with("email", "ops@acme.test"))
        .unwrap();
    assert!(lookup.created());
    let acme = match lookup {
        ContractorLookup::Created(contractor) => contractor,
        other => panic!("expected Created, got {other:?}"),
    };
    assert_eq!(acme.name, "Acme");
    assert_eq!(acme.biz_id, 7);

    // Step 3: attach a requisite carrying the inn.
    let requisite = client
        .requisite()
        .create_requisite(
            acme.id,
            "Main",
            Payload::new()
                .with("inn", "7701234567")
                .with("kpp", "770101001")
                .with("bank_account", "40702810900000000001")
                .with("bank_bic", "044525225"),
        )
        .unwrap();
    assert_eq!(requisite.contractor_id, acme.id);

    // Step 4: the same inn now resolves to the existing contractor.
    let lookup = client
        .contractor()
        .get_or_create_by_inn("7701234567", Payload::new().with("name", "Duplicate"))
        .unwrap();
    assert!(!lookup.created());
    let matches = lookup.into_contractors();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].requisites[0].id, requisite.id);

    // Step 5: boolean filters travel as strings and are accepted.
    let bizzed = client
        .contractor()
        .get_contractors(Payload::new().with("is_bizzed", false))
        .unwrap();
    assert_eq!(bizzed.len(), 1);
    let requisites = client
        .requisite()
        .get_requisites(Payload::new().with("contractor_id", acme.id).with("is_bizzed", false))
        .unwrap();
    assert_eq!(requisites.len(), 1);

    // Step 6: update contractor and requisite.
    let renamed = client
        .contractor()
        .update_contractor(acme.id, Payload::new().with("name", "Acme Ltd"))
        .unwrap();
    assert_eq!(renamed.name, "Acme Ltd");
    let requisite = client
        .requisite()
        .update_requisite(requisite.id, Payload::new().with("address_city", "Moscow"))
        .unwrap();
    assert_eq!(requisite.address_city.as_deref(), Some("Moscow"));

    // Step 7: create a document and fetch its PDF.
    let items = vec![Payload::new()
        .with("id", -1)
        .with("item_id", 134204)
        .with("count", 2)
        .with("price", 150.5)
        .with("price_currency_id", 1)
        .with("item_name", "Flour")];
    let document = client
        .document()
        .create_document(
            items,
            Payload::new()
                .with("kind", "invoice")
                .with("to_contractor_id", acme.id)
                .with("to_requisite_id", requisite.id)
                .with("number", "INV-1"),
        )
        .unwrap();
    let package = document.package.as_ref().unwrap();
    assert_eq!(package.total_price, 301.0);
    assert_eq!(package.items[0].item_name, "Flour");

    let pdf = client.document().get_document_pdf(document.id, Some(true)).unwrap();
    assert_eq!(pdf.id, document.id);
    assert_eq!(pdf.r#type, "Document");
    assert_ne!(pdf.biz_id, document.id);

    let fetched = client.document().get_document(document.id).unwrap();
    assert_eq!(fetched.file_id, Some(pdf.biz_id));

    // Step 8: update and list documents.
    let paid = client
        .document()
        .update_document(document.id, Payload::new().with("status", "paid"))
        .unwrap();
    assert_eq!(paid.status, "paid");
    let invoices = client
        .document()
        .get_documents(Payload::new().with("kind", "invoice"))
        .unwrap();
    assert_eq!(invoices.len(), 1);

    // Step 9: delete everything; deletions return the last state.
    let deleted = client.document().delete_document(document.id).unwrap();
    assert!(deleted.deleted_at.is_some());
    let deleted = client.requisite().delete_requisite(requisite.id).unwrap();
    assert!(deleted.deleted_at.is_some());
    let deleted = client.contractor().delete_contractor(acme.id).unwrap();
    assert!(deleted.is_deleted());

    // Step 10: every get/update/delete on a gone id is NotFound.
    let err = client.contractor().get_contractor(acme.id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    let err = client
        .contractor()
        .update_contractor(acme.id, Payload::new().with("name", "Ghost"))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    let err = client.document().get_document_pdf(document.id, None).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    let err = client.requisite().delete_requisite(requisite.id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    client.close();
}

#[test]
fn validation_failures_never_reach_the_server() {
    let base_url = start_mock_server();
    let client = FinologClient::with_base_url("test-token", 7, &base_url);

    let err = client
        .requisite()
        .create_requisite(1, "Main", Payload::new().with("inn", "123").with("kpp", 770101001))
        .unwrap_err();
    assert_eq!(err.field_errors().len(), 2);

    let err = client.document().create_document(Vec::new(), Payload::new()).unwrap_err();
    assert!(matches!(err, ApiError::MissingField(_)));

    // Nothing was created by the rejected calls.
    assert!(client.requisite().get_requisites(Payload::new()).unwrap().is_empty());
    assert!(client.document().get_documents(Payload::new()).unwrap().is_empty());
}

#[test]
fn missing_token_surfaces_as_http_error() {
    let base_url = start_mock_server();
    let client = FinologClient::with_base_url("", 7, &base_url);
    let err = client.country().get_countries().unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 401, .. }));
}

#[test]
fn non_integer_biz_id_fails_without_network() {
    let err = FinologClient::parse("test-token", "abc").err().unwrap();
    assert!(matches!(err, ApiError::InvalidId { .. }));
}
