use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use proptest::prelude::*;
use serde_json::{json, Value};
use shelf_app::books::{store::BookStore, BooksModule};
use shelf_kernel::{settings::Settings, ModuleRegistry};
use tower::ServiceExt; // for oneshot

fn app_with_store(store: BookStore) -> Router {
    let mut registry = ModuleRegistry::new();
    registry
        .register(Arc::new(BooksModule::with_store(store)))
        .unwrap();
    shelf_http::build_router(&registry, &Settings::default())
}

fn app() -> Router {
    app_with_store(BookStore::new())
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        panic!(
            "non-JSON body for {} {}: {}",
            method,
            uri,
            String::from_utf8_lossy(&bytes)
        )
    });
    (status, body)
}

#[tokio::test]
async fn root_returns_greeting() {
    let app = app();

    let (status, body) = send(&app, "GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Hello from FastAPI CI/CD!" }));
}

#[tokio::test]
async fn create_get_delete_scenario() {
    let app = app();

    let (status, body) = send(&app, "POST", "/books/1?title=Dune").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 1, "title": "Dune" }));

    let (_, body) = send(&app, "GET", "/books/1").await;
    assert_eq!(body, json!({ "id": 1, "title": "Dune" }));

    let (status, body) = send(&app, "DELETE", "/books/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Deleted" }));

    let (status, body) = send(&app, "GET", "/books/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 1, "title": "Not Found" }));
}

#[tokio::test]
async fn update_overwrites_previous_title() {
    let app = app();

    send(&app, "POST", "/books/5?title=Dune").await;
    let (status, body) = send(&app, "PUT", "/books/5?title=Children%20of%20Dune").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 5, "title": "Children of Dune" }));

    let (_, body) = send(&app, "GET", "/books/5").await;
    assert_eq!(body["title"], "Children of Dune");
}

#[tokio::test]
async fn update_of_absent_id_inserts() {
    let app = app();

    send(&app, "PUT", "/books/9?title=Hyperion").await;
    let (_, body) = send(&app, "GET", "/books/9").await;
    assert_eq!(body, json!({ "id": 9, "title": "Hyperion" }));
}

#[tokio::test]
async fn absent_id_reports_placeholder() {
    let app = app();

    let (status, body) = send(&app, "GET", "/books/404").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 404, "title": "Not Found" }));
}

#[tokio::test]
async fn delete_of_absent_id_still_acknowledges() {
    let app = app();

    let (status, body) = send(&app, "DELETE", "/books/77").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Deleted" }));

    let (_, body) = send(&app, "GET", "/books/77").await;
    assert_eq!(body["title"], "Not Found");
}

#[tokio::test]
async fn list_contains_latest_titles() {
    let app = app();

    let (_, body) = send(&app, "GET", "/books").await;
    assert_eq!(body, json!({}));

    send(&app, "POST", "/books/2?title=Solaris").await;
    send(&app, "POST", "/books/1?title=Dune").await;
    send(&app, "POST", "/books/3?title=Ubik").await;
    send(&app, "PUT", "/books/2?title=Solaris%20(1961)").await;

    let (status, body) = send(&app, "GET", "/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "1": "Dune", "2": "Solaris (1961)", "3": "Ubik" })
    );
}

#[tokio::test]
async fn negative_ids_are_accepted() {
    let app = app();

    let (_, body) = send(&app, "POST", "/books/-3?title=Negative").await;
    assert_eq!(body, json!({ "id": -3, "title": "Negative" }));
}

#[tokio::test]
async fn empty_title_is_stored() {
    let app = app();

    let (status, body) = send(&app, "POST", "/books/4?title=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 4, "title": "" }));
}

#[tokio::test]
async fn non_integer_id_is_validation_error() {
    let app = app();

    let (status, body) = send(&app, "GET", "/books/abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["details"][0]["location"], "path");
}

#[tokio::test]
async fn missing_title_is_validation_error() {
    let store = BookStore::new();
    let app = app_with_store(store.clone());

    let (status, body) = send(&app, "POST", "/books/1").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"][0]["location"], "query");
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn handlers_share_the_injected_store() {
    let store = BookStore::new();
    store.put(12, "Seeded").unwrap();
    let app = app_with_store(store.clone());

    let (_, body) = send(&app, "GET", "/books/12").await;
    assert_eq!(body["title"], "Seeded");

    send(&app, "DELETE", "/books/12").await;
    assert_eq!(store.get(12).unwrap(), None);
}

#[tokio::test]
async fn separate_apps_are_isolated() {
    let first = app();
    let second = app();

    send(&first, "POST", "/books/1?title=Dune").await;
    let (_, body) = send(&second, "GET", "/books/1").await;
    assert_eq!(body["title"], "Not Found");
}

#[tokio::test]
async fn openapi_lists_book_routes() {
    let app = app();

    let (status, body) = send(&app, "GET", "/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books"]["get"].is_object());
    assert!(body["paths"]["/books/{book_id}"]["post"].is_object());
    assert!(body["components"]["schemas"]["Book"].is_object());
}

#[tokio::test]
async fn concurrent_writes_all_land() {
    let store = BookStore::new();
    let app = app_with_store(store.clone());

    let tasks: Vec<_> = (0..32)
        .map(|id| {
            let app = app.clone();
            tokio::spawn(async move {
                send(&app, "POST", &format!("/books/{id}?title=t{id}")).await
            })
        })
        .collect();

    for task in tasks {
        let (status, _) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(store.len().unwrap(), 32);
}

#[tokio::test]
async fn health_segment_is_treated_as_book_id() {
    let app = app();

    for (method, uri) in [
        ("GET", "/books/health"),
        ("POST", "/books/health?title=x"),
        ("PUT", "/books/health?title=x"),
        ("DELETE", "/books/health"),
    ] {
        let (status, body) = send(&app, method, uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{method} {uri}");
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["details"][0]["location"], "path");
    }
}

#[tokio::test]
async fn unsupported_method_returns_error_envelope() {
    let app = app();

    for (method, uri) in [("PATCH", "/books/1"), ("POST", "/books"), ("DELETE", "/")] {
        let (status, body) = send(&app, method, uri).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(body["error"]["code"], "method_not_allowed");
    }
}

#[tokio::test]
async fn repeated_title_keeps_last_value() {
    let app = app();

    let (status, body) = send(&app, "POST", "/books/1?title=a&title=b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 1, "title": "b" }));

    let (_, body) = send(&app, "PUT", "/books/1?title=c&lang=en&title=d").await;
    assert_eq!(body["title"], "d");

    let (_, body) = send(&app, "GET", "/books/1").await;
    assert_eq!(body["title"], "d");
}

#[tokio::test]
async fn other_query_params_without_title_are_rejected() {
    let app = app();

    let (status, body) = send(&app, "POST", "/books/1?name=Dune").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"][0]["field"], "title");
}

fn encode_query_value(value: &str) -> String {
    value.replace(' ', "%20")
}

proptest! {
    #[test]
    fn create_get_delete_over_http(id in any::<i64>(), title in "[A-Za-z0-9 ._-]{0,32}") {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let result: Result<(), TestCaseError> = runtime.block_on(async move {
            let app = app();
            let uri = format!("/books/{id}");

            let (status, body) =
                send(&app, "POST", &format!("{uri}?title={}", encode_query_value(&title))).await;
            prop_assert_eq!(status, StatusCode::OK);
            prop_assert_eq!(&body, &json!({ "id": id, "title": title }));

            let (_, body) = send(&app, "GET", &uri).await;
            prop_assert_eq!(&body["title"], &json!(title));

            let (_, body) = send(&app, "DELETE", &uri).await;
            prop_assert_eq!(&body, &json!({ "message": "Deleted" }));

            let (_, body) = send(&app, "GET", &uri).await;
            prop_assert_eq!(&body, &json!({ "id": id, "title": "Not Found" }));
            Ok(())
        });
        result?;
    }

    #[test]
    fn update_after_create_keeps_last_write(
        id in any::<i64>(),
        first in "[a-z]{1,12}",
        second in "[a-z]{1,12}",
    ) {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let result: Result<(), TestCaseError> = runtime.block_on(async move {
            let app = app();
            let uri = format!("/books/{id}");

            send(&app, "POST", &format!("{uri}?title={first}")).await;
            send(&app, "PUT", &format!("{uri}?title={second}")).await;

            let (_, body) = send(&app, "GET", &uri).await;
            prop_assert_eq!(&body["title"], &json!(second));
            Ok(())
        });
        result?;
    }
}
