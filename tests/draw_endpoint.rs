use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use std::sync::mpsc::Receiver;
use text_overlay::overlay::{OverlayCommand, OverlayDispatcher};
use text_overlay::server::handlers::text_param;
use text_overlay::server::{router, DrawState};
use text_overlay::text::SharedText;
use tower::ServiceExt;

fn app(enable_cors: bool) -> (Router, SharedText, Receiver<OverlayCommand>) {
    let text = SharedText::default();
    let (dispatcher, rx) = OverlayDispatcher::channel();
    let state = DrawState {
        text: text.clone(),
        dispatcher,
    };
    (router(state, enable_cors), text, rx)
}

fn assert_cors_headers(response: &axum::response::Response) {
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn draw_stores_and_dispatches_text() {
    let (app, text, rx) = app(true);

    let response = app.oneshot(get("/draw?text=Hello%20World")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors_headers(&response);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body_string(response).await, "Text updated");

    assert_eq!(text.get(), "Hello World");
    assert_eq!(
        rx.try_recv().unwrap(),
        OverlayCommand::SetText("Hello World".into())
    );
}

#[tokio::test]
async fn missing_text_clears_the_overlay() {
    let (app, text, rx) = app(true);

    let response = app.oneshot(get("/draw")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text.get(), "");
    assert_eq!(rx.try_recv().unwrap(), OverlayCommand::SetText(String::new()));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (app, text, rx) = app(true);

    let response = app.oneshot(get("/other?text=x")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors_headers(&response);
    assert_eq!(body_string(response).await, "Not found");
    assert_eq!(text.get(), "READY");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn cors_preflight_is_accepted() {
    let (app, _text, _rx) = app(true);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/draw")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_string();
    assert!(methods.contains("GET"));
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "content-type"
    );
}

#[tokio::test]
async fn plain_options_on_any_path_is_ok() {
    let (app, _text, _rx) = app(false);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/anything")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .is_none());
}

#[tokio::test]
async fn text_is_stored_even_without_an_overlay() {
    let (app, text, rx) = app(true);
    drop(rx);

    let response = app.oneshot(get("/draw?text=late")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text.get(), "late");
}

#[test]
fn text_param_follows_form_decoding() {
    assert_eq!(text_param(Some("text=a+b%21")), "a b!");
    assert_eq!(text_param(Some("text=first&text=second")), "first");
    assert_eq!(text_param(Some("text=&text=kept")), "kept");
    assert_eq!(text_param(Some("other=1")), "");
    assert_eq!(text_param(Some("text=%E2%9C%93")), "✓");
    assert_eq!(text_param(None), "");
}
