#![allow(unused_crate_dependencies)]
#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::unwrap_used, reason = "integration test: panics are the assertion mechanism")]

use errorx_core::modules::events::{drain, notices};
use errorx_core::{ClientContext, ClientEvent, CoreError, Outcome};
use errorx_types::ClientConfig;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "msg": "ok", "data": data }))
}

async fn mount(server: &MockServer, verb: &str, route: &str, response: ResponseTemplate) {
    Mock::given(method(verb)).and(path(route)).respond_with(response).mount(server).await;
}

fn context_for(server: &MockServer) -> ClientContext {
    let config = ClientConfig { service_url: server.uri(), ..ClientConfig::default() };
    ClientContext::connect(config).unwrap()
}

#[tokio::test]
async fn test_login_and_license_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/license/validate"))
        .and(body_json(json!({ "key": "ABCD-EFGH" })))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;
    mount(&server, "POST", "/api/tray/show", ok(Value::Null)).await;
    mount(
        &server,
        "GET",
        "/api/license/info",
        ok(json!({
            "license_key": "ABCD-EFGH",
            "start_time": "2099-01-01T00:00:00",
            "subscription_type": "30D",
            "allowed_platform": "windows",
            "windows_device": { "is_active": true }
        })),
    )
    .await;

    let ctx = context_for(&server);
    let mut rx = ctx.events().subscribe();

    let credentials = ctx.sign_in("  ABCD-EFGH ").await.unwrap();
    assert_eq!(credentials.license_key, "ABCD-EFGH");
    assert!(drain(&mut rx).contains(&ClientEvent::NavigateHome));

    let record = ctx.monitor().load().await.unwrap();
    assert_eq!(record.subscription_type.label(), "1MONTH");
    assert!(record.is_device_active);
}

#[tokio::test]
async fn test_unreachable_service_reports_login_unavailable() {
    let config =
        ClientConfig { service_url: "http://127.0.0.1:9".to_string(), ..ClientConfig::default() };
    let ctx = ClientContext::connect(config).unwrap();

    let err = ctx.sign_in("ABCD-EFGH").await.unwrap_err();
    assert!(matches!(err, CoreError::LoginUnavailable(_)));
    assert_eq!(err.to_string(), "Failed to validate license. Please try again.");
    assert!(!ctx.session().is_authenticated());
}

#[tokio::test]
async fn test_select_over_http_surfaces_backend_rejection() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/api/profiles",
        ok(json!({
            "current": "a",
            "items": [{ "uid": "a", "type": "local", "name": "A" }]
        })),
    )
    .await;
    mount(
        &server,
        "PATCH",
        "/api/profiles/current",
        ResponseTemplate::new(200)
            .set_body_json(json!({ "code": 1, "msg": "profile not found", "data": null })),
    )
    .await;

    let ctx = context_for(&server);
    ctx.profiles().refresh().await.unwrap();
    let mut rx = ctx.events().subscribe();

    let outcome = ctx.profiles().select("b", false).await;
    assert!(matches!(outcome, Outcome::Failed(ref msg) if msg.contains("profile not found")));
    assert_eq!(ctx.profiles().profiles().current.as_deref(), Some("a"));

    let events = drain(&mut rx);
    assert_eq!(notices(&events).len(), 1);
}
