use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use cardvault_core::{AlertDirection, CardStore, NewCard, NewPriceAlert};
use cardvault_server::{api::app_router, build_state, config::Config, AppState};
use chrono::Utc;
use rust_decimal_macros::dec;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    _tmp: TempDir,
}

async fn build_test_app(scryfall: &MockServer) -> TestApp {
    let tmp = tempdir().unwrap();
    let config = Config {
        db_path: tmp.path().join("test.db").to_string_lossy().to_string(),
        scryfall_base_url: scryfall.uri(),
        price_spacing: Duration::ZERO,
        monitor_enabled: false,
        ..Config::default()
    };
    let state = build_state(&config).await.unwrap();
    TestApp {
        router: app_router(state.clone(), &config),
        state,
        _tmp: tmp,
    }
}

fn card_json(usd: &str) -> serde_json::Value {
    serde_json::json!({
        "object": "card",
        "name": "Lightning Bolt",
        "set": "m10",
        "collector_number": "146",
        "rarity": "common",
        "colors": ["R"],
        "prices": { "usd": usd, "usd_foil": null, "eur": null, "tix": null }
    })
}

fn new_card(id: &str, owner: &str) -> NewCard {
    NewCard {
        id: Some(id.to_string()),
        owner_id: owner.to_string(),
        name: "Lightning Bolt".to_string(),
        set_code: Some("m10".to_string()),
        collector_number: Some("146".to_string()),
        quantity: 4,
        purchase_price: Some(dec!(1.50)),
        ..Default::default()
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn wait_until_idle(router: &Router, owner: &str) -> serde_json::Value {
    for _ in 0..100 {
        let (_, status) = send(
            router,
            Method::GET,
            &format!("/api/v1/prices/sync/status?ownerId={owner}"),
            None,
        )
        .await;
        if status["active"] == false {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("sync for {owner} did not finish");
}

#[tokio::test]
async fn healthz_returns_ok() {
    let scryfall = MockServer::start().await;
    let app = build_test_app(&scryfall).await;

    let response = app
        .router
        .oneshot(Request::builder().uri("/api/v1/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn sync_updates_prices_and_reports_progress() {
    let scryfall = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cards/m10/146"))
        .respond_with(ResponseTemplate::new(200).set_body_json(card_json("2.00")))
        .mount(&scryfall)
        .await;
    let app = build_test_app(&scryfall).await;
    app.state.card_repository.insert_card(new_card("c1", "u1")).await.unwrap();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/v1/prices/sync",
        Some(serde_json::json!({ "ownerId": "u1" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "started");
    assert_eq!(body["total"], 1);

    let progress = wait_until_idle(&app.router, "u1").await;
    assert_eq!(progress["phase"], "complete");
    assert_eq!(progress["current"], 1);
    assert_eq!(progress["updatedCount"], 1);

    let card = app.state.card_repository.get_card("c1").unwrap().unwrap();
    assert_eq!(card.market_price, Some(dec!(2.00)));
    assert_eq!(card.total_value, Some(dec!(8.00)));
    assert_eq!(card.price_change, Some(dec!(0.50)));
}

#[tokio::test]
async fn second_sync_for_same_owner_conflicts() {
    let scryfall = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cards/m10/146"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(card_json("2.00"))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&scryfall)
        .await;
    let app = build_test_app(&scryfall).await;
    app.state.card_repository.insert_card(new_card("c1", "u1")).await.unwrap();
    app.state.card_repository.insert_card(new_card("c2", "u1")).await.unwrap();

    let request = serde_json::json!({ "ownerId": "u1" });
    let (first, _) = send(&app.router, Method::POST, "/api/v1/prices/sync", Some(request.clone())).await;
    assert_eq!(first, StatusCode::ACCEPTED);

    let (second, body) = send(&app.router, Method::POST, "/api/v1/prices/sync", Some(request)).await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["code"], "already_running");

    wait_until_idle(&app.router, "u1").await;
}

#[tokio::test]
async fn status_of_unknown_owner_is_idle() {
    let scryfall = MockServer::start().await;
    let app = build_test_app(&scryfall).await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/v1/prices/sync/status?ownerId=nobody",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);
    assert_eq!(body["phase"], "idle");
}

#[tokio::test]
async fn alerts_are_listed_and_marked_read_per_owner() {
    let scryfall = MockServer::start().await;
    let app = build_test_app(&scryfall).await;
    let repo = app.state.card_repository.clone();
    repo.insert_card(new_card("c1", "u1")).await.unwrap();
    let alert = repo
        .record_alert(NewPriceAlert {
            card_id: "c1".to_string(),
            owner_id: "u1".to_string(),
            card_name: "Lightning Bolt".to_string(),
            alert_type: "price_change".to_string(),
            threshold_value: dec!(5),
            previous_value: dec!(2.00),
            current_value: dec!(2.40),
            change_pct: dec!(20.00),
            direction: AlertDirection::Up,
            triggered_at: Utc::now(),
        })
        .await
        .unwrap();

    let (status, body) = send(&app.router, Method::GET, "/api/v1/alerts?ownerId=u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["direction"], "up");

    let (status, body) = send(
        &app.router,
        Method::POST,
        &format!("/api/v1/alerts/{}/read?ownerId=u2", alert.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = send(
        &app.router,
        Method::POST,
        &format!("/api/v1/alerts/{}/read?ownerId=u1", alert.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(
        &app.router,
        Method::GET,
        "/api/v1/alerts?ownerId=u1&unreadOnly=true",
        None,
    )
    .await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}
