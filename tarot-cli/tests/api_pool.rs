//! Backend client tests against a mock HTTP server.

use std::sync::Arc;

use serde_json::json;
use tarot_cli::{ApiClient, RemoteError};
use tarot_core::{CardPool, CardSession, PoolError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cards_json() -> serde_json::Value {
    json!([
        {
            "id": "major-17",
            "name": "Der Stern",
            "image": { "type": "remote", "url": "https://cdn.example/17.png" },
            "explanation": "Hoffnung",
            "showFront": true
        },
        {
            "id": "major-19",
            "name": "Die Sonne",
            "image": { "type": "remote", "url": "https://cdn.example/19.png" },
            "explanation": "Freude"
        },
        {
            "id": "major-21",
            "name": "Die Welt",
            "image": { "type": "bundled", "key": "major/21" }
        }
    ])
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn random_cards_are_dealt_face_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cards/random"))
        .and(query_param("count", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cards_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/api", server.uri())).expect("client");
    let cards = client.draw_cards(3).await.expect("cards");

    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0].name, "Der Stern");
    assert!(cards.iter().all(|card| !card.show_front && !card.is_selected));
    assert!(cards[2].explanation.is_none());
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn server_error_becomes_session_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cards/random"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("client");
    assert!(matches!(
        client.random_cards(3).await,
        Err(RemoteError::Status(503))
    ));
    assert!(matches!(
        client.draw_cards(3).await,
        Err(PoolError::Unavailable(_))
    ));

    let session = CardSession::new(Arc::new(client));
    session.start_session().await;
    let state = session.snapshot();
    assert!(!state.session_started);
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("API returned status 503"));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn save_reading_posts_cards() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/readings"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("client");
    let cards: Vec<tarot_core::Card> =
        serde_json::from_value(cards_json()).expect("cards parse");
    client.save_reading(&cards).await.expect("saved");
}
