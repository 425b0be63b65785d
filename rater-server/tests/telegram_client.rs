//! Bot API client tests against a wiremock server.

use rater_server::telegram::TelegramClient;
use rater_server::transport::{Keyboard, TextFormat, Transport, TransportError};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123:abc";

fn client(server: &MockServer) -> TelegramClient {
    TelegramClient::with_base_url(TOKEN.to_string(), server.uri(), 1)
        .expect("Failed to create client")
}

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": result }))
}

#[tokio::test]
async fn test_get_me_reads_bot_username() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/getMe"))
        .respond_with(ok(json!({
            "id": 123,
            "is_bot": true,
            "first_name": "Rater",
            "username": "rater_bot"
        })))
        .mount(&server)
        .await;

    let me = client(&server).get_me().await.unwrap();
    assert_eq!(me.id, 123);
    assert_eq!(me.username.as_deref(), Some("rater_bot"));
}

#[tokio::test]
async fn test_get_updates_parses_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/getUpdates"))
        .and(body_json(json!({
            "offset": 11,
            "timeout": 1,
            "allowed_updates": ["message"],
        })))
        .respond_with(ok(json!([
            {
                "update_id": 11,
                "message": {
                    "message_id": 1,
                    "from": { "id": 42, "first_name": "Ada", "last_name": "Lovelace" },
                    "chat": { "id": 42 },
                    "text": "/get_text"
                }
            },
            {
                "update_id": 12,
                "message": {
                    "message_id": 2,
                    "from": { "id": 42, "first_name": "Ada" },
                    "chat": { "id": 42 },
                    "document": { "file_id": "F1", "file_name": "batch.tsv" }
                }
            }
        ])))
        .mount(&server)
        .await;

    let updates = client(&server).get_updates(Some(11)).await.unwrap();
    assert_eq!(updates.len(), 2);

    let first = updates[0].message.as_ref().unwrap();
    assert_eq!(first.text.as_deref(), Some("/get_text"));
    assert_eq!(first.from.as_ref().unwrap().full_name(), "Ada Lovelace");

    let second = updates[1].message.as_ref().unwrap();
    let document = second.document.as_ref().unwrap();
    assert_eq!(document.file_id, "F1");
    assert_eq!(document.file_name.as_deref(), Some("batch.tsv"));
}

#[tokio::test]
async fn test_send_text_with_html_and_keyboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_json(json!({
            "chat_id": 42,
            "text": "<b>Tag</b>: A",
            "parse_mode": "HTML",
            "reply_markup": {
                "keyboard": [[{ "text": "Evaluate" }]],
                "resize_keyboard": true,
                "one_time_keyboard": false,
            }
        })))
        .respond_with(ok(json!({ "message_id": 5 })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_text(
            42,
            "<b>Tag</b>: A",
            TextFormat::Html,
            &Keyboard::single_row(&["Evaluate"], false),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_text_plain_omits_parse_mode_and_markup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_json(json!({ "chat_id": 42, "text": "hi" })))
        .respond_with(ok(json!({ "message_id": 6 })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_text(42, "hi", TextFormat::Plain, &Keyboard::Unchanged)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_api_error_maps_to_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .mount(&server)
        .await;

    let result = client(&server)
        .send_text(42, "hi", TextFormat::Plain, &Keyboard::Remove)
        .await;
    match result {
        Err(TransportError::Api { code, description }) => {
            assert_eq!(code, 403);
            assert!(description.contains("blocked"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_download_document_resolves_file_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/getFile"))
        .and(body_json(json!({ "file_id": "F1" })))
        .respond_with(ok(json!({ "file_id": "F1", "file_path": "documents/file_1.tsv" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file/bot123:abc/documents/file_1.tsv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"Class\tText\nA\thello\n".to_vec()))
        .mount(&server)
        .await;

    let bytes = client(&server).download_document("F1").await.unwrap();
    assert_eq!(bytes, b"Class\tText\nA\thello\n");
}

#[tokio::test]
async fn test_send_photo_fetches_image_then_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/kitten.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake-jpeg".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendPhoto"))
        .and(body_string_contains("Get the kitten"))
        .respond_with(ok(json!({ "message_id": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/images/kitten.jpg", server.uri());
    client(&server)
        .send_photo_from_url(42, &url, Some("Get the kitten for now :)"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_photo_fails_when_image_is_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/kitten.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/images/kitten.jpg", server.uri());
    let result = client(&server).send_photo_from_url(42, &url, None).await;
    assert!(matches!(result, Err(TransportError::Http(_))));
}

#[tokio::test]
async fn test_send_document_uploads_named_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendDocument"))
        .and(body_string_contains("interaction.csv"))
        .and(body_string_contains("item_id,relevance,quality"))
        .respond_with(ok(json!({ "message_id": 8 })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_document(42, "interaction.csv", b"item_id,relevance,quality\n".to_vec())
        .await
        .unwrap();
}
