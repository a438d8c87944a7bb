//! GistClient behavior against a mock HTTP server.

use gistrelay::{GistClient, PasteError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GistClient {
    GistClient::new("test-token".to_string(), "paste_bot", false)
        .with_api_base(format!("{}/gists", server.uri()))
}

#[tokio::test]
async fn create_returns_both_links_and_sends_the_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gists"))
        .and(header("Authorization", "token test-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "html_url": "https://gist.github.com/abc123",
            "files": {
                "Gist Paste by @paste_bot": {
                    "raw_url": "https://gist.githubusercontent.com/raw/Gist Paste by @paste_bot"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let paste = client_for(&server).create("hello world").await.unwrap();
    assert_eq!(paste.url, "https://gist.github.com/abc123");
    // Spaces in the raw URL come back percent-encoded.
    assert_eq!(
        paste.raw_url.as_deref(),
        Some("https://gist.githubusercontent.com/raw/Gist%20Paste%20by%20@paste_bot")
    );
}

#[tokio::test]
async fn create_sends_content_under_the_gist_title() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gists"))
        .and(body_partial_json(json!({
            "public": false,
            "files": { "notes.txt": { "content": "hello" } }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "html_url": "https://gist.github.com/abc123",
            "files": { "notes.txt": { "raw_url": "https://gist.githubusercontent.com/raw" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_title("notes.txt".to_string());
    client.create("hello").await.unwrap();
}

#[tokio::test]
async fn visibility_flag_is_passed_through_without_inversion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gists"))
        .and(body_partial_json(json!({ "public": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "html_url": "https://gist.github.com/abc123",
            "files": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GistClient::new("test-token".to_string(), "paste_bot", true)
        .with_api_base(format!("{}/gists", server.uri()));
    client.create("hello").await.unwrap();
}

#[tokio::test]
async fn error_body_on_2xx_is_remote_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Bad credentials"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).create("hello").await.unwrap_err();
    assert_eq!(err, PasteError::RemoteRejected("Bad credentials".to_string()));
}

#[tokio::test]
async fn non_2xx_is_remote_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gists"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).create("hello").await.unwrap_err();
    assert_eq!(err, PasteError::RemoteUnavailable);
}

#[tokio::test]
async fn transport_failure_is_remote_unavailable() {
    // Grab a port that nothing listens on anymore.
    let server = MockServer::start().await;
    let dead_uri = server.uri();
    drop(server);

    let client = GistClient::new("test-token".to_string(), "paste_bot", false)
        .with_api_base(format!("{dead_uri}/gists"));
    let err = client.create("hello").await.unwrap_err();
    assert_eq!(err, PasteError::RemoteUnavailable);
}

#[tokio::test]
async fn missing_html_url_on_2xx_yields_empty_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": {}
        })))
        .mount(&server)
        .await;

    let paste = client_for(&server).create("hello").await.unwrap();
    assert!(paste.url.is_empty());
    assert!(paste.raw_url.is_none());
}

#[tokio::test]
async fn raw_url_falls_back_to_any_file_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gists"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "html_url": "https://gist.github.com/abc123",
            "files": {
                "renamed-by-github.txt": { "raw_url": "https://gist.githubusercontent.com/raw/x" }
            }
        })))
        .mount(&server)
        .await;

    let paste = client_for(&server).create("hello").await.unwrap();
    assert_eq!(
        paste.raw_url.as_deref(),
        Some("https://gist.githubusercontent.com/raw/x")
    );
}

#[tokio::test]
async fn delete_confirms_with_the_gist_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/gists/abc123"))
        .and(header("Authorization", "token test-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let confirmation = client_for(&server).delete("abc123").await.unwrap();
    assert!(confirmation.contains("abc123"));
}

#[tokio::test]
async fn delete_failure_is_remote_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).delete("abc123").await.unwrap_err();
    assert_eq!(err, PasteError::RemoteUnavailable);
}
