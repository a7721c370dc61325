use serde_json::{Value, json};
use verdant_http::{Auth, HttpClient, HttpError, RequestOpts};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(&format!("{}/", server.uri()))
        .expect("valid base")
        .with_retries(2)
}

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/claims/detect"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/claims/detect"))
        .and(body_json(json!({"text": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let got: Value = client_for(&server)
        .post_json(
            "api/claims/detect",
            &json!({"text": "hello"}),
            RequestOpts::default(),
        )
        .await
        .expect("second attempt succeeds");
    assert_eq!(got, json!({"ok": true}));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nlp/status"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": "Text/content is required"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_json::<Value>("api/nlp/status", RequestOpts::default())
        .await
        .unwrap_err();

    match err {
        HttpError::Api { status, message, .. } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "Text/content is required");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bearer_token_is_sent_sanitized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nlp/status"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ready"})))
        .expect(1)
        .mount(&server)
        .await;

    let opts = RequestOpts {
        auth: Some(Auth::Bearer(" \"secret-token\"\n")),
        ..Default::default()
    };
    let got: Value = client_for(&server)
        .get_json("api/nlp/status", opts)
        .await
        .expect("authorized");
    assert_eq!(got["status"], "ready");
}

#[tokio::test]
async fn undecodable_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_json::<Value>("anything", RequestOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Decode(_, ref snip) if snip.contains("oops")));
}
