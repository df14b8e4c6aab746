use super::*;
use async_trait::async_trait;
use core::sync::atomic::{AtomicUsize, Ordering};
use serde_json::json;

enum Behavior {
    Reply(String),
    Fail(StatusCode),
    Hang,
}

/// Stand-in for the model service that records how often it was called.
struct Stub {
    behavior: Behavior,
    calls: AtomicUsize,
}

#[async_trait]
impl Llm for Stub {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(prompt.contains("Only return the valid JSON array"));
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(status) => Err(UpstreamError::Status(*status)),
            Behavior::Hang => core::future::pending().await,
        }
    }
}

fn api(behavior: Behavior) -> Api<Stub> {
    Api::new(Stub { behavior, calls: AtomicUsize::new(0) }, Duration::from_millis(50))
}

fn calls(api: &Api<Stub>) -> usize {
    api.llm.calls.load(Ordering::SeqCst)
}

fn questions() -> Value {
    let items: Vec<_> = ["ephemeral", "lucid", "candor", "wary", "mirth"]
        .iter()
        .flat_map(|word| [word, word])
        .enumerate()
        .map(|(i, word)| {
            let question = format!("{}. Which word best matches \"{word}\"?", i + 1);
            let answer = ["A", "B", "C", "D"][i % 4];
            json!({
                "question": question,
                "options": ["A. One", "B. Two", "C. Three", "D. Four"],
                "correct_answer": answer,
            })
        })
        .collect();
    Value::Array(items)
}

fn post(body: &str) -> Request<Full<Bytes>> {
    Request::post("/generate-questions/").body(Full::new(Bytes::from(body.to_owned()))).unwrap()
}

const FIVE_WORDS: &str = r#"{"srcLang":"English","words":["ephemeral","lucid","candor","wary","mirth"]}"#;

async fn read(res: Response<Full<Bytes>>) -> (StatusCode, Value) {
    let status = res.status();
    assert_eq!(res.headers().get(CONTENT_TYPE).unwrap(), "application/json");
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test(flavor = "current_thread")]
async fn returns_clean_reply_unchanged() {
    let expected = questions();
    let api = api(Behavior::Reply(serde_json::to_string_pretty(&expected).unwrap()));
    let (status, body) = read(api.respond(post(FIVE_WORDS)).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, expected);
    assert_eq!(calls(&api), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn repairs_fenced_reply() {
    let expected = questions();
    let fenced = format!("```json\n{}\n```", serde_json::to_string(&expected).unwrap());
    let api = api(Behavior::Reply(fenced));
    let (status, body) = read(api.respond(post(FIVE_WORDS)).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, expected);
}

#[tokio::test(flavor = "current_thread")]
async fn malformed_entries_are_returned_as_is() {
    let reply = r#"[{"question": "1. Q", "options": ["A. a", "B. b"], "correct_answer": 2}]"#;
    let api = api(Behavior::Reply(reply.to_owned()));
    let (status, body) = read(api.respond(post(FIVE_WORDS)).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "question": "1. Q", "options": ["A. a", "B. b"], "correct_answer": 2 }]));
}

#[tokio::test(flavor = "current_thread")]
async fn four_words_are_rejected_before_the_model() {
    let api = api(Behavior::Reply("[]".to_owned()));
    let body = r#"{"srcLang":"English","words":["ephemeral","lucid","candor","wary"]}"#;
    let (status, body) = read(api.respond(post(body)).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Exactly 5 words are required, got 4." }));
    assert_eq!(calls(&api), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn blank_language_is_rejected_before_the_model() {
    let api = api(Behavior::Reply("[]".to_owned()));
    let body = r#"{"srcLang":" ","words":["a","b","c","d","e"]}"#;
    let res = api.respond(post(body)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls(&api), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn malformed_body_is_rejected() {
    let api = api(Behavior::Reply("[]".to_owned()));
    for body in ["", "not json", r#"{"words":["a","b","c","d","e"]}"#, r#"{"srcLang":"English","words":"a b c d e"}"#] {
        let res = api.respond(post(body)).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "body {body:?}");
    }
    assert_eq!(calls(&api), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn oversized_body_is_rejected() {
    let api = api(Behavior::Reply("[]".to_owned()));
    let body = format!(r#"{{"srcLang":"English","words":["{}","b","c","d","e"]}}"#, "a".repeat(MAX_BODY_SIZE));
    let res = api.respond(post(&body)).await;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(calls(&api), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn empty_reply_is_a_repair_failure() {
    let api = api(Behavior::Reply(String::new()));
    let (status, body) = read(api.respond(post(FIVE_WORDS)).await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().starts_with("Failed to parse the model response as JSON."));
    assert_eq!(calls(&api), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn prose_reply_is_a_repair_failure() {
    let api = api(Behavior::Reply("I cannot create questions for these words.".to_owned()));
    let res = api.respond(post(FIVE_WORDS)).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test(flavor = "current_thread")]
async fn model_failure_is_an_upstream_error() {
    let api = api(Behavior::Fail(StatusCode::TOO_MANY_REQUESTS));
    let (status, body) = read(api.respond(post(FIVE_WORDS)).await).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().starts_with("Error generating questions:"));
    assert_eq!(calls(&api), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn slow_model_times_out() {
    let api = api(Behavior::Hang);
    let res = api.respond(post(FIVE_WORDS)).await;
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(calls(&api), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn failures_are_distinguishable() {
    let invalid = api(Behavior::Reply(String::new()));
    let invalid = invalid.respond(post(r#"{"srcLang":"English","words":["a"]}"#)).await.status();
    let upstream = api(Behavior::Fail(StatusCode::UNAUTHORIZED)).respond(post(FIVE_WORDS)).await.status();
    let unparseable = api(Behavior::Reply(String::new())).respond(post(FIVE_WORDS)).await.status();
    assert!(invalid.is_client_error());
    assert!(upstream.is_server_error());
    assert!(unparseable.is_server_error());
    assert_ne!(upstream, unparseable);
}

#[tokio::test(flavor = "current_thread")]
async fn root_reports_info() {
    let api = api(Behavior::Reply(String::new()));
    let req = Request::get("/").body(Full::new(Bytes::new())).unwrap();
    let (status, body) = read(api.respond(req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["message"].as_str().unwrap().starts_with("Welcome"));
}

#[tokio::test(flavor = "current_thread")]
async fn unknown_routes_and_methods() {
    let api = api(Behavior::Reply(String::new()));
    let req = Request::get("/missing").body(Full::new(Bytes::new())).unwrap();
    assert_eq!(api.respond(req).await.status(), StatusCode::NOT_FOUND);
    let req = Request::get("/generate-questions/").body(Full::new(Bytes::new())).unwrap();
    assert_eq!(api.respond(req).await.status(), StatusCode::METHOD_NOT_ALLOWED);
    let req = Request::post("/generate-questions").body(Full::new(Bytes::from(FIVE_WORDS))).unwrap();
    assert_eq!(api.respond(req).await.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(calls(&api), 1);
}
