use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use voicebrief_common::{AppConfig, Result, TranscriberKind};
use voicebrief_llm::{parse_success_body, CompletionClient, Content, GeminiClient};
use voicebrief_server::{configure, AppState};
use voicebrief_stt::{Availability, Transcriber};

const BOUNDARY: &str = "voicebrief-test-boundary";

/// Answers every request with a canned Gemini response body
struct CannedGemini {
    body: String,
    requests: Mutex<Vec<Vec<Content>>>,
}

impl CannedGemini {
    fn replying(text: &str) -> Arc<Self> {
        Self::with_body(json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string())
    }

    fn with_body(body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            body: body.into(),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionClient for CannedGemini {
    async fn complete(&self, contents: Vec<Content>) -> Result<String> {
        self.requests.lock().unwrap().push(contents);
        parse_success_body(&self.body)?.first_candidate_text()
    }
}

/// Returns a fixed transcript and records what it was asked to transcribe
struct StubTranscriber {
    transcript: String,
    calls: Mutex<Vec<(PathBuf, String)>>,
}

impl StubTranscriber {
    fn returning(transcript: &str) -> Arc<Self> {
        Arc::new(Self {
            transcript: transcript.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, audio_path: &Path, model: &str) -> Result<String> {
        assert!(audio_path.exists(), "upload should be on disk during transcription");
        self.calls
            .lock()
            .unwrap()
            .push((audio_path.to_path_buf(), model.to_string()));
        std::fs::write(audio_path.with_extension("txt"), &self.transcript).unwrap();
        Ok(self.transcript.clone())
    }

    async fn availability(&self) -> Availability {
        Availability::unavailable("stub has no model")
    }

    fn kind(&self) -> TranscriberKind {
        TranscriberKind::Cli
    }
}

fn test_config(upload_dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.upload_dir = upload_dir.to_path_buf();
    config.gemini_api_key = Some("test-key".to_string());
    config
}

fn state(
    upload_dir: &Path,
    client: Arc<dyn CompletionClient>,
    transcriber: Arc<dyn Transcriber>,
) -> web::Data<Arc<AppState>> {
    web::Data::new(Arc::new(AppState::with_components(
        test_config(upload_dir),
        client,
        transcriber,
    )))
}

/// 16-bit PCM mono WAV of silence
fn silent_wav(seconds: u32, sample_rate: u32) -> Vec<u8> {
    let data_len = seconds * sample_rate * 2;
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(44 + data_len as usize, 0);
    out
}

enum Part<'a> {
    Text { name: &'a str, value: &'a str },
    File { name: &'a str, filename: Option<&'a str>, data: &'a [u8] },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File { name, filename, data } => {
                let disposition = match filename {
                    Some(filename) => format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    ),
                    None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", name),
                };
                body.extend_from_slice(disposition.as_bytes());
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(parts))
}

fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).map(|mut d| d.next().is_none()).unwrap_or(true)
}

#[actix_web::test]
async fn test_chat_relays_reply() {
    let dir = tempfile::tempdir().unwrap();
    let client = CannedGemini::replying("Hi there!");
    let app = test::init_service(
        App::new()
            .app_data(state(dir.path(), client.clone(), StubTranscriber::returning("")))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "messages": [{ "role": "user", "text": "Hello" }] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "reply": "Hi there!" }));

    let requests = client.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].len(), 1);
    assert_eq!(requests[0][0].text(), "Hello");
}

#[actix_web::test]
async fn test_chat_with_system_prompt_sends_priming_turns() {
    let dir = tempfile::tempdir().unwrap();
    let client = CannedGemini::replying("Sure.");
    let app = test::init_service(
        App::new()
            .app_data(state(dir.path(), client.clone(), StubTranscriber::returning("")))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({
            "messages": [
                { "role": "user", "text": "Hi" },
                { "role": "model", "text": "Hello!" },
                { "role": "user", "text": "Summarize our chat" }
            ],
            "system_prompt": "Be brief."
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(client.requests.lock().unwrap()[0].len(), 5);
}

#[actix_web::test]
async fn test_chat_empty_reply_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new()
            .app_data(state(dir.path(), CannedGemini::replying("   "), StubTranscriber::returning("")))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "messages": [{ "role": "user", "text": "Hello" }] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["reply"], voicebrief_llm::FALLBACK_REPLY);
}

#[actix_web::test]
async fn test_chat_zero_candidates_is_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new()
            .app_data(state(
                dir.path(),
                CannedGemini::with_body(r#"{"candidates": []}"#),
                StubTranscriber::returning(""),
            ))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "messages": [{ "role": "user", "text": "Hello" }] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "No candidates in Gemini response");
}

#[actix_web::test]
async fn test_chat_rejects_malformed_body() {
    let dir = tempfile::tempdir().unwrap();
    let client = CannedGemini::replying("unused");
    let app = test::init_service(
        App::new()
            .app_data(state(dir.path(), client.clone(), StubTranscriber::returning("")))
            .configure(configure),
    )
    .await;

    for payload in [
        json!({ "messages": "not a list" }),
        json!({ "messages": [{ "role": "system", "text": "Hello" }] }),
        json!({ "messages": [{ "role": "user" }] }),
    ] {
        let req = test::TestRequest::post().uri("/chat").set_json(payload).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["detail"].as_str().unwrap().starts_with("Invalid request body"));
    }
    assert!(client.requests.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn test_chat_without_api_key_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = GeminiClient::with_endpoint(
        "http://127.0.0.1:9/models/test:generateContent",
        "test",
        None,
        Duration::from_secs(1),
    )
    .unwrap();
    let app = test::init_service(
        App::new()
            .app_data(state(dir.path(), Arc::new(client), StubTranscriber::returning("")))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/chat")
        .set_json(json!({ "messages": [{ "role": "user", "text": "Hello" }] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("GEMINI_API_KEY"));
}

#[actix_web::test]
async fn test_transcribe_summarize_silent_wav() {
    let dir = tempfile::tempdir().unwrap();
    let transcriber = StubTranscriber::returning("");
    let app = test::init_service(
        App::new()
            .app_data(state(dir.path(), CannedGemini::replying("(empty)"), transcriber.clone()))
            .configure(configure),
    )
    .await;

    let wav = silent_wav(3, 16_000);
    let req = multipart_request(
        "/transcribe_summarize",
        &[
            Part::Text { name: "whisper_model", value: "base.en" },
            Part::File { name: "file", filename: Some("silence.wav"), data: &wav },
        ],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "filename": "silence.wav",
            "transcript": "",
            "summary": "(empty)",
            "status": "success"
        })
    );

    let calls = transcriber.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "base.en");
    assert_eq!(calls[0].0.extension().unwrap(), "wav");
    assert!(dir_is_empty(dir.path()));
}

#[actix_web::test]
async fn test_transcribe_summarize_model_from_query() {
    let dir = tempfile::tempdir().unwrap();
    let transcriber = StubTranscriber::returning("we met on tuesday");
    let app = test::init_service(
        App::new()
            .app_data(state(dir.path(), CannedGemini::replying("A meeting."), transcriber.clone()))
            .configure(configure),
    )
    .await;

    let req = multipart_request(
        "/transcribe_summarize?whisper_model=small",
        &[Part::File { name: "file", filename: Some("notes.mp3"), data: b"ID3" }],
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["summary"], "A meeting.");
    assert_eq!(body["transcript"], "we met on tuesday");

    let calls = transcriber.calls();
    assert_eq!(calls[0].1, "small");
    assert_eq!(calls[0].0.extension().unwrap(), "mp3");
    assert!(dir_is_empty(dir.path()));
}

#[actix_web::test]
async fn test_transcribe_summarize_form_model_beats_query() {
    let dir = tempfile::tempdir().unwrap();
    let transcriber = StubTranscriber::returning("text");
    let app = test::init_service(
        App::new()
            .app_data(state(dir.path(), CannedGemini::replying("ok"), transcriber.clone()))
            .configure(configure),
    )
    .await;

    let req = multipart_request(
        "/transcribe_summarize?whisper_model=small",
        &[
            Part::File { name: "file", filename: Some("clip"), data: b"RIFF" },
            Part::Text { name: "whisper_model", value: "tiny.en" },
        ],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let calls = transcriber.calls();
    assert_eq!(calls[0].1, "tiny.en");
    // no extension on the upload falls back to .wav
    assert_eq!(calls[0].0.extension().unwrap(), "wav");
}

#[actix_web::test]
async fn test_transcribe_summarize_without_filename_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let client = CannedGemini::replying("unused");
    let transcriber = StubTranscriber::returning("unused");
    let app = test::init_service(
        App::new()
            .app_data(state(dir.path(), client.clone(), transcriber.clone()))
            .configure(configure),
    )
    .await;

    let req = multipart_request(
        "/transcribe_summarize",
        &[Part::File { name: "file", filename: None, data: b"RIFF" }],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "No filename provided");
    assert!(transcriber.calls().is_empty());
    assert!(client.requests.lock().unwrap().is_empty());
    assert!(dir_is_empty(dir.path()));
}

#[actix_web::test]
async fn test_transcribe_summarize_without_file_field() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new()
            .app_data(state(dir.path(), CannedGemini::replying("unused"), StubTranscriber::returning("")))
            .configure(configure),
    )
    .await;

    let req = multipart_request(
        "/transcribe_summarize",
        &[Part::Text { name: "whisper_model", value: "base.en" }],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "No file uploaded");
}

#[actix_web::test]
async fn test_transcribe_summarize_upstream_failure_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new()
            .app_data(state(
                dir.path(),
                CannedGemini::with_body("<html>oops</html>"),
                StubTranscriber::returning("hello"),
            ))
            .configure(configure),
    )
    .await;

    let req = multipart_request(
        "/transcribe_summarize",
        &[Part::File { name: "file", filename: Some("a.wav"), data: b"RIFF" }],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert!(dir_is_empty(dir.path()));
}

#[actix_web::test]
async fn test_root_and_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
        App::new()
            .app_data(state(dir.path(), CannedGemini::replying(""), StubTranscriber::returning("")))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "status": "ok", "message": "VoiceBrief API is running" }));

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["gemini_api_key_set"], true);
    assert_eq!(body["gemini_model"], "gemini-2.5-flash");
    assert_eq!(body["transcriber"], "cli");
    assert_eq!(body["whisper_model"], "base.en");
    assert_eq!(body["transcriber_available"], false);
    assert_eq!(body["transcriber_detail"], "stub has no model");
}
