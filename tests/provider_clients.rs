//! 出站适配器对本地桩服务的集成测试

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use common::{spawn_stub, Recorded, Recorder};
use glesolas_api::application::{
    Credential, EmbeddingError, EmbeddingPort, ImageError, ImageGeneratorPort, QueryOptions,
    SpeechError, SpeechSynthesizerPort, VectorIndexPort,
};
use glesolas_api::domain::{
    AudioRequest, AudioRequestBody, CardRecord, CardVector, ImageRequest, ImageRequestBody,
    MinThreshold, QueryFilter,
};
use glesolas_api::infrastructure::adapters::{
    CloudflareApi, CloudflareConfig, ElevenLabsClient, ElevenLabsClientConfig, ReplicateClient,
    ReplicateClientConfig, RetryPolicy, VectorizeClient, WorkersAiEmbedder,
};

fn record(method: &Method, uri: &OriginalUri, headers: &HeaderMap, body: &Bytes) -> Recorded {
    Recorded {
        method: method.to_string(),
        path: uri.0.path().to_string(),
        headers: headers.clone(),
        body: body.to_vec(),
    }
}

fn audio_request(text: &str) -> AudioRequest {
    AudioRequest::validate(AudioRequestBody {
        text: Some(json!(text)),
        ..Default::default()
    })
    .unwrap()
}

fn image_request(prompt: &str) -> ImageRequest {
    ImageRequest::validate(ImageRequestBody {
        prompt: Some(json!(prompt)),
    })
    .unwrap()
}

// ============================================================================
// ElevenLabs
// ============================================================================

#[derive(Clone)]
struct TtsStub {
    recorder: Recorder,
    status: StatusCode,
    body: &'static str,
}

async fn tts_handler(
    State(stub): State<TtsStub>,
    method: Method,
    uri: OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    stub.recorder.push(record(&method, &uri, &headers, &body));
    (stub.status, stub.body)
}

async fn spawn_tts(status: StatusCode, body: &'static str) -> (String, Recorder) {
    let recorder = Recorder::default();
    let stub = TtsStub {
        recorder: recorder.clone(),
        status,
        body,
    };
    let router = Router::new()
        .route("/v1/text-to-speech/:voice_id", post(tts_handler))
        .with_state(stub);
    (spawn_stub(router).await, recorder)
}

#[tokio::test]
async fn test_elevenlabs_sends_key_and_returns_audio() {
    let (base_url, recorder) = spawn_tts(StatusCode::OK, "ID3-fake-mp3").await;
    let client = ElevenLabsClient::new(ElevenLabsClientConfig::new(base_url)).unwrap();

    let audio = client
        .synthesize(&Credential::new("xi-key"), &audio_request("Hello there"))
        .await
        .unwrap();
    assert_eq!(audio.audio_data, b"ID3-fake-mp3");

    let requests = recorder.all();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.path, "/v1/text-to-speech/JBFqnCBsd6RMkjVDRZzb");
    assert_eq!(request.header("xi-api-key"), Some("xi-key"));
    assert_eq!(
        request.json(),
        json!({
            "text": "Hello there",
            "model_id": "eleven_flash_v2_5",
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.75,
                "style": 0.0,
                "use_speaker_boost": true,
            }
        })
    );
}

#[tokio::test]
async fn test_elevenlabs_error_is_not_retried() {
    let (base_url, recorder) = spawn_tts(StatusCode::SERVICE_UNAVAILABLE, "rate limited").await;
    let client = ElevenLabsClient::new(ElevenLabsClientConfig::new(base_url)).unwrap();

    let err = client
        .synthesize(&Credential::new("xi-key"), &audio_request("Hello"))
        .await
        .unwrap_err();

    match err {
        SpeechError::Provider { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(recorder.len(), 1);
}

#[tokio::test]
async fn test_elevenlabs_unreachable_is_network_error() {
    let client = ElevenLabsClient::new(ElevenLabsClientConfig::new("http://127.0.0.1:1")).unwrap();
    let err = client
        .synthesize(&Credential::new("xi-key"), &audio_request("Hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, SpeechError::Network(_)));
}

// ============================================================================
// Replicate
// ============================================================================

/// Replicate 桩：GET 轮询时依次返回 `poll_statuses`，用完后保持最后一个状态
#[derive(Clone)]
struct ReplicateStub {
    recorder: Recorder,
    create_status: &'static str,
    poll_statuses: Arc<Vec<&'static str>>,
    polls: Arc<AtomicUsize>,
    /// 创建请求前 N 次返回 429
    throttle_creates: Arc<AtomicUsize>,
    /// 直接返回的错误
    create_error: Option<(StatusCode, &'static str)>,
}

impl ReplicateStub {
    fn new(create_status: &'static str, poll_statuses: Vec<&'static str>) -> Self {
        Self {
            recorder: Recorder::default(),
            create_status,
            poll_statuses: Arc::new(poll_statuses),
            polls: Arc::new(AtomicUsize::new(0)),
            throttle_creates: Arc::new(AtomicUsize::new(0)),
            create_error: None,
        }
    }
}

fn prediction(status: &str) -> Value {
    let output = if status == "succeeded" {
        json!(["https://replicate.delivery/card.jpg"])
    } else {
        Value::Null
    };
    let error = if status == "failed" {
        json!("NSFW content detected")
    } else {
        Value::Null
    };
    json!({"id": "pred-1", "status": status, "output": output, "error": error})
}

async fn replicate_handler(
    State(stub): State<ReplicateStub>,
    method: Method,
    uri: OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let path = uri.0.path().to_string();
    stub.recorder.push(record(&method, &uri, &headers, &body));

    if path.ends_with("/cancel") {
        return Json(prediction("canceled")).into_response();
    }

    if method == Method::GET {
        let n = stub.polls.fetch_add(1, Ordering::SeqCst);
        let status = stub
            .poll_statuses
            .get(n)
            .or(stub.poll_statuses.last())
            .copied()
            .unwrap_or("processing");
        return Json(prediction(status)).into_response();
    }

    if let Some((status, body)) = stub.create_error {
        return (status, body).into_response();
    }
    let throttled = stub
        .throttle_creates
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if throttled {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [("retry-after", "0")],
            "slow down",
        )
            .into_response();
    }

    (StatusCode::CREATED, Json(prediction(stub.create_status))).into_response()
}

async fn spawn_replicate(stub: ReplicateStub) -> String {
    let router = Router::new()
        .route("/v1/*rest", any(replicate_handler))
        .with_state(stub);
    format!("{}/v1", spawn_stub(router).await)
}

fn replicate_client(base_url: String) -> ReplicateClient {
    ReplicateClient::new(
        ReplicateClientConfig::new(base_url)
            .with_poll_interval(Duration::from_millis(5))
            .with_retry(RetryPolicy {
                max_retries: 2,
                interval: Duration::from_millis(1),
                jitter: Duration::ZERO,
            }),
    )
    .unwrap()
}

#[tokio::test]
async fn test_replicate_blocking_create_succeeds_without_polling() {
    let stub = ReplicateStub::new("succeeded", vec![]);
    let recorder = stub.recorder.clone();
    let client = replicate_client(spawn_replicate(stub).await);

    let output = client
        .generate(
            &Credential::new("r8-token"),
            &image_request("a fire fox"),
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(output, json!(["https://replicate.delivery/card.jpg"]));

    let requests = recorder.all();
    assert_eq!(requests.len(), 1);
    let create = &requests[0];
    assert_eq!(create.path, "/v1/models/black-forest-labs/flux-schnell/predictions");
    assert_eq!(create.header("authorization"), Some("Bearer r8-token"));
    assert_eq!(create.header("prefer"), Some("wait"));
    assert_eq!(
        create.json(),
        json!({
            "input": {
                "prompt": "a fire fox",
                "num_outputs": 1,
                "aspect_ratio": "16:9",
                "output_format": "jpg",
                "output_quality": 80,
            }
        })
    );
}

#[tokio::test]
async fn test_replicate_polls_until_terminal() {
    let stub = ReplicateStub::new("starting", vec!["processing", "processing", "succeeded"]);
    let recorder = stub.recorder.clone();
    let client = replicate_client(spawn_replicate(stub).await);

    let output = client
        .generate(
            &Credential::new("r8-token"),
            &image_request("a fire fox"),
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(output[0], "https://replicate.delivery/card.jpg");
    assert_eq!(
        recorder.paths(),
        vec![
            "POST /v1/models/black-forest-labs/flux-schnell/predictions",
            "GET /v1/predictions/pred-1",
            "GET /v1/predictions/pred-1",
            "GET /v1/predictions/pred-1",
        ]
    );
}

#[tokio::test]
async fn test_replicate_failed_prediction() {
    let stub = ReplicateStub::new("processing", vec!["failed"]);
    let client = replicate_client(spawn_replicate(stub).await);

    let err = client
        .generate(
            &Credential::new("r8-token"),
            &image_request("a fire fox"),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
    match err {
        ImageError::PredictionFailed(message) => assert_eq!(message, "NSFW content detected"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_replicate_cancel_calls_cancel_endpoint() {
    let stub = ReplicateStub::new("processing", vec!["processing"]);
    let recorder = stub.recorder.clone();
    let client = replicate_client(spawn_replicate(stub).await);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });

    let err = client
        .generate(&Credential::new("r8-token"), &image_request("a fox"), cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ImageError::Canceled));

    let paths = recorder.paths();
    assert_eq!(paths.last().unwrap(), "POST /v1/predictions/pred-1/cancel");
}

#[tokio::test]
async fn test_replicate_version_endpoint() {
    let stub = ReplicateStub::new("succeeded", vec![]);
    let recorder = stub.recorder.clone();
    let base_url = spawn_replicate(stub).await;
    let client = ReplicateClient::new(
        ReplicateClientConfig::new(base_url).with_model("stability-ai/sdxl:abc123".parse().unwrap()),
    )
    .unwrap();

    client
        .generate(
            &Credential::new("r8-token"),
            &image_request("a fox"),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let create = &recorder.all()[0];
    assert_eq!(create.path, "/v1/predictions");
    assert_eq!(create.json()["version"], "abc123");
    assert_eq!(create.json()["input"]["prompt"], "a fox");
}

#[tokio::test]
async fn test_replicate_retries_throttled_create() {
    let stub = ReplicateStub::new("succeeded", vec![]);
    stub.throttle_creates.store(2, Ordering::SeqCst);
    let recorder = stub.recorder.clone();
    let client = replicate_client(spawn_replicate(stub).await);

    client
        .generate(
            &Credential::new("r8-token"),
            &image_request("a fox"),
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(recorder.len(), 3);
}

#[tokio::test]
async fn test_replicate_http_error_is_provider_error() {
    let mut stub = ReplicateStub::new("succeeded", vec![]);
    stub.create_error = Some((StatusCode::UNPROCESSABLE_ENTITY, "invalid input"));
    let recorder = stub.recorder.clone();
    let client = replicate_client(spawn_replicate(stub).await);

    let err = client
        .generate(
            &Credential::new("r8-token"),
            &image_request("a fox"),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
    match err {
        ImageError::Provider { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "invalid input");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // 422 不重试
    assert_eq!(recorder.len(), 1);
}

#[tokio::test]
async fn test_replicate_server_error_on_create_not_retried() {
    let mut stub = ReplicateStub::new("succeeded", vec![]);
    stub.create_error = Some((StatusCode::BAD_GATEWAY, "upstream down"));
    let recorder = stub.recorder.clone();
    let client = replicate_client(spawn_replicate(stub).await);

    let err = client
        .generate(
            &Credential::new("r8-token"),
            &image_request("a fox"),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ImageError::Provider { status: 502, .. }));
    assert_eq!(recorder.len(), 1);
}

#[tokio::test]
async fn test_replicate_timed_out_create_not_retried() {
    let creates = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/v1/models/*rest",
            post(|State(creates): State<Arc<AtomicUsize>>| async move {
                creates.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(prediction("succeeded"))
            }),
        )
        .with_state(creates.clone());
    let base_url = format!("{}/v1", spawn_stub(router).await);

    let client = ReplicateClient::new(
        ReplicateClientConfig::new(base_url)
            .with_timeout(1)
            .with_retry(RetryPolicy {
                max_retries: 2,
                interval: Duration::from_millis(1),
                jitter: Duration::ZERO,
            }),
    )
    .unwrap();

    let err = client
        .generate(
            &Credential::new("r8-token"),
            &image_request("a fox"),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ImageError::Network(_)));
    // 超时的创建请求可能已在上游生效
    assert_eq!(creates.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Cloudflare
// ============================================================================

#[derive(Clone)]
struct CloudflareStub {
    recorder: Recorder,
    fail: bool,
}

async fn cloudflare_handler(
    State(stub): State<CloudflareStub>,
    method: Method,
    uri: OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let path = uri.0.path().to_string();
    stub.recorder.push(record(&method, &uri, &headers, &body));

    if stub.fail {
        return Json(json!({
            "success": false,
            "errors": [{"code": 10000, "message": "Authentication error"}],
            "result": null,
        }));
    }

    let result = if path.contains("/ai/run/") {
        json!({"shape": [1, 3], "data": [[0.1, 0.2, 0.3]]})
    } else if path.ends_with("/upsert") {
        json!({"mutationId": "m-1"})
    } else {
        json!({
            "count": 1,
            "matches": [{"id": "c1", "score": 0.91, "metadata": {"name": "Ember Fox"}}],
        })
    };
    Json(json!({"success": true, "errors": [], "messages": [], "result": result}))
}

async fn spawn_cloudflare(fail: bool) -> (Arc<CloudflareApi>, Recorder) {
    let recorder = Recorder::default();
    let stub = CloudflareStub {
        recorder: recorder.clone(),
        fail,
    };
    let router = Router::new()
        .route("/client/v4/*rest", post(cloudflare_handler))
        .with_state(stub);
    let base_url = format!("{}/client/v4", spawn_stub(router).await);
    let config = CloudflareConfig::new("acct-1", Credential::new("cf-token")).with_base_url(base_url);
    (Arc::new(CloudflareApi::new(config).unwrap()), recorder)
}

fn card(id: &str) -> CardRecord {
    CardRecord {
        id: id.to_string(),
        name: "Ember Fox".to_string(),
        description: "Quick and sly".to_string(),
        might: 2.0,
        fortune: 3.0,
        cunning: 5.0,
        category: "character".to_string(),
    }
}

#[tokio::test]
async fn test_workers_ai_embedding() {
    let (api, recorder) = spawn_cloudflare(false).await;
    let embedder = WorkersAiEmbedder::new(api, "@cf/baai/bge-base-en-v1.5");

    let vectors = embedder.embed(&["fire fox".to_string()]).await.unwrap();
    assert_eq!(vectors, vec![vec![0.1, 0.2, 0.3]]);

    let request = &recorder.all()[0];
    assert_eq!(
        request.path,
        "/client/v4/accounts/acct-1/ai/run/@cf/baai/bge-base-en-v1.5"
    );
    assert_eq!(request.header("authorization"), Some("Bearer cf-token"));
    assert_eq!(request.json(), json!({"text": ["fire fox"]}));
}

#[tokio::test]
async fn test_workers_ai_unsuccessful_envelope() {
    let (api, _) = spawn_cloudflare(true).await;
    let embedder = WorkersAiEmbedder::new(api, "@cf/baai/bge-base-en-v1.5");

    let err = embedder.embed(&["fire fox".to_string()]).await.unwrap_err();
    match err {
        EmbeddingError::InvalidResponse(message) => {
            assert!(message.contains("Authentication error"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_vectorize_upsert_sends_ndjson() {
    let (api, recorder) = spawn_cloudflare(false).await;
    let index = VectorizeClient::new(api, "glesolas-cards");

    let result = index
        .upsert(vec![
            CardVector::new(card("c1"), vec![0.1, 0.2], Some("deck-1")),
            CardVector::new(card("c2"), vec![0.3, 0.4], Some("deck-1")),
        ])
        .await
        .unwrap();
    assert_eq!(result.count, 2);
    assert_eq!(result.ids, vec!["c1", "c2"]);

    let request = &recorder.all()[0];
    assert_eq!(
        request.path,
        "/client/v4/accounts/acct-1/vectorize/v2/indexes/glesolas-cards/upsert"
    );
    assert_eq!(request.header("content-type"), Some("application/x-ndjson"));
    let text = request.text();
    let lines: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["id"], "c2");
    assert_eq!(lines[1]["metadata"]["deckId"], "deck-1");
}

#[tokio::test]
async fn test_vectorize_upsert_empty_batch_makes_no_call() {
    let (api, recorder) = spawn_cloudflare(false).await;
    let index = VectorizeClient::new(api, "glesolas-cards");

    let result = index.upsert(Vec::new()).await.unwrap();
    assert_eq!(result.count, 0);
    assert_eq!(recorder.len(), 0);
}

#[tokio::test]
async fn test_vectorize_query() {
    let (api, recorder) = spawn_cloudflare(false).await;
    let index = VectorizeClient::new(api, "glesolas-cards");

    let filter = QueryFilter {
        deck_id: Some("deck-1".to_string()),
        cunning: Some(MinThreshold { gte: 4 }),
        ..Default::default()
    };
    let matches = index
        .query(vec![0.5, 0.25], QueryOptions::new(3, filter))
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, "c1");
    assert_eq!(matches[0].metadata, Some(json!({"name": "Ember Fox"})));

    let request = &recorder.all()[0];
    assert!(request.path.ends_with("/vectorize/v2/indexes/glesolas-cards/query"));
    assert_eq!(
        request.json(),
        json!({
            "vector": [0.5, 0.25],
            "topK": 3,
            "returnValues": false,
            "returnMetadata": "all",
            "filter": {"deckId": "deck-1", "cunning": {"$gte": 4}},
        })
    );
}
