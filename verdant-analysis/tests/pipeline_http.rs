mod common;

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;
use verdant_analysis::cache::ContentCache;
use verdant_analysis::traits::{AnalysisBackend, AnalysisError, AnalysisRequest};
use verdant_analysis::{build_backend, Analyzer, ClaimKind, ResultSource};
use verdant_common::RiskLevel;
use verdant_config::UpstreamConfig;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEXT: &str = "Our product is made from 100% recyclable packaging and is carbon neutral.";

fn upstream(server: &MockServer) -> UpstreamConfig {
    UpstreamConfig {
        base_url: server.uri(),
        retries: 0,
        timeout_secs: 5,
        ..Default::default()
    }
}

fn analyzer(cfg: &UpstreamConfig) -> Analyzer {
    let backend = build_backend(cfg).expect("backend");
    Analyzer::new(backend, Arc::new(ContentCache::default()))
}

#[tokio::test]
async fn posts_text_and_url_and_normalizes_the_reply() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    // shape returned by the detection endpoint
    Mock::given(method("POST"))
        .and(path("/api/claims/detect"))
        .and(body_json(json!({"text": TEXT, "url": "https://shop.example/p/1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "claims": [
                {"claim_text": "Our packaging is 100% recyclable", "confidence_score": 0.92,
                 "greenwashing_risk": "medium", "keyword": "recyclable"}
            ],
            "claims_detected": 1,
            "analysis_summary": {"total_claims": 1, "high_risk_claims": 0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let a = analyzer(&upstream(&server));
    let report = a
        .analyze(TEXT, Some("https://shop.example/p/1"))
        .await
        .expect("analysis");

    assert_eq!(report.source, ResultSource::Upstream);
    let texts: Vec<_> = report
        .result
        .detected_claims
        .iter()
        .map(|c| c.text.as_str())
        .collect();
    // upstream claim first, then what the extractor finds in the submitted text
    assert_eq!(
        texts,
        vec![
            "Our packaging is 100% recyclable",
            "Our product is made from 100% recyclable packaging and is carbon neutral",
        ]
    );
    assert_eq!(report.result.detected_claims[0].confidence, 0.92);
    assert_eq!(report.result.detected_claims[1].kind, ClaimKind::EnvironmentalStatement);
    // no score upstream: two claims → 0.2
    assert_eq!(report.result.risk_level, RiskLevel::Low);
    assert_eq!(report.result.risk_percentage, 20);
}

#[tokio::test]
async fn server_errors_surface_as_upstream_failures() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/claims/detect"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(json!({"error": "NLP model not loaded", "details": "warming up"})),
        )
        .mount(&server)
        .await;

    let a = analyzer(&upstream(&server));
    let err = a.analyze(TEXT, None).await.unwrap_err();
    match err {
        AnalysisError::Upstream { status, message } => {
            assert_eq!(status, Some(503));
            assert!(message.contains("NLP model not loaded"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(a.cache().is_empty());

    let report = a.analyze_or_placeholder(TEXT, None).await;
    assert_eq!(report.source, ResultSource::LocalPlaceholder);
    assert_eq!(report.result.risk_level, RiskLevel::Unknown);
}

#[tokio::test]
async fn cache_hit_skips_the_network() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/claims/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"risk_score": 0.8})))
        .expect(1)
        .mount(&server)
        .await;

    let a = analyzer(&upstream(&server));
    let first = a.analyze(TEXT, None).await.unwrap();
    let second = a.analyze(TEXT, None).await.unwrap();
    assert_eq!(first.source, ResultSource::Upstream);
    assert_eq!(second.source, ResultSource::Cache);
    assert_eq!(second.result.risk_percentage, 80);
    // MockServer verifies `expect(1)` on drop
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({"text": "plain text here", "url": ""})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = UpstreamConfig {
        api_key: Some("sk-test".into()),
        ..upstream(&server)
    };
    let report = analyzer(&cfg).analyze("plain text here", None).await.unwrap();
    assert_eq!(report.result.detected_claims[0].kind, ClaimKind::NoClaims);
}

#[tokio::test]
async fn health_check_uses_status_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nlp/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ready"})))
        .mount(&server)
        .await;

    let backend = build_backend(&upstream(&server)).unwrap();
    assert!(backend.health_check().await);

    let down = UpstreamConfig {
        status_path: "missing".into(),
        ..upstream(&server)
    };
    assert!(!build_backend(&down).unwrap().health_check().await);
}

/// Counts calls and parks each one on a barrier so both requests are in
/// flight before either returns.
struct Gated {
    calls: AtomicUsize,
    barrier: Barrier,
}

#[async_trait]
impl AnalysisBackend for Gated {
    async fn analyze(&self, _req: &AnalysisRequest) -> Result<Value, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.barrier.wait().await;
        Ok(json!({"risk_score": 0.5}))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "gated"
    }
}

#[tokio::test]
async fn concurrent_requests_for_same_text_both_reach_upstream() {
    let backend = Arc::new(Gated {
        calls: AtomicUsize::new(0),
        barrier: Barrier::new(2),
    });
    let a = Analyzer::new(backend.clone(), Arc::new(ContentCache::default()));

    let (r1, r2) = tokio::join!(a.analyze(TEXT, None), a.analyze(TEXT, None));
    assert_eq!(r1.unwrap().source, ResultSource::Upstream);
    assert_eq!(r2.unwrap().source, ResultSource::Upstream);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    assert_eq!(a.cache().len(), 1);
}
