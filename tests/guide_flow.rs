//! End-to-end guide service behavior with scripted providers.
//!
//! Covers the navigation scenario, enrichment idempotence, cache
//! busting, failure isolation, single-flight sharing, and cancellation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use foldguide::api::{
    AdviceRequest, AdvisorProvider, AvatarIdentity, AvatarInfo, AvatarProvider, CancelToken,
    ProviderError, VoiceInfo,
};
use foldguide::config::Config;
use foldguide::errors::GuideError;
use foldguide::guide::{GuideService, InstructionSource};

// ─── Scripted providers ───────────────────────────────────────────────────────

struct ScriptedAdvisor {
    calls: AtomicUsize,
}

impl ScriptedAdvisor {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AdvisorProvider for ScriptedAdvisor {
    fn name(&self) -> &str {
        "scripted-advisor"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(&self, request: AdviceRequest) -> Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("advice #{call}: {}", request.prompt))
    }
}

/// Renderer whose renders can be slowed down, failed, or parked.
struct ScriptedRenderer {
    renders: AtomicUsize,
    fail_next: AtomicBool,
    render_delay: Duration,
    park_until_cancelled: bool,
}

impl ScriptedRenderer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            renders: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            render_delay: Duration::ZERO,
            park_until_cancelled: false,
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            renders: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            render_delay: delay,
            park_until_cancelled: false,
        })
    }

    fn parked() -> Arc<Self> {
        Arc::new(Self {
            renders: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            render_delay: Duration::ZERO,
            park_until_cancelled: true,
        })
    }
}

#[async_trait]
impl AvatarProvider for ScriptedRenderer {
    fn name(&self) -> &str {
        "scripted-renderer"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn list_avatars(&self) -> Result<Vec<AvatarInfo>, ProviderError> {
        Ok(vec![AvatarInfo {
            id: "avatar-1".to_string(),
            name: "Avery".to_string(),
            thumbnail: String::new(),
        }])
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, ProviderError> {
        Ok(vec![VoiceInfo {
            id: "voice-en".to_string(),
            name: "Dana".to_string(),
            language: "English".to_string(),
        }])
    }

    async fn render(
        &self,
        script: &str,
        _identity: &AvatarIdentity,
        cancel: &CancelToken,
    ) -> Result<String, ProviderError> {
        if self.park_until_cancelled {
            cancel.cancelled().await;
            return Err(ProviderError::cancelled("scripted-renderer"));
        }
        if !self.render_delay.is_zero() {
            tokio::time::sleep(self.render_delay).await;
        }

        let n = self.renders.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::job_failed("scripted-renderer", "no luck"));
        }
        Ok(format!("https://videos.test/{n}/{}", script.len()))
    }
}

fn make_service(
    advisor: Option<Arc<ScriptedAdvisor>>,
    renderer: Option<Arc<ScriptedRenderer>>,
) -> Arc<GuideService> {
    let config = Config::default();
    Arc::new(GuideService::new(
        &config,
        advisor.map(|a| a as Arc<dyn AdvisorProvider>),
        renderer.map(|r| r as Arc<dyn AvatarProvider>),
    ))
}

async fn load_crane(service: &GuideService) {
    service
        .load(&InstructionSource::Preset("basic_crane".to_string()))
        .await
        .expect("preset should load");
}

// ─── Navigation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn navigation_walkthrough() {
    let service = make_service(None, None);
    load_crane(&service).await;
    assert_eq!(service.total_steps().await, 10);

    // After load the cursor is on the first step.
    let first = service.current_step().await.unwrap();
    assert_eq!(first.index, 0);
    assert!(first.text.starts_with("Start with a square piece of paper"));

    for _ in 0..6 {
        assert!(service.advance().await.moved);
    }
    assert_eq!(service.current_step().await.unwrap().index, 6);

    assert!(service.retreat().await.moved);
    assert_eq!(service.current_step().await.unwrap().index, 5);

    assert!(service.jump(9).await.moved);
    let outcome = service.advance().await;
    assert!(!outcome.moved);
    assert_eq!(outcome.step.unwrap().index, 9);
}

#[tokio::test]
async fn reload_replaces_sequence_wholesale() {
    let service = make_service(None, None);
    load_crane(&service).await;
    service.jump(8).await;

    let total = service
        .load(&InstructionSource::RawText(
            "1. Only fold.\n2. Done.".to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(service.current_step().await.unwrap().index, 0);
    assert_eq!(service.current_step().await.unwrap().text, "Only fold.");
}

#[tokio::test]
async fn load_rejects_empty_sources() {
    let service = make_service(None, None);

    let err = service
        .load(&InstructionSource::RawText("   \n\n".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, GuideError::EmptyInput));

    let err = service
        .load(&InstructionSource::Preset("missing".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, GuideError::EmptyInput));
}

// ─── Enrichment semantics ─────────────────────────────────────────────────────

#[tokio::test]
async fn welcome_video_is_idempotent() {
    let renderer = ScriptedRenderer::new();
    let service = make_service(None, Some(renderer.clone()));
    load_crane(&service).await;
    let cancel = CancelToken::new();

    let first = service.welcome_video(false, &cancel).await.unwrap();
    let second = service.welcome_video(false, &cancel).await.unwrap();

    assert!(!first.was_cached);
    assert!(second.was_cached);
    assert_eq!(first.artifact, second.artifact);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn force_regenerates_and_overwrites() {
    let renderer = ScriptedRenderer::new();
    let service = make_service(None, Some(renderer.clone()));
    load_crane(&service).await;
    let cancel = CancelToken::new();

    let original = service.step_video(3, false, &cancel).await.unwrap();
    let forced = service.step_video(3, true, &cancel).await.unwrap();
    assert!(!forced.was_cached);
    assert_ne!(original.artifact, forced.artifact);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 2);

    // The forced artifact replaced the stored one.
    let replay = service.step_video(3, false, &cancel).await.unwrap();
    assert!(replay.was_cached);
    assert_eq!(replay.artifact, forced.artifact);
}

#[tokio::test]
async fn failed_generation_is_not_cached() {
    let renderer = ScriptedRenderer::new();
    renderer.fail_next.store(true, Ordering::SeqCst);
    let service = make_service(None, Some(renderer.clone()));
    load_crane(&service).await;
    let cancel = CancelToken::new();

    let err = service.welcome_video(false, &cancel).await.unwrap_err();
    assert!(matches!(err, GuideError::GenerationFailed { .. }));

    // The retry generates again instead of replaying the failure.
    let retry = service.welcome_video(false, &cancel).await.unwrap();
    assert!(!retry.was_cached);
}

#[tokio::test]
async fn failed_force_keeps_previous_artifact() {
    let renderer = ScriptedRenderer::new();
    let service = make_service(None, Some(renderer.clone()));
    load_crane(&service).await;
    let cancel = CancelToken::new();

    let original = service.welcome_video(false, &cancel).await.unwrap();

    renderer.fail_next.store(true, Ordering::SeqCst);
    let err = service.welcome_video(true, &cancel).await.unwrap_err();
    assert!(matches!(err, GuideError::GenerationFailed { .. }));

    let replay = service.welcome_video(false, &cancel).await.unwrap();
    assert!(replay.was_cached);
    assert_eq!(replay.artifact, original.artifact);
}

#[tokio::test]
async fn explain_caches_per_step() {
    let advisor = ScriptedAdvisor::new();
    let service = make_service(Some(advisor.clone()), None);
    load_crane(&service).await;

    let first = service.explain(false).await.unwrap();
    let again = service.explain(false).await.unwrap();
    assert!(again.was_cached);
    assert_eq!(first.artifact, again.artifact);

    service.advance().await;
    let next_step = service.explain(false).await.unwrap();
    assert!(!next_step.was_cached);
    assert_ne!(first.artifact, next_step.artifact);

    assert_eq!(advisor.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_requests_share_one_generation() {
    let renderer = ScriptedRenderer::slow(Duration::from_millis(50));
    let service = make_service(None, Some(renderer.clone()));
    load_crane(&service).await;

    let a_service = service.clone();
    let b_service = service.clone();
    let (a, b) = tokio::join!(
        async move {
            let cancel = CancelToken::new();
            a_service.welcome_video(false, &cancel).await.unwrap()
        },
        async move {
            let cancel = CancelToken::new();
            b_service.welcome_video(false, &cancel).await.unwrap()
        }
    );

    assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);
    assert_eq!(a.artifact, b.artifact);
    // Exactly one of the two paid for the render.
    assert_ne!(a.was_cached, b.was_cached);
}

#[tokio::test]
async fn cancellation_aborts_render() {
    let renderer = ScriptedRenderer::parked();
    let service = make_service(None, Some(renderer));
    load_crane(&service).await;

    let cancel = CancelToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(2),
        service.welcome_video(false, &cancel),
    )
    .await
    .expect("cancelled render should return promptly")
    .unwrap_err();
    assert!(matches!(err, GuideError::Cancelled));

    // Nothing was cached: a pre-cancelled retry reaches the renderer
    // again instead of finding an entry.
    let pre_cancelled = CancelToken::new();
    pre_cancelled.cancel();
    let err = service
        .welcome_video(false, &pre_cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, GuideError::Cancelled));
}

#[tokio::test]
async fn help_video_shares_cache_across_cursor_positions() {
    let renderer = ScriptedRenderer::new();
    let service = make_service(None, Some(renderer.clone()));
    load_crane(&service).await;

    let step_text = service.current_step().await.unwrap().text;

    // Ask for help on the current step, then move away and ask again by text.
    let first = service.help_video(None, false, &CancelToken::new()).await.unwrap();
    service.jump(7).await;
    let second = service
        .help_video(Some(step_text), false, &CancelToken::new())
        .await
        .unwrap();

    assert!(second.was_cached);
    assert_eq!(first.artifact, second.artifact);
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);
}
