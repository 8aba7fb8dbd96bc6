//! The guide service: sequence navigation plus cache-backed enrichment.
//!
//! One explicitly constructed service object owns the step sequence, the
//! enrichment cache, and handles to the external generators. Callers
//! (the REST layer, tests) receive it behind an `Arc`; nothing here is
//! process-global.

use std::io::Write;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::{
    AdviceRequest, AdvisorProvider, AvatarIdentity, AvatarInfo, AvatarProvider, CancelToken,
    ImageAttachment, VoiceInfo,
};
use crate::cache::{Artifact, CacheKey, EnrichmentCache, Lookup};
use crate::config::Config;
use crate::errors::GuideError;
use crate::guide::script;
use crate::guide::sequence::StepSequence;
use crate::guide::source::{self, InstructionSource};

/// Role name used in errors when no advisor is wired in.
const ADVISOR_ROLE: &str = "advisor";
/// Role name used in errors when no renderer is wired in.
const RENDERER_ROLE: &str = "avatar renderer";

/// Image extensions accepted for troubleshooting uploads.
const ALLOWED_IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
];

/// A step as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub index: usize,
    pub total: usize,
    pub text: String,
}

/// Result of a navigation operation.
#[derive(Debug, Clone)]
pub struct NavOutcome {
    /// Whether the cursor actually moved.
    pub moved: bool,
    /// The step under the cursor after the operation.
    pub step: Option<StepView>,
}

/// Which enrichment a caller is asking for.
#[derive(Debug, Clone)]
pub enum EnrichmentKind {
    /// Detailed explanation of the current step.
    Explain,
    /// Troubleshooting advice for the current step.
    Troubleshoot,
    /// The application welcome video.
    WelcomeVideo,
    /// Avatar video for the step at `index` (cursor does not move).
    StepVideo { index: usize },
    /// Help video; defaults to the current step's text.
    HelpVideo { step_text: Option<String> },
}

/// Provider wiring visible to status endpoints.
#[derive(Debug, Clone)]
pub struct ServiceStatus {
    pub advisor_configured: bool,
    pub renderer_configured: bool,
    /// Whether the renderer's avatar/voice catalog has been fetched.
    pub renderer_ready: bool,
}

/// Avatar catalog plus the identity selected for renders.
struct RendererState {
    identity: AvatarIdentity,
    avatars: Vec<AvatarInfo>,
    voices: Vec<VoiceInfo>,
}

/// Service object wiring the sequence, cache, and generators together.
pub struct GuideService {
    sequence: RwLock<StepSequence>,
    cache: EnrichmentCache,
    advisor: Option<Arc<dyn AdvisorProvider>>,
    renderer: Option<Arc<dyn AvatarProvider>>,
    renderer_state: RwLock<Option<RendererState>>,
    advice_max_tokens: u32,
    vision_max_tokens: u32,
}

impl GuideService {
    /// Construct the service from config and optional provider handles.
    pub fn new(
        config: &Config,
        advisor: Option<Arc<dyn AdvisorProvider>>,
        renderer: Option<Arc<dyn AvatarProvider>>,
    ) -> Self {
        Self {
            sequence: RwLock::new(StepSequence::new()),
            cache: EnrichmentCache::new(config.cache.capacity),
            advisor,
            renderer,
            renderer_state: RwLock::new(None),
            advice_max_tokens: config.advisor.advice_max_tokens,
            vision_max_tokens: config.advisor.vision_max_tokens,
        }
    }

    // ── Sequence operations ──────────────────────────────────────────────

    /// Load a new step sequence, replacing any previous one.
    pub async fn load(&self, source: &InstructionSource) -> Result<usize, GuideError> {
        let steps = source::resolve(source)?;
        let total = self.sequence.write().await.load(steps)?;
        tracing::info!(total_steps = total, "instruction sequence loaded");
        Ok(total)
    }

    /// The step under the cursor, if any.
    pub async fn current_step(&self) -> Option<StepView> {
        let seq = self.sequence.read().await;
        seq.current().map(|text| StepView {
            index: seq.cursor(),
            total: seq.len(),
            text: text.to_string(),
        })
    }

    /// Number of steps in the loaded sequence.
    pub async fn total_steps(&self) -> usize {
        self.sequence.read().await.len()
    }

    /// Move to the next step. Does not wrap at the end.
    pub async fn advance(&self) -> NavOutcome {
        let moved = self.sequence.write().await.advance();
        NavOutcome {
            moved,
            step: self.current_step().await,
        }
    }

    /// Move to the previous step. Does not wrap at the start.
    pub async fn retreat(&self) -> NavOutcome {
        let moved = self.sequence.write().await.retreat();
        NavOutcome {
            moved,
            step: self.current_step().await,
        }
    }

    /// Jump to an arbitrary step index.
    pub async fn jump(&self, index: usize) -> NavOutcome {
        let moved = self.sequence.write().await.jump(index);
        NavOutcome {
            moved,
            step: self.current_step().await,
        }
    }

    // ── Enrichment operations ────────────────────────────────────────────

    /// Fetch or generate the enrichment `kind` describes.
    ///
    /// `force` always re-invokes the generator and overwrites the cached
    /// artifact; `cancel` aborts a video render between status polls.
    pub async fn enrich(
        &self,
        kind: EnrichmentKind,
        force: bool,
        cancel: &CancelToken,
    ) -> Result<Lookup, GuideError> {
        match kind {
            EnrichmentKind::Explain => self.explain(force).await,
            EnrichmentKind::Troubleshoot => self.troubleshoot(force).await,
            EnrichmentKind::WelcomeVideo => self.welcome_video(force, cancel).await,
            EnrichmentKind::StepVideo { index } => self.step_video(index, force, cancel).await,
            EnrichmentKind::HelpVideo { step_text } => {
                self.help_video(step_text, force, cancel).await
            }
        }
    }

    /// Detailed explanation of the current step.
    pub async fn explain(&self, force: bool) -> Result<Lookup, GuideError> {
        let step = self.require_current().await?;
        let advisor = self.require_advisor()?;
        let prompt = script::explain_prompt(&step.text)
            .map_err(|e| GuideError::generation_failed(advisor.name(), e.to_string()))?;
        let max_tokens = self.advice_max_tokens;

        self.cache
            .get_or_generate(CacheKey::Explain { index: step.index }, force, || async move {
                let advice = advisor.complete(AdviceRequest::text(prompt, max_tokens)).await?;
                Ok(Artifact::Text(advice))
            })
            .await
    }

    /// Troubleshooting advice for the current step.
    pub async fn troubleshoot(&self, force: bool) -> Result<Lookup, GuideError> {
        let step = self.require_current().await?;
        let advisor = self.require_advisor()?;
        let prompt = script::troubleshoot_prompt(&step.text)
            .map_err(|e| GuideError::generation_failed(advisor.name(), e.to_string()))?;
        let max_tokens = self.advice_max_tokens;

        self.cache
            .get_or_generate(
                CacheKey::Troubleshoot { index: step.index },
                force,
                || async move {
                    let advice =
                        advisor.complete(AdviceRequest::text(prompt, max_tokens)).await?;
                    Ok(Artifact::Text(advice))
                },
            )
            .await
    }

    /// The application welcome video.
    pub async fn welcome_video(
        &self,
        force: bool,
        cancel: &CancelToken,
    ) -> Result<Lookup, GuideError> {
        let renderer = self.require_renderer()?;
        let identity = self.renderer_identity().await?;
        let script = script::welcome_script().to_string();
        let cancel = cancel.clone();

        self.cache
            .get_or_generate(CacheKey::Welcome, force, || async move {
                let url = renderer.render(&script, &identity, &cancel).await?;
                Ok(Artifact::VideoUrl(url))
            })
            .await
    }

    /// Avatar video for the step at `index`, without moving the cursor.
    pub async fn step_video(
        &self,
        index: usize,
        force: bool,
        cancel: &CancelToken,
    ) -> Result<Lookup, GuideError> {
        let text = {
            let seq = self.sequence.read().await;
            match seq.get(index) {
                Some(text) => text.to_string(),
                None => {
                    return Err(GuideError::OutOfRange {
                        index,
                        len: seq.len(),
                    })
                }
            }
        };

        let renderer = self.require_renderer()?;
        let identity = self.renderer_identity().await?;
        let script = script::step_script(&text)
            .map_err(|e| GuideError::generation_failed(renderer.name(), e.to_string()))?;
        let cancel = cancel.clone();

        self.cache
            .get_or_generate(CacheKey::StepVideo { index }, force, || async move {
                let url = renderer.render(&script, &identity, &cancel).await?;
                Ok(Artifact::VideoUrl(url))
            })
            .await
    }

    /// Help video for a step the user is stuck on.
    ///
    /// Defaults to the current step when no text is supplied. Keyed by a
    /// fingerprint of the step text, so the same plea for help hits the
    /// cache regardless of cursor position.
    pub async fn help_video(
        &self,
        step_text: Option<String>,
        force: bool,
        cancel: &CancelToken,
    ) -> Result<Lookup, GuideError> {
        let text = match step_text {
            Some(text) if !text.trim().is_empty() => text,
            _ => self.require_current().await?.text,
        };

        let renderer = self.require_renderer()?;
        let identity = self.renderer_identity().await?;
        let script = script::help_script(&text)
            .map_err(|e| GuideError::generation_failed(renderer.name(), e.to_string()))?;
        let cancel = cancel.clone();

        self.cache
            .get_or_generate(CacheKey::help_for(&text), force, || async move {
                let url = renderer.render(&script, &identity, &cancel).await?;
                Ok(Artifact::VideoUrl(url))
            })
            .await
    }

    /// Image-grounded troubleshooting for the current step.
    ///
    /// Never cached: every photo of the user's paper is unique. The upload
    /// is spooled to a scoped temp file that is removed on every exit path.
    pub async fn troubleshoot_image(
        &self,
        data: &[u8],
        filename: &str,
        description: &str,
    ) -> Result<String, GuideError> {
        let step = self.require_current().await?;
        let advisor = self.require_advisor()?;
        let media_type = media_type_for(filename)?;
        if data.is_empty() {
            return Err(GuideError::UnsupportedInput(
                "empty image upload".to_string(),
            ));
        }

        let spooled = spool_upload(data)?;

        // Explanation gives the advisor context; cached like any other.
        let explanation = self.explain(false).await?;
        let explanation_text = explanation
            .artifact
            .as_text()
            .unwrap_or_default()
            .to_string();

        let prompt = script::image_prompt(&step.text, &explanation_text, description)
            .map_err(|e| GuideError::generation_failed(advisor.name(), e.to_string()))?;

        let bytes = std::fs::read(spooled.path())
            .map_err(|e| GuideError::generation_failed(advisor.name(), e.to_string()))?;

        let advice = advisor
            .complete(AdviceRequest::with_image(
                prompt,
                self.vision_max_tokens,
                ImageAttachment {
                    media_type: media_type.to_string(),
                    data: bytes,
                },
            ))
            .await?;

        Ok(advice)
    }

    // ── Avatar identity management ───────────────────────────────────────

    /// Avatars available for rendering.
    pub async fn avatars(&self) -> Result<Vec<AvatarInfo>, GuideError> {
        self.ensure_renderer_ready().await?;
        let state = self.renderer_state.read().await;
        Ok(state.as_ref().map(|s| s.avatars.clone()).unwrap_or_default())
    }

    /// Voices available for rendering.
    pub async fn voices(&self) -> Result<Vec<VoiceInfo>, GuideError> {
        self.ensure_renderer_ready().await?;
        let state = self.renderer_state.read().await;
        Ok(state.as_ref().map(|s| s.voices.clone()).unwrap_or_default())
    }

    /// Select the avatar used for future renders.
    ///
    /// Unknown ids are reported, not raised. Cached videos keep their old
    /// identity; force-regeneration is the escape hatch.
    pub async fn set_avatar(&self, avatar_id: &str) -> Result<bool, GuideError> {
        self.ensure_renderer_ready().await?;
        let mut state = self.renderer_state.write().await;
        let Some(state) = state.as_mut() else {
            return Ok(false);
        };
        if state.avatars.iter().any(|a| a.id == avatar_id) {
            state.identity.avatar_id = avatar_id.to_string();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Select the voice used for future renders.
    pub async fn set_voice(&self, voice_id: &str) -> Result<bool, GuideError> {
        self.ensure_renderer_ready().await?;
        let mut state = self.renderer_state.write().await;
        let Some(state) = state.as_mut() else {
            return Ok(false);
        };
        if state.voices.iter().any(|v| v.id == voice_id) {
            state.identity.voice_id = Some(voice_id.to_string());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Provider wiring, for status endpoints.
    pub async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            advisor_configured: self
                .advisor
                .as_ref()
                .map(|a| a.is_configured())
                .unwrap_or(false),
            renderer_configured: self
                .renderer
                .as_ref()
                .map(|r| r.is_configured())
                .unwrap_or(false),
            renderer_ready: self.renderer_state.read().await.is_some(),
        }
    }

    // ── Internals ────────────────────────────────────────────────────────

    async fn require_current(&self) -> Result<StepView, GuideError> {
        self.current_step().await.ok_or(GuideError::NoCurrentStep)
    }

    fn require_advisor(&self) -> Result<Arc<dyn AdvisorProvider>, GuideError> {
        self.advisor
            .clone()
            .ok_or_else(|| GuideError::unavailable(ADVISOR_ROLE))
    }

    fn require_renderer(&self) -> Result<Arc<dyn AvatarProvider>, GuideError> {
        self.renderer
            .clone()
            .ok_or_else(|| GuideError::unavailable(RENDERER_ROLE))
    }

    /// Identity used for renders, initializing the catalog on first use.
    async fn renderer_identity(&self) -> Result<AvatarIdentity, GuideError> {
        self.ensure_renderer_ready().await?;
        let state = self.renderer_state.read().await;
        state
            .as_ref()
            .map(|s| s.identity.clone())
            .ok_or_else(|| GuideError::unavailable(RENDERER_ROLE))
    }

    /// Fetch the avatar/voice catalog and pick defaults on first use.
    ///
    /// Default identity: first avatar, first English voice (else the
    /// first voice of any language).
    async fn ensure_renderer_ready(&self) -> Result<(), GuideError> {
        if self.renderer_state.read().await.is_some() {
            return Ok(());
        }

        let renderer = self.require_renderer()?;
        let mut guard = self.renderer_state.write().await;
        if guard.is_some() {
            return Ok(());
        }

        let avatars = renderer.list_avatars().await?;
        if avatars.is_empty() {
            return Err(GuideError::generation_failed(
                renderer.name(),
                "no avatars available in account",
            ));
        }
        let voices = renderer.list_voices().await?;

        let voice_id = voices
            .iter()
            .find(|v| v.language.eq_ignore_ascii_case("english"))
            .or_else(|| voices.first())
            .map(|v| v.id.clone());

        tracing::info!(
            avatars = avatars.len(),
            voices = voices.len(),
            "avatar catalog fetched"
        );

        *guard = Some(RendererState {
            identity: AvatarIdentity {
                avatar_id: avatars[0].id.clone(),
                voice_id,
            },
            avatars,
            voices,
        });
        Ok(())
    }
}

/// Map an upload filename onto its media type, rejecting disallowed types.
fn media_type_for(filename: &str) -> Result<&'static str, GuideError> {
    if filename.trim().is_empty() {
        return Err(GuideError::UnsupportedInput("no image selected".to_string()));
    }

    let extension = filename
        .rsplit('.')
        .next()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    ALLOWED_IMAGE_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media)| *media)
        .ok_or_else(|| {
            GuideError::UnsupportedInput(format!("file type not allowed: {filename}"))
        })
}

/// Spool upload bytes to a scoped temp file (removed when dropped).
fn spool_upload(data: &[u8]) -> Result<tempfile::NamedTempFile, GuideError> {
    let mut file = tempfile::NamedTempFile::new()
        .map_err(|e| GuideError::generation_failed("upload", e.to_string()))?;
    file.write_all(data)
        .map_err(|e| GuideError::generation_failed("upload", e.to_string()))?;
    file.flush()
        .map_err(|e| GuideError::generation_failed("upload", e.to_string()))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::api::error::ProviderError;

    struct MockAdvisor {
        calls: AtomicUsize,
        fail_next: AtomicBool,
    }

    impl MockAdvisor {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_next: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl AdvisorProvider for MockAdvisor {
        fn name(&self) -> &str {
            "mock-advisor"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn complete(&self, request: AdviceRequest) -> Result<String, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(ProviderError::http(
                    "mock-advisor",
                    400,
                    "bad request".to_string(),
                ));
            }
            Ok(format!("advice #{call} for: {}", request.prompt))
        }
    }

    struct MockRenderer {
        renders: AtomicUsize,
    }

    impl MockRenderer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                renders: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AvatarProvider for MockRenderer {
        fn name(&self) -> &str {
            "mock-renderer"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn list_avatars(&self) -> Result<Vec<AvatarInfo>, ProviderError> {
            Ok(vec![
                AvatarInfo {
                    id: "avatar-1".to_string(),
                    name: "Avery".to_string(),
                    thumbnail: String::new(),
                },
                AvatarInfo {
                    id: "avatar-2".to_string(),
                    name: "Blake".to_string(),
                    thumbnail: String::new(),
                },
            ])
        }

        async fn list_voices(&self) -> Result<Vec<VoiceInfo>, ProviderError> {
            Ok(vec![
                VoiceInfo {
                    id: "voice-fr".to_string(),
                    name: "Camille".to_string(),
                    language: "French".to_string(),
                },
                VoiceInfo {
                    id: "voice-en".to_string(),
                    name: "Dana".to_string(),
                    language: "English".to_string(),
                },
            ])
        }

        async fn render(
            &self,
            script: &str,
            identity: &AvatarIdentity,
            _cancel: &CancelToken,
        ) -> Result<String, ProviderError> {
            let n = self.renders.fetch_add(1, Ordering::SeqCst);
            Ok(format!(
                "https://videos.test/{}/{n}/{}",
                identity.avatar_id,
                script.len()
            ))
        }
    }

    fn service_with(
        advisor: Option<Arc<MockAdvisor>>,
        renderer: Option<Arc<MockRenderer>>,
    ) -> GuideService {
        let config = Config::default();
        GuideService::new(
            &config,
            advisor.map(|a| a as Arc<dyn AdvisorProvider>),
            renderer.map(|r| r as Arc<dyn AvatarProvider>),
        )
    }

    async fn loaded_service(
        advisor: Option<Arc<MockAdvisor>>,
        renderer: Option<Arc<MockRenderer>>,
    ) -> GuideService {
        let service = service_with(advisor, renderer);
        service
            .load(&InstructionSource::Preset("basic_crane".to_string()))
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn test_load_and_navigate_scenario() {
        let service = loaded_service(None, None).await;
        assert_eq!(service.total_steps().await, 10);

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
    async fn test_jump_out_of_range_reports_failure() {
        let service = loaded_service(None, None).await;
        service.jump(3).await;

        let outcome = service.jump(10).await;
        assert!(!outcome.moved);
        assert_eq!(outcome.step.unwrap().index, 3);
    }

    #[tokio::test]
    async fn test_load_unknown_preset() {
        let service = service_with(None, None);
        let err = service
            .load(&InstructionSource::Preset("nope".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, GuideError::EmptyInput));
    }

    #[tokio::test]
    async fn test_explain_is_cached() {
        let advisor = MockAdvisor::new();
        let service = loaded_service(Some(advisor.clone()), None).await;

        let first = service.explain(false).await.unwrap();
        assert!(!first.was_cached);

        let second = service.explain(false).await.unwrap();
        assert!(second.was_cached);
        assert_eq!(first.artifact, second.artifact);
        assert_eq!(advisor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_explain_force_regenerates() {
        let advisor = MockAdvisor::new();
        let service = loaded_service(Some(advisor.clone()), None).await;

        service.explain(false).await.unwrap();
        let forced = service.explain(true).await.unwrap();
        assert!(!forced.was_cached);
        assert_eq!(advisor.calls.load(Ordering::SeqCst), 2);

        // The forced artifact is now the cached one.
        let replay = service.explain(false).await.unwrap();
        assert!(replay.was_cached);
        assert_eq!(replay.artifact, forced.artifact);
    }

    #[tokio::test]
    async fn test_explain_failure_not_cached() {
        let advisor = MockAdvisor::new();
        advisor.fail_next.store(true, Ordering::SeqCst);
        let service = loaded_service(Some(advisor.clone()), None).await;

        let err = service.explain(false).await.unwrap_err();
        assert!(matches!(err, GuideError::GenerationFailed { .. }));

        // The retry generates instead of replaying the failure.
        let retry = service.explain(false).await.unwrap();
        assert!(!retry.was_cached);
        assert_eq!(advisor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_explain_per_step_keys() {
        let advisor = MockAdvisor::new();
        let service = loaded_service(Some(advisor.clone()), None).await;

        let step_zero = service.explain(false).await.unwrap();
        service.advance().await;
        let step_one = service.explain(false).await.unwrap();

        assert_ne!(step_zero.artifact, step_one.artifact);
        assert_eq!(advisor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_explain_without_advisor() {
        let service = loaded_service(None, None).await;
        let err = service.explain(false).await.unwrap_err();
        assert!(matches!(err, GuideError::GeneratorUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_explain_without_steps() {
        let advisor = MockAdvisor::new();
        let service = service_with(Some(advisor), None);
        let err = service.explain(false).await.unwrap_err();
        assert!(matches!(err, GuideError::NoCurrentStep));
    }

    #[tokio::test]
    async fn test_welcome_video_cached() {
        let renderer = MockRenderer::new();
        let service = loaded_service(None, Some(renderer.clone())).await;
        let cancel = CancelToken::new();

        let first = service.welcome_video(false, &cancel).await.unwrap();
        assert!(!first.was_cached);
        assert!(first.artifact.as_video_url().is_some());

        let second = service.welcome_video(false, &cancel).await.unwrap();
        assert!(second.was_cached);
        assert_eq!(first.artifact, second.artifact);
        assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_default_identity_prefers_english_voice() {
        let renderer = MockRenderer::new();
        let service = loaded_service(None, Some(renderer)).await;

        service.avatars().await.unwrap();
        let identity = service.renderer_identity().await.unwrap();
        assert_eq!(identity.avatar_id, "avatar-1");
        assert_eq!(identity.voice_id.as_deref(), Some("voice-en"));
    }

    #[tokio::test]
    async fn test_step_video_out_of_range() {
        let renderer = MockRenderer::new();
        let service = loaded_service(None, Some(renderer)).await;
        let cancel = CancelToken::new();

        let err = service.step_video(10, false, &cancel).await.unwrap_err();
        assert!(matches!(
            err,
            GuideError::OutOfRange { index: 10, len: 10 }
        ));
    }

    #[tokio::test]
    async fn test_step_video_does_not_move_cursor() {
        let renderer = MockRenderer::new();
        let service = loaded_service(None, Some(renderer)).await;
        let cancel = CancelToken::new();

        service.step_video(7, false, &cancel).await.unwrap();
        assert_eq!(service.current_step().await.unwrap().index, 0);
    }

    #[tokio::test]
    async fn test_help_video_keyed_by_step_text() {
        let renderer = MockRenderer::new();
        let service = loaded_service(None, Some(renderer.clone())).await;
        let cancel = CancelToken::new();

        let first = service
            .help_video(Some("Fold the corners.".to_string()), false, &cancel)
            .await
            .unwrap();
        let repeat = service
            .help_video(Some("Fold the corners.".to_string()), false, &cancel)
            .await
            .unwrap();
        assert!(repeat.was_cached);
        assert_eq!(first.artifact, repeat.artifact);

        let different = service
            .help_video(Some("Unfold everything.".to_string()), false, &cancel)
            .await
            .unwrap();
        assert!(!different.was_cached);
        assert_eq!(renderer.renders.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_help_video_defaults_to_current_step() {
        let renderer = MockRenderer::new();
        let service = loaded_service(None, Some(renderer)).await;
        let cancel = CancelToken::new();

        let lookup = service.help_video(None, false, &cancel).await.unwrap();
        assert!(lookup.artifact.as_video_url().is_some());

        let service_without_steps = service_with(None, Some(MockRenderer::new()));
        let err = service_without_steps
            .help_video(None, false, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, GuideError::NoCurrentStep));
    }

    #[tokio::test]
    async fn test_set_avatar_and_voice() {
        let renderer = MockRenderer::new();
        let service = loaded_service(None, Some(renderer)).await;

        assert!(service.set_avatar("avatar-2").await.unwrap());
        assert!(!service.set_avatar("avatar-99").await.unwrap());

        assert!(service.set_voice("voice-fr").await.unwrap());
        assert!(!service.set_voice("voice-99").await.unwrap());

        let identity = service.renderer_identity().await.unwrap();
        assert_eq!(identity.avatar_id, "avatar-2");
        assert_eq!(identity.voice_id.as_deref(), Some("voice-fr"));
    }

    #[tokio::test]
    async fn test_troubleshoot_image_rejects_bad_uploads() {
        let advisor = MockAdvisor::new();
        let service = loaded_service(Some(advisor.clone()), None).await;

        let err = service
            .troubleshoot_image(&[1, 2, 3], "progress.pdf", "stuck")
            .await
            .unwrap_err();
        assert!(matches!(err, GuideError::UnsupportedInput(_)));

        let err = service
            .troubleshoot_image(&[], "progress.jpg", "stuck")
            .await
            .unwrap_err();
        assert!(matches!(err, GuideError::UnsupportedInput(_)));

        // The advisor was never invoked for rejected uploads.
        assert_eq!(advisor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_troubleshoot_image_calls_advisor_with_image() {
        let advisor = MockAdvisor::new();
        let service = loaded_service(Some(advisor.clone()), None).await;

        let advice = service
            .troubleshoot_image(&[0xFF, 0xD8, 0xFF], "progress.jpg", "the fold tore")
            .await
            .unwrap();
        assert!(advice.contains("the fold tore"));

        // One call for the cached explanation, one for the vision request.
        assert_eq!(advisor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_status_reflects_wiring() {
        let service = service_with(Some(MockAdvisor::new()), None);
        let status = service.status().await;
        assert!(status.advisor_configured);
        assert!(!status.renderer_configured);
        assert!(!status.renderer_ready);

        let service = loaded_service(None, Some(MockRenderer::new())).await;
        service.avatars().await.unwrap();
        let status = service.status().await;
        assert!(status.renderer_ready);
    }

    #[test]
    fn test_media_type_mapping() {
        assert_eq!(media_type_for("a.png").unwrap(), "image/png");
        assert_eq!(media_type_for("B.JPG").unwrap(), "image/jpeg");
        assert_eq!(media_type_for("c.jpeg").unwrap(), "image/jpeg");
        assert_eq!(media_type_for("d.gif").unwrap(), "image/gif");
        assert!(media_type_for("e.bmp").is_err());
        assert!(media_type_for("").is_err());
    }
}
