use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use shared::{
    domain::{ImageSlot, ImageSource, OutputBinding, SessionId, SubmitMode},
    protocol::{output_artifact_url, JobPayload, DEFAULT_OUTPUT_BASE},
};

pub mod input;
pub mod session_id;
pub mod transport;

pub use input::FileUpload;
pub use transport::{HttpJobTransport, JobTransport, MissingJobTransport};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no content image selected")]
    MissingContentImage,
    #[error("no style image selected")]
    MissingStyleImage,
    #[error("a submission is already in flight")]
    AlreadyInFlight,
    #[error("loading an input image from a URL is not supported")]
    UrlSourceUnsupported,
    #[error("job dispatch failed: {0}")]
    Transport(String),
}

/// Read contracts of the parameter widgets. The sliders and the blur field
/// are external collaborators; the controller only ever reads their current
/// values at submission time.
pub trait ControlPanel: Send + Sync {
    fn blur_kernel(&self) -> u32;
    fn style_weights(&self) -> Vec<f64>;
    fn master_weight(&self) -> f64;
}

/// Value-struct control panel, for headless callers and tests.
#[derive(Debug, Clone)]
pub struct FixedControls {
    pub blur_kernel: u32,
    pub style_weights: Vec<f64>,
    pub master_weight: f64,
}

impl Default for FixedControls {
    fn default() -> Self {
        Self {
            blur_kernel: 3,
            style_weights: vec![1.0],
            master_weight: 1.0,
        }
    }
}

impl ControlPanel for FixedControls {
    fn blur_kernel(&self) -> u32 {
        self.blur_kernel
    }

    fn style_weights(&self) -> Vec<f64> {
        self.style_weights.clone()
    }

    fn master_weight(&self) -> f64 {
        self.master_weight
    }
}

/// What the page would render. The DOM is an external collaborator; the
/// controller publishes every visible effect as an event and the front end
/// applies them to its widgets.
#[derive(Debug, Clone)]
pub enum PaintEvent {
    /// A new current id was minted; stale in-flight responses keyed to the
    /// old id no longer match the display slots.
    SessionRotated(SessionId),
    /// The preview pane was revealed with the selected source, which is
    /// mirrored into the companion hyperlink target.
    PreviewRevealed { slot: ImageSlot, source: ImageSource },
    /// Busy indicator shown / submit affordance disabled, and the reverse.
    BusyChanged(bool),
    /// Every output display slot rewritten with cache-busted artifact URLs.
    OutputsRewritten(Vec<OutputBinding>),
    /// Blocking user-facing message for a precondition failure.
    Alert(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    InFlight,
}

struct PaintClientState {
    session_id: SessionId,
    content: Option<ImageSource>,
    style: Option<ImageSource>,
    submission: SubmissionState,
    last_cache_bust: i64,
}

#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub session_id: SessionId,
    pub content: Option<ImageSource>,
    pub style: Option<ImageSource>,
    pub submission: SubmissionState,
}

/// Submission controller for one page-lifetime painting session.
///
/// Gates one in-flight request at a time behind an explicit state machine:
/// a submit attempted while a request is running is rejected by logic, not
/// merely by a disabled control.
pub struct PaintClient {
    mode: SubmitMode,
    output_base: String,
    transport: Arc<dyn JobTransport>,
    controls: Arc<dyn ControlPanel>,
    inner: Mutex<PaintClientState>,
    events: broadcast::Sender<PaintEvent>,
}

impl PaintClient {
    pub fn new(
        mode: SubmitMode,
        transport: Arc<dyn JobTransport>,
        controls: Arc<dyn ControlPanel>,
    ) -> Arc<Self> {
        Self::with_output_base(mode, transport, controls, DEFAULT_OUTPUT_BASE)
    }

    pub fn with_output_base(
        mode: SubmitMode,
        transport: Arc<dyn JobTransport>,
        controls: Arc<dyn ControlPanel>,
        output_base: impl Into<String>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            mode,
            output_base: output_base.into(),
            transport,
            controls,
            inner: Mutex::new(PaintClientState {
                session_id: session_id::generate_session_id(),
                content: None,
                style: None,
                submission: SubmissionState::Idle,
                last_cache_bust: 0,
            }),
            events,
        })
    }

    pub fn mode(&self) -> SubmitMode {
        self.mode
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PaintEvent> {
        self.events.subscribe()
    }

    pub async fn state_snapshot(&self) -> StateSnapshot {
        let state = self.inner.lock().await;
        StateSnapshot {
            session_id: state.session_id.clone(),
            content: state.content.clone(),
            style: state.style.clone(),
            submission: state.submission,
        }
    }

    /// Feeds a picked file into the content slot. Non-image files are
    /// dropped silently and `Ok(false)` is returned; accepted files select
    /// the content image and, in batch/single mode, auto-submit.
    pub async fn load_content_file(&self, upload: FileUpload) -> Result<bool, SubmitError> {
        let Some(data_url) = input::data_url_for(&upload) else {
            debug!(mime = %upload.mime_type, "ignoring non-image upload");
            return Ok(false);
        };
        self.select_content(ImageSource(data_url)).await?;
        Ok(true)
    }

    /// Style-slot counterpart of [`load_content_file`]. Selection alone
    /// never submits; returns whether the file was accepted.
    ///
    /// [`load_content_file`]: PaintClient::load_content_file
    pub async fn load_style_file(&self, upload: FileUpload) -> bool {
        let Some(data_url) = input::data_url_for(&upload) else {
            debug!(mime = %upload.mime_type, "ignoring non-image upload");
            return false;
        };
        self.select_style(ImageSource(data_url)).await;
        true
    }

    /// Selecting a source by typed-in URL is not supported. The path fails
    /// loudly instead of silently doing nothing.
    pub fn select_content_url(&self, _url: &str) -> Result<(), SubmitError> {
        Err(SubmitError::UrlSourceUnsupported)
    }

    /// Binds a content source: reveals the preview, mints a new session id,
    /// and in batch/single mode immediately runs the submit path. The
    /// auto-submit bypasses precondition checks (the content was just set)
    /// but still honors the in-flight guard; if a request is already
    /// running the auto-submit is skipped.
    pub async fn select_content(&self, source: ImageSource) -> Result<(), SubmitError> {
        self.bind_selection(ImageSlot::Content, source).await;
        if self.mode.auto_submit_on_content() {
            match self.submit_current().await {
                Err(SubmitError::AlreadyInFlight) => {
                    warn!("auto-submit skipped: a submission is already in flight");
                }
                other => return other,
            }
        }
        Ok(())
    }

    /// Binds a style source and mints a new session id. Never auto-submits;
    /// the user confirms explicitly once both images are present.
    pub async fn select_style(&self, source: ImageSource) {
        self.bind_selection(ImageSlot::Style, source).await;
    }

    async fn bind_selection(&self, slot: ImageSlot, source: ImageSource) {
        let session_id = session_id::generate_session_id();
        {
            let mut state = self.inner.lock().await;
            state.session_id = session_id.clone();
            match slot {
                ImageSlot::Content => state.content = Some(source.clone()),
                ImageSlot::Style => state.style = Some(source.clone()),
            }
        }
        let _ = self.events.send(PaintEvent::SessionRotated(session_id));
        let _ = self.events.send(PaintEvent::PreviewRevealed { slot, source });
    }

    /// Explicit user-initiated submit. Precondition failures raise a
    /// blocking alert and leave the state machine in `Idle` with no request
    /// dispatched.
    pub async fn submit(&self) -> Result<(), SubmitError> {
        {
            let state = self.inner.lock().await;
            if state.content.is_none() {
                let message = match self.mode {
                    SubmitMode::Slow => "Please upload a content file",
                    _ => "select a file",
                };
                let _ = self.events.send(PaintEvent::Alert(message.to_string()));
                return Err(SubmitError::MissingContentImage);
            }
            if self.mode.requires_style() && state.style.is_none() {
                let _ = self
                    .events
                    .send(PaintEvent::Alert("Please upload a style file".to_string()));
                return Err(SubmitError::MissingStyleImage);
            }
        }
        self.submit_current().await
    }

    async fn submit_current(&self) -> Result<(), SubmitError> {
        let payload = {
            let mut state = self.inner.lock().await;
            if state.submission == SubmissionState::InFlight {
                return Err(SubmitError::AlreadyInFlight);
            }
            let Some(content) = state.content.clone() else {
                return Err(SubmitError::MissingContentImage);
            };
            state.submission = SubmissionState::InFlight;
            JobPayload {
                line: content.0,
                style: if self.mode.requires_style() {
                    state.style.clone().map(|s| s.0)
                } else {
                    None
                },
                blur: self.controls.blur_kernel(),
                id: state.session_id.clone(),
                mode: self.mode,
                style_weights: self
                    .mode
                    .carries_style_weights()
                    .then(|| self.controls.style_weights()),
                style_master_weight: self
                    .mode
                    .carries_style_weights()
                    .then(|| self.controls.master_weight()),
            }
        };

        let _ = self.events.send(PaintEvent::BusyChanged(true));
        info!(id = %payload.id, mode = %payload.mode, "coloring start");

        // One request, no retry; the lock is never held across the await.
        let outcome = self.transport.submit(&payload).await;

        let rewritten = {
            let mut state = self.inner.lock().await;
            state.submission = SubmissionState::Idle;
            match outcome {
                Ok(()) => {
                    // The id used for rewriting is whatever is current at
                    // completion time; a reselection made while the request
                    // was running wins the display slots.
                    let cache_bust = next_cache_bust(&mut state);
                    let id = state.session_id.clone();
                    let bindings = (0..self.mode.output_count())
                        .map(|index| {
                            let url =
                                output_artifact_url(&self.output_base, &id, index, cache_bust);
                            OutputBinding {
                                image_url: url.clone(),
                                link_url: url,
                            }
                        })
                        .collect::<Vec<_>>();
                    Ok((id, bindings))
                }
                Err(err) => Err(err),
            }
        };

        let _ = self.events.send(PaintEvent::BusyChanged(false));
        match rewritten {
            Ok((id, bindings)) => {
                info!(id = %id, outputs = bindings.len(), "coloring finish");
                let _ = self.events.send(PaintEvent::OutputsRewritten(bindings));
                Ok(())
            }
            Err(err) => {
                warn!("coloring failed: {err}");
                let _ = self.events.send(PaintEvent::Error(err.to_string()));
                Err(SubmitError::Transport(err.to_string()))
            }
        }
    }
}

/// Wall-clock millisecond token, clamped so successive submissions never go
/// backwards even if the clock does.
fn next_cache_bust(state: &mut PaintClientState) -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let token = now.max(state.last_cache_bust);
    state.last_cache_bust = token;
    token
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
