//! Mounting a rendered document into an isolated frame on the host page.
//!
//! # States
//!
//! ```text
//! Idle --start--> Loading --mount--> Rendering --settle--> Settled
//!                    |                   |
//!                    +------fail---------+----> Failed
//! ```
//!
//! - **Loading**: a placeholder occupies the host element.
//! - **Rendering**: the document is assigned to a new frame (`srcdoc`),
//!   appended with height 0 and opacity 0.
//! - **Settled**: after the frame's load signal, its content height plus a
//!   fixed buffer is applied, size changes are followed until a re-check
//!   deadline, the latest height is applied once more, then the
//!   placeholder is removed and the frame revealed.
//!
//! Height application is idempotent; the host is only touched when the
//! height actually changes.
//!
//! The host page is reached through [`EmbedHost`]. [`MarkupHost`] is an
//! in-memory host that produces the host element's final markup.

use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

use crate::error::{MountError, FEED_LOAD_ERROR_MESSAGE};
use crate::render::{escape_html, RenderedMarkup};

pub const DEFAULT_HEIGHT_BUFFER_PX: u32 = 20;
pub const DEFAULT_RECHECK_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_PLACEHOLDER: &str = "Loading Medium posts...";

/// Markup that replaces the host content when a load fails.
pub fn error_html() -> String {
    format!("<p style='color: #ff0000;'>{FEED_LOAD_ERROR_MESSAGE}</p>")
}

/// Tuning for the mount sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOptions {
    /// Added to the observed content height.
    pub height_buffer_px: u32,
    /// How long to follow size changes after load before the final re-check.
    pub recheck_delay: Duration,
    /// Text shown while loading.
    pub placeholder: String,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            height_buffer_px: DEFAULT_HEIGHT_BUFFER_PX,
            recheck_delay: DEFAULT_RECHECK_DELAY,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

/// The frame the host is asked to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub srcdoc: String,
    pub height_px: u32,
    pub visible: bool,
}

impl FrameSpec {
    fn hidden(document: RenderedMarkup) -> Self {
        Self {
            srcdoc: document.into_string(),
            height_px: 0,
            visible: false,
        }
    }

    /// `<iframe>` element for this frame. Width is always 100%.
    pub fn to_html(&self) -> String {
        format!(
            r#"<iframe srcdoc="{}" width="100%" style="border: none; height: {}px; opacity: {}; transition: opacity 0.3s ease-in-out;"></iframe>"#,
            escape_html(&self.srcdoc),
            self.height_px,
            u8::from(self.visible),
        )
    }
}

/// Signals a mounted frame reports back to the controller.
#[derive(Debug)]
pub struct FrameSignals {
    /// Fires once when the frame's content has loaded.
    pub loaded: oneshot::Receiver<()>,
    /// Latest observed content height in pixels.
    pub content_height: watch::Receiver<u32>,
}

/// Sending side of [`FrameSignals`], held by the host.
#[derive(Debug)]
pub struct FrameEvents {
    loaded: Option<oneshot::Sender<()>>,
    content_height: watch::Sender<u32>,
}

impl FrameEvents {
    /// Connected event/signal pair.
    pub fn channel() -> (Self, FrameSignals) {
        let (loaded_tx, loaded_rx) = oneshot::channel();
        let (height_tx, height_rx) = watch::channel(0);
        (
            Self {
                loaded: Some(loaded_tx),
                content_height: height_tx,
            },
            FrameSignals {
                loaded: loaded_rx,
                content_height: height_rx,
            },
        )
    }

    /// Report that the frame finished loading. Later calls are ignored.
    pub fn loaded(&mut self) {
        if let Some(tx) = self.loaded.take() {
            let _ = tx.send(());
        }
    }

    /// Report an observed content height.
    pub fn resized(&self, height_px: u32) {
        self.content_height.send_replace(height_px);
    }
}

/// The host page element an embed renders into.
pub trait EmbedHost {
    /// Show the loading placeholder.
    fn show_placeholder(&mut self, html: &str);

    /// Replace the element's entire content.
    fn replace_content(&mut self, html: &str);

    /// Append an isolated frame and start reporting its load and size.
    fn append_frame(&mut self, frame: FrameSpec) -> FrameSignals;

    fn set_frame_height(&mut self, height_px: u32);

    fn remove_placeholder(&mut self);

    /// Make the frame visible (opacity transition).
    fn reveal_frame(&mut self);
}

/// Mount lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    Idle,
    Loading,
    Rendering,
    Settled { height_px: u32 },
    Failed,
}

impl MountState {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Rendering => "rendering",
            Self::Settled { .. } => "settled",
            Self::Failed => "failed",
        }
    }
}

/// Drives one host element through the mount sequence.
pub struct MountController<H> {
    host: H,
    options: MountOptions,
    state: MountState,
    applied_height: Option<u32>,
}

impl<H: EmbedHost> MountController<H> {
    pub fn new(host: H, options: MountOptions) -> Self {
        Self {
            host,
            options,
            state: MountState::Idle,
            applied_height: None,
        }
    }

    pub fn state(&self) -> MountState {
        self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Show the placeholder.
    pub fn start(&mut self) -> Result<(), MountError> {
        self.expect_state(MountState::Idle, "start")?;

        let html = format!(
            r#"<p class="medium-embed-loading" style="color: #6b7280;">{}</p>"#,
            escape_html(&self.options.placeholder)
        );
        self.host.show_placeholder(&html);
        self.state = MountState::Loading;
        Ok(())
    }

    /// Append a hidden frame holding `document`.
    pub fn mount(&mut self, document: RenderedMarkup) -> Result<FrameSignals, MountError> {
        self.expect_state(MountState::Loading, "mount")?;

        let signals = self.host.append_frame(FrameSpec::hidden(document));
        self.state = MountState::Rendering;
        debug!("Frame appended");
        Ok(signals)
    }

    /// Size the frame from its signals, then reveal it. Returns the applied height.
    pub async fn settle(&mut self, signals: FrameSignals) -> Result<u32, MountError> {
        self.expect_state(MountState::Rendering, "settle")?;

        let FrameSignals {
            loaded,
            mut content_height,
        } = signals;

        if loaded.await.is_err() {
            warn!("Frame load signal dropped, settling with last observed height");
        }
        let observed = *content_height.borrow_and_update();
        self.apply_height(observed);

        let deadline = tokio::time::sleep(self.options.recheck_delay);
        tokio::pin!(deadline);
        let mut observing = true;
        loop {
            tokio::select! {
                () = &mut deadline => break,
                changed = content_height.changed(), if observing => match changed {
                    Ok(()) => {
                        let observed = *content_height.borrow_and_update();
                        self.apply_height(observed);
                    }
                    Err(_) => observing = false,
                },
            }
        }

        // Late images and fonts may have changed the size without a report
        // reaching us before the deadline.
        let observed = *content_height.borrow();
        let height_px = self.apply_height(observed);

        self.host.remove_placeholder();
        self.host.reveal_frame();
        self.state = MountState::Settled { height_px };
        debug!(height_px, "Frame settled");
        Ok(height_px)
    }

    /// Replace the host content with the error message. No frame remains.
    pub fn fail(&mut self) -> Result<(), MountError> {
        if matches!(self.state, MountState::Settled { .. } | MountState::Failed) {
            return Err(MountError::InvalidTransition {
                from: self.state.name(),
                operation: "fail",
            });
        }

        self.host.replace_content(&error_html());
        self.state = MountState::Failed;
        Ok(())
    }

    fn apply_height(&mut self, content_height: u32) -> u32 {
        let height_px = content_height.saturating_add(self.options.height_buffer_px);
        if self.applied_height != Some(height_px) {
            self.host.set_frame_height(height_px);
            self.applied_height = Some(height_px);
        }
        height_px
    }

    fn expect_state(&self, expected: MountState, operation: &'static str) -> Result<(), MountError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(MountError::InvalidTransition {
                from: self.state.name(),
                operation,
            })
        }
    }
}

/// In-memory host element.
///
/// Keeps the element's children as markup. Without a layout engine it
/// cannot measure the frame itself: either give it a content height up
/// front with [`MarkupHost::with_content_height`], or drive the frame
/// through [`MarkupHost::take_frame_events`].
#[derive(Debug, Default)]
pub struct MarkupHost {
    placeholder: Option<String>,
    replaced: Option<String>,
    frame: Option<FrameSpec>,
    events: Option<FrameEvents>,
    content_height: Option<u32>,
    height_writes: usize,
}

impl MarkupHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report loaded with `height_px` of content as soon as a frame is appended.
    #[must_use]
    pub fn with_content_height(mut self, height_px: u32) -> Self {
        self.content_height = Some(height_px);
        self
    }

    /// Events for the appended frame, if not already taken.
    pub fn take_frame_events(&mut self) -> Option<FrameEvents> {
        self.events.take()
    }

    pub fn frame(&self) -> Option<&FrameSpec> {
        self.frame.as_ref()
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Number of times the frame height was written.
    pub fn height_writes(&self) -> usize {
        self.height_writes
    }

    /// Current content of the host element.
    pub fn inner_html(&self) -> String {
        if let Some(replaced) = &self.replaced {
            return replaced.clone();
        }

        let mut html = String::new();
        if let Some(placeholder) = &self.placeholder {
            html.push_str(placeholder);
        }
        if let Some(frame) = &self.frame {
            html.push_str(&frame.to_html());
        }
        html
    }
}

impl EmbedHost for MarkupHost {
    fn show_placeholder(&mut self, html: &str) {
        self.replaced = None;
        self.placeholder = Some(html.to_string());
    }

    fn replace_content(&mut self, html: &str) {
        self.placeholder = None;
        self.frame = None;
        self.events = None;
        self.replaced = Some(html.to_string());
    }

    fn append_frame(&mut self, frame: FrameSpec) -> FrameSignals {
        let (mut events, signals) = FrameEvents::channel();
        if let Some(height_px) = self.content_height {
            events.resized(height_px);
            events.loaded();
        }
        self.frame = Some(frame);
        self.events = Some(events);
        signals
    }

    fn set_frame_height(&mut self, height_px: u32) {
        if let Some(frame) = &mut self.frame {
            frame.height_px = height_px;
        }
        self.height_writes += 1;
    }

    fn remove_placeholder(&mut self) {
        self.placeholder = None;
    }

    fn reveal_frame(&mut self) {
        if let Some(frame) = &mut self.frame {
            frame.visible = true;
        }
    }
}
