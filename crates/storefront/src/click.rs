//! The click-through sequence for a rendered button.
//!
//! Clicking validates the destination scheme, fires analytics and a
//! transient notice best-effort, then opens the URL in a new browsing
//! context after a short cosmetic delay. Side-channel failures are
//! swallowed at the call site; nothing may block the open.

use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::render::RenderedButton;

/// Cosmetic animation delay before the open.
const OPEN_DELAY: Duration = Duration::from_millis(700);

/// Validate that a destination is an `http`/`https` URL.
#[must_use]
pub fn validate_destination(destination: &str) -> bool {
    Url::parse(destination)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// A click event handed to the analytics sink.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub product_id: String,
    pub url: String,
    pub label: String,
}

/// Best-effort analytics. Implementations may fail freely; the handler
/// swallows every error.
pub trait AnalyticsSink {
    /// Record one outbound click.
    ///
    /// # Errors
    ///
    /// Implementations may return any error; callers ignore it.
    fn track(&self, event: &ClickEvent) -> Result<(), Box<dyn std::error::Error>>;
}

/// What a click resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Open `url` in a new browsing context; `notice` is the transient
    /// message shown meanwhile.
    Opened { url: String, notice: String },
    /// The destination failed validation; nothing opens.
    Rejected,
}

/// Drives the click sequence for rendered buttons.
pub struct ClickHandler<A> {
    analytics: Option<A>,
}

impl<A: AnalyticsSink> ClickHandler<A> {
    /// Create a handler, optionally with an analytics sink.
    #[must_use]
    pub const fn new(analytics: Option<A>) -> Self {
        Self { analytics }
    }

    /// Run the full sequence for one button.
    ///
    /// Returns after the cosmetic delay with the URL to open, or
    /// [`ClickOutcome::Rejected`] for a non-http(s) destination.
    pub async fn activate(&self, button: &RenderedButton) -> ClickOutcome {
        if !validate_destination(&button.url) {
            warn!(url = %button.url, "rejected non-http(s) destination");
            return ClickOutcome::Rejected;
        }

        if let Some(analytics) = &self.analytics {
            let event = ClickEvent {
                product_id: button.product_id.clone(),
                url: button.url.clone(),
                label: button.label.clone(),
            };
            if let Err(error) = analytics.track(&event) {
                debug!(%error, "analytics unavailable, continuing");
            }
        }

        let notice = format!("Opening {}...", button.label);
        tokio::time::sleep(OPEN_DELAY).await;

        ClickOutcome::Opened {
            url: button.url.clone(),
            notice,
        }
    }
}
