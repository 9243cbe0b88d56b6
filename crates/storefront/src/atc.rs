//! Hiding the native add-to-cart control.
//!
//! The control is found by guessing: an ordered selector list, merchant
//! override first, then fixed fallbacks covering common themes. Themes
//! that render late get a bounded retry. Whatever happens, a completion
//! report is emitted for other scripts to consume.

use std::time::{Duration, Instant};

use tracing::debug;

/// Fallback selectors, tried in order on every pass.
pub const FALLBACK_SELECTORS: &[&str] = &[
    "form[action*='/cart/add'] [type='submit']",
    "form[action*='/cart/add'] button[name='add']",
    ".product-form__submit",
    ".shopify-payment-button",
    "button[data-add-to-cart]",
    ".add-to-cart-button",
];

/// Bounded retry: attempts x delay, then give up and report anyway.
const HIDE_MAX_ATTEMPTS: u32 = 5;
const HIDE_RETRY_DELAY: Duration = Duration::from_millis(400);

/// Debounce window for mutation-observer-triggered re-renders.
pub const RERENDER_DEBOUNCE: Duration = Duration::from_millis(200);

/// The one shared mutable resource the storefront script touches.
pub trait DomSurface {
    /// Hide every element matching `selector`; returns how many matched.
    fn hide_all(&mut self, selector: &str) -> usize;
}

/// Completion signal: consumable by other scripts, required by none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideReport {
    /// Total elements hidden across all passes.
    pub hidden: usize,
    /// Passes used (1-based; equals the max when nothing was found).
    pub attempts: u32,
}

/// The ordered selector list for one container.
///
/// A non-blank merchant override goes first; the fixed fallbacks always
/// follow.
#[must_use]
pub fn selector_plan(override_selector: Option<&str>) -> Vec<String> {
    let mut plan = Vec::with_capacity(FALLBACK_SELECTORS.len() + 1);
    if let Some(custom) = override_selector
        && !custom.trim().is_empty()
    {
        plan.push(custom.trim().to_string());
    }
    plan.extend(FALLBACK_SELECTORS.iter().map(|s| (*s).to_string()));
    plan
}

/// Hide all add-to-cart matches, retrying while nothing is found.
///
/// A pass walks the whole selector plan. Passes repeat with a fixed delay
/// until something was hidden or the attempt budget runs out; the report
/// is emitted either way.
pub async fn hide_add_to_cart<D: DomSurface>(
    dom: &mut D,
    override_selector: Option<&str>,
) -> HideReport {
    let plan = selector_plan(override_selector);

    let mut attempts = 0;
    loop {
        attempts += 1;
        let hidden: usize = plan.iter().map(|s| dom.hide_all(s)).sum();

        if hidden > 0 || attempts >= HIDE_MAX_ATTEMPTS {
            debug!(hidden, attempts, "add-to-cart hide pass finished");
            return HideReport { hidden, attempts };
        }

        tokio::time::sleep(HIDE_RETRY_DELAY).await;
    }
}

/// Collapses a burst of DOM-change signals into one due re-render.
///
/// Pure schedule logic: the caller feeds wall-clock instants in, so it
/// tests without timers or a DOM.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// A debouncer with the standard re-render window.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delay: RERENDER_DEBOUNCE,
            deadline: None,
        }
    }

    /// Note a DOM change; pushes the deadline out by the full window.
    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True exactly once per settled burst, when the window has elapsed.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
