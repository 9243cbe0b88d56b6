//! The per-container render state machine.
//!
//! One container element per product. A container renders at most once:
//! `Unrendered -> Rendered` when at least one button comes out of the
//! payload, `Unrendered -> Skipped` when the payload is empty or absent.
//! Re-invoking the entry point (e.g., after dynamic content injection)
//! touches only containers still in `Unrendered`.

use buylink_core::ExternalLink;

use crate::payload::parse_payload;

/// Label used when a link has no text.
pub const DEFAULT_BUTTON_LABEL: &str = "Buy now";

/// The data attributes the app block writes onto its container element.
#[derive(Debug, Clone, Default)]
pub struct ContainerDataset {
    /// `data-product-id` - correlates the container to rendered buttons.
    pub product_id: String,
    /// `data-external-links` - serialized link array, tolerant encodings.
    pub external_links: String,
    /// `data-hide-atc` - `"true"` to hide the native add-to-cart control.
    pub hide_atc: bool,
    /// `data-atc-override-selector` - optional merchant-supplied selector.
    pub atc_override_selector: Option<String>,
}

/// Where a container is in its render lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    #[default]
    Unrendered,
    Rendering,
    /// Terminal: buttons were produced.
    Rendered,
    /// Terminal: empty or absent payload, nothing to show.
    Skipped,
}

/// One interactive element to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedButton {
    /// Owning product (from the container dataset).
    pub product_id: String,
    /// Destination URL.
    pub url: String,
    /// Visible label, defaulted when the record text is empty.
    pub label: String,
}

/// A container element plus its render state.
#[derive(Debug, Clone)]
pub struct Container {
    dataset: ContainerDataset,
    state: RenderState,
}

impl Container {
    /// Wrap a freshly discovered container element.
    #[must_use]
    pub const fn new(dataset: ContainerDataset) -> Self {
        Self {
            dataset,
            state: RenderState::Unrendered,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RenderState {
        self.state
    }

    /// The dataset this container was discovered with.
    #[must_use]
    pub const fn dataset(&self) -> &ContainerDataset {
        &self.dataset
    }

    /// Render this container once.
    ///
    /// Only `enabled` entries with a non-blank url are rendered, in payload
    /// order. Safe to call repeatedly: terminal states return nothing.
    pub fn render(&mut self) -> Vec<RenderedButton> {
        if self.state != RenderState::Unrendered {
            return Vec::new();
        }
        self.state = RenderState::Rendering;

        let links = parse_payload(&self.dataset.external_links);
        let buttons: Vec<RenderedButton> = links
            .iter()
            .filter(|l| l.enabled && !l.is_blank())
            .map(|l| self.button_for(l))
            .collect();

        self.state = if buttons.is_empty() {
            RenderState::Skipped
        } else {
            RenderState::Rendered
        };
        buttons
    }

    fn button_for(&self, link: &ExternalLink) -> RenderedButton {
        let label = if link.text.trim().is_empty() {
            DEFAULT_BUTTON_LABEL.to_string()
        } else {
            link.text.clone()
        };
        RenderedButton {
            product_id: self.dataset.product_id.clone(),
            url: link.url.clone(),
            label,
        }
    }
}

/// Render every not-yet-rendered container on the page.
///
/// The re-entrant page entry point: calling it again after new containers
/// were appended renders only the new ones.
pub fn render_all(containers: &mut [Container]) -> Vec<RenderedButton> {
    containers.iter_mut().flat_map(Container::render).collect()
}
