//! BuyLink storefront protocol - consuming the persisted configuration.
//!
//! The theme app extension emits the stored configuration as data
//! attributes on a container element; this crate defines the contract for
//! reading them and turning them into interactive buttons:
//!
//! - [`payload`] - tolerant parsing of the serialized link array
//! - [`render`] - the per-container render state machine
//! - [`click`] - destination validation and the click-through sequence
//! - [`atc`] - hiding the native add-to-cart control, with bounded retries
//!
//! Nothing in here is allowed to throw at the page: parse failures render
//! nothing, and best-effort side channels (analytics, notices) swallow
//! their own errors.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod atc;
pub mod click;
pub mod payload;
pub mod render;

pub use atc::{DomSurface, HideReport, hide_add_to_cart};
pub use click::{AnalyticsSink, ClickHandler, ClickOutcome, validate_destination};
pub use payload::parse_payload;
pub use render::{Container, ContainerDataset, RenderState, RenderedButton};
