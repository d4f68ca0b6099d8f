//! Dialogue routing: from a classified message to a reply payload.
//!
//! ```text
//! ClassificationResult ─┐
//!                       ├→ DialogueRouter::route → handler → ResponsePayload
//! raw message ──────────┘
//! ```
//!
//! Each message is handled on its own; no state is kept between turns.

pub mod extract;
pub mod response;
pub mod router;

pub use response::{OrderCard, ReplyStatus, ResponsePayload};
pub use router::{DialogueRouter, RouterConfig};
