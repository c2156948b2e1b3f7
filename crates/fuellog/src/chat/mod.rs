//! Conversational surface.
//!
//! Inbound events are decoded once into [`Action`]s, handled one at a time
//! by the [`Assistant`], and answered with structured [`Reply`] values that
//! a [`Transport`] renders for its medium.

mod action;
mod assistant;
pub mod render;
mod reply;
mod transport;

pub use action::Action;
pub use assistant::Assistant;
pub use reply::{Button, ListPurpose, Prompt, Reply, ReplyBody};
pub use transport::{run_session, LineTransport, Transport};
