//! Cassettes: the stored interaction format and the interaction store.

pub mod format;
pub mod store;

pub use format::{Body, CapturedRequest, CapturedResponse, HeaderText, Interaction};
pub use store::Cassette;
