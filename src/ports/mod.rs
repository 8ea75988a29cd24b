//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the dispatch engine and an
//! external system (network, durable storage, time). Implementations live
//! in `src/adapters/`.

pub mod clock;
pub mod storage;
pub mod transport;

pub use clock::Clock;
pub use storage::CassetteStorage;
pub use transport::{HttpRequest, HttpResponse, Transport, TransportFuture};
