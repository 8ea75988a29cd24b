//! In-process adapters for tests and throwaway cassettes.

pub mod clock;
pub mod storage;

pub use clock::FixedClock;
pub use storage::MemoryStorage;
