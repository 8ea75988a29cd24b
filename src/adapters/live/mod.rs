//! Live adapters for the network, the filesystem and the system clock.

pub mod clock;
pub mod storage;
pub mod transport;

pub use clock::SystemClock;
pub use storage::YamlFileStorage;
pub use transport::ReqwestTransport;
