//! Transport implementations

mod http;
pub mod mock;

pub use http::{DEFAULT_TIMEOUT, ReqwestTransport};
pub use mock::MockTransport;
