//! Middleware components for all services.

pub mod request_id;
pub mod session;

// Re-export commonly used types
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use session::{SessionKey, SESSION_KEY_HEADER};
