pub mod fcm_push_adapter;

// Re-export main adapters for convenience
pub use fcm_push_adapter::{FcmConfig, FcmPushAdapter};
