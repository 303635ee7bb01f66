//! Image-generation port for linechat.
//!
//! - `ImageClient`: RPITIT trait for concrete image upstreams
//! - `BoxImageClient`: object-safe wrapper for dynamic dispatch

pub mod box_provider;
pub mod provider;

pub use box_provider::BoxImageClient;
pub use provider::ImageClient;
