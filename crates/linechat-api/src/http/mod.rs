//! HTTP layer for linechat.
//!
//! Axum server with the LINE webhook at `/callback`, liveness routes, and
//! a token-protected admin API at `/api/v1/` using the envelope response
//! format.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;
