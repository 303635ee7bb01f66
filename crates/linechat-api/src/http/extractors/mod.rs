//! Request extractors.

pub mod admin;
