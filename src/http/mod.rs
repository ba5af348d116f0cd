//! REST transport.

mod client;

pub use client::{Headers, HttpClient};
