//! HTTP client used to reach the GitHub API.

mod client;

pub use client::{HttpClient, USER_AGENT};
