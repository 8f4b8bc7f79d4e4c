//! hearth-http - Identity API client over HTTP.

mod api;
mod client;
mod endpoints;

pub use api::HttpIdentityApi;
pub use client::ApiClient;
