//! RBAC Effects - HTTP handlers for the migration engine
//!
//! [`HttpResourceApi`] implements [`rbac_core::ResourceApi`] against the
//! platform REST API and [`GraphDirectory`] implements
//! [`rbac_core::DirectoryService`] against a Graph-style `users` endpoint.
//! Both send an optional bearer token and map transport failures, missing
//! resources and other statuses onto the core error types.

#![forbid(unsafe_code)]

mod http;

/// Directory handler
pub mod directory;

/// Resource API handler
pub mod resource_api;

pub use directory::GraphDirectory;
pub use http::REQUEST_TIMEOUT;
pub use resource_api::HttpResourceApi;
