//! # FlashBlade SDK
//!
//! Rust client for the Pure Storage FlashBlade REST API.
//!
//! ## Features
//!
//! - **Two auth modes** - OAuth2 identity-token exchange (pre-issued ID token
//!   or RS256-signed from a private key), or API-token session login
//! - **Resilient dispatch** - automatic re-authentication on 401/403, rate-limit
//!   backoff on 429, immediate retry on 5xx gateway errors
//! - **Lazy pagination** - results are fetched page by page as you consume them
//! - **Uniform responses** - every call returns a [`Response`] that is either
//!   valid or an [`ErrorResponse`] carrying the array's error messages
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flashblade_sdk::{Client, ListParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder()
//!         .target("flashblade.example.com")
//!         .api_token("T-0b8a7f36-1c5e-4f1a-9d7e-6b2e4c3a1f00")
//!         .build()?;
//!
//!     let response = client.file_systems().list(&ListParams::new().limit(50)).await?;
//!     let mut items = response.into_result()?.into_items();
//!     while let Some(fs) = items.next().await? {
//!         println!("File system: {:?}", fs.name);
//!     }
//!
//!     client.logout().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! ### API token
//! ```rust,no_run
//! # use flashblade_sdk::Client;
//! let client = Client::builder()
//!     .target("flashblade.example.com")
//!     .api_token("T-0b8a7f36-1c5e-4f1a-9d7e-6b2e4c3a1f00")
//!     .build()?;
//! # Ok::<(), flashblade_sdk::Error>(())
//! ```
//!
//! ### Identity token
//! ```rust,no_run
//! # use flashblade_sdk::Client;
//! let client = Client::builder()
//!     .target("flashblade.example.com")
//!     .id_token("eyJ...")
//!     .build()?;
//! # Ok::<(), flashblade_sdk::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! HTTP failures the client knows how to classify come back as data; only
//! configuration, authentication, network and unexpected-status failures are
//! `Err`:
//!
//! ```rust,no_run
//! # use flashblade_sdk::{Client, ListParams, Response};
//! # async fn example(client: Client) -> Result<(), flashblade_sdk::Error> {
//! match client.buckets().list(&ListParams::new().names(["logs"])).await? {
//!     Response::Valid(valid) => println!("{:?} buckets", valid.total_item_count),
//!     Response::Error(error) => {
//!         for e in &error.errors {
//!             eprintln!("{}: {:?}", error.status, e.message);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod error;
pub mod headers;
pub mod models;
pub mod pagination;
pub mod params;
pub mod reference;
pub mod response;
pub mod testkit;

// Re-export main types
pub use client::{ApiCall, Client, ClientBuilder, ClientConfig, Endpoint, Transport};
pub use error::{Error, Result};
pub use pagination::ItemIterator;
pub use params::{ParamValue, Params};
pub use reference::{process_references, Reference, ResourceRef};
pub use response::{ApiError, ErrorResponse, Response, ValidResponse};

// Re-export model types for convenience
pub use models::{
    ApiVersions, Array, Bucket, FileSystem, FileSystemPatch, FileSystemPost, ListParams, Policy,
    PolicyMember,
};

/// SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent prefix for API requests
pub const USER_AGENT: &str = concat!("flashblade-sdk/", env!("CARGO_PKG_VERSION"));
