//! # nav-guidance
//!
//! Embeddable support library for turn-by-turn navigation hosts: guidance
//! view image fetching and periodic trip status notifications.
//!
//! ## Design Philosophy
//!
//! nav-guidance is designed to be:
//! - **Non-blocking** - Image fetches are scheduled onto background tasks,
//!   never run on the caller's stack
//! - **Cancelable** - Every fetch can be cancelled individually or as a
//!   group, and a cancelled fetch delivers nothing
//! - **Host-agnostic** - Notification delivery is a trait the host
//!   implements for its platform
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use nav_guidance::{BannerInstruction, FetchConfig, FetchOutcome, GuidanceImageFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = GuidanceImageFetcher::new(&FetchConfig::default())?;
//!
//!     // Parsed from a route response; shown here as raw JSON.
//!     let banner: BannerInstruction = serde_json::from_str(
//!         r#"{
//!             "primary_text": "Exit 23B toward Midtown",
//!             "view": {
//!                 "components": [
//!                     {"type": "guidance-view", "image_url": "https://img.example.com/23b.png"}
//!                 ]
//!             }
//!         }"#,
//!     )?;
//!
//!     match fetcher.fetch(&banner).outcome().await {
//!         Some(FetchOutcome::Ready(image)) => println!("{}x{} image", image.width, image.height),
//!         Some(FetchOutcome::NoSource(reason)) => println!("nothing to fetch: {reason}"),
//!         Some(FetchOutcome::Failure(message)) => println!("fetch failed: {message}"),
//!         None => println!("fetch was cancelled"),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Banner instruction model and guidance view URL extraction
pub mod banner;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Asynchronous guidance view image fetching
pub mod fetch;
/// Trip notification sink trait and status payloads
pub mod notification;
/// Periodic trip status refresh loop
pub mod trip_service;
/// Core types shared across modules
pub mod types;

// Re-export commonly used types
pub use banner::{
    BannerComponent, BannerInstruction, BannerView, ComponentKind, NoSourceReason,
    guidance_image_url,
};
pub use config::{Config, FetchConfig, RefreshConfig};
pub use error::{Error, Result};
pub use fetch::decoder::{GuessFormatDecoder, ImageDecoder};
pub use fetch::transport::{ImageTransport, ReqwestTransport, TransportResponse, USER_AGENT};
pub use fetch::{FetchHandle, GuidanceImageFetcher};
pub use notification::{RouteProgress, TripNotificationSink, TripStatus};
pub use trip_service::TripStatusService;
pub use types::{FetchId, FetchOutcome, GENERIC_FETCH_FAILURE, GuidanceImage};
