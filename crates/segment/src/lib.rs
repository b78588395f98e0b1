//! Segment tracking API client for Rust.
//!
//! Requests are plain values assembled with chained builders, then handed to
//! a [`SegmentClient`] which posts them to `https://api.segment.io/v1/<resource>`.
//!
//! # Example
//!
//! ```rust,ignore
//! use segment::{SegmentClient, Track, AnonymousAware, EnvelopeAware};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), segment::Error> {
//!     let client = SegmentClient::builder("write_key").build()?;
//!
//!     let track = Track::create_anonymous("anon_42", "Signed Up")
//!         .with_property("plan", "pro")
//!         .with_ip_context("203.0.113.7")
//!         .disable_all_integrations()
//!         .with_integration("Mixpanel", true);
//!
//!     client.send(track).await?;
//!     Ok(())
//! }
//! ```

mod batch;
mod client;
mod config;
mod envelope;
mod error;
mod filter;
mod fragments;
mod requests;
mod transport;
mod types;

pub use batch::Batch;
pub use client::SegmentClient;
pub use config::{Config, SegmentBuilder, DEFAULT_API_HOST, DEFAULT_TIMEOUT, DEFAULT_VERSION};
pub use envelope::*;
pub use error::Error;
pub use filter::{filter_dict, is_blank};
pub use fragments::{
    Anonymity, AnonymousAware, Identity, IdentityAware, Timestamp, TimestampAware,
};
pub use requests::*;
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::{Request, Resource};

impl SegmentBuilder {
    /// Build a client using the reqwest transport.
    pub fn build(self) -> Result<SegmentClient, Error> {
        let config = self.build_config()?;
        SegmentClient::from_config(config)
    }
}
