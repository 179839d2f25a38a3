//! Blocking Rust client for the SigBox remote signing service.
//!
//! SigBox signs documents server-side: callers register seal templates,
//! open a signature batch (a "ticket"), attach the files to sign, then
//! finalize the batch to obtain the URL where the signer completes the
//! signature on their phone. Once that has happened, each signed file is
//! fetched back; the fetch removes the server-side copy, so it works
//! exactly once per document.
//!
//! All requests are authenticated with an API key and run synchronously,
//! one HTTP round-trip per call.
//!
//! # Example
//!
//! ```no_run
//! use sigbox_client::SigBoxClient;
//!
//! # fn main() -> Result<(), sigbox_client::Error> {
//! let client = SigBoxClient::new("secret-key", "https://sigbox.example.com")?;
//!
//! let ticket = client.start_signature(
//!     "https://app.example.com/signed",
//!     "https://app.example.com/failed",
//! )?;
//! let document_id = client.add_document(&ticket, "contract.pdf")?;
//! let signing_url = client.finalize(&ticket)?;
//! println!("sign here: {signing_url}");
//!
//! // ...after the signer has finished on their device...
//! let signed = client.take_document(&ticket, &document_id)?;
//! std::fs::write("contract-signed.pdf", &signed.content)?;
//! # Ok(())
//! # }
//! ```
//!
//! The crate never prints or logs on its own; request outcomes are
//! reported as [`Error`] values, plus `tracing` debug events for anyone
//! who subscribes.

pub mod client;
pub mod error;
pub mod types;

pub use client::{SigBoxClient, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use types::{SealPlacement, SignedDocument, Template};
