//! Invisible Web-to-Lead relay for live Chrome pages.
//!
//! Intercepts submission of an existing form in a page, remaps its field
//! values onto a hidden form aimed at a lead-capture endpoint, and submits
//! that form into a hidden frame so the page never navigates away. All DOM
//! work runs over CDP via [`chromiumoxide`].
//!
//! ```no_run
//! use lead_relay::{Chrome, ChromeConfig, LeadRelay};
//!
//! # async fn run() -> lead_relay::Result<()> {
//! let chrome = Chrome::launch(ChromeConfig::default()).await?;
//! let page = chrome.new_page("https://example.com/signup").await?;
//!
//! LeadRelay::builder("https://crm.example.com/lead", "signup-form")
//!     .map_field("email", "lead_email")
//!     .additional_field("oid", "00D000000000001")
//!     .install(&page)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod chrome;
pub mod config;
pub mod dom;
pub mod error;
pub mod mapper;
pub mod relay;

pub use chrome::{Chrome, ChromeConfig};
pub use config::{AfterSubmitFn, RelayBuilder, RelayConfig, TransformFn};
pub use error::{Error, Result};
pub use mapper::{InputKind, ShadowInput, SourceField};
pub use relay::LeadRelay;
