//! Chrome DevTools Protocol (CDP) client implementation.
//!
//! Connects to Chrome via WebSocket and speaks the CDP JSON-RPC protocol.
//! Responses are matched to requests by id; events are routed to the page
//! session they belong to.
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222").await?;
//! let page = client.new_window(true).await?;
//! page.navigate("https://example.com").await?;
//! ```

mod client;
mod error;
mod events;
mod protocol;
mod session;
mod transport;

pub use client::CdpClient;
pub use error::CdpError;
pub use events::translate_event;
pub use protocol::*;
pub use session::PageSession;
