//! Supervisor event listener protocol.
//!
//! ```text
//!  listener                         supervisor
//!     │ ── READY\n ──────────────────────► │
//!     │ ◄── header line (key:value ...)\n ─ │
//!     │ ◄── payload (len bytes) ─────────── │
//!     │ ── RESULT 2\nOK ─────────────────► │
//!     └─ repeat
//! ```
//!
//! ## Contents
//! - [`Headers`] parsed `key:value` header line
//! - [`Envelope`] one received event (headers + payload)
//! - [`Ack`] acknowledgment tokens
//! - [`Transport`] receive/acknowledge seam, [`StdioTransport`] its stream implementation

mod envelope;
mod headers;
mod transport;

pub use envelope::{Ack, Envelope, FATAL_EVENT, READY_TOKEN};
pub use headers::Headers;
pub use transport::{StdioTransport, Transport};
