//! Client/server clock gap.
//!
//! Every response carries a timing block comparing when the client says it
//! sent the request with when the server received it. All arithmetic happens
//! on UTC epoch milliseconds.

mod gap;

pub use gap::{parse_client_sent, TimeGapService, TimingPayload};
