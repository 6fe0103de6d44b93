//! Integration test common infrastructure.
//!
//! Provides an in-memory connection whose outgoing lines are recorded and
//! whose inbound side is driven by feeding raw server lines.

pub mod server;
pub mod sink;

#[allow(unused_imports)]
pub use server::FakeServer;
#[allow(unused_imports)]
pub use sink::RecordingSink;
