#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Transport-independent route model: annotation codec, per-port grouping,
//! and the wire message emitted for each instance-port pair.

mod instance;
mod message;
mod routes;

pub use self::instance::{Instance, MessageConstructionError};
pub use self::message::{group_routes_by_port, messages_for_instance, Message, PortGroup, Routes};
pub use self::routes::{decode_routes, DecodeError, Route, RouteSet};

/// Accepted-for-dispatch hand-off of a [`Message`] to the transport.
///
/// Implementations must not block: a full outbound buffer is surfaced as
/// [`EmitError::Full`] and left to the caller (typically logged; periodic
/// resync bounds the resulting staleness).
pub trait Emit: Clone + Send + Sync + 'static {
    fn emit(&self, message: Message) -> Result<(), EmitError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("outbound message buffer is full")]
    Full,

    #[error("message dispatcher has shut down")]
    Closed,
}
