pub mod connection;
pub mod debugger;
pub mod error;
pub mod jid;
pub mod logging_stream;
pub mod stanza;

pub use connection::{
    ConnectionConfig, ConnectionEvent, ConnectionHandle, ConnectionListener, ConnectionListeners,
    SharedError, XmppConnection,
};
pub use debugger::{ConnectionDebugger, LifecycleLogger, MIN_LOG_LEVEL, StanzaLogger};
pub use error::StanzaError;
pub use jid::LenientJid;
pub use logging_stream::{LoggingReader, LoggingWriter, level_enabled};
pub use stanza::Stanza;

#[cfg(test)]
pub(crate) mod test_support;
