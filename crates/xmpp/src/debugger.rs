use std::error::Error;
use std::fmt;
use std::sync::Arc;

use tracing::{Level, debug, trace};

use jabber_core::DebugConfig;

use crate::connection::{ConnectionEvent, ConnectionListener, XmppConnection};
use crate::jid::LenientJid;
use crate::logging_stream::{LoggingReader, LoggingWriter};
use crate::stanza::Stanza;

/// Level raw traffic, logins and lifecycle transitions are logged at.
pub const MIN_LOG_LEVEL: Level = Level::DEBUG;

/// Logs received stanzas at `trace`.
#[derive(Debug, Clone, Default)]
pub struct StanzaLogger;

impl StanzaLogger {
    pub fn process_stanza(&self, stanza: &Stanza) {
        if tracing::enabled!(Level::TRACE) {
            trace!(stanza_type = stanza.name(), "RCV PKT: {}", stanza.to_xml_lossy());
        }
    }
}

/// Logs connection lifecycle transitions at `debug`.
#[derive(Debug, Clone)]
pub struct LifecycleLogger {
    connection_id: String,
}

impl LifecycleLogger {
    pub fn new(connection_id: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
        }
    }

    pub fn handle(&self, event: &ConnectionEvent) {
        if !tracing::enabled!(Level::DEBUG) {
            return;
        }

        let connection_id = self.connection_id.as_str();
        match event {
            ConnectionEvent::Connected { connection } => {
                debug!(connection_id, "Connection {connection} established");
            }
            ConnectionEvent::Authenticated {
                connection,
                resumed,
            } => {
                debug!(
                    connection_id,
                    resumed = *resumed,
                    "Connection {connection} authenticated"
                );
            }
            ConnectionEvent::Closed => debug!(connection_id, "Connection closed"),
            ConnectionEvent::ClosedOnError(error) => debug!(
                connection_id,
                error = %ErrorChain(error.as_ref()),
                "Connection closed due to an exception"
            ),
            ConnectionEvent::ReconnectionFailed(error) => debug!(
                connection_id,
                error = %ErrorChain(error.as_ref()),
                "Reconnection failed due to an exception"
            ),
            ConnectionEvent::ReconnectionSuccessful => {
                debug!(connection_id, "Reconnection successful");
            }
            ConnectionEvent::ReconnectingIn { seconds } => {
                debug!(connection_id, "Reconnecting in {seconds} seconds");
            }
        }
    }
}

/// Renders an error followed by each of its sources.
struct ErrorChain<'a>(&'a (dyn Error + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {cause}")?;
            source = cause.source();
        }
        Ok(())
    }
}

/// Traces one XMPP connection: raw traffic through the stream decorators,
/// inbound stanzas through [`reader_listener`](Self::reader_listener), and
/// lifecycle transitions once the user has logged in.
///
/// The connection is shared, not owned. Replacing a stream drops the old
/// decorator together with whatever it wrapped; pass `&mut S` to keep
/// ownership of the underlying stream.
pub struct ConnectionDebugger<C: ?Sized, R, W> {
    connection: Arc<C>,
    connection_id: String,
    reader: LoggingReader<R>,
    writer: LoggingWriter<W>,
    reader_listener: StanzaLogger,
    lifecycle: Arc<LifecycleLogger>,
    lifecycle_registered: bool,
}

impl<C, R, W> ConnectionDebugger<C, R, W>
where
    C: XmppConnection + ?Sized,
{
    pub fn attach(connection: Arc<C>, writer: W, reader: R) -> Self {
        let connection_id = connection_id(&connection);
        Self {
            lifecycle: Arc::new(LifecycleLogger::new(connection_id.clone())),
            connection,
            connection_id,
            reader: LoggingReader::new(reader, MIN_LOG_LEVEL),
            writer: LoggingWriter::new(writer, MIN_LOG_LEVEL),
            reader_listener: StanzaLogger,
            lifecycle_registered: false,
        }
    }

    /// Attach only when connection debugging is switched on.
    pub fn attach_if_enabled(
        config: &DebugConfig,
        connection: Arc<C>,
        writer: W,
        reader: R,
    ) -> Option<Self> {
        config
            .enabled
            .then(|| Self::attach(connection, writer, reader))
    }

    pub fn connection(&self) -> &Arc<C> {
        &self.connection
    }

    /// Hex tag correlating log lines of concurrent connections.
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn reader(&mut self) -> &mut LoggingReader<R> {
        &mut self.reader
    }

    pub fn writer(&mut self) -> &mut LoggingWriter<W> {
        &mut self.writer
    }

    pub fn reader_listener(&self) -> &StanzaLogger {
        &self.reader_listener
    }

    /// Outbound stanzas are only visible through the writer decorator.
    pub fn writer_listener(&self) -> Option<&StanzaLogger> {
        None
    }

    pub fn new_connection_reader(&mut self, reader: R) -> &mut LoggingReader<R> {
        self.reader = LoggingReader::new(reader, MIN_LOG_LEVEL);
        &mut self.reader
    }

    pub fn new_connection_writer(&mut self, writer: W) -> &mut LoggingWriter<W> {
        self.writer = LoggingWriter::new(writer, MIN_LOG_LEVEL);
        &mut self.writer
    }

    /// Called once the session has bound `user`. Logs the bound identity
    /// (bare JID, connection port, resource) and starts observing lifecycle
    /// events; events before the first login are not seen.
    pub fn user_has_logged(&mut self, user: &str) {
        if tracing::enabled!(Level::DEBUG) {
            let jid = LenientJid::parse(user);
            debug!(
                connection_id = self.connection_id.as_str(),
                "User logged in ({}): {}:{}/{}",
                self.connection_id,
                jid.bare(),
                self.connection.port(),
                jid.resource()
            );
        }

        if !self.lifecycle_registered {
            self.connection
                .add_connection_listener(self.lifecycle_listener());
            self.lifecycle_registered = true;
        }
    }

    pub fn lifecycle_listener(&self) -> ConnectionListener {
        let logger = Arc::clone(&self.lifecycle);
        Arc::new(move |event: &ConnectionEvent| logger.handle(event))
    }
}

fn connection_id<C: ?Sized>(connection: &Arc<C>) -> String {
    format!("{:x}", Arc::as_ptr(connection) as *const () as usize)
}
