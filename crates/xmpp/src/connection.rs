use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use jabber_core::AccountConfig;

use crate::jid::LenientJid;

pub const DEFAULT_XMPP_PORT: u16 = 5222;

/// Error handed to lifecycle listeners. Listeners only report it.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Connection state transitions reported by the session.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    Connected { connection: String },
    Authenticated { connection: String, resumed: bool },
    Closed,
    ClosedOnError(SharedError),
    ReconnectionFailed(SharedError),
    ReconnectionSuccessful,
    ReconnectingIn { seconds: u32 },
}

impl ConnectionEvent {
    pub fn connected(connection: &impl fmt::Display) -> Self {
        Self::Connected {
            connection: connection.to_string(),
        }
    }

    pub fn authenticated(connection: &impl fmt::Display, resumed: bool) -> Self {
        Self::Authenticated {
            connection: connection.to_string(),
            resumed,
        }
    }

    pub fn closed_on_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ClosedOnError(Arc::new(error))
    }

    pub fn reconnection_failed<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ReconnectionFailed(Arc::new(error))
    }
}

pub type ConnectionListener = Arc<dyn Fn(&ConnectionEvent) + Send + Sync>;

/// What the debugger needs from a live connection.
pub trait XmppConnection: fmt::Display + Send + Sync {
    fn service_name(&self) -> &str;

    fn port(&self) -> u16;

    fn add_connection_listener(&self, listener: ConnectionListener);
}

/// Listener registry a connection fires lifecycle events through.
#[derive(Default)]
pub struct ConnectionListeners {
    listeners: RwLock<Vec<ConnectionListener>>,
}

impl ConnectionListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: ConnectionListener) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Call every registered listener in registration order. The lock is
    /// released first, so listeners may register further listeners.
    pub fn fire(&self, event: &ConnectionEvent) {
        let snapshot = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ConnectionListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionListeners")
            .field("len", &self.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub jid: String,
    pub server: Option<String>,
    pub port: Option<u16>,
}

impl ConnectionConfig {
    /// Explicit server, else the domain of the account JID.
    pub fn service_name(&self) -> String {
        match &self.server {
            Some(server) => server.clone(),
            None => LenientJid::parse(&self.jid).domain().to_string(),
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_XMPP_PORT)
    }
}

impl From<&AccountConfig> for ConnectionConfig {
    fn from(account: &AccountConfig) -> Self {
        Self {
            jid: account.jid.clone(),
            server: account.server.clone(),
            port: account.port,
        }
    }
}

/// Host-side connection handle: addressing plus the listener registry.
#[derive(Debug)]
pub struct ConnectionHandle {
    service_name: String,
    port: u16,
    listeners: ConnectionListeners,
}

impl ConnectionHandle {
    pub fn new(service_name: impl Into<String>, port: u16) -> Self {
        Self {
            service_name: service_name.into(),
            port,
            listeners: ConnectionListeners::new(),
        }
    }

    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self::new(config.service_name(), config.port())
    }

    pub fn dispatch(&self, event: &ConnectionEvent) {
        self.listeners.fire(event);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl XmppConnection for ConnectionHandle {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn add_connection_listener(&self, listener: ConnectionListener) {
        self.listeners.register(listener);
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XMPPConnection[{}:{}]", self.service_name, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, ConnectionListener) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: ConnectionListener = Arc::new(move |event: &ConnectionEvent| {
            sink.lock().unwrap().push(format!("{event:?}"));
        });
        (seen, listener)
    }

    #[test]
    fn fires_listeners_in_registration_order() {
        let handle = ConnectionHandle::new("example.com", 5222);
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in 0..3 {
            let order = Arc::clone(&order);
            handle.add_connection_listener(Arc::new(move |_event: &ConnectionEvent| {
                order.lock().unwrap().push(id);
            }));
        }

        handle.dispatch(&ConnectionEvent::Closed);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(handle.listener_count(), 3);
    }

    #[test]
    fn no_listeners_is_a_no_op() {
        let listeners = ConnectionListeners::new();
        assert!(listeners.is_empty());
        listeners.fire(&ConnectionEvent::ReconnectionSuccessful);
    }

    #[test]
    fn listener_may_register_during_fire() {
        let handle = Arc::new(ConnectionHandle::new("example.com", 5222));
        let (seen, late) = recorder();
        let inner = Arc::clone(&handle);
        handle.add_connection_listener(Arc::new(move |_event: &ConnectionEvent| {
            inner.add_connection_listener(Arc::clone(&late));
        }));

        handle.dispatch(&ConnectionEvent::Closed);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(handle.listener_count(), 2);

        handle.dispatch(&ConnectionEvent::ReconnectingIn { seconds: 5 });
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn event_constructors_capture_connection_and_error() {
        let handle = ConnectionHandle::new("example.com", 5223);
        let ConnectionEvent::Authenticated { connection, resumed } =
            ConnectionEvent::authenticated(&handle, true)
        else {
            panic!("expected authenticated event");
        };
        assert_eq!(connection, "XMPPConnection[example.com:5223]");
        assert!(resumed);

        let event = ConnectionEvent::closed_on_error(std::io::Error::other("reset by peer"));
        let ConnectionEvent::ClosedOnError(error) = event else {
            panic!("expected closed-on-error event");
        };
        assert_eq!(error.to_string(), "reset by peer");
    }

    #[test]
    fn config_falls_back_to_jid_domain_and_default_port() {
        let config = ConnectionConfig {
            jid: "builds@example.com/ci".to_string(),
            server: None,
            port: None,
        };
        let handle = ConnectionHandle::from_config(&config);
        assert_eq!(handle.service_name(), "example.com");
        assert_eq!(handle.port(), DEFAULT_XMPP_PORT);
    }

    #[test]
    fn config_from_account_prefers_explicit_server() {
        let account = AccountConfig {
            jid: "builds@example.com".to_string(),
            password: "secret".to_string(),
            server: Some("xmpp.example.net".to_string()),
            port: Some(5223),
        };
        let config = ConnectionConfig::from(&account);
        assert_eq!(config.service_name(), "xmpp.example.net");
        assert_eq!(config.port(), 5223);
        assert_eq!(
            ConnectionHandle::from_config(&config).to_string(),
            "XMPPConnection[xmpp.example.net:5223]"
        );
    }
}
