//! Inbound stanzas as seen by [`StanzaLogger`](crate::StanzaLogger).

use xmpp_parsers::{iq::Iq, message::Message, minidom::Element, presence::Presence};

use crate::error::StanzaError;

/// A top-level `jabber:client` stanza.
#[derive(Debug, Clone, PartialEq)]
pub enum Stanza {
    Message(Box<Message>),
    Presence(Box<Presence>),
    Iq(Box<Iq>),
}

impl Stanza {
    pub fn parse(raw: &[u8]) -> Result<Self, StanzaError> {
        let element = std::str::from_utf8(raw)?
            .trim()
            .parse::<Element>()
            .map_err(|error| StanzaError::Malformed(error.to_string()))?;

        match element.name() {
            "message" => Message::try_from(element)
                .map(|message| Self::Message(Box::new(message)))
                .map_err(|error| StanzaError::invalid("message", error)),
            "presence" => Presence::try_from(element)
                .map(|presence| Self::Presence(Box::new(presence)))
                .map_err(|error| StanzaError::invalid("presence", error)),
            "iq" => Iq::try_from(element)
                .map(|iq| Self::Iq(Box::new(iq)))
                .map_err(|error| StanzaError::invalid("iq", error)),
            other => Err(StanzaError::Unsupported(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Presence(_) => "presence",
            Self::Iq(_) => "iq",
        }
    }

    /// XML for log output. A stanza that cannot be written is rendered as a
    /// placeholder carrying its element name.
    pub fn to_xml_lossy(&self) -> String {
        let element: Element = match self {
            Self::Message(message) => (**message).clone().into(),
            Self::Presence(presence) => (**presence).clone().into(),
            Self::Iq(iq) => (**iq).clone().into(),
        };

        let mut xml = Vec::new();
        match element.write_to(&mut xml) {
            Ok(()) => String::from_utf8_lossy(&xml).into_owned(),
            Err(_) => format!("<{} [unserializable]/>", self.name()),
        }
    }
}
