//! Notification targets: the accounts and chat rooms build results are sent to.
//!
//! Targets used to be persisted under fully-qualified type names of an older
//! plugin layout. Those tags are still accepted on input and rewritten to the
//! current tags on output, see [`TargetKind::from_type_tag`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const GROUP_CHAT_PREFIX: char = '*';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("target name must not be empty")]
    EmptyName,

    #[error("unknown target type tag: {0}")]
    UnknownTypeTag(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    User,
    GroupChat,
}

impl TargetKind {
    const USER_TAGS: &'static [&'static str] = &[
        "user",
        "hudson.plugins.im.DefaultIMMessageTarget",
        "hudson.plugins.jabber.im.DefaultIMMessageTarget",
    ];

    const GROUP_CHAT_TAGS: &'static [&'static str] = &[
        "group_chat",
        "hudson.plugins.im.GroupChatIMMessageTarget",
        "hudson.plugins.jabber.im.GroupChatIMMessageTarget",
    ];

    /// Map a stored type tag, current or legacy, onto a target kind.
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if Self::GROUP_CHAT_TAGS.contains(&tag) {
            Some(Self::GroupChat)
        } else if Self::USER_TAGS.contains(&tag) {
            Some(Self::User)
        } else {
            None
        }
    }

    /// The tag written when a target is serialized.
    pub fn type_tag(self) -> &'static str {
        match self {
            Self::User => Self::USER_TAGS[0],
            Self::GroupChat => Self::GROUP_CHAT_TAGS[0],
        }
    }
}

/// A single account, addressed by its JID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserTarget {
    jid: String,
}

impl UserTarget {
    pub fn new(jid: impl Into<String>) -> Self {
        Self { jid: jid.into() }
    }

    pub fn jid(&self) -> &str {
        &self.jid
    }
}

/// A multi-user chat room.
///
/// Identity is the room name alone: two targets naming the same room are
/// equal whatever their password or notification settings, and they hash
/// the same.
#[derive(Debug, Clone)]
pub struct GroupChatTarget {
    name: String,
    password: Option<String>,
    notification_only: bool,
}

impl GroupChatTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: None,
            notification_only: false,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_notification_only(mut self, notification_only: bool) -> Self {
        self.notification_only = notification_only;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Whether the bot only posts to the room and ignores commands there.
    pub fn is_notification_only(&self) -> bool {
        self.notification_only
    }
}

impl PartialEq for GroupChatTarget {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for GroupChatTarget {}

impl Hash for GroupChatTarget {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTarget", into = "RawTarget")]
pub enum MessageTarget {
    User(UserTarget),
    GroupChat(GroupChatTarget),
}

impl MessageTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::User(_) => TargetKind::User,
            Self::GroupChat(_) => TargetKind::GroupChat,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::User(user) => user.jid(),
            Self::GroupChat(room) => room.name(),
        }
    }
}

impl From<UserTarget> for MessageTarget {
    fn from(value: UserTarget) -> Self {
        Self::User(value)
    }
}

impl From<GroupChatTarget> for MessageTarget {
    fn from(value: GroupChatTarget) -> Self {
        Self::GroupChat(value)
    }
}

impl FromStr for MessageTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let target = match trimmed.strip_prefix(GROUP_CHAT_PREFIX) {
            Some(room) => {
                let room = room.trim();
                if room.is_empty() {
                    return Err(TargetError::EmptyName);
                }
                Self::GroupChat(GroupChatTarget::new(room))
            }
            None if trimmed.is_empty() => return Err(TargetError::EmptyName),
            None => Self::User(UserTarget::new(trimmed)),
        };
        Ok(target)
    }
}

impl fmt::Display for MessageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(user) => f.write_str(user.jid()),
            Self::GroupChat(room) => write!(f, "{GROUP_CHAT_PREFIX}{}", room.name()),
        }
    }
}

/// Stored shape of a target. Every read goes through the tag shim.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTarget {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    notification_only: bool,
}

impl TryFrom<RawTarget> for MessageTarget {
    type Error = TargetError;

    fn try_from(raw: RawTarget) -> Result<Self, Self::Error> {
        let kind = TargetKind::from_type_tag(&raw.kind)
            .ok_or_else(|| TargetError::UnknownTypeTag(raw.kind.clone()))?;
        let name = raw.name.trim();
        if name.is_empty() {
            return Err(TargetError::EmptyName);
        }

        let target = match kind {
            TargetKind::User => Self::User(UserTarget::new(name)),
            TargetKind::GroupChat => {
                let mut room =
                    GroupChatTarget::new(name).with_notification_only(raw.notification_only);
                room.password = raw.password;
                Self::GroupChat(room)
            }
        };
        Ok(target)
    }
}

impl From<MessageTarget> for RawTarget {
    fn from(target: MessageTarget) -> Self {
        let kind = target.kind().type_tag().to_string();
        match target {
            MessageTarget::User(user) => Self {
                kind,
                name: user.jid,
                password: None,
                notification_only: false,
            },
            MessageTarget::GroupChat(room) => Self {
                kind,
                name: room.name,
                password: room.password,
                notification_only: room.notification_only,
            },
        }
    }
}
