use std::fmt;

/// A JID split into its parts without validation.
///
/// Login notifications hand over whatever identifier the server bound,
/// including anonymous ones (`@example.com/res`) that a strict parser
/// rejects. Splitting never fails: missing parts come back empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LenientJid {
    localpart: String,
    domain: String,
    resource: String,
}

impl LenientJid {
    pub fn parse(raw: &str) -> Self {
        let slash = raw.find('/');
        // An '@' inside the resource does not start a local part.
        let at = raw
            .find('@')
            .filter(|&at| slash.is_none_or(|slash| at < slash));

        let (localpart, rest) = match at {
            Some(at) => (&raw[..at], &raw[at + 1..]),
            None => ("", raw),
        };
        let (domain, resource) = rest.split_once('/').unwrap_or((rest, ""));

        Self {
            localpart: localpart.to_string(),
            domain: domain.to_string(),
            resource: resource.to_string(),
        }
    }

    pub fn localpart(&self) -> &str {
        &self.localpart
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn is_anonymous(&self) -> bool {
        self.localpart.is_empty()
    }

    pub fn bare(&self) -> String {
        if self.localpart.is_empty() {
            self.domain.clone()
        } else {
            format!("{}@{}", self.localpart, self.domain)
        }
    }
}

impl fmt::Display for LenientJid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bare())?;
        if !self.resource.is_empty() {
            write!(f, "/{}", self.resource)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_full_jid() {
        let jid = LenientJid::parse("alice@example.com/laptop");
        assert_eq!(jid.localpart(), "alice");
        assert_eq!(jid.domain(), "example.com");
        assert_eq!(jid.resource(), "laptop");
        assert_eq!(jid.bare(), "alice@example.com");
        assert!(!jid.is_anonymous());
    }

    #[test]
    fn anonymous_identity_has_empty_localpart() {
        let jid = LenientJid::parse("@example.com/res");
        assert!(jid.is_anonymous());
        assert_eq!(jid.domain(), "example.com");
        assert_eq!(jid.resource(), "res");
        assert_eq!(jid.bare(), "example.com");
    }

    #[test]
    fn domain_only() {
        let jid = LenientJid::parse("example.com");
        assert!(jid.is_anonymous());
        assert_eq!(jid.domain(), "example.com");
        assert_eq!(jid.resource(), "");
    }

    #[test]
    fn at_sign_in_resource_is_not_a_localpart() {
        let jid = LenientJid::parse("example.com/phone@home");
        assert_eq!(jid.localpart(), "");
        assert_eq!(jid.domain(), "example.com");
        assert_eq!(jid.resource(), "phone@home");
    }

    #[test]
    fn resource_keeps_later_slashes() {
        let jid = LenientJid::parse("bob@example.com/a/b");
        assert_eq!(jid.resource(), "a/b");
        assert_eq!(jid.to_string(), "bob@example.com/a/b");
    }

    #[test]
    fn tolerates_garbage() {
        let jid = LenientJid::parse("");
        assert_eq!(jid.bare(), "");
        let jid = LenientJid::parse("@/");
        assert!(jid.is_anonymous());
        assert_eq!(jid.domain(), "");
    }
}
