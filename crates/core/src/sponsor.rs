//! Sponsors: contributors implicated in a breakage.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A contributor identity implicated in a breakage.
///
/// Two sponsors are the same sponsor when their identities match, whatever
/// picture they carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsor {
    /// Contributor identity
    pub identity: String,

    /// Picture shown on the dashboard
    #[serde(default)]
    pub picture: Option<String>,
}

impl Sponsor {
    /// Create a sponsor without a picture.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            picture: None,
        }
    }

    /// Attach a picture.
    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }
}

impl PartialEq for Sponsor {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Sponsor {}

impl Hash for Sponsor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl PartialOrd for Sponsor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sponsor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity.cmp(&other.identity)
    }
}

impl std::fmt::Display for Sponsor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_identity_decides_equality() {
        let plain = Sponsor::new("alice");
        let pictured = Sponsor::new("alice").with_picture("alice.png");
        assert_eq!(plain, pictured);

        let set: BTreeSet<_> = [plain, pictured, Sponsor::new("bob")].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
