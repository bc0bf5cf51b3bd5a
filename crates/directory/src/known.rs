//! In-memory offender directory.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use buildwatch_core::Sponsor;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{OffenderDirectory, Result};

/// A known contributor and the words that identify them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offender {
    /// Identity reported as the sponsor
    pub identity: String,

    /// Picture shown on the dashboard
    #[serde(default)]
    pub picture: Option<String>,

    /// Extra names (VCS usernames, nicknames)
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Offender {
    /// Create an offender with no aliases.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            picture: None,
            aliases: Vec::new(),
        }
    }

    /// Add an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    fn sponsor(&self) -> Sponsor {
        Sponsor {
            identity: self.identity.clone(),
            picture: self.picture.clone(),
        }
    }
}

/// Directory of known offenders, matched by whole words.
///
/// An offender matches when its identity or any alias appears in the text
/// as a whole word, ignoring case.
pub struct KnownOffenders {
    entries: Vec<(Offender, Regex)>,
}

impl KnownOffenders {
    /// Build the directory, compiling one matcher per offender.
    ///
    /// Offenders without a usable identity or alias are left out.
    pub fn new(offenders: Vec<Offender>) -> Result<Self> {
        let mut entries = Vec::with_capacity(offenders.len());
        for offender in offenders {
            match Self::matcher(&offender)? {
                Some(matcher) => entries.push((offender, matcher)),
                None => debug!("Ignoring offender with a blank identity"),
            }
        }
        Ok(Self { entries })
    }

    /// Load offenders from a JSON array.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        let offenders: Vec<Offender> = serde_json::from_str(&contents)?;
        debug!("Loaded {} known offenders", offenders.len());
        Self::new(offenders)
    }

    /// Number of known offenders.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody is known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matcher(offender: &Offender) -> Result<Option<Regex>> {
        let words: Vec<String> = std::iter::once(&offender.identity)
            .chain(offender.aliases.iter())
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect();
        if words.is_empty() {
            return Ok(None);
        }

        let pattern = format!(r"(^|\W)({})($|\W)", words.join("|"));
        Ok(Some(RegexBuilder::new(&pattern).case_insensitive(true).build()?))
    }
}

#[async_trait]
impl OffenderDirectory for KnownOffenders {
    async fn search(&self, text: &str) -> Result<BTreeSet<Sponsor>> {
        if text.trim().is_empty() {
            return Ok(BTreeSet::new());
        }
        Ok(self
            .entries
            .iter()
            .filter(|(_, matcher)| matcher.is_match(text))
            .map(|(offender, _)| offender.sponsor())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> KnownOffenders {
        KnownOffenders::new(vec![
            Offender::new("Alice Smith").alias("asmith"),
            Offender::new("Bob").alias("bobby.t"),
            Offender::new("Carol"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_matches_identity_and_alias() {
        let found = directory()
            .search("asmith fixed login; reviewed by bob")
            .await
            .unwrap();
        let names: Vec<_> = found.iter().map(|s| s.identity.as_str()).collect();
        assert_eq!(names, vec!["Alice Smith", "Bob"]);
    }

    #[tokio::test]
    async fn test_requires_whole_words() {
        let found = directory().search("caroline bobsled").await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_alias_with_punctuation() {
        let found = directory().search("bobby.t: bump deps").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains(&Sponsor::new("Bob")));
    }

    #[tokio::test]
    async fn test_repeated_mentions_yield_one_sponsor() {
        let found = directory().search("carol carol CAROL").await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_blank_offenders_are_skipped() {
        let known = KnownOffenders::new(vec![Offender::new("  "), Offender::new("erin")]).unwrap();
        assert_eq!(known.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_finds_nobody() {
        assert!(directory().search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offenders.json");
        std::fs::write(
            &path,
            r#"[{"identity": "dave", "picture": "dave.png", "aliases": ["dj"]}]"#,
        )
        .unwrap();

        let known = KnownOffenders::load(&path).await.unwrap();
        assert_eq!(known.len(), 1);
        let found = known.search("dj broke it").await.unwrap();
        let dave = found.iter().next().unwrap();
        assert_eq!(dave.picture.as_deref(), Some("dave.png"));
    }
}
