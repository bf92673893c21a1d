//! Rule-based keyword matcher

use super::EventPredicate;
use crate::config::MatcherConfig;
use crate::error::{Error, Result};
use crate::types::ChatEvent;

/// A single comparison against the message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRule {
    /// Whole message equals the keyword
    Exact { keyword: String, ignore_case: bool },
    /// Message contains the keyword anywhere
    Contains { keyword: String, ignore_case: bool },
}

impl MatchRule {
    /// Build a rule, lowercasing the keyword up front when case is ignored.
    pub fn exact(keyword: &str, ignore_case: bool) -> Self {
        MatchRule::Exact {
            keyword: normalize(keyword, ignore_case),
            ignore_case,
        }
    }

    /// Build a substring rule.
    pub fn contains(keyword: &str, ignore_case: bool) -> Self {
        MatchRule::Contains {
            keyword: normalize(keyword, ignore_case),
            ignore_case,
        }
    }

    fn matches(&self, message: &str) -> bool {
        match self {
            MatchRule::Exact {
                keyword,
                ignore_case,
            } => normalize(message, *ignore_case) == *keyword,
            MatchRule::Contains {
                keyword,
                ignore_case,
            } => normalize(message, *ignore_case).contains(keyword.as_str()),
        }
    }
}

fn normalize(text: &str, ignore_case: bool) -> String {
    if ignore_case {
        text.to_lowercase()
    } else {
        text.to_string()
    }
}

/// Matches when any of its rules matches the message.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    name: String,
    rules: Vec<MatchRule>,
}

impl KeywordMatcher {
    /// Create a matcher from explicit rules.
    pub fn new(name: impl Into<String>, rules: Vec<MatchRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// `hic` on its own, or the three-part hic emote.
    pub fn hic_ame() -> Self {
        Self::new(
            "hic_ame",
            vec![
                MatchRule::exact("hic", true),
                MatchRule::exact(":_hic1::_hic2::_hic3:", false),
            ],
        )
    }

    /// Any message mentioning `hic`.
    ///
    /// Loose enough for chats where the keyword is embedded in other text.
    pub fn hic_ubye() -> Self {
        Self::new("hic_ubye", vec![MatchRule::contains("hic", true)])
    }

    /// Build a matcher from a `[[matchers]]` config entry.
    pub fn from_config(config: &MatcherConfig) -> Result<Self> {
        if config.name.trim().is_empty() {
            return Err(Error::Config("matcher name must not be empty".to_string()));
        }

        let rules: Vec<MatchRule> = config
            .exact
            .iter()
            .map(|k| MatchRule::exact(k, config.ignore_case))
            .chain(
                config
                    .contains
                    .iter()
                    .map(|k| MatchRule::contains(k, config.ignore_case)),
            )
            .collect();

        if rules.is_empty() {
            return Err(Error::Config(format!(
                "matcher '{}' needs at least one `exact` or `contains` keyword",
                config.name
            )));
        }
        if rules.iter().any(|r| match r {
            MatchRule::Exact { keyword, .. } | MatchRule::Contains { keyword, .. } => {
                keyword.is_empty()
            }
        }) {
            return Err(Error::Config(format!(
                "matcher '{}' has an empty keyword",
                config.name
            )));
        }

        Ok(Self::new(config.name.clone(), rules))
    }

    /// Rules checked by this matcher.
    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }
}

impl EventPredicate for KeywordMatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, event: &ChatEvent) -> bool {
        self.rules.iter().any(|rule| rule.matches(&event.message))
    }
}
