//! Keyword matchers
//!
//! A matcher decides whether a single chat message counts as a keyword hit.
//! Matchers are collected into a [`MatcherRegistry`] once at startup and looked
//! up by name; the extractor only ever sees the selected [`EventPredicate`].
//!
//! ## Built-in Matchers
//!
//! | Name | Rule |
//! |------|------|
//! | `hic_ame` | message is exactly `hic` (any case) or the `:_hic1::_hic2::_hic3:` emote |
//! | `hic_ubye` | message contains `hic` (any case) |
//!
//! ## Adding Matchers
//!
//! Keyword matchers can be declared in the config file (see
//! [`MatcherConfig`](crate::config::MatcherConfig)); anything more involved
//! implements [`EventPredicate`] and is registered with
//! [`MatcherRegistry::register`].

mod keyword;

pub use keyword::{KeywordMatcher, MatchRule};

use crate::config::MatcherConfig;
use crate::error::{Error, Result};
use crate::types::ChatEvent;
use std::collections::BTreeMap;

/// Name of the matcher used when none is configured.
pub const DEFAULT_MATCHER: &str = "hic_ubye";

/// Trait implemented by every keyword matcher.
pub trait EventPredicate: Send + Sync {
    /// Registry name (e.g. `"hic_ubye"`)
    fn name(&self) -> &str;

    /// Whether the chat event is a keyword hit
    fn matches(&self, event: &ChatEvent) -> bool;
}

/// Name → matcher lookup, built once and then read-only.
///
/// Names are kept sorted so listings are stable.
#[derive(Default)]
pub struct MatcherRegistry {
    matchers: BTreeMap<String, Box<dyn EventPredicate>>,
}

impl MatcherRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a matcher, replacing any previous one with the same name.
    pub fn register(&mut self, matcher: Box<dyn EventPredicate>) {
        let name = matcher.name().to_string();
        if self.matchers.insert(name.clone(), matcher).is_some() {
            tracing::debug!(matcher = %name, "Replaced registered matcher");
        }
    }

    /// Look up a matcher by name.
    pub fn get(&self, name: &str) -> Result<&dyn EventPredicate> {
        self.matchers
            .get(name)
            .map(|m| m.as_ref())
            .ok_or_else(|| Error::UnknownMatcher {
                name: name.to_string(),
                available: self.names().into_iter().map(String::from).collect(),
            })
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.matchers.keys().map(String::as_str).collect()
    }

    /// Number of registered matchers.
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Whether the registry has no matchers.
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// Create a registry with the built-in matchers plus those declared in config.
///
/// Config entries with a built-in name override the built-in.
pub fn create_registry(configured: &[MatcherConfig]) -> Result<MatcherRegistry> {
    let mut registry = MatcherRegistry::new();
    registry.register(Box::new(KeywordMatcher::hic_ame()));
    registry.register(Box::new(KeywordMatcher::hic_ubye()));

    for config in configured {
        registry.register(Box::new(KeywordMatcher::from_config(config)?));
    }

    tracing::debug!(matchers = ?registry.names(), "Matcher registry ready");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = create_registry(&[]).unwrap();
        assert_eq!(registry.names(), vec!["hic_ame", "hic_ubye"]);
        assert!(registry.get(DEFAULT_MATCHER).is_ok());
    }

    #[test]
    fn test_unknown_matcher() {
        let registry = create_registry(&[]).unwrap();
        match registry.get("missing") {
            Err(Error::UnknownMatcher { name, available }) => {
                assert_eq!(name, "missing");
                assert_eq!(available, vec!["hic_ame", "hic_ubye"]);
            }
            _ => panic!("expected UnknownMatcher"),
        }
    }

    #[test]
    fn test_configured_matcher_registered() {
        let configured = vec![MatcherConfig {
            name: "kusa".to_string(),
            exact: vec![],
            contains: vec!["草".to_string(), "w".to_string()],
            ignore_case: false,
        }];
        let registry = create_registry(&configured).unwrap();
        assert_eq!(registry.len(), 3);

        let kusa = registry.get("kusa").unwrap();
        assert!(kusa.matches(&ChatEvent::new("0:01", "草草草")));
        assert!(!kusa.matches(&ChatEvent::new("0:01", "hello")));
    }

    #[test]
    fn test_configured_matcher_overrides_builtin() {
        let configured = vec![MatcherConfig {
            name: "hic_ubye".to_string(),
            exact: vec!["HIC".to_string()],
            contains: vec![],
            ignore_case: false,
        }];
        let registry = create_registry(&configured).unwrap();
        assert_eq!(registry.len(), 2);

        let matcher = registry.get("hic_ubye").unwrap();
        assert!(matcher.matches(&ChatEvent::new("0:01", "HIC")));
        assert!(!matcher.matches(&ChatEvent::new("0:01", "hic hic")));
    }
}
