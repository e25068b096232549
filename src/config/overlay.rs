//! Default/override overlay producing the effective configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::ops::Bound;
use std::str::FromStr;

use crate::config::defaults::DEFAULTS;
use crate::config::error::ConfigError;

/// The effective, immutable key/value configuration of one server instance.
///
/// Built by copying a default table and then an override table on top of it,
/// so later changes to either input never reach an existing `Configuration`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    values: BTreeMap<String, String>,
    overridden: BTreeSet<String>,
}

impl Configuration {
    /// Overlay `overrides` on `defaults`. Overrides win on key collision.
    pub fn overlay<D, DK, DV, O, OK, OV>(defaults: D, overrides: O) -> Self
    where
        D: IntoIterator<Item = (DK, DV)>,
        DK: AsRef<str>,
        DV: AsRef<str>,
        O: IntoIterator<Item = (OK, OV)>,
        OK: AsRef<str>,
        OV: AsRef<str>,
    {
        let mut values: BTreeMap<String, String> = defaults
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
            .collect();
        let mut overridden = BTreeSet::new();

        for (k, v) in overrides {
            let key = k.as_ref().to_owned();
            values.insert(key.clone(), v.as_ref().to_owned());
            overridden.insert(key);
        }

        Self { values, overridden }
    }

    /// Overlay `overrides` on the process-wide [`DEFAULTS`].
    pub fn from_overrides<O, K, V>(overrides: O) -> Self
    where
        O: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::overlay(DEFAULTS.iter().copied(), overrides)
    }

    /// The defaults alone.
    pub fn defaults() -> Self {
        Self::from_overrides(std::iter::empty::<(&str, &str)>())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.get(key).unwrap_or(fallback)
    }

    /// `true` only for a case-insensitive `"true"`; anything else, including
    /// an absent key, is `false`.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Parse a required key, naming the key on failure.
    pub fn parse<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.get(key).ok_or_else(|| ConfigError::Missing {
            key: key.to_owned(),
        })?;
        raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_owned(),
            value: raw.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Split a comma-separated value into trimmed, non-empty items.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Entries whose key starts with `prefix`, with the prefix stripped.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.values
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(move |(k, v)| (&k[prefix.len()..], v.as_str()))
    }

    /// Whether `key` was supplied by the caller rather than the defaults.
    pub fn is_overridden(&self, key: &str) -> bool {
        self.overridden.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Only the caller-supplied entries.
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, _)| self.is_overridden(k))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn defaults() -> Vec<(&'static str, &'static str)> {
        vec![("a", "1"), ("b", "2"), ("c", "3")]
    }

    #[test]
    fn override_wins_and_defaults_fill_in() {
        let overrides = HashMap::from([("b", "20"), ("d", "40")]);
        let config = Configuration::overlay(defaults(), &overrides);

        assert_eq!(config.get("a"), Some("1"));
        assert_eq!(config.get("b"), Some("20"));
        assert_eq!(config.get("c"), Some("3"));
        assert_eq!(config.get("d"), Some("40"));
        assert_eq!(config.get("e"), None);
    }

    #[test]
    fn merge_copies_the_override_map() {
        let mut overrides: HashMap<String, String> = HashMap::new();
        overrides.insert("a".into(), "override".into());
        let config = Configuration::overlay(defaults(), &overrides);

        overrides.insert("a".into(), "changed".into());
        overrides.insert("z".into(), "new".into());

        assert_eq!(config.get("a"), Some("override"));
        assert_eq!(config.get("z"), None);
    }

    #[test]
    fn tracks_overridden_keys() {
        let config = Configuration::overlay(defaults(), [("a", "1"), ("x", "y")]);
        assert!(config.is_overridden("a"));
        assert!(!config.is_overridden("b"));
        let keys: Vec<_> = config.overrides().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "x"]);
    }

    #[test]
    fn bool_parsing_is_lenient() {
        let config = Configuration::overlay(
            [("t", "TRUE"), ("f", "yes"), ("e", "")],
            std::iter::empty::<(&str, &str)>(),
        );
        assert!(config.get_bool("t"));
        assert!(!config.get_bool("f"));
        assert!(!config.get_bool("e"));
        assert!(!config.get_bool("missing"));
    }

    #[test]
    fn parse_names_the_key_on_failure() {
        let config = Configuration::from_overrides([("server.port", "eighty")]);
        let err = config.parse::<u16>("server.port").unwrap_err();
        assert!(err.to_string().contains("server.port"));
        assert!(matches!(config.parse::<u16>("nope"), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn prefix_scan_strips_prefix() {
        let config = Configuration::overlay(
            [("validator.a", "non-empty"), ("validator.b", "json-syntax"), ("x", "1")],
            std::iter::empty::<(&str, &str)>(),
        );
        let found: Vec<_> = config.with_prefix("validator.").collect();
        assert_eq!(found, vec![("a", "non-empty"), ("b", "json-syntax")]);
    }

    #[test]
    fn list_values_are_trimmed() {
        let config = Configuration::from_overrides([("validator.defaults", " a, ,b ")]);
        assert_eq!(config.get_list("validator.defaults"), vec!["a", "b"]);
        assert!(Configuration::defaults().get_list("validator.defaults").is_empty());
    }
}
