//! Routing configuration and first-match rule resolution
//!
//! The JSON shape is
//!
//! ```json
//! { "loggers": { "^app\\.": { "console": ["warn", "error"] } } }
//! ```
//!
//! Rules are evaluated in document order and the first pattern that matches
//! the logger name wins. Overlapping patterns are never merged, so more
//! specific rules must be listed before broader ones.

use super::error::{LoggerError, Result};
use super::rule::{ActivationTable, Rule};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawConfiguration")]
pub struct Configuration {
    rules: Vec<Rule>,
}

impl Configuration {
    /// An empty configuration; every logger resolves to nothing.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Parse the `{ "loggers": { ... } }` document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse the configuration stored under `section` of a larger JSON
    /// document, e.g. an application environment file.
    pub fn from_json_section(json: &str, section: &str) -> Result<Self> {
        let mut document: serde_json::Value = serde_json::from_str(json)?;
        let value = document
            .get_mut(section)
            .map(serde_json::Value::take)
            .ok_or_else(|| {
                LoggerError::config("Configuration", format!("missing section '{}'", section))
            })?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logging configuration",
                path.display().to_string(),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }

    /// Append a rule. A rule with the same pattern is replaced in place,
    /// keeping its position.
    pub fn push(&mut self, rule: Rule) {
        match self.rules.iter_mut().find(|r| r.pattern() == rule.pattern()) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    /// Activation table of the first rule whose pattern matches `logger_name`
    pub fn resolve(&self, logger_name: &str) -> Option<&ActivationTable> {
        self.resolve_rule(logger_name).map(Rule::table)
    }

    pub fn resolve_rule(&self, logger_name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(logger_name))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Every handler id mentioned by any rule
    pub fn handler_ids(&self) -> BTreeSet<&str> {
        self.rules
            .iter()
            .flat_map(|rule| rule.table().handler_ids())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Loggers<'a>(&'a [Rule]);

        impl Serialize for Loggers<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for rule in self.0 {
                    map.serialize_entry(rule.pattern(), rule.table())?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("loggers", &Loggers(&self.rules))?;
        map.end()
    }
}

#[derive(Deserialize)]
struct RawConfiguration {
    #[serde(default)]
    loggers: RawRules,
}

#[derive(Default)]
struct RawRules(Vec<(String, ActivationTable)>);

/// A repeated pattern replaces the earlier table but keeps its position
fn upsert_rule(rules: &mut Vec<(String, ActivationTable)>, pattern: String, table: ActivationTable) {
    match rules.iter_mut().find(|(existing, _)| *existing == pattern) {
        Some(entry) => entry.1 = table,
        None => rules.push((pattern, table)),
    }
}

impl<'de> Deserialize<'de> for RawRules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RulesVisitor;

        impl<'de> Visitor<'de> for RulesVisitor {
            type Value = RawRules;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of logger-name pattern to activation table")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut rules = Vec::new();
                while let Some((pattern, table)) = map.next_entry::<String, ActivationTable>()? {
                    upsert_rule(&mut rules, pattern, table);
                }
                Ok(RawRules(rules))
            }
        }

        deserializer.deserialize_map(RulesVisitor)
    }
}

impl TryFrom<RawConfiguration> for Configuration {
    type Error = LoggerError;

    fn try_from(raw: RawConfiguration) -> Result<Self> {
        let rules = raw
            .loggers
            .0
            .into_iter()
            .map(|(pattern, table)| Rule::new(pattern, table))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }
}

/// Builder for constructing a Configuration in code
///
/// # Example
/// ```
/// use rust_log_router::prelude::*;
///
/// let config = Configuration::builder()
///     .rule(r"^app\.", ActivationTable::new().with_handler("console", [LogLevel::Warn]))
///     .build()
///     .unwrap();
///
/// assert!(config.resolve("app.db").is_some());
/// ```
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    rules: Vec<(String, ActivationTable)>,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; rules are evaluated in the order they are added.
    /// Adding a pattern again replaces its table in place.
    #[must_use = "builder methods return a new value"]
    pub fn rule(mut self, pattern: impl Into<String>, table: ActivationTable) -> Self {
        upsert_rule(&mut self.rules, pattern.into(), table);
        self
    }

    /// Compile every pattern; fails on the first malformed one.
    pub fn build(self) -> Result<Configuration> {
        let rules = self
            .rules
            .into_iter()
            .map(|(pattern, table)| Rule::new(pattern, table))
            .collect::<Result<Vec<_>>>()?;
        Ok(Configuration { rules })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;

    const TWO_RULES: &str = r#"{
        "loggers": {
            "^app\\.": { "console": ["warn", "error"] },
            "db": { "sentry": ["error"] }
        }
    }"#;

    #[test]
    fn test_first_match_wins() {
        let config = Configuration::from_json_str(TWO_RULES).unwrap();

        let table = config.resolve("app.db").unwrap();
        assert!(table.accepts("console", LogLevel::Warn));
        assert!(table.levels_for("sentry").is_none());

        let table = config.resolve("legacy.db").unwrap();
        assert!(table.accepts("sentry", LogLevel::Error));
    }

    #[test]
    fn test_resolve_not_found() {
        let config = Configuration::from_json_str(TWO_RULES).unwrap();
        assert!(config.resolve("unrelated.thing").is_none());
        assert!(Configuration::new().resolve("app.db").is_none());
    }

    #[test]
    fn test_document_order_is_rule_order() {
        let config = Configuration::from_json_str(
            r#"{"loggers": {"z": {"a": ["debug"]}, "a": {"b": ["debug"]}, "m": {}}}"#,
        )
        .unwrap();

        let patterns: Vec<&str> = config.rules().iter().map(Rule::pattern).collect();
        assert_eq!(patterns, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_malformed_pattern_fails_load() {
        let result = Configuration::from_json_str(r#"{"loggers": {"(oops": {}}}"#);
        assert!(matches!(result, Err(LoggerError::JsonError(_))));

        let result = Configuration::builder()
            .rule("(oops", ActivationTable::new())
            .build();
        assert!(matches!(result, Err(LoggerError::InvalidPattern { .. })));
    }

    #[test]
    fn test_missing_loggers_key_is_empty() {
        let config = Configuration::from_json_str("{}").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_from_json_section() {
        let env = r#"{
            "environment": "production",
            "logging": { "loggers": { ".*": { "backlog": ["info"] } } }
        }"#;

        let config = Configuration::from_json_section(env, "logging").unwrap();
        assert_eq!(config.len(), 1);

        let err = Configuration::from_json_section(env, "missing").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_serialize_roundtrip_keeps_order() {
        let config = Configuration::from_json_str(TWO_RULES).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let reparsed = Configuration::from_json_str(&json).unwrap();

        assert_eq!(config, reparsed);
        assert!(json.find("app").unwrap() < json.find("db\"").unwrap());
    }

    #[test]
    fn test_handler_ids() {
        let config = Configuration::from_json_str(TWO_RULES).unwrap();
        let ids: Vec<&str> = config.handler_ids().into_iter().collect();
        assert_eq!(ids, vec!["console", "sentry"]);
    }

    #[test]
    fn test_duplicate_pattern_replaces_in_place() {
        let config = Configuration::from_json_str(
            r#"{"loggers": {
                "^app": {"console": ["info"]},
                "db": {"sentry": ["error"]},
                "^app": {"console": ["error"]}
            }}"#,
        )
        .unwrap();

        assert_eq!(config.len(), 2);
        let patterns: Vec<&str> = config.rules().iter().map(Rule::pattern).collect();
        assert_eq!(patterns, vec!["^app", "db"]);

        let table = config.resolve("app.db").unwrap();
        assert!(!table.accepts("console", LogLevel::Info));
        assert!(table.accepts("console", LogLevel::Error));
    }

    #[test]
    fn test_builder_and_push_replace_duplicate_pattern() {
        let mut config = Configuration::builder()
            .rule("^app", ActivationTable::new().with_handler("console", [LogLevel::Info]))
            .rule("^app", ActivationTable::new().with_handler("backlog", [LogLevel::Debug]))
            .build()
            .unwrap();
        assert_eq!(config.len(), 1);
        assert!(config.resolve("app").unwrap().accepts("backlog", LogLevel::Debug));

        config.push(
            Rule::new("^app", ActivationTable::new().with_handler("sentry", [LogLevel::Error]))
                .unwrap(),
        );
        assert_eq!(config.len(), 1);
        assert!(config.resolve("app").unwrap().accepts("sentry", LogLevel::Error));
    }

    #[test]
    fn test_lookaround_pattern_rejected() {
        let result = Configuration::builder()
            .rule("^(?!internal)", ActivationTable::new())
            .build();
        assert!(matches!(result, Err(LoggerError::InvalidPattern { .. })));
    }
}
