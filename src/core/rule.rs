//! Routing rules: a logger-name pattern paired with a handler activation table

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Levels accepted by one handler under one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerActivation {
    handler: String,
    levels: Vec<LogLevel>,
}

impl HandlerActivation {
    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn levels(&self) -> &[LogLevel] {
        &self.levels
    }

    pub fn accepts(&self, level: LogLevel) -> bool {
        self.levels.contains(&level)
    }
}

/// Handler id → accepted levels, in insertion order.
///
/// Level lists are de-duplicated but otherwise keep the order they were
/// given in. Inserting an id a second time replaces its levels in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationTable {
    entries: Vec<HandlerActivation>,
}

impl ActivationTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_handler<I>(mut self, handler: impl Into<String>, levels: I) -> Self
    where
        I: IntoIterator<Item = LogLevel>,
    {
        self.insert(handler, levels);
        self
    }

    pub fn insert<I>(&mut self, handler: impl Into<String>, levels: I)
    where
        I: IntoIterator<Item = LogLevel>,
    {
        let handler = handler.into();
        let mut unique = Vec::new();
        for level in levels {
            if !unique.contains(&level) {
                unique.push(level);
            }
        }

        match self.entries.iter_mut().find(|e| e.handler == handler) {
            Some(entry) => entry.levels = unique,
            None => self.entries.push(HandlerActivation {
                handler,
                levels: unique,
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandlerActivation> {
        self.entries.iter()
    }

    pub fn levels_for(&self, handler: &str) -> Option<&[LogLevel]> {
        self.entries
            .iter()
            .find(|e| e.handler == handler)
            .map(|e| e.levels.as_slice())
    }

    /// Whether `handler` is listed and accepts `level`
    pub fn accepts(&self, handler: &str, level: LogLevel) -> bool {
        self.levels_for(handler)
            .is_some_and(|levels| levels.contains(&level))
    }

    pub fn handler_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.handler.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ActivationTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.handler, &entry.levels)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ActivationTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = ActivationTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of handler id to a list of levels")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut table = ActivationTable::new();
                while let Some((handler, levels)) = map.next_entry::<String, Vec<LogLevel>>()? {
                    table.insert(handler, levels);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// A compiled rule.
///
/// The pattern is matched anywhere in the logger name; anchor it with `^`/`$`
/// for prefix or exact matching. Patterns use `regex` crate syntax, which has
/// no look-around or backreferences; such patterns fail with
/// [`LoggerError::InvalidPattern`].
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    regex: Regex,
    table: ActivationTable,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, table: ActivationTable) -> Result<Self> {
        let pattern = pattern.into();
        let regex =
            Regex::new(&pattern).map_err(|e| LoggerError::invalid_pattern(pattern.clone(), e))?;
        Ok(Self {
            pattern,
            regex,
            table,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn table(&self) -> &ActivationTable {
        &self.table
    }

    #[inline]
    pub fn matches(&self, logger_name: &str) -> bool {
        self.regex.is_match(logger_name)
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.table == other.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_keeps_insertion_order() {
        let table = ActivationTable::new()
            .with_handler("sentry", [LogLevel::Error])
            .with_handler("console", [LogLevel::Debug])
            .with_handler("backlog", [LogLevel::Info]);

        let ids: Vec<&str> = table.handler_ids().collect();
        assert_eq!(ids, vec!["sentry", "console", "backlog"]);
    }

    #[test]
    fn test_table_dedups_and_replaces() {
        let mut table = ActivationTable::new();
        table.insert("console", [LogLevel::Warn, LogLevel::Warn, LogLevel::Error]);
        assert_eq!(
            table.levels_for("console"),
            Some(&[LogLevel::Warn, LogLevel::Error][..])
        );

        table.insert("console", [LogLevel::Debug]);
        assert_eq!(table.len(), 1);
        assert!(table.accepts("console", LogLevel::Debug));
        assert!(!table.accepts("console", LogLevel::Warn));
    }

    #[test]
    fn test_table_deserialize_preserves_order() {
        let table: ActivationTable =
            serde_json::from_str(r#"{"z": ["error"], "a": ["debug", "info"]}"#).unwrap();

        let ids: Vec<&str> = table.handler_ids().collect();
        assert_eq!(ids, vec!["z", "a"]);
        assert!(table.accepts("a", LogLevel::Info));
    }

    #[test]
    fn test_table_rejects_unknown_level() {
        let result = serde_json::from_str::<ActivationTable>(r#"{"console": ["verbose"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_rule_matches_unanchored() {
        let rule = Rule::new("db", ActivationTable::new()).unwrap();
        assert!(rule.matches("app.db.pool"));
        assert!(!rule.matches("app.cache"));

        let anchored = Rule::new(r"^app\.", ActivationTable::new()).unwrap();
        assert!(anchored.matches("app.db"));
        assert!(!anchored.matches("myapp.db"));
    }

    #[test]
    fn test_rule_invalid_pattern() {
        let err = Rule::new("[unterminated", ActivationTable::new()).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidPattern { .. }));
    }
}
