//! Structured connection descriptors.
//!
//! A descriptor is the whitespace-separated `key=value` string a provider
//! hands out, e.g.
//!
//! ```text
//! service='pg_prod' key='id' srid=21781 type=Polygon table="land"."parcels" (geom) sql=
//! ```
//!
//! Values come in three shapes: bare tokens, single-quoted strings, and
//! compound double-quoted segments joined by dots (schema-qualified table
//! names). Parsing keeps every entry, including standalone tokens such as the
//! geometry column `(geom)`, so a descriptor can be rewritten and rendered
//! back without losing anything.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

const TABLE_KEY: &str = "table";
const SERVICE_KEY: &str = "service";

/// One shape a descriptor value can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum SourceValue {
    /// Unquoted run of characters, possibly empty (`sql=`).
    Bare(String),
    /// Single-quoted string (`service='pg_prod'`).
    Quoted(String),
    /// Dot-joined double-quoted segments (`table="land"."parcels"`).
    Compound(Vec<String>),
}

impl SourceValue {
    /// The scalar text of the value; for compound values, the last segment.
    fn scalar(&self) -> &str {
        match self {
            Self::Bare(s) | Self::Quoted(s) => s,
            Self::Compound(segments) => segments.last().map_or("", String::as_str),
        }
    }
}

impl fmt::Display for SourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bare(s) => f.write_str(s),
            Self::Quoted(s) => write!(f, "'{s}'"),
            Self::Compound(segments) => {
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "\"{segment}\"")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Entry {
    /// Empty for standalone tokens like `(geom)`.
    key: String,
    value: SourceValue,
}

/// A parsed connection descriptor.
///
/// Entry order is preserved so the rendered form stays recognizable next to
/// the original.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    entries: Vec<Entry>,
}

impl DataSource {
    /// Parses a descriptor string.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut chars = descriptor.chars().peekable();
        loop {
            while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
                chars.next();
            }
            if chars.peek().is_none() {
                break;
            }
            let mut head = String::new();
            let mut is_pair = false;
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                chars.next();
                if c == '=' {
                    is_pair = true;
                    break;
                }
                head.push(c);
            }
            if !is_pair {
                entries.push(Entry {
                    key: String::new(),
                    value: SourceValue::Bare(head),
                });
                continue;
            }
            let value = match chars.peek() {
                Some('\'') => {
                    chars.next();
                    SourceValue::Quoted(read_quoted(&mut chars, '\'', descriptor)?)
                }
                Some('"') => {
                    let mut segments = Vec::new();
                    loop {
                        chars.next();
                        segments.push(read_quoted(&mut chars, '"', descriptor)?);
                        // Another segment only follows as `."`; anything else
                        // ends the compound value.
                        let mut ahead = chars.clone();
                        if ahead.next() == Some('.') && ahead.next() == Some('"') {
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    SourceValue::Compound(segments)
                }
                _ => {
                    let mut raw = String::new();
                    while let Some(&c) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        chars.next();
                        raw.push(c);
                    }
                    SourceValue::Bare(raw)
                }
            };
            entries.push(Entry { key: head, value });
        }
        Ok(Self { entries })
    }

    /// The table or relation name, without any schema qualifier.
    ///
    /// Returns `None` when the descriptor has no (non-empty) `table` entry,
    /// e.g. for purely file-based sources.
    pub fn table(&self) -> Option<&str> {
        self.lookup(TABLE_KEY).filter(|s| !s.is_empty())
    }

    /// The service name the descriptor connects through, if any.
    pub fn service(&self) -> Option<&str> {
        self.lookup(SERVICE_KEY).filter(|s| !s.is_empty())
    }

    /// The scalar value of an arbitrary entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lookup(key)
    }

    /// Points the descriptor at another service.
    ///
    /// Descriptors without a `service` entry (file paths, plain host/port
    /// connections) are left untouched; returns whether a rewrite happened.
    pub fn replace_service(&mut self, service: &str) -> bool {
        for entry in &mut self.entries {
            if entry.key == SERVICE_KEY {
                entry.value = SourceValue::Quoted(service.to_string());
                return true;
            }
        }
        false
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.scalar())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if !entry.key.is_empty() {
                write!(f, "{}=", entry.key)?;
            }
            write!(f, "{}", entry.value)?;
        }
        Ok(())
    }
}

impl FromStr for DataSource {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Reads up to (and past) the closing quote, assuming the opener is consumed.
fn read_quoted(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    quote: char,
    descriptor: &str,
) -> Result<String> {
    let mut out = String::new();
    for c in chars.by_ref() {
        if c == quote {
            return Ok(out);
        }
        out.push(c);
    }
    Err(ModelError::UnterminatedQuote {
        descriptor: descriptor.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const PARCELS: &str =
        "service='pg_prod' key='id' srid=21781 type=Polygon table=\"land\".\"parcels\" (geom) sql=";

    #[test]
    fn round_trips_a_full_descriptor() {
        let source = DataSource::parse(PARCELS).unwrap();
        assert_eq!(source.to_string(), PARCELS);
    }

    #[test]
    fn extracts_table_from_compound_value() {
        let source = DataSource::parse(PARCELS).unwrap();
        assert_eq!(source.table(), Some("parcels"));
    }

    #[test]
    fn extracts_table_from_plain_values() {
        let quoted = DataSource::parse("table='owners' key='id'").unwrap();
        assert_eq!(quoted.table(), Some("owners"));
        let bare = DataSource::parse("table=owners").unwrap();
        assert_eq!(bare.table(), Some("owners"));
    }

    #[test]
    fn missing_or_empty_table_is_none() {
        let none = DataSource::parse("host=localhost port=5432").unwrap();
        assert_eq!(none.table(), None);
        let empty = DataSource::parse("table= host=localhost").unwrap();
        assert_eq!(empty.table(), None);
    }

    #[test]
    fn quoted_values_keep_spaces() {
        let source = DataSource::parse("table=\"my schema\".\"my table\" key='obj id'").unwrap();
        assert_eq!(source.table(), Some("my table"));
        assert_eq!(source.get("key"), Some("obj id"));
        assert_eq!(
            source.to_string(),
            "table=\"my schema\".\"my table\" key='obj id'"
        );
    }

    #[test]
    fn replace_service_rewrites_in_place() {
        let mut source = DataSource::parse(PARCELS).unwrap();
        assert!(source.replace_service("pg_qgep"));
        assert_eq!(source.service(), Some("pg_qgep"));
        assert!(source.to_string().starts_with("service='pg_qgep' key='id'"));
    }

    #[test]
    fn replace_service_skips_serviceless_descriptors() {
        let mut source = DataSource::parse("host=localhost table=owners").unwrap();
        assert!(!source.replace_service("pg_qgep"));
        assert_eq!(source.to_string(), "host=localhost table=owners");
    }

    #[test]
    fn standalone_tokens_survive() {
        let source = DataSource::parse("table=\"s\".\"t\" (geom)").unwrap();
        assert_eq!(source.to_string(), "table=\"s\".\"t\" (geom)");
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = DataSource::parse("service='pg_prod table=x").unwrap_err();
        assert!(matches!(err, ModelError::UnterminatedQuote { .. }));
    }

    #[test]
    fn empty_descriptor_parses() {
        let source = DataSource::parse("").unwrap();
        assert_eq!(source.table(), None);
        assert_eq!(source.to_string(), "");
    }

    proptest! {
        #[test]
        fn rendering_then_parsing_is_lossless(
            keys in proptest::collection::vec("[a-z]{1,8}", 1..5),
            values in proptest::collection::vec("[a-zA-Z0-9_]{0,10}", 1..5),
        ) {
            let descriptor = keys
                .iter()
                .zip(values.iter())
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" ");
            let parsed = DataSource::parse(&descriptor).unwrap();
            let rendered = parsed.to_string();
            prop_assert_eq!(DataSource::parse(&rendered).unwrap(), parsed);
        }

        #[test]
        fn replace_service_touches_only_the_service_entry(
            old in "[a-z_]{1,12}",
            new in "[a-z_]{1,12}",
            table in "[a-z_]{1,12}",
            key in "[a-z_]{1,12}",
        ) {
            let descriptor = format!("service='{old}' key='{key}' table=\"s\".\"{table}\" (geom)");
            let mut source = DataSource::parse(&descriptor).unwrap();
            prop_assert!(source.replace_service(&new));
            prop_assert_eq!(source.service(), Some(new.as_str()));
            prop_assert_eq!(source.table(), Some(table.as_str()));
            prop_assert_eq!(source.get("key"), Some(key.as_str()));
            prop_assert_eq!(
                source.to_string(),
                format!("service='{new}' key='{key}' table=\"s\".\"{table}\" (geom)")
            );
        }
    }
}
