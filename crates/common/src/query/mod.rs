//! Query filter for record searches
//!
//! A search string is a run of whitespace-separated `field:value` tokens.
//! When a string contains no recognized pair at all it is deliberately
//! treated as one free-text term matched against every field. Whitespace
//! inside a value cannot be escaped; that is a known limitation of the
//! syntax.

use serde::Serialize;
use serde_json::Value;

/// A single structured search condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub value: String,
}

/// A parsed search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Empty query; matches every record
    All,
    /// Every condition must hold
    Conditions(Vec<Condition>),
    /// Flat search over all fields
    FreeText(String),
}

impl Query {
    /// Parse a raw query string.
    ///
    /// Tokens without a `field:value` shape are ignored when at least one
    /// structured pair is present; with none present the whole string
    /// becomes a free-text term.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Query::All;
        }

        let conditions: Vec<Condition> = raw
            .split_whitespace()
            .filter_map(|token| {
                let (field, value) = token.split_once(':')?;
                if field.is_empty() {
                    return None;
                }
                Some(Condition {
                    field: field.to_string(),
                    value: value.to_string(),
                })
            })
            .collect();

        if conditions.is_empty() {
            Query::FreeText(raw.to_string())
        } else {
            Query::Conditions(conditions)
        }
    }
}

/// A record field flattened to a string value
struct FlatField {
    path: String,
    leaf: String,
    value: String,
}

fn flatten_into(value: &Value, path: &str, leaf: &str, out: &mut Vec<FlatField>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, nested) in map {
                let nested_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                flatten_into(nested, &nested_path, key, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_into(item, path, leaf, out);
            }
        }
        Value::String(s) => out.push(FlatField {
            path: path.to_string(),
            leaf: leaf.to_string(),
            value: s.clone(),
        }),
        other => out.push(FlatField {
            path: path.to_string(),
            leaf: leaf.to_string(),
            value: other.to_string(),
        }),
    }
}

fn flatten(record: &Value) -> Vec<FlatField> {
    let mut out = Vec::new();
    flatten_into(record, "", "", &mut out);
    out
}

fn condition_matches(fields: &[FlatField], condition: &Condition, partial: bool) -> bool {
    fields
        .iter()
        .filter(|f| f.path == condition.field || f.leaf == condition.field)
        .any(|f| {
            if partial {
                f.value.to_lowercase().contains(&condition.value.to_lowercase())
            } else {
                f.value == condition.value
            }
        })
}

fn free_text_matches(fields: &[FlatField], term: &str) -> bool {
    let term = term.to_lowercase();
    fields.iter().any(|f| f.value.to_lowercase().contains(&term))
}

/// Filter records by a parsed query, preserving input order.
///
/// Structured conditions address a field by its flattened path
/// (`author.email`) or by its leaf name (`email`); a record matches when
/// every condition holds. In partial mode values match by case-insensitive
/// substring instead of equality. Free-text queries match a record when
/// any stringified field contains the term.
pub fn filter_records<T: Serialize>(records: Vec<T>, query: &Query, partial: bool) -> Vec<T> {
    match query {
        Query::All => records,
        _ => records
            .into_iter()
            .filter(|record| {
                let value = match serde_json::to_value(record) {
                    Ok(v) => v,
                    Err(_) => return false,
                };
                let fields = flatten(&value);
                match query {
                    Query::All => true,
                    Query::Conditions(conditions) => conditions
                        .iter()
                        .all(|c| condition_matches(&fields, c, partial)),
                    Query::FreeText(term) => free_text_matches(&fields, term),
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Person {
        name: String,
        email: String,
    }

    fn people() -> Vec<Person> {
        vec![
            Person { name: "Ann".into(), email: "a@x.com".into() },
            Person { name: "Bob".into(), email: "b@x.com".into() },
        ]
    }

    #[test]
    fn test_parse_structured() {
        let query = Query::parse("name:Ann email:a@x.com");
        assert_eq!(
            query,
            Query::Conditions(vec![
                Condition { field: "name".into(), value: "Ann".into() },
                Condition { field: "email".into(), value: "a@x.com".into() },
            ])
        );
    }

    #[test]
    fn test_parse_free_text_fallback() {
        assert_eq!(Query::parse("Ann"), Query::FreeText("Ann".into()));
        assert_eq!(Query::parse("gene editing"), Query::FreeText("gene editing".into()));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Query::parse(""), Query::All);
        assert_eq!(Query::parse("   "), Query::All);
    }

    #[test]
    fn test_structured_filter() {
        let query = Query::parse("name:Ann");
        let matched = filter_records(people(), &query, false);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Ann");
    }

    #[test]
    fn test_free_text_filter() {
        let query = Query::parse("Ann");
        let matched = filter_records(people(), &query, false);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Ann");
    }

    #[test]
    fn test_partial_match_is_case_insensitive() {
        let query = Query::parse("name:an");
        let matched = filter_records(people(), &query, true);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Ann");
    }

    #[test]
    fn test_exact_match_requires_equality() {
        let query = Query::parse("name:An");
        let matched = filter_records(people(), &query, false);
        assert!(matched.is_empty());
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let matched = filter_records(people(), &Query::All, true);
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_order_preserved() {
        let query = Query::parse("email:x.com");
        let matched = filter_records(people(), &query, true);
        assert_eq!(matched[0].name, "Ann");
        assert_eq!(matched[1].name, "Bob");
    }

    #[derive(Serialize)]
    struct Nested {
        title: String,
        author: Person,
    }

    #[test]
    fn test_leaf_name_reaches_nested_field() {
        let records = vec![Nested {
            title: "T".into(),
            author: Person { name: "Ann".into(), email: "a@x.com".into() },
        }];
        let query = Query::parse("email:a@x.com");
        assert_eq!(filter_records(records, &query, false).len(), 1);
    }
}
