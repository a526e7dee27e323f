//! Predicate shapes handed to the downstream query layer
//!
//! The engine never issues queries. It emits [`Clause`] values built from a
//! closed set of operators and the query layer translates them into its native
//! filter language. On the wire a clause is a single-key object:
//!
//! ```text
//! {"listed": true}
//! {"belongsToDeployment": {"in": ["d1", "d2"]}}
//! {"belongsToDeployment": {"exists": true}}
//! ```
//!
//! Field paths may be dotted (`appliesTo.hasDeployment`) to address nested
//! fields. `matches` evaluates a clause against a JSON document with the same
//! semantics the store applies: array-valued fields match when any element does.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::identifiers::DeploymentId;

/// Operator of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Field equals the value.
    Equals(Value),
    /// Field is one of the ids.
    In(Vec<String>),
    /// Field is present (and not null) when `true`, absent when `false`.
    Exists(bool),
}

/// A single filter condition on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Dotted field path.
    pub field: String,
    /// Condition applied to the field.
    pub condition: Condition,
}

impl Clause {
    /// `{field: value}`
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            condition: Condition::Equals(value.into()),
        }
    }

    /// `{field: {in: ids}}`
    pub fn is_in<'a>(
        field: impl Into<String>,
        ids: impl IntoIterator<Item = &'a DeploymentId>,
    ) -> Self {
        Self {
            field: field.into(),
            condition: Condition::In(ids.into_iter().map(|id| id.as_str().to_string()).collect()),
        }
    }

    /// `{field: {exists: flag}}`
    pub fn exists(field: impl Into<String>, flag: bool) -> Self {
        Self {
            field: field.into(),
            condition: Condition::Exists(flag),
        }
    }

    /// Evaluate the clause against a document.
    pub fn matches(&self, document: &Value) -> bool {
        let value = lookup(document, &self.field).filter(|value| !value.is_null());
        match &self.condition {
            Condition::Exists(flag) => value.is_some() == *flag,
            Condition::Equals(expected) => match value {
                Some(Value::Array(items)) => items.contains(expected),
                Some(actual) => actual == expected,
                None => false,
            },
            Condition::In(ids) => match value {
                Some(Value::String(actual)) => ids.iter().any(|id| id == actual),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|actual| ids.iter().any(|id| id == actual)),
                _ => false,
            },
        }
    }
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, part| current.get(part))
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match &self.condition {
            Condition::Equals(value) => map.serialize_entry(&self.field, value)?,
            Condition::In(ids) => {
                map.serialize_entry(&self.field, &serde_json::json!({ "in": ids }))?;
            }
            Condition::Exists(flag) => {
                map.serialize_entry(&self.field, &serde_json::json!({ "exists": flag }))?;
            }
        }
        map.end()
    }
}

/// Visibility restriction for a collection query.
///
/// `Unrestricted` and "any of zero clauses" are deliberately different values:
/// the first lets every resource through, the second none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OrPredicate {
    /// No restriction: the caller may see everything.
    Unrestricted,
    /// A resource is visible if any clause matches.
    AnyOf(Vec<Clause>),
}

impl OrPredicate {
    /// Returns `true` if the caller may see everything.
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Clauses to OR-combine; empty when unrestricted.
    pub fn clauses(&self) -> &[Clause] {
        match self {
            Self::Unrestricted => &[],
            Self::AnyOf(clauses) => clauses,
        }
    }

    /// Returns `true` if a document passes the restriction.
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::AnyOf(clauses) => clauses.iter().any(|clause| clause.matches(document)),
        }
    }

    /// Combine with the request's explicit filter.
    ///
    /// Returns `None` when neither side restricts anything.
    pub fn restrict(self, explicit: Option<Filter>) -> Option<Filter> {
        let visibility = match self {
            Self::Unrestricted => None,
            Self::AnyOf(clauses) => Some(Filter::Or(
                clauses.into_iter().map(Filter::Clause).collect(),
            )),
        };
        match (explicit, visibility) {
            (None, None) => None,
            (Some(filter), None) | (None, Some(filter)) => Some(filter),
            (Some(explicit), Some(visibility)) => Some(Filter::And(vec![explicit, visibility])),
        }
    }
}

/// Boolean composition of clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// A single clause.
    Clause(Clause),
    /// All filters must match.
    And(Vec<Filter>),
    /// Any filter must match.
    Or(Vec<Filter>),
}

impl Filter {
    /// Evaluate against a document.
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Self::Clause(clause) => clause.matches(document),
            Self::And(filters) => filters.iter().all(|filter| filter.matches(document)),
            Self::Or(filters) => filters.iter().any(|filter| filter.matches(document)),
        }
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Clause(clause) => clause.serialize(serializer),
            Self::And(filters) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("and", filters)?;
                map.end()
            }
            Self::Or(filters) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("or", filters)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clause_wire_format() {
        let ids = [DeploymentId::new("d1"), DeploymentId::new("d2")];
        assert_eq!(
            serde_json::to_value(Clause::equals("listed", true)).unwrap(),
            json!({ "listed": true })
        );
        assert_eq!(
            serde_json::to_value(Clause::is_in("belongsToDeployment", &ids)).unwrap(),
            json!({ "belongsToDeployment": { "in": ["d1", "d2"] } })
        );
        assert_eq!(
            serde_json::to_value(Clause::exists("belongsToDeployment", true)).unwrap(),
            json!({ "belongsToDeployment": { "exists": true } })
        );
    }

    #[test]
    fn test_nested_and_array_matching() {
        let check = json!({ "id": "c1", "appliesTo": { "hasDeployment": "d1" } });
        assert!(Clause::exists("appliesTo.hasDeployment", true).matches(&check));
        assert!(!Clause::exists("appliesTo.hasDeployment", false).matches(&check));

        let platform = json!({ "id": "p1", "inDeployments": ["d1", "d7"] });
        let ids = [DeploymentId::new("d7")];
        assert!(Clause::is_in("inDeployments", &ids).matches(&platform));
        assert!(!Clause::is_in("inDeployments", &[] as &[DeploymentId]).matches(&platform));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let doc = json!({ "belongsToDeployment": null });
        assert!(Clause::exists("belongsToDeployment", false).matches(&doc));
        assert!(!Clause::equals("createdBy", "u1").matches(&doc));
    }

    #[test]
    fn test_empty_any_of_denies_while_unrestricted_allows() {
        let doc = json!({ "listed": true });
        assert!(OrPredicate::Unrestricted.matches(&doc));
        assert!(!OrPredicate::AnyOf(vec![]).matches(&doc));
        assert!(OrPredicate::Unrestricted.clauses().is_empty());
    }

    #[test]
    fn test_restrict_combines_with_explicit_filter() {
        let explicit = Filter::Clause(Clause::equals("label", "Temperature"));
        assert_eq!(OrPredicate::Unrestricted.restrict(None), None);
        assert_eq!(
            OrPredicate::Unrestricted.restrict(Some(explicit.clone())),
            Some(explicit.clone())
        );

        let combined = OrPredicate::AnyOf(vec![Clause::equals("listed", true)])
            .restrict(Some(explicit))
            .unwrap();
        assert_eq!(
            serde_json::to_value(&combined).unwrap(),
            json!({ "and": [ { "label": "Temperature" }, { "or": [ { "listed": true } ] } ] })
        );
        assert!(combined.matches(&json!({ "label": "Temperature", "listed": true })));
        assert!(!combined.matches(&json!({ "label": "Temperature", "listed": false })));
    }
}
