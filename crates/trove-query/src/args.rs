//! Raw GraphQL field arguments.
//!
//! The GraphQL layer hands arguments over as a JSON object. `null` is
//! treated the same as an absent argument. Integer arguments are validated
//! here and nowhere else: only JSON integers are accepted, numeric-looking
//! strings are rejected.

use crate::error::{QueryError, QueryResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use trove_core::Term;

/// Arguments of one field invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value, which must be an object or `null`.
    pub fn from_value(value: Value) -> QueryResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(QueryError::invalid_argument(
                "arguments",
                format!("expected an object, got {}", json_type(&other)),
            )),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Argument value, `None` when absent or `null`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    pub fn required_str(&self, name: &str) -> QueryResult<&str> {
        match self.get(name) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(QueryError::invalid_argument(
                name,
                format!("expected a string, got {}", json_type(other)),
            )),
            None => Err(QueryError::invalid_argument(name, "required argument is missing")),
        }
    }

    /// Required node reference (`_:label` or an IRI)
    pub fn required_node(&self, name: &str) -> QueryResult<Term> {
        let reference = self.required_str(name)?;
        if reference.trim().is_empty() {
            return Err(QueryError::invalid_argument(name, "node reference is empty"));
        }
        Ok(Term::from_reference(reference))
    }

    pub fn optional_int(&self, name: &str) -> QueryResult<Option<i64>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| {
                QueryError::invalid_argument(name, format!("{} is not an integer", n))
            }),
            Some(other) => Err(QueryError::invalid_argument(
                name,
                format!("expected an integer, got {}", json_type(other)),
            )),
        }
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Arguments {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// JSON type name for error messages
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_absent() {
        let args = Arguments::new().with("limit", Value::Null);
        assert_eq!(args.optional_int("limit").unwrap(), None);
        assert!(args.get("limit").is_none());
    }

    #[test]
    fn test_integer_only() {
        let args = Arguments::new()
            .with("a", 5)
            .with("b", "5")
            .with("c", 2.5);

        assert_eq!(args.optional_int("a").unwrap(), Some(5));
        assert!(args.optional_int("b").unwrap_err().is_invalid_argument());
        assert!(args.optional_int("c").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_required_node() {
        let args = Arguments::new().with("uri", "_:b1");
        assert_eq!(args.required_node("uri").unwrap(), Term::blank("b1"));

        let err = Arguments::new().required_node("uri").unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { ref argument, .. } if argument == "uri"));

        let blank = Arguments::new().with("uri", "  ");
        assert!(blank.required_node("uri").is_err());
    }

    #[test]
    fn test_from_value() {
        let args = Arguments::from_value(json!({"uri": "http://ex.org/a"})).unwrap();
        assert_eq!(args.required_str("uri").unwrap(), "http://ex.org/a");

        assert!(Arguments::from_value(json!([1, 2])).is_err());
        assert_eq!(Arguments::from_value(Value::Null).unwrap(), Arguments::new());
    }
}
