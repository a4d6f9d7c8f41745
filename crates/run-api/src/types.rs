//! Value types passed through the run API client.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! structured request data: filter sets that end up in URLs, operation
//! descriptors that end up in `POST` bodies, and the request parameter
//! envelope the transport encodes.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::{RunApiError, TransportError};
use crate::identifiers::OperationName;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// A single filter value.
///
/// Values are embedded in URLs using their [`Display`](fmt::Display) text.
/// Lists display as their elements joined with `,`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// `true` / `false`.
    Bool(bool),
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Text, embedded verbatim (comparison prefixes such as `">1"` included).
    Text(String),
    /// A list of values.
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Returns `true` for [`FilterValue::List`].
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------

/// Ordered mapping of filter keys to values.
///
/// Keys are free-form (a leading `.` addresses a run attribute path, e.g.
/// `".price"`). Iteration follows insertion order; re-inserting an existing
/// key replaces its value without moving it. Neither keys nor values are
/// validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    entries: Vec<(String, FilterValue)>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces the value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Copies every entry of `other` into `self`; entries of `other` win.
    pub fn merge(&mut self, other: &FilterSet) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSet
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<K, V> Extend<(K, V)> for FilterSet
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl Serialize for FilterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// Hand-written so that document order survives deserialisation.
impl<'de> Deserialize<'de> for FilterSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FilterSetVisitor;

        impl<'de> Visitor<'de> for FilterSetVisitor {
            type Value = FilterSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of filter keys to scalar or list values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FilterSet, A::Error> {
                let mut set = FilterSet::new();
                while let Some((key, value)) = access.next_entry::<String, FilterValue>()? {
                    set.insert(key, value);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(FilterSetVisitor)
    }
}

// ---------------------------------------------------------------------------
// Request parameters
// ---------------------------------------------------------------------------

/// Parameters handed to the transport for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    /// No body.
    #[default]
    None,
    /// Pre-encoded text, sent unchanged (used for query-string bodies).
    Raw(String),
    /// A JSON value. Objects and arrays are sent as JSON text; scalars are
    /// sent as their plain text.
    Json(Value),
}

impl Params {
    /// Wraps any serialisable value as [`Params::Json`].
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, TransportError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Encodes the parameters into request body text.
    ///
    /// Returns `None` when there is nothing to send.
    pub fn encode(&self) -> Result<Option<String>, TransportError> {
        match self {
            Self::None => Ok(None),
            Self::Raw(text) => Ok(Some(text.clone())),
            Self::Json(Value::Null) => Ok(None),
            Self::Json(value @ (Value::Object(_) | Value::Array(_))) => {
                Ok(Some(serde_json::to_string(value)?))
            }
            Self::Json(Value::String(s)) => Ok(Some(s.clone())),
            Self::Json(other) => Ok(Some(other.to_string())),
        }
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Parameters of a run operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OperationParams {
    /// The operation takes no arguments; no body is sent.
    #[default]
    None,
    /// Positional arguments, sent as a JSON array.
    Positional(Vec<Value>),
    /// Named arguments, sent as a JSON object.
    Keyed(Map<String, Value>),
}

impl OperationParams {
    /// Converts to transport parameters.
    pub fn to_params(&self) -> Params {
        match self {
            Self::None => Params::None,
            Self::Positional(args) => Params::Json(Value::Array(args.clone())),
            Self::Keyed(args) => Params::Json(Value::Object(args.clone())),
        }
    }
}

impl From<Value> for OperationParams {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Array(args) => Self::Positional(args),
            Value::Object(args) => Self::Keyed(args),
            scalar => Self::Positional(vec![scalar]),
        }
    }
}

impl From<Vec<Value>> for OperationParams {
    fn from(args: Vec<Value>) -> Self {
        Self::Positional(args)
    }
}

impl From<Map<String, Value>> for OperationParams {
    fn from(args: Map<String, Value>) -> Self {
        Self::Keyed(args)
    }
}

// ---------------------------------------------------------------------------

/// A normalised `(name, params)` pair ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// The operation to invoke.
    pub name: OperationName,
    /// Its arguments.
    pub params: OperationParams,
}

impl Operation {
    /// Creates an operation, rejecting an empty name.
    pub fn new(
        name: impl Into<String>,
        params: impl Into<OperationParams>,
    ) -> Result<Self, RunApiError> {
        let name = OperationName::new(name).ok_or_else(|| RunApiError::InvalidOperation {
            message: "operation name must not be empty".to_owned(),
        })?;
        Ok(Self {
            name,
            params: params.into(),
        })
    }

    /// Creates an operation without arguments.
    pub fn named(name: impl Into<String>) -> Result<Self, RunApiError> {
        Self::new(name, OperationParams::None)
    }

    /// Pairs a list of names with a list of parameters by position.
    ///
    /// Names without a matching parameter entry get
    /// [`OperationParams::None`]; surplus parameter entries are ignored.
    pub fn batch<N, P>(names: N, params: P) -> Result<Vec<Self>, RunApiError>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<OperationParams>,
    {
        let mut params = params.into_iter();
        names
            .into_iter()
            .map(|name| {
                let p = params.next().map(Into::into).unwrap_or_default();
                Self::new(name, p)
            })
            .collect()
    }
}

impl TryFrom<&str> for Operation {
    type Error = RunApiError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::named(name)
    }
}

impl TryFrom<String> for Operation {
    type Error = RunApiError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::named(name)
    }
}

impl<N, P> TryFrom<(N, P)> for Operation
where
    N: Into<String>,
    P: Into<OperationParams>,
{
    type Error = RunApiError;

    fn try_from((name, params): (N, P)) -> Result<Self, Self::Error> {
        Self::new(name, params)
    }
}

/// Normalises a list of operation descriptors.
///
/// Accepts bare names or `(name, params)` pairs. Fails on the first
/// descriptor that cannot be normalised.
pub fn normalize_operations<I>(operations: I) -> Result<Vec<Operation>, RunApiError>
where
    I: IntoIterator,
    I::Item: TryInto<Operation, Error = RunApiError>,
{
    operations.into_iter().map(TryInto::try_into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_set_keeps_insertion_order_on_replace() {
        let mut set = FilterSet::new().with("a", 1).with("b", 2);
        set.insert("a", "x");
        let keys: Vec<_> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(set.get("a"), Some(&FilterValue::Text("x".into())));
    }

    #[test]
    fn merge_lets_other_win_and_appends_new_keys() {
        let mut base = FilterSet::new().with("saved", true).with("trashed", false);
        let caller = FilterSet::new().with("trashed", true).with(".price", ">1");
        base.merge(&caller);
        let rendered: Vec<_> = base.iter().map(|(k, v)| format!("{k}={v}")).collect();
        assert_eq!(rendered, ["saved=true", "trashed=true", ".price=>1"]);
    }

    #[test]
    fn list_values_display_comma_joined() {
        let v = FilterValue::from(vec!["price", "sales"]);
        assert!(v.is_list());
        assert_eq!(v.to_string(), "price,sales");
        assert_eq!(FilterValue::from(1.5).to_string(), "1.5");
    }

    #[test]
    fn filter_set_deserializes_in_document_order() {
        let set: FilterSet =
            serde_json::from_str(r#"{"z": 1, "a": [true, "x"], "m": 2.5}"#).unwrap();
        let keys: Vec<_> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(set.get("a").unwrap().to_string(), "true,x");
        assert_eq!(set.get("m"), Some(&FilterValue::Float(2.5)));
    }

    #[test]
    fn structured_params_encode_as_json_text() {
        let body = Params::Json(json!({"model": "model.jl"})).encode().unwrap();
        assert_eq!(body.as_deref(), Some(r#"{"model":"model.jl"}"#));
        let body = Params::Json(json!([1, 2])).encode().unwrap();
        assert_eq!(body.as_deref(), Some("[1,2]"));
    }

    #[test]
    fn scalar_and_raw_params_pass_through() {
        assert_eq!(
            Params::Raw("include=score".into()).encode().unwrap().as_deref(),
            Some("include=score")
        );
        assert_eq!(
            Params::Json(json!("plain")).encode().unwrap().as_deref(),
            Some("plain")
        );
        assert_eq!(Params::Json(json!(7)).encode().unwrap().as_deref(), Some("7"));
        assert_eq!(Params::None.encode().unwrap(), None);
        assert_eq!(Params::Json(Value::Null).encode().unwrap(), None);
    }

    #[test]
    fn operation_params_follow_json_shape() {
        assert_eq!(
            OperationParams::from(json!([1, 2])),
            OperationParams::Positional(vec![json!(1), json!(2)])
        );
        assert!(matches!(
            OperationParams::from(json!({"x": 1})),
            OperationParams::Keyed(_)
        ));
        assert_eq!(OperationParams::from(Value::Null), OperationParams::None);
        assert_eq!(
            OperationParams::from(json!(3)),
            OperationParams::Positional(vec![json!(3)])
        );
    }

    #[test]
    fn batch_pairs_names_with_params_by_position() {
        let ops = Operation::batch(["init", "step", "solve"], [json!([1]), json!({"n": 2})]).unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].params, OperationParams::Positional(vec![json!(1)]));
        assert!(matches!(ops[1].params, OperationParams::Keyed(_)));
        assert_eq!(ops[2].params, OperationParams::None);
        assert_eq!(ops[2].name.as_str(), "solve");
    }

    #[test]
    fn normalize_rejects_empty_names() {
        let err = normalize_operations(["ok", ""]).unwrap_err();
        assert!(matches!(err, RunApiError::InvalidOperation { .. }));
    }

    #[test]
    fn normalize_accepts_pairs() {
        let ops = normalize_operations([("add", json!([1, 2])), ("reset", Value::Null)]).unwrap();
        assert_eq!(ops[0].params.to_params(), Params::Json(json!([1, 2])));
        assert_eq!(ops[1].params.to_params(), Params::None);
    }
}
