use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Zero-argument condition.
pub type Thunk = Arc<dyn Fn() -> bool + Send + Sync>;

/// Condition receiving the context object of the call it guards.
pub type Lambda = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// An unevaluated boolean condition.
///
/// Nothing in this crate ever calls a predicate; they are carried along and
/// concatenated until they reach a target that knows what to do with them.
#[derive(Clone)]
pub enum Predicate {
    /// Reference by name, e.g. an attribute or method of the validated record.
    Named(String),
    /// Any other JSON value handed over as a condition, kept as-is.
    Value(Value),
    Thunk(Thunk),
    Lambda(Lambda),
}

impl Predicate {
    pub fn named(name: impl Into<String>) -> Self {
        Predicate::Named(name.into())
    }

    pub fn thunk<F>(f: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Predicate::Thunk(Arc::new(f))
    }

    pub fn lambda<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Predicate::Lambda(Arc::new(f))
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Predicate::Named(n) => Some(n),
            _ => None,
        }
    }
}

// Callables compare by identity.
impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Predicate::Named(a), Predicate::Named(b)) => a == b,
            (Predicate::Value(a), Predicate::Value(b)) => a == b,
            (Predicate::Thunk(a), Predicate::Thunk(b)) => Arc::ptr_eq(a, b),
            (Predicate::Lambda(a), Predicate::Lambda(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Named(n) => f.debug_tuple("Named").field(n).finish(),
            Predicate::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Predicate::Thunk(_) => f.write_str("Thunk(<thunk>)"),
            Predicate::Lambda(_) => f.write_str("Lambda(<lambda>)"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Named(n) => f.write_str(n),
            Predicate::Value(v) => write!(f, "{v}"),
            Predicate::Thunk(_) => f.write_str("<thunk>"),
            Predicate::Lambda(_) => f.write_str("<lambda>"),
        }
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Predicate::Value(v) => v.serialize(serializer),
            _ => serializer.collect_str(self),
        }
    }
}

/// Strings read back as names, anything else as an opaque value.
impl<'de> Deserialize<'de> for Predicate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Predicate::from)
    }
}

impl From<Value> for Predicate {
    fn from(value: Value) -> Self {
        match value {
            Value::String(name) => Predicate::Named(name),
            other => Predicate::Value(other),
        }
    }
}

impl From<&str> for Predicate {
    fn from(name: &str) -> Self {
        Predicate::Named(name.to_string())
    }
}

impl From<String> for Predicate {
    fn from(name: String) -> Self {
        Predicate::Named(name)
    }
}

/// Ordered predicate sequence.
///
/// Every shape a caller may hand over (nothing, one predicate, a list)
/// normalizes into this through `From`.
#[derive(Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Predicates(Vec<Predicate>);

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Predicate] {
        &self.0
    }

    /// Fresh sequence holding `self` followed by `later`. Neither input changes.
    pub fn merge(&self, later: &Predicates) -> Predicates {
        self.0.iter().chain(later.0.iter()).cloned().collect()
    }

    /// Reads a JSON value as predicates: `null` is empty, an array is taken
    /// element by element, anything else is a single predicate. Strings become
    /// names; other values are kept opaque.
    pub fn from_json(value: &Value) -> Predicates {
        match value {
            Value::Null => Predicates::new(),
            Value::Array(items) => items.iter().cloned().map(Predicate::from).collect(),
            other => Predicates(vec![Predicate::from(other.clone())]),
        }
    }
}

impl fmt::Debug for Predicates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for Predicates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

impl<'de> Deserialize<'de> for Predicates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| Predicates::from_json(&v))
    }
}

impl FromIterator<Predicate> for Predicates {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Predicates(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Predicates {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Predicates {
    type Item = Predicate;
    type IntoIter = std::vec::IntoIter<Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<()> for Predicates {
    fn from(_: ()) -> Self {
        Predicates::new()
    }
}

impl From<Predicate> for Predicates {
    fn from(p: Predicate) -> Self {
        Predicates(vec![p])
    }
}

impl From<&str> for Predicates {
    fn from(name: &str) -> Self {
        Predicates(vec![Predicate::from(name)])
    }
}

impl From<String> for Predicates {
    fn from(name: String) -> Self {
        Predicates(vec![Predicate::from(name)])
    }
}

impl<P: Into<Predicate>> From<Vec<P>> for Predicates {
    fn from(items: Vec<P>) -> Self {
        items.into_iter().map(Into::into).collect()
    }
}

impl<P: Into<Predicate>, const N: usize> From<[P; N]> for Predicates {
    fn from(items: [P; N]) -> Self {
        items.into_iter().map(Into::into).collect()
    }
}

impl<P: Into<Predicate> + Clone> From<&[P]> for Predicates {
    fn from(items: &[P]) -> Self {
        items.iter().cloned().map(Into::into).collect()
    }
}

impl<T: Into<Predicates>> From<Option<T>> for Predicates {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// An `if` / `unless` pair, as handed to the scope entry points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(rename = "if", default)]
    pub if_conds: Predicates,
    #[serde(rename = "unless", default)]
    pub unless_conds: Predicates,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the `if` list.
    pub fn when(mut self, preds: impl Into<Predicates>) -> Self {
        self.if_conds = self.if_conds.merge(&preds.into());
        self
    }

    /// Appends to the `unless` list.
    pub fn unless(mut self, preds: impl Into<Predicates>) -> Self {
        self.unless_conds = self.unless_conds.merge(&preds.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.if_conds.is_empty() && self.unless_conds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn scalar_and_list_normalize_the_same() {
        assert_eq!(Predicates::from("cond_1"), Predicates::from(vec!["cond_1"]));
        assert_eq!(Predicates::from(["a", "b"]).len(), 2);
        assert_eq!(Predicates::from(None::<&str>), Predicates::new());
        assert_eq!(Predicates::from(()), Predicates::from(Vec::<&str>::new()));
    }

    #[test]
    fn merge_keeps_order_and_inputs() {
        let outer = Predicates::from(["a", "b"]);
        let inner = Predicates::from("c");
        let merged = outer.merge(&inner);
        assert_eq!(merged, Predicates::from(["a", "b", "c"]));
        assert_eq!(outer.len(), 2);
        assert_eq!(inner.len(), 1);
    }

    #[test]
    fn callables_compare_by_identity() {
        let p = Predicate::thunk(|| true);
        let q = Predicate::thunk(|| true);
        assert_eq!(p, p.clone());
        assert!(p != q);
        assert!(Predicate::lambda(|_| true) != Predicate::named("x"));
    }

    #[test]
    fn display_and_json() {
        let ps = Predicates::from(vec![
            Predicate::named("ready?"),
            Predicate::thunk(|| false),
            Predicate::lambda(|v| v["ok"] == json!(true)),
        ]);
        assert_eq!(ps.to_string(), "[ready?, <thunk>, <lambda>]");
        assert_eq!(
            serde_json::to_value(&ps).unwrap(),
            json!(["ready?", "<thunk>", "<lambda>"])
        );
    }

    #[test]
    fn from_json_shapes() {
        assert_eq!(Predicates::from_json(&json!("a")), Predicates::from("a"));
        assert_eq!(Predicates::from_json(&json!(["a", "b"])), Predicates::from(["a", "b"]));
        assert_eq!(Predicates::from_json(&json!(null)), Predicates::new());

        let mixed = Predicates::from_json(&json!(["a", 1, {"attr": "x"}]));
        assert_eq!(mixed.len(), 3);
        assert_eq!(mixed.as_slice()[0].as_name(), Some("a"));
        assert_eq!(mixed.as_slice()[1], Predicate::Value(json!(1)));
        assert_eq!(mixed.as_slice()[2].as_name(), None);
        assert_eq!(serde_json::to_value(&mixed).unwrap(), json!(["a", 1, {"attr": "x"}]));
        assert_eq!(mixed.to_string(), r#"[a, 1, {"attr":"x"}]"#);

        assert_eq!(Predicates::from_json(&json!(true)), Predicates::from(Predicate::Value(json!(true))));
    }

    #[test]
    fn conditions_deserialize_scalar_or_list() {
        let c: Conditions = serde_json::from_value(json!({"if": "a", "unless": ["b", "c"]})).unwrap();
        assert_eq!(c, Conditions::new().when("a").unless(["b", "c"]));
        let empty: Conditions = serde_json::from_value(json!({})).unwrap();
        assert!(empty.is_empty());
    }
}
