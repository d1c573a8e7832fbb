use crate::predicate::Predicates;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The two keyword options a conditional scope manages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionKey {
    If,
    Unless,
}

impl ConditionKey {
    pub const ALL: [ConditionKey; 2] = [ConditionKey::If, ConditionKey::Unless];

    pub fn as_str(self) -> &'static str {
        match self {
            ConditionKey::If => "if",
            ConditionKey::Unless => "unless",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "if" => Some(ConditionKey::If),
            "unless" => Some(ConditionKey::Unless),
            _ => None,
        }
    }
}

/// A named call with positional arguments and keyword options.
///
/// `if` / `unless` live in their own slots instead of `options` so that
/// predicates (which may be closures) never have to pass through JSON, and so
/// a target can tell an absent key (`None`) from an empty list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub if_conds: Option<Predicates>,
    #[serde(rename = "unless", default, skip_serializing_if = "Option::is_none")]
    pub unless_conds: Option<Predicates>,
}

impl Call {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Sets a keyword option. `"if"` / `"unless"` always go to the predicate
    /// slot instead, replacing it; `null` clears the slot back to absent.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match ConditionKey::parse(&key) {
            Some(slot) => {
                *self.slot_mut(slot) = match value {
                    Value::Null => None,
                    other => Some(Predicates::from_json(&other)),
                };
            }
            None => {
                self.options.insert(key, value);
            }
        }
        self
    }

    /// Appends to the call-site `if` list, creating it when absent.
    pub fn when(self, preds: impl Into<Predicates>) -> Self {
        self.append(ConditionKey::If, preds.into())
    }

    /// Appends to the call-site `unless` list, creating it when absent.
    pub fn unless(self, preds: impl Into<Predicates>) -> Self {
        self.append(ConditionKey::Unless, preds.into())
    }

    fn append(mut self, key: ConditionKey, preds: Predicates) -> Self {
        let slot = self.slot_mut(key);
        *slot = Some(match slot.take() {
            Some(existing) => existing.merge(&preds),
            None => preds,
        });
        self
    }

    pub fn slot(&self, key: ConditionKey) -> Option<&Predicates> {
        match key {
            ConditionKey::If => self.if_conds.as_ref(),
            ConditionKey::Unless => self.unless_conds.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, key: ConditionKey) -> &mut Option<Predicates> {
        match key {
            ConditionKey::If => &mut self.if_conds,
            ConditionKey::Unless => &mut self.unless_conds,
        }
    }

    pub fn get_option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let positional = self.args.iter().map(|v| v.to_string());
        let keywords = self.options.iter().map(|(k, v)| format!("{k}: {v}"));
        let conditions = ConditionKey::ALL.into_iter().filter_map(|key| {
            self.slot(key).map(|preds| format!("{}: {preds}", key.as_str()))
        });
        write!(
            f,
            "{}({})",
            self.name,
            positional.chain(keywords).chain(conditions).join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Predicate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn option_routes_condition_keys() {
        let call = Call::new("validates")
            .arg("value")
            .option("presence", true)
            .option("if", json!(["cond_3", "cond_4"]))
            .option("unless", "cond_5");
        assert_eq!(call.if_conds, Some(Predicates::from(["cond_3", "cond_4"])));
        assert_eq!(call.unless_conds, Some(Predicates::from("cond_5")));
        assert_eq!(call.get_option("presence"), Some(&json!(true)));
        assert!(call.get_option("if").is_none());
    }

    #[test]
    fn condition_keys_never_land_in_options() {
        let call = Call::new("validates").option("if", 3).option("unless", json!(["a", false]));
        assert_eq!(call.if_conds, Some(Predicates::from(Predicate::Value(json!(3)))));
        assert_eq!(
            call.unless_conds,
            Some(Predicates::from(vec![Predicate::named("a"), Predicate::Value(json!(false))]))
        );
        assert!(call.options.is_empty());
    }

    #[test]
    fn null_means_absent_on_every_path() {
        let built = Call::new("f").when("a").option("if", Value::Null);
        assert!(built.if_conds.is_none());
        assert!(built.get_option("if").is_none());

        let read: Call = serde_json::from_value(json!({"name": "f", "if": null})).unwrap();
        assert_eq!(read, built);
    }

    #[test]
    fn when_appends() {
        let call = Call::new("validates").when("a").when(["b", "c"]);
        assert_eq!(call.if_conds, Some(Predicates::from(["a", "b", "c"])));
        assert!(call.unless_conds.is_none());
    }

    #[test]
    fn display_reads_like_a_call() {
        let call = Call::new("validates")
            .arg("value")
            .option("presence", true)
            .when("ready?")
            .unless(());
        assert_eq!(
            call.to_string(),
            r#"validates("value", presence: true, if: [ready?], unless: [])"#
        );
    }

    #[test]
    fn json_omits_absent_slots() {
        let call = Call::new("validates").arg("value").unless("x");
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"name": "validates", "args": ["value"], "unless": ["x"]})
        );
        let back: Call = serde_json::from_value(json!({"name": "n", "if": "a"})).unwrap();
        assert_eq!(back, Call::new("n").when("a"));
    }
}
