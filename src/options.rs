use crate::call::{Call, ConditionKey};
use crate::errors::Result;
use crate::target::{EmptyConditions, Invoke};
use serde_json::{Map, Value};
use std::fmt;
use tracing::trace;

/// Fills in default keyword options on every call before forwarding it.
///
/// Call-site values win. Nested objects are merged key by key. Defaults named
/// `if` / `unless` only apply when the call has no such key at all; unlike
/// `ConditionalProxy` they replace rather than concatenate.
pub struct OptionsMerger<'a, T: ?Sized> {
    target: &'a T,
    defaults: Call,
}

impl<'a, T: Invoke + ?Sized> OptionsMerger<'a, T> {
    pub fn new(target: &'a T, defaults: Map<String, Value>) -> Self {
        let defaults = defaults
            .into_iter()
            .fold(Call::default(), |call, (key, value)| call.option(key, value));
        Self { target, defaults }
    }

    pub fn target(&self) -> &'a T {
        self.target
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults.options
    }

    fn merge_into(&self, call: &mut Call) {
        for (key, default) in &self.defaults.options {
            match call.options.get_mut(key) {
                Some(given) => deep_merge(default, given),
                None => {
                    call.options.insert(key.clone(), default.clone());
                }
            }
        }
        for key in ConditionKey::ALL {
            let slot = call.slot_mut(key);
            if slot.is_none() {
                *slot = self.defaults.slot(key).cloned();
            }
        }
    }
}

/// Copies keys of `base` missing from `over`, recursing where both sides are objects.
fn deep_merge(base: &Value, over: &mut Value) {
    if let (Value::Object(base), Value::Object(over)) = (base, over) {
        for (key, value) in base {
            match over.get_mut(key) {
                Some(existing) => deep_merge(value, existing),
                None => {
                    over.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

impl<T: Invoke + ?Sized> Invoke for OptionsMerger<'_, T> {
    fn invoke(&self, mut call: Call) -> Result<Value> {
        self.merge_into(&mut call);
        trace!(name = %call.name, options = call.options.len(), "forwarding with default options");
        self.target.invoke(call)
    }

    fn responds_to(&self, name: &str) -> bool {
        self.target.responds_to(name)
    }

    fn empty_conditions(&self) -> EmptyConditions {
        self.target.empty_conditions()
    }
}

impl<T: fmt::Debug + ?Sized> fmt::Debug for OptionsMerger<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsMerger")
            .field("defaults", &self.defaults)
            .field("target", &self.target)
            .finish()
    }
}
