use crate::call::Call;
use crate::errors::{InvokeError, Result};
use crate::target::{EmptyConditions, Invoke};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Target that keeps every call it receives.
///
/// With a vocabulary it behaves like a fixed configuration API: other names
/// are rejected and capability probes answer from the vocabulary.
#[derive(Debug, Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
    vocabulary: Option<BTreeSet<String>>,
    empty: EmptyConditions,
}

impl Recorder {
    /// Accepts any call name.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vocabulary<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocabulary: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_empty_conditions(mut self, empty: EmptyConditions) -> Self {
        self.empty = empty;
        self
    }

    fn guard(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.guard().clone()
    }

    pub fn last(&self) -> Option<Call> {
        self.guard().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Drains the log.
    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.guard())
    }
}

impl Invoke for Recorder {
    fn invoke(&self, call: Call) -> Result<Value> {
        if !self.responds_to(&call.name) {
            return Err(InvokeError::UnknownCall(call.name));
        }
        self.guard().push(call);
        Ok(Value::Null)
    }

    fn responds_to(&self, name: &str) -> bool {
        self.vocabulary
            .as_ref()
            .map_or(true, |names| names.contains(name))
    }

    fn empty_conditions(&self) -> EmptyConditions {
        self.empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_in_order_and_drains() {
        let r = Recorder::new();
        r.invoke(Call::new("a")).unwrap();
        r.invoke(Call::new("b").arg(1)).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.last(), Some(Call::new("b").arg(1)));
        let drained = r.take();
        assert_eq!(drained[0].name, "a");
        assert!(r.is_empty());
    }

    #[test]
    fn vocabulary_gates_calls() {
        let r = Recorder::with_vocabulary(["validates", "validate"]);
        assert!(r.responds_to("validate"));
        assert!(!r.responds_to("with_options"));
        assert!(r.invoke(Call::new("with_options")).is_err());
        assert!(r.is_empty());
    }
}
