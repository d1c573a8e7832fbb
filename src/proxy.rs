use crate::call::{Call, ConditionKey};
use crate::errors::Result;
use crate::predicate::{Conditions, Predicates};
use crate::target::{EmptyConditions, Invoke};
use serde_json::Value;
use std::fmt;
use tracing::trace;

/// Forwards every call to `target` with its own `if` / `unless` predicates
/// placed in front of whatever the call already carried.
///
/// The target is borrowed, never owned. It may be another proxy, in which case
/// the two predicate sets stack up outer-first on the way down.
pub struct ConditionalProxy<'a, T: ?Sized> {
    target: &'a T,
    if_conds: Predicates,
    unless_conds: Predicates,
}

impl<'a, T: Invoke + ?Sized> ConditionalProxy<'a, T> {
    pub fn new(
        target: &'a T,
        if_conds: impl Into<Predicates>,
        unless_conds: impl Into<Predicates>,
    ) -> Self {
        Self {
            target,
            if_conds: if_conds.into(),
            unless_conds: unless_conds.into(),
        }
    }

    pub fn from_conditions(target: &'a T, conditions: Conditions) -> Self {
        Self::new(target, conditions.if_conds, conditions.unless_conds)
    }

    pub fn target(&self) -> &'a T {
        self.target
    }

    pub fn if_conds(&self) -> &Predicates {
        &self.if_conds
    }

    pub fn unless_conds(&self) -> &Predicates {
        &self.unless_conds
    }

    fn own(&self, key: ConditionKey) -> &Predicates {
        match key {
            ConditionKey::If => &self.if_conds,
            ConditionKey::Unless => &self.unless_conds,
        }
    }

    fn merge_into(&self, call: &mut Call) {
        let omit = self.target.empty_conditions() == EmptyConditions::Omit;
        for key in ConditionKey::ALL {
            let own = self.own(key);
            let slot = call.slot_mut(key);
            *slot = match slot.take() {
                Some(incoming) => Some(own.merge(&incoming)),
                None if omit && own.is_empty() => None,
                None => Some(own.clone()),
            };
        }
    }
}

impl<T: Invoke + ?Sized> Invoke for ConditionalProxy<'_, T> {
    fn invoke(&self, mut call: Call) -> Result<Value> {
        self.merge_into(&mut call);
        trace!(
            name = %call.name,
            if_len = call.if_conds.as_ref().map_or(0, Predicates::len),
            unless_len = call.unless_conds.as_ref().map_or(0, Predicates::len),
            "forwarding conditional call"
        );
        self.target.invoke(call)
    }

    fn responds_to(&self, name: &str) -> bool {
        self.target.responds_to(name)
    }

    fn empty_conditions(&self) -> EmptyConditions {
        self.target.empty_conditions()
    }
}

impl<T: ?Sized> Clone for ConditionalProxy<'_, T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            if_conds: self.if_conds.clone(),
            unless_conds: self.unless_conds.clone(),
        }
    }
}

impl<T: fmt::Debug + ?Sized> fmt::Debug for ConditionalProxy<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalProxy")
            .field("if_conds", &self.if_conds)
            .field("unless_conds", &self.unless_conds)
            .field("target", &self.target)
            .finish()
    }
}

/// `#<ConditionalProxy:0x.. if_conds=[..] unless_conds=[..] target=..>`
impl<T: fmt::Debug + ?Sized> fmt::Display for ConditionalProxy<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#<ConditionalProxy:{:p} if_conds={} unless_conds={} target={:?}>",
            self, self.if_conds, self.unless_conds, self.target
        )
    }
}
