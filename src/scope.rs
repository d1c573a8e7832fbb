//! Entry points for opening a conditional (or default-options) scope on a
//! receiver.
//!
//! The block form always hands the scope object to the callback explicitly;
//! there is no implicit "current receiver".

use crate::options::OptionsMerger;
use crate::predicate::{Conditions, Predicates};
use crate::proxy::ConditionalProxy;
use crate::target::Invoke;
use serde_json::{Map, Value};
use tracing::debug;

/// Builds a proxy over `receiver` and returns it for the caller to hold.
pub fn with_conditions<T: Invoke + ?Sized>(
    receiver: &T,
    if_conds: impl Into<Predicates>,
    unless_conds: impl Into<Predicates>,
) -> ConditionalProxy<'_, T> {
    ConditionalProxy::new(receiver, if_conds, unless_conds)
}

/// Builds a proxy over `receiver`, runs `block` with it and returns the block's value.
pub fn with_conditions_scope<T, F, R>(
    receiver: &T,
    if_conds: impl Into<Predicates>,
    unless_conds: impl Into<Predicates>,
    block: F,
) -> R
where
    T: Invoke + ?Sized,
    F: FnOnce(&ConditionalProxy<'_, T>) -> R,
{
    let proxy = ConditionalProxy::new(receiver, if_conds, unless_conds);
    debug!(
        if_conds = %proxy.if_conds(),
        unless_conds = %proxy.unless_conds(),
        "entering conditional scope"
    );
    let out = block(&proxy);
    debug!("leaving conditional scope");
    out
}

/// Method-style access to the scope entry points for every call target.
pub trait WithConditions: Invoke {
    fn with_conditions(&self, conditions: Conditions) -> ConditionalProxy<'_, Self> {
        ConditionalProxy::from_conditions(self, conditions)
    }

    fn with_conditions_scope<F, R>(&self, conditions: Conditions, block: F) -> R
    where
        F: FnOnce(&ConditionalProxy<'_, Self>) -> R,
    {
        with_conditions_scope(self, conditions.if_conds, conditions.unless_conds, block)
    }

    fn with_options(&self, defaults: Map<String, Value>) -> OptionsMerger<'_, Self> {
        OptionsMerger::new(self, defaults)
    }

    fn with_options_scope<F, R>(&self, defaults: Map<String, Value>, block: F) -> R
    where
        F: FnOnce(&OptionsMerger<'_, Self>) -> R,
    {
        let merger = OptionsMerger::new(self, defaults);
        debug!(keys = merger.defaults().len(), "entering options scope");
        block(&merger)
    }
}

impl<T: Invoke + ?Sized> WithConditions for T {}
