use crate::call::Call;
use crate::errors::{InvokeError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// How a target treats an empty `if` / `unless` list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyConditions {
    /// An empty list means "no condition"; decorators may always fill both keys.
    #[default]
    Forward,
    /// The target distinguishes a missing key from an empty list, so keys the
    /// caller never mentioned must stay missing when nothing was merged in.
    Omit,
}

/// Anything that accepts named calls.
pub trait Invoke {
    fn invoke(&self, call: Call) -> Result<Value>;

    /// Whether `name` would be accepted, without performing the call.
    fn responds_to(&self, name: &str) -> bool;

    fn empty_conditions(&self) -> EmptyConditions {
        EmptyConditions::Forward
    }
}

impl<T: Invoke + ?Sized> Invoke for &T {
    fn invoke(&self, call: Call) -> Result<Value> {
        (**self).invoke(call)
    }
    fn responds_to(&self, name: &str) -> bool {
        (**self).responds_to(name)
    }
    fn empty_conditions(&self) -> EmptyConditions {
        (**self).empty_conditions()
    }
}

impl<T: Invoke + ?Sized> Invoke for Box<T> {
    fn invoke(&self, call: Call) -> Result<Value> {
        (**self).invoke(call)
    }
    fn responds_to(&self, name: &str) -> bool {
        (**self).responds_to(name)
    }
    fn empty_conditions(&self) -> EmptyConditions {
        (**self).empty_conditions()
    }
}

impl<T: Invoke + ?Sized> Invoke for Arc<T> {
    fn invoke(&self, call: Call) -> Result<Value> {
        (**self).invoke(call)
    }
    fn responds_to(&self, name: &str) -> bool {
        (**self).responds_to(name)
    }
    fn empty_conditions(&self) -> EmptyConditions {
        (**self).empty_conditions()
    }
}

/// A single named operation a `Dispatcher` can route to.
pub trait Handler: Send + Sync {
    fn name(&self) -> &str;
    fn call(&self, call: &Call) -> Result<Value>;
}

struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&Call) -> Result<Value> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }
    fn call(&self, call: &Call) -> Result<Value> {
        (self.f)(call)
    }
}

/// Thread-safe name → handler table, usable directly as a call target.
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Arc<HashMap<String, Arc<dyn Handler>>>,
    empty: EmptyConditions,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_empty_conditions(mut self, empty: EmptyConditions) -> Self {
        self.empty = empty;
        self
    }

    pub fn register<H: Handler + 'static>(&mut self, handler: H) {
        let map = Arc::make_mut(&mut self.inner);
        map.insert(handler.name().to_string(), Arc::new(handler));
    }

    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Call) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(FnHandler { name: name.into(), f });
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.inner.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }
}

impl Invoke for Dispatcher {
    fn invoke(&self, call: Call) -> Result<Value> {
        match self.get(&call.name) {
            Some(handler) => handler.call(&call),
            None => {
                debug!(name = %call.name, "no handler registered");
                Err(InvokeError::UnknownCall(call.name))
            }
        }
    }

    fn responds_to(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    fn empty_conditions(&self) -> EmptyConditions {
        self.empty
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Dispatcher")
            .field("handlers", &names)
            .field("empty", &self.empty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Echo;
    impl Handler for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn call(&self, call: &Call) -> Result<Value> {
            Ok(Value::Array(call.args.clone()))
        }
    }

    #[test]
    fn dispatches_by_name() {
        let mut d = Dispatcher::new();
        d.register(Echo);
        d.register_fn("count", |c| Ok(json!(c.args.len())));
        assert_eq!(d.invoke(Call::new("echo").arg(1).arg("x")).unwrap(), json!([1, "x"]));
        assert_eq!(d.invoke(Call::new("count").arg(1)).unwrap(), json!(1));
        assert!(d.responds_to("echo"));
        assert!(!d.responds_to("nope"));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let d = Dispatcher::new();
        let err = d.invoke(Call::new("nope")).unwrap_err();
        assert!(matches!(err, InvokeError::UnknownCall(ref n) if n == "nope"));
    }

    #[test]
    fn clones_share_until_registered() {
        let mut a = Dispatcher::new();
        a.register(Echo);
        let mut b = a.clone();
        b.register_fn("extra", |_| Ok(Value::Null));
        assert!(!a.responds_to("extra"));
        assert!(b.responds_to("echo"));
    }

    #[test]
    fn forwards_through_smart_pointers() {
        let mut d = Dispatcher::new().with_empty_conditions(EmptyConditions::Omit);
        d.register(Echo);
        let boxed: Box<dyn Invoke> = Box::new(d);
        assert!(boxed.responds_to("echo"));
        assert_eq!(boxed.empty_conditions(), EmptyConditions::Omit);
    }
}
