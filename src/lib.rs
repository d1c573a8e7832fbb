//! Scoped `if` / `unless` predicates for configuration calls.
//!
//! A [`ConditionalProxy`] wraps any [`Invoke`] target and prepends its own
//! predicates to the `if` / `unless` lists of every call passing through it.
//! Proxies nest, so outer scopes contribute their predicates first.
//!
//! ```
//! use with_conditions::{with_conditions_scope, Call, Invoke, Predicates, Recorder};
//!
//! let model = Recorder::new();
//! with_conditions_scope(&model, "cond_1", (), |outer| {
//!     with_conditions_scope(outer, "cond_2", (), |inner| {
//!         inner.invoke(Call::new("validates").arg("value").when("cond_3"))
//!     })
//! })
//! .unwrap();
//!
//! assert_eq!(
//!     model.last().unwrap().if_conds,
//!     Some(Predicates::from(["cond_1", "cond_2", "cond_3"]))
//! );
//! ```

pub mod call;
pub mod errors;
pub mod options;
pub mod predicate;
pub mod proxy;
pub mod recorder;
pub mod scope;
pub mod script;
pub mod target;

pub use call::{Call, ConditionKey};
pub use errors::{InvokeError, Result};
pub use options::OptionsMerger;
pub use predicate::{Conditions, Predicate, Predicates};
pub use proxy::ConditionalProxy;
pub use recorder::Recorder;
pub use scope::{with_conditions, with_conditions_scope, WithConditions};
pub use script::Script;
pub use target::{Dispatcher, EmptyConditions, Handler, Invoke};
