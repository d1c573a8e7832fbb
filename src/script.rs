//! JSON scripts describing nested scopes and the calls made inside them.
//!
//! ```json
//! {
//!   "vocabulary": ["validates"],
//!   "steps": [
//!     {"with_conditions": {"if": "cond_1"}, "steps": [
//!       {"with_options": {"presence": true}, "steps": [
//!         {"call": "validates", "args": ["value"], "if": ["cond_2"]}
//!       ]}
//!     ]}
//!   ]
//! }
//! ```

use crate::call::Call;
use crate::errors::Result;
use crate::predicate::{Conditions, Predicates};
use crate::recorder::Recorder;
use crate::scope::WithConditions;
use crate::target::{EmptyConditions, Invoke};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct Script {
    /// Call names the recording target accepts; any name when absent.
    #[serde(default)]
    pub vocabulary: Option<Vec<String>>,
    /// Target distinguishes a missing `if`/`unless` key from an empty one.
    #[serde(default)]
    pub omit_empty: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Call(CallStep),
    Conditions(ConditionsStep),
    Options(OptionsStep),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionsStep {
    pub with_conditions: Conditions,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsStep {
    pub with_options: Map<String, Value>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallStep {
    pub call: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub options: Map<String, Value>,
    #[serde(rename = "if", default)]
    pub if_conds: Option<Predicates>,
    #[serde(rename = "unless", default)]
    pub unless_conds: Option<Predicates>,
}

impl CallStep {
    pub fn to_call(&self) -> Call {
        let mut call = self
            .options
            .iter()
            .fold(Call::new(&self.call), |call, (k, v)| call.option(k.clone(), v.clone()));
        call.args = self.args.clone();
        if let Some(preds) = &self.if_conds {
            call = call.when(preds.clone());
        }
        if let Some(preds) = &self.unless_conds {
            call = call.unless(preds.clone());
        }
        call
    }
}

impl Script {
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Reads a script from `path`, or from stdin when `path` is `-`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            std::fs::read_to_string(path)?
        };
        Self::from_json_str(&text)
    }

    /// The recording target this script asks for.
    pub fn recorder(&self) -> Recorder {
        let recorder = match &self.vocabulary {
            Some(names) => Recorder::with_vocabulary(names.iter().cloned()),
            None => Recorder::new(),
        };
        if self.omit_empty {
            recorder.with_empty_conditions(EmptyConditions::Omit)
        } else {
            recorder
        }
    }

    /// Runs every step against `target`, returning each call's result in order.
    /// A script without steps runs nothing.
    pub fn run(&self, target: &dyn Invoke) -> Result<Vec<Value>> {
        let mut out = Vec::new();
        run_steps(&self.steps, target, &mut out)?;
        Ok(out)
    }
}

fn run_steps(steps: &[Step], receiver: &dyn Invoke, out: &mut Vec<Value>) -> Result<()> {
    for step in steps {
        match step {
            Step::Call(step) => {
                let call = step.to_call();
                debug!(%call, "script call");
                out.push(receiver.invoke(call)?);
            }
            Step::Conditions(scope) => receiver
                .with_conditions_scope(scope.with_conditions.clone(), |proxy| {
                    run_steps(&scope.steps, proxy, out)
                })?,
            Step::Options(scope) => receiver
                .with_options_scope(scope.with_options.clone(), |merger| {
                    run_steps(&scope.steps, merger, out)
                })?,
        }
    }
    Ok(())
}
