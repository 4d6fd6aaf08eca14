//! Lexically-scoped environment: an ordered symbol→value table with a
//! parent link. Lookup walks the parent chain; `def` always writes the
//! root, `put` writes locally.

use crate::error::{LispyError, err};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    parent: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: None,
        }
    }

    pub fn new_child(parent: Rc<RefCell<Environment>>) -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Re-seats the parent link, overwriting rather than chaining, so a
    /// lambda invoked repeatedly never grows an unbounded parent chain.
    pub fn set_parent(&mut self, parent: Rc<RefCell<Environment>>) {
        self.parent = Some(parent);
    }

    /// Local write: replace the binding if present in this scope, else append.
    pub fn put(&mut self, name: String, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Walks to the root environment and writes the binding there.
    pub fn def(&mut self, name: String, value: Value) {
        if let Some(parent) = &self.parent {
            parent.borrow_mut().def(name, value);
        } else {
            self.put(name, value);
        }
    }

    /// Looks up `name` in this scope, then the parent chain. Missing names
    /// produce an `Error` value rather than an out-of-band failure.
    pub fn get(&self, name: &str) -> Value {
        if let Some(v) = self.bindings.get(name) {
            v.clone()
        } else if let Some(parent) = &self.parent {
            parent.borrow().get(name)
        } else {
            err(LispyError::UnboundSymbol(name.to_string()))
        }
    }

    /// Deep clone: every bound Value is independently copied. The parent
    /// link is shared by `Rc` — the global environment is effectively
    /// immortal, so this is unobservable (§4.2).
    pub fn deep_copy(&self) -> Environment {
        Environment {
            bindings: self
                .bindings
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            parent: self.parent.clone(),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
