use super::{Array, Val};
use crate::error;
use crate::lang::ast::Kind;
use crate::lang::Error;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

pub type EnvRef = Rc<RefCell<Env>>;

/// ## Variable environment
///
/// A lexical scope holding case-folded scalar, array, and constant maps.
/// Lookups climb the parent chain; writes land in the local scope unless
/// the name was declared SHARED, in which case they land in the module
/// scope. Reading an undeclared scalar materialises its default value.

#[derive(Debug, Default)]
pub struct Env {
    vars: HashMap<String, Val>,
    arrays: HashMap<String, Array>,
    consts: HashMap<String, Val>,
    shared_names: HashSet<String>,
    parent: Option<EnvRef>,
    module: Option<EnvRef>,
}

impl Env {
    /// The outermost (module) scope.
    pub fn new_module() -> EnvRef {
        Rc::new(RefCell::new(Env::default()))
    }

    /// A routine scope enclosed in `parent`.
    pub fn new_enclosed(parent: &EnvRef) -> EnvRef {
        let module = parent
            .borrow()
            .module
            .clone()
            .unwrap_or_else(|| Rc::clone(parent));
        Rc::new(RefCell::new(Env {
            parent: Some(Rc::clone(parent)),
            module: Some(module),
            ..Env::default()
        }))
    }

    fn module_of(env: &EnvRef) -> EnvRef {
        let module = env.borrow().module.clone();
        module.unwrap_or_else(|| Rc::clone(env))
    }

    pub fn get(env: &EnvRef, name: &str) -> Option<Val> {
        let name = name.to_ascii_uppercase();
        let mut scope = Rc::clone(env);
        loop {
            let parent = {
                let e = scope.borrow();
                if let Some(val) = e.consts.get(&name) {
                    return Some(val.clone());
                }
                if let Some(val) = e.vars.get(&name) {
                    return Some(val.clone());
                }
                e.parent.clone()
            };
            match parent {
                Some(parent) => scope = parent,
                None => return None,
            }
        }
    }

    /// Read a scalar, materialising the default for its kind when the
    /// name is not yet bound anywhere.
    pub fn fetch(env: &EnvRef, name: &str, kind: Option<Kind>) -> Val {
        if let Some(val) = Env::get(env, name) {
            return val;
        }
        let kind = kind.unwrap_or_else(|| Kind::infer(name));
        let val = Val::default_for(kind);
        env.borrow_mut()
            .vars
            .insert(name.to_ascii_uppercase(), val.clone());
        val
    }

    /// Bind a scalar, coercing to the kind already declared for the name
    /// (or the kind its suffix infers). Constants reject assignment, and
    /// SHARED names write through to the module scope.
    pub fn set(env: &EnvRef, name: &str, val: Val) -> Result<()> {
        let name = name.to_ascii_uppercase();
        if Env::is_const(env, &name) {
            return Err(error!(ValueError; "ASSIGNMENT TO CONSTANT"));
        }
        let shared = {
            let module = Env::module_of(env);
            let shared = module.borrow().shared_names.contains(&name);
            shared
        };
        let target = if shared {
            Env::module_of(env)
        } else {
            Rc::clone(env)
        };
        let mut scope = target.borrow_mut();
        let kind = match scope.vars.get(&name) {
            Some(existing) => existing.kind(),
            None => Kind::infer(&name),
        };
        scope.vars.insert(name, val.coerce(kind)?);
        Ok(())
    }

    fn is_const(env: &EnvRef, name: &str) -> bool {
        let mut scope = Rc::clone(env);
        loop {
            let parent = {
                let e = scope.borrow();
                if e.consts.contains_key(name) {
                    return true;
                }
                e.parent.clone()
            };
            match parent {
                Some(parent) => scope = parent,
                None => return false,
            }
        }
    }

    /// Declare a scalar with an explicit kind, as DIM does.
    pub fn declare(env: &EnvRef, name: &str, kind: Kind) {
        env.borrow_mut()
            .vars
            .insert(name.to_ascii_uppercase(), Val::default_for(kind));
    }

    pub fn define_const(env: &EnvRef, name: &str, val: Val) -> Result<()> {
        let name = name.to_ascii_uppercase();
        let mut scope = env.borrow_mut();
        if scope.consts.contains_key(&name) {
            return Err(error!(ValueError; "DUPLICATE DEFINITION"));
        }
        scope.consts.insert(name, val);
        Ok(())
    }

    /// Mark a name SHARED so every scope's writes target the module.
    pub fn mark_shared(env: &EnvRef, name: &str) {
        let module = Env::module_of(env);
        let name = name.to_ascii_uppercase();
        module.borrow_mut().shared_names.insert(name);
    }

    pub fn declare_array(env: &EnvRef, name: &str, array: Array) {
        env.borrow_mut()
            .arrays
            .insert(name.to_ascii_uppercase(), array);
    }

    pub fn declare_array_shared(env: &EnvRef, name: &str, array: Array) {
        let module = Env::module_of(env);
        module
            .borrow_mut()
            .arrays
            .insert(name.to_ascii_uppercase(), array);
    }

    pub fn has_array(env: &EnvRef, name: &str) -> bool {
        Env::with_array(env, name, |_| Ok(())).is_some()
    }

    /// Run `f` against the named array wherever it lives on the chain.
    pub fn with_array<R>(
        env: &EnvRef,
        name: &str,
        f: impl FnOnce(&mut Array) -> Result<R>,
    ) -> Option<Result<R>> {
        let name = name.to_ascii_uppercase();
        let mut scope = Rc::clone(env);
        loop {
            let parent = {
                let mut e = scope.borrow_mut();
                if let Some(array) = e.arrays.get_mut(&name) {
                    return Some(f(array));
                }
                e.parent.clone()
            };
            match parent {
                Some(parent) => scope = parent,
                None => return None,
            }
        }
    }

    /// Snapshot an array for REDIM PRESERVE.
    pub fn clone_array(env: &EnvRef, name: &str) -> Option<Array> {
        match Env::with_array(env, name, |array| Ok(array.clone())) {
            Some(Ok(array)) => Some(array),
            _ => None,
        }
    }
}
