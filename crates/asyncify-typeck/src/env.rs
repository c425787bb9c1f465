//! Symbol table with scope stack.
//!
//! Maps identifiers to descriptors. Entering a function body, a block or a
//! `for` header pushes a scope; leaving pops it. Lookups search from the
//! innermost scope outward.

use std::fmt::Write;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::registry::Registry;
use crate::ty::Ty;

/// One lexical scope, in declaration order.
pub type Scope = IndexMap<String, Ty, FxBuildHasher>;

/// A stack of scopes. Index 0 is the root scope.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    /// Globals seeded from the registry, hidden from `dump` while unchanged.
    seeded: FxHashMap<String, Ty>,
}

impl SymbolTable {
    /// A table with one empty root scope.
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::default()],
            seeded: FxHashMap::default(),
        }
    }

    /// A table whose root scope holds the registry's globals.
    pub fn with_globals(registry: &Registry) -> Self {
        let mut table = SymbolTable::new();
        for (name, member) in registry.globals() {
            table.add(name, member.ty.clone());
            table.seeded.insert(name.to_string(), member.ty.clone());
        }
        table
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// # Panics
    ///
    /// Panics if only the root scope remains.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the root scope");
        self.scopes.pop();
    }

    /// Descriptor of `name`, or `Unknown` when it is bound nowhere.
    pub fn lookup(&self, name: &str) -> Ty {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
            .unwrap_or(Ty::Unknown)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains_key(name))
    }

    /// Declare `name` in the current scope, shadowing outer bindings.
    pub fn add(&mut self, name: &str, ty: Ty) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name.to_string(), ty);
    }

    /// Update the nearest binding of `name`. A different descriptor widens
    /// it to `Unknown`. Unbound names become implicit globals.
    pub fn assign(&mut self, name: &str, ty: Ty) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                if *slot != ty {
                    *slot = Ty::Unknown;
                }
                return;
            }
        }
        self.scopes[0].insert(name.to_string(), ty);
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Merge the states that left a set of branches into `self`, the state
    /// that entered them.
    ///
    /// A binding keeps a descriptor only when every branch agrees on it;
    /// otherwise, or when some branch lacks it, it becomes `Unknown`.
    pub fn join(&mut self, branches: &[SymbolTable]) {
        if branches.is_empty() {
            return;
        }
        for (level, scope) in self.scopes.iter_mut().enumerate() {
            let mut names: IndexSet<String, FxBuildHasher> = scope.keys().cloned().collect();
            for branch in branches {
                if let Some(other) = branch.scopes.get(level) {
                    names.extend(other.keys().cloned());
                }
            }
            for name in names {
                let mut seen = branches
                    .iter()
                    .map(|branch| branch.scopes.get(level).and_then(|s| s.get(&name)));
                let first = seen.next().flatten();
                let joined = match first {
                    Some(ty) if seen.all(|other| other == Some(ty)) => ty.clone(),
                    _ => Ty::Unknown,
                };
                scope.insert(name, joined);
            }
        }
    }

    /// Bindings listed innermost scope first. Registry globals are left out
    /// while they still hold their seeded descriptor.
    pub fn dump(&self) -> String {
        self.render(false)
    }

    pub fn dump_with_globals(&self) -> String {
        self.render(true)
    }

    fn render(&self, globals: bool) -> String {
        let mut out = String::new();
        for (index, scope) in self.scopes.iter().enumerate().rev() {
            let _ = writeln!(out, "scope {index}:");
            for (name, ty) in scope {
                if !globals && index == 0 && self.seeded.get(name) == Some(ty) {
                    continue;
                }
                let _ = writeln!(out, "  {name}: {ty}");
            }
        }
        out
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
