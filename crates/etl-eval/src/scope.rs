//! Scope graph for the ETL evaluator.
//!
//! Scopes live in a [`ScopeArena`] and refer to their parents by
//! [`ScopeId`]. A scope can only be created with parents that already
//! exist, so every parent handle is older than its child and the graph
//! cannot contain a cycle.
//!
//! Lookups search the scope itself first, then each parent depth-first in
//! the order the parents were listed. The first definition found wins.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use etl_types::ast::BuiltinKind;

use crate::value::{Value, Verb, VerbBody};

/// Handle to a scope inside a [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("scope {0} cannot be a parent: it does not exist")]
    UnknownParent(ScopeId),
    #[error("scope {0} does not exist")]
    UnknownScope(ScopeId),
}

/// Result of a name lookup through the scope graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// `scope` is where the definition was found, not where the search began.
    Found { scope: ScopeId, value: T },
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found { .. })
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found { value, .. } => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found { scope, value } => Lookup::Found {
                scope,
                value: f(value),
            },
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

/// A single scope: three name tables plus the `it` slot.
#[derive(Debug, Default)]
pub struct Scope {
    parents: Vec<ScopeId>,
    verbs: BTreeMap<String, Rc<Verb>>,
    nouns: BTreeMap<String, Value>,
    /// Struct templates declared here, by struct name.
    structs: BTreeMap<String, ScopeId>,
    it: Option<Value>,
}

impl Scope {
    pub fn parents(&self) -> &[ScopeId] {
        &self.parents
    }

    pub fn has_verb(&self, name: &str) -> bool {
        self.verbs.contains_key(name)
    }

    pub fn has_noun(&self, name: &str) -> bool {
        self.nouns.contains_key(name)
    }

    pub fn has_struct(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    pub fn nouns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.nouns.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Owns every scope of one runtime.
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope with no parents.
    pub fn root(&mut self) -> ScopeId {
        self.push(Scope::default())
    }

    /// Create a scope delegating to `parents`, in order.
    pub fn new_scope(&mut self, parents: Vec<ScopeId>) -> Result<ScopeId, ScopeError> {
        if let Some(&unknown) = parents.iter().find(|p| p.index() >= self.scopes.len()) {
            return Err(ScopeError::UnknownParent(unknown));
        }
        Ok(self.push(Scope {
            parents,
            ..Scope::default()
        }))
    }

    fn push(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    fn get_mut(&mut self, id: ScopeId) -> Result<&mut Scope, ScopeError> {
        self.scopes
            .get_mut(id.index())
            .ok_or(ScopeError::UnknownScope(id))
    }

    // ── Definitions ──────────────────────────────────────────────────────

    /// Define (or replace) a verb in `scope`.
    pub fn define_verb(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        params: Vec<BuiltinKind>,
        body: VerbBody,
    ) -> Result<Rc<Verb>, ScopeError> {
        let verb = Rc::new(Verb::new(name, params, body));
        self.get_mut(scope)?
            .verbs
            .insert(verb.name.clone(), Rc::clone(&verb));
        Ok(verb)
    }

    pub fn define_noun(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        value: Value,
    ) -> Result<(), ScopeError> {
        self.get_mut(scope)?.nouns.insert(name.into(), value);
        Ok(())
    }

    pub fn define_struct(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        template: ScopeId,
    ) -> Result<(), ScopeError> {
        if self.get(template).is_none() {
            return Err(ScopeError::UnknownScope(template));
        }
        self.get_mut(scope)?.structs.insert(name.into(), template);
        Ok(())
    }

    pub fn set_it(&mut self, scope: ScopeId, value: Value) -> Result<(), ScopeError> {
        self.get_mut(scope)?.it = Some(value);
        Ok(())
    }

    /// The most recent clause value in `scope` itself. `it` is never
    /// inherited from a parent.
    pub fn it(&self, scope: ScopeId) -> Option<&Value> {
        self.get(scope).and_then(|s| s.it.as_ref())
    }

    // ── Lookups ──────────────────────────────────────────────────────────

    pub fn lookup_verb(&self, scope: ScopeId, name: &str) -> Lookup<&Rc<Verb>> {
        self.lookup(scope, &|s| s.verbs.get(name))
    }

    pub fn lookup_noun(&self, scope: ScopeId, name: &str) -> Lookup<&Value> {
        self.lookup(scope, &|s| s.nouns.get(name))
    }

    /// Resolve a struct template by name to its scope handle.
    pub fn lookup_struct(&self, scope: ScopeId, name: &str) -> Lookup<ScopeId> {
        self.lookup(scope, &|s| s.structs.get(name))
            .map(|template| *template)
    }

    fn lookup<'a, T, F>(&'a self, id: ScopeId, pick: &F) -> Lookup<&'a T>
    where
        F: Fn(&'a Scope) -> Option<&'a T>,
    {
        let Some(scope) = self.get(id) else {
            return Lookup::NotFound;
        };
        if let Some(value) = pick(scope) {
            return Lookup::Found { scope: id, value };
        }
        for &parent in &scope.parents {
            let found = self.lookup(parent, pick);
            if found.is_found() {
                return found;
            }
        }
        Lookup::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_builtins() -> (ScopeArena, ScopeId, ScopeId) {
        let mut arena = ScopeArena::new();
        let builtins = arena.root();
        arena
            .define_verb(builtins, "write", vec![BuiltinKind::Text], VerbBody::Write)
            .unwrap();
        let root = arena.new_scope(vec![builtins]).unwrap();
        (arena, builtins, root)
    }

    #[test]
    fn test_child_sees_parent_verb() {
        let (arena, builtins, root) = with_builtins();
        match arena.lookup_verb(root, "write") {
            Lookup::Found { scope, value } => {
                assert_eq!(scope, builtins);
                assert_eq!(value.name, "write");
            }
            Lookup::NotFound => panic!("write should resolve through the parent"),
        }
    }

    #[test]
    fn test_orphan_scope_sees_nothing() {
        let (mut arena, _, _) = with_builtins();
        let orphan = arena.new_scope(vec![]).unwrap();
        assert!(!arena.lookup_verb(orphan, "write").is_found());
    }

    #[test]
    fn test_local_definition_shadows_parent() {
        let (mut arena, builtins, root) = with_builtins();
        arena.define_noun(builtins, "x", Value::Number(1.0)).unwrap();
        arena.define_noun(root, "x", Value::Number(2.0)).unwrap();
        assert_eq!(
            arena.lookup_noun(root, "x"),
            Lookup::Found {
                scope: root,
                value: &Value::Number(2.0)
            }
        );
    }

    #[test]
    fn test_parents_searched_in_order() {
        let mut arena = ScopeArena::new();
        let first = arena.root();
        let second = arena.root();
        arena.define_noun(first, "x", Value::Text("first".into())).unwrap();
        arena.define_noun(second, "x", Value::Text("second".into())).unwrap();
        let child = arena.new_scope(vec![first, second]).unwrap();
        assert_eq!(
            arena.lookup_noun(child, "x").found(),
            Some(&Value::Text("first".into()))
        );
        let reversed = arena.new_scope(vec![second, first]).unwrap();
        assert_eq!(
            arena.lookup_noun(reversed, "x").found(),
            Some(&Value::Text("second".into()))
        );
    }

    #[test]
    fn test_depth_first_search() {
        let mut arena = ScopeArena::new();
        let grandparent = arena.root();
        arena.define_noun(grandparent, "x", Value::Number(1.0)).unwrap();
        let parent = arena.new_scope(vec![grandparent]).unwrap();
        let sibling = arena.root();
        arena.define_noun(sibling, "x", Value::Number(2.0)).unwrap();
        let child = arena.new_scope(vec![parent, sibling]).unwrap();
        assert_eq!(
            arena.lookup_noun(child, "x"),
            Lookup::Found {
                scope: grandparent,
                value: &Value::Number(1.0)
            }
        );
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut arena = ScopeArena::new();
        let root = arena.root();
        let err = arena.new_scope(vec![root, ScopeId(7)]).unwrap_err();
        assert_eq!(err, ScopeError::UnknownParent(ScopeId(7)));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_struct_table_is_separate() {
        let mut arena = ScopeArena::new();
        let root = arena.root();
        let template = arena.new_scope(vec![]).unwrap();
        arena.define_struct(root, "game", template).unwrap();
        assert_eq!(arena.lookup_struct(root, "game").found(), Some(template));
        assert!(!arena.lookup_noun(root, "game").is_found());
        assert!(arena.get(root).unwrap().has_struct("game"));
    }

    #[test]
    fn test_it_is_not_inherited() {
        let (mut arena, builtins, root) = with_builtins();
        arena.set_it(builtins, Value::Number(1.0)).unwrap();
        assert_eq!(arena.it(root), None);
        arena.set_it(root, Value::Number(3.0)).unwrap();
        assert_eq!(arena.it(root), Some(&Value::Number(3.0)));
    }

    #[test]
    fn test_unknown_scope_operations() {
        let mut arena = ScopeArena::new();
        let ghost = ScopeId(3);
        assert_eq!(
            arena.define_noun(ghost, "x", Value::Nothing),
            Err(ScopeError::UnknownScope(ghost))
        );
        assert_eq!(arena.lookup_noun(ghost, "x"), Lookup::NotFound);
        assert_eq!(arena.it(ghost), None);
    }
}
