use std::collections::HashMap;
use std::rc::Rc;

use crate::ctype::QualifiedType;

/**
 * A binding looked up by name. `NotFound` is an ordinary value so callers
 * can branch on absence without a failure path.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Global(QualifiedType),
    Stack(QualifiedType),
    Typedef(QualifiedType),
    EnumConstant(QualifiedType, i128),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Global,
    Stack,
    Typedef,
}

#[derive(Clone)]
struct Scope {
    symbols: HashMap<String, Entry>,
}

/**
 * Persistent symbol table for the whole translation unit.
 *
 * Every operation that binds a name consumes the environment and returns
 * the extended one; the original value stays valid. Scopes share storage
 * until written to, so cloning an environment is cheap.
 *
 * Struct, union and enum tags live in the same table under namespaced
 * keys ("struct X", "union X", "enum X") and never collide with
 * ordinary identifiers.
 */
#[derive(Clone)]
pub struct Env {
    scopes: Vec<Rc<Scope>>,
}

pub fn struct_tag_key(tag: &str) -> String {
    format!("struct {}", tag)
}

pub fn union_tag_key(tag: &str) -> String {
    format!("union {}", tag)
}

pub fn enum_tag_key(tag: &str) -> String {
    format!("enum {}", tag)
}

impl Env {
    /**
     * All bindings pushed onto a fresh environment are at file scope.
     */
    pub fn new() -> Self {
        Self {
            scopes: vec![Rc::new(Scope::new())],
        }
    }

    pub fn is_global(&self) -> bool {
        self.scopes.len() == 1
    }

    /**
     * Open a block scope. The parent environment is left untouched;
     * dropping the returned value abandons everything bound inside.
     */
    pub fn enter_scope(mut self) -> Self {
        self.scopes.push(Rc::new(Scope::new()));
        self
    }

    /**
     * Innermost binding for the name, or `Entry::NotFound`.
     */
    pub fn find(&self, name: &str) -> Entry {
        for scope in self.scopes.iter().rev() {
            if let Some(entry) = scope.symbols.get(name) {
                return entry.clone();
            }
        }
        Entry::NotFound
    }

    /**
     * Bind a name in the innermost scope. Rebinding an existing name at
     * the same scope replaces it, the last writer wins.
     */
    pub fn push_entry(self, kind: EntryKind, name: &str, t: QualifiedType) -> Env {
        let entry = match kind {
            EntryKind::Global => Entry::Global(t),
            EntryKind::Stack => Entry::Stack(t),
            EntryKind::Typedef => Entry::Typedef(t),
        };
        self.push(name, entry)
    }

    pub fn push_enum(self, name: &str, t: QualifiedType, value: i128) -> Env {
        self.push(name, Entry::EnumConstant(t, value))
    }

    fn push(mut self, name: &str, entry: Entry) -> Env {
        // there is always at least one scope
        let scope = self.scopes.last_mut().unwrap();
        Rc::make_mut(scope).symbols.insert(name.to_string(), entry);
        self
    }
}

impl Entry {
    pub fn is_not_found(&self) -> bool {
        if let Entry::NotFound = self {
            true
        } else {
            false
        }
    }

    pub fn get_type(&self) -> Option<&QualifiedType> {
        match self {
            Entry::Global(t) | Entry::Stack(t) | Entry::Typedef(t) | Entry::EnumConstant(t, _) => {
                Some(t)
            }
            Entry::NotFound => None,
        }
    }
}

impl Scope {
    fn new() -> Self {
        Self {
            symbols: HashMap::new(),
        }
    }
}
