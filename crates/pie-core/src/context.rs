//! The five flavours of context threaded through the kernel: `Σ`, `Γ`, `ρ`,
//! `Bound`, and `Renamings`. All of them are immutable, persistent, ordered
//! sequences - extending one never mutates its predecessor, so a checker or
//! evaluator can freely clone a context before descending into a subterm.

use im::Vector;

use crate::data::RcDataDecl;
use crate::domain::{RcType, RcValue, Value};
use crate::ident::Symbol;

/// An entry in the global program state.
#[derive(Debug, Clone, PartialEq)]
pub enum SigmaEntry {
    /// `name : ty`, with no definition (yet).
    Claim(RcType),
    /// `name = value`. A `Claim` for `name` must appear earlier (invariant I2).
    Define(RcValue),
    /// The declaration of a user-defined datatype named `name`.
    Data(RcDataDecl),
}

/// `Σ`, the global context: every claim, definition, and datatype
/// declaration seen so far, in the order they were elaborated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sigma {
    entries: Vector<(Symbol, SigmaEntry)>,
}

impl Sigma {
    pub fn new() -> Sigma {
        Sigma { entries: Vector::new() }
    }

    pub fn has(&self, name: &Symbol) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn fresh(&self, hint: &Symbol) -> Symbol {
        hint.fresh(|candidate| self.has(candidate))
    }

    /// The most recent entry bound to `name`, of any kind.
    pub fn lookup(&self, name: &Symbol) -> Option<&SigmaEntry> {
        self.entries.iter().rev().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    /// The declared type of `name`, found via its (unique) `Claim` entry.
    pub fn lookup_type(&self, name: &Symbol) -> Option<RcType> {
        self.entries.iter().rev().find_map(|(n, entry)| match entry {
            SigmaEntry::Claim(ty) if n == name => Some(ty.clone()),
            _ => None,
        })
    }

    pub fn lookup_data(&self, name: &Symbol) -> Option<RcDataDecl> {
        self.entries.iter().rev().find_map(|(n, entry)| match entry {
            SigmaEntry::Data(decl) if n == name => Some(decl.clone()),
            _ => None,
        })
    }

    /// Find the datatype that declares a constructor of this name, scanning
    /// every `data` entry seen so far. Constructor names share a single
    /// namespace across all datatypes, so the first (innermost) match wins.
    pub fn lookup_constructor(&self, ctor_name: &Symbol) -> Option<(Symbol, RcDataDecl)> {
        self.entries.iter().rev().find_map(|(n, entry)| match entry {
            SigmaEntry::Data(decl) if decl.constructor(ctor_name).is_some() => Some((n.clone(), decl.clone())),
            _ => None,
        })
    }

    pub fn claim(&self, name: Symbol, ty: RcType) -> Sigma {
        log::trace!("claim {}", name);
        let mut entries = self.entries.clone();
        entries.push_back((name, SigmaEntry::Claim(ty)));
        Sigma { entries }
    }

    pub fn define(&self, name: Symbol, value: RcValue) -> Sigma {
        log::trace!("define {}", name);
        let mut entries = self.entries.clone();
        entries.push_back((name, SigmaEntry::Define(value)));
        Sigma { entries }
    }

    pub fn data(&self, name: Symbol, decl: RcDataDecl) -> Sigma {
        log::trace!("data {}", name);
        let mut entries = self.entries.clone();
        entries.push_back((name, SigmaEntry::Data(decl)));
        Sigma { entries }
    }

    /// Derive the runtime environment: every `Claim` becomes a neutral
    /// variable of its type, every `Define` becomes its value, and `Data`
    /// entries bind nothing (the datatype's own name is bound via its
    /// paired claim/define, emitted alongside the `Data` entry).
    pub fn to_rho(&self) -> Rho {
        let mut bindings = Vector::new();
        for (name, entry) in self.entries.iter() {
            match entry {
                SigmaEntry::Claim(ty) => {
                    bindings.push_back((name.clone(), RcValue::var(name.clone(), ty.clone())));
                },
                SigmaEntry::Define(value) => bindings.push_back((name.clone(), value.clone())),
                SigmaEntry::Data(_) => {},
            }
        }
        Rho { bindings }
    }
}

/// `Γ`, the elaboration context: `Σ` plus local `HasType` bindings
/// introduced under binders (lambda parameters, pattern variables, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Gamma {
    sigma: Sigma,
    locals: Vector<(Symbol, RcType)>,
}

impl Gamma {
    pub fn from_sigma(sigma: &Sigma) -> Gamma {
        Gamma { sigma: sigma.clone(), locals: Vector::new() }
    }

    pub fn sigma(&self) -> &Sigma {
        &self.sigma
    }

    pub fn has(&self, name: &Symbol) -> bool {
        self.locals.iter().any(|(n, _)| n == name) || self.sigma.has(name)
    }

    pub fn fresh(&self, hint: &Symbol) -> Symbol {
        hint.fresh(|candidate| self.has(candidate))
    }

    pub fn lookup_type(&self, name: &Symbol) -> Option<RcType> {
        self.locals
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| ty.clone())
            .or_else(|| self.sigma.lookup_type(name))
    }

    pub fn lookup_data(&self, name: &Symbol) -> Option<RcDataDecl> {
        self.sigma.lookup_data(name)
    }

    pub fn lookup_constructor(&self, ctor_name: &Symbol) -> Option<(Symbol, RcDataDecl)> {
        self.sigma.lookup_constructor(ctor_name)
    }

    /// Add a local `HasType` binding, as happens when entering a binder.
    pub fn add_hastype(&self, name: Symbol, ty: RcType) -> Gamma {
        log::trace!("add local binding {}", name);
        let mut locals = self.locals.clone();
        locals.push_back((name, ty));
        Gamma { sigma: self.sigma.clone(), locals }
    }

    /// The runtime environment implied by this context: `Σ`'s environment,
    /// extended by a neutral variable for every local `HasType` entry.
    pub fn to_rho(&self) -> Rho {
        let mut rho = self.sigma.to_rho();
        for (name, ty) in self.locals.iter() {
            rho = rho.extend(name.clone(), RcValue::var(name.clone(), ty.clone()));
        }
        rho
    }
}

/// `ρ`, the runtime environment consulted by the evaluator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rho {
    bindings: Vector<(Symbol, RcValue)>,
}

impl Rho {
    pub fn new() -> Rho {
        Rho { bindings: Vector::new() }
    }

    pub fn lookup(&self, name: &Symbol) -> Option<RcValue> {
        self.bindings.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v.clone())
    }

    pub fn extend(&self, name: Symbol, value: RcValue) -> Rho {
        let mut bindings = self.bindings.clone();
        bindings.push_back((name, value));
        Rho { bindings }
    }
}

/// `Bound`, the ordered list of names in scope during read-back, used only
/// to pick fresh names deterministically.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bound {
    names: Vector<Symbol>,
}

impl Bound {
    pub fn new() -> Bound {
        Bound { names: Vector::new() }
    }

    pub fn contains(&self, name: &Symbol) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn extend(&self, name: Symbol) -> Bound {
        let mut names = self.names.clone();
        names.push_back(name);
        Bound { names }
    }

    pub fn fresh(&self, hint: &Symbol) -> Symbol {
        hint.fresh(|candidate| self.contains(candidate))
    }
}

/// `Renamings`, the pair of maps from bound names to a shared monotone
/// index used while deciding alpha-equivalence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Renamings {
    left: im::HashMap<Symbol, u32>,
    right: im::HashMap<Symbol, u32>,
    next: u32,
}

impl Renamings {
    pub fn new() -> Renamings {
        Renamings { left: im::HashMap::new(), right: im::HashMap::new(), next: 0 }
    }

    /// Record that `left_name` on the left corresponds to `right_name` on
    /// the right, both freshly bound by the same binder.
    pub fn extend(&self, left_name: &Symbol, right_name: &Symbol) -> Renamings {
        let mut left = self.left.clone();
        let mut right = self.right.clone();
        left.insert(left_name.clone(), self.next);
        right.insert(right_name.clone(), self.next);
        Renamings { left, right, next: self.next + 1 }
    }

    /// Decide whether `left_name` (as seen on the left term) and
    /// `right_name` (as seen on the right term) refer to the same variable:
    /// either both are bound by corresponding binders, or both are free and
    /// spell the same name.
    pub fn same_var(&self, left_name: &Symbol, right_name: &Symbol) -> bool {
        match (self.left.get(left_name), self.right.get(right_name)) {
            (Some(l), Some(r)) => l == r,
            (None, None) => left_name == right_name,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::domain::{Neutral, RcNeutral};

    /// P5: a later `HasType` for the same name shadows an earlier one.
    #[test]
    fn shadowing_returns_the_latest_hastype() {
        let gamma = Gamma::from_sigma(&Sigma::new());
        let gamma = gamma.add_hastype(Symbol::new("x"), RcValue::from(Value::Nat));
        let gamma = gamma.add_hastype(Symbol::new("x"), RcValue::from(Value::Atom));

        assert_eq!(gamma.lookup_type(&Symbol::new("x")), Some(RcValue::from(Value::Atom)));
    }

    /// P6: `fresh` never returns a name already in the context.
    #[test]
    fn fresh_avoids_every_bound_name() {
        let sigma = Sigma::new().claim(Symbol::new("x"), RcValue::from(Value::Nat));
        let sigma = sigma.claim(Symbol::new("x'"), RcValue::from(Value::Nat));

        let fresh = sigma.fresh(&Symbol::new("x"));

        assert!(!sigma.has(&fresh));
        assert_eq!(fresh, Symbol::new("x''"));
    }

    #[test]
    fn sigma_to_rho_turns_claims_into_neutral_variables() {
        let sigma = Sigma::new().claim(Symbol::new("x"), RcValue::from(Value::Nat));
        let rho = sigma.to_rho();

        match rho.lookup(&Symbol::new("x")).unwrap().as_ref() {
            Value::Neutral(neutral, ty) => {
                assert_eq!(*neutral, RcNeutral::from(Neutral::Var(Symbol::new("x"))));
                assert_eq!(ty.as_ref(), &Value::Nat);
            },
            other => panic!("expected a neutral variable, found {:?}", other),
        }
    }

    #[test]
    fn extending_a_context_never_mutates_its_predecessor() {
        let base = Sigma::new().claim(Symbol::new("x"), RcValue::from(Value::Nat));
        let _extended = base.claim(Symbol::new("y"), RcValue::from(Value::Atom));

        assert!(base.has(&Symbol::new("x")));
        assert!(!base.has(&Symbol::new("y")));
    }
}
