//! Patterns and the four operations `match` arms need from them: admission,
//! context extension, environment extension, and renaming-aware comparison.

use std::error::Error;
use std::fmt;

use crate::context::{Gamma, Renamings, Rho};
use crate::core::RcCore;
use crate::domain::{RcType, RcValue, Value};
use crate::error::CoreError;
use crate::ident::Symbol;

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// `_`, matches anything, binds nothing.
    Hole,
    /// A variable pattern, matches anything, binds `name`.
    Var(Symbol),
    /// `'atom`, matches only the identical tick.
    Tick(Symbol),
    /// `(cons p q)`, matches a dependent pair.
    Cons(Box<Pattern>, Box<Pattern>),
    /// `(C q...)`, matches a specific constructor of a user datatype.
    Ctor(Symbol, Vec<Pattern>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    pub pattern: Pattern,
    pub body: RcCore,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternError {
    ExpectedType(&'static str),
    UnknownConstructor(Symbol),
    Arity { expected: usize, found: usize },
    Core(CoreError),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::ExpectedType(name) => write!(f, "pattern expected a {} type", name),
            PatternError::UnknownConstructor(name) => {
                write!(f, "`{}` is not a constructor of the scrutinee's datatype", name)
            },
            PatternError::Arity { expected, found } => {
                write!(f, "constructor pattern expected {} arguments, found {}", expected, found)
            },
            PatternError::Core(err) => err.fmt(f),
        }
    }
}

impl Error for PatternError {}

impl From<CoreError> for PatternError {
    fn from(src: CoreError) -> PatternError {
        PatternError::Core(src)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Hole => write!(f, "_"),
            Pattern::Var(name) => write!(f, "{}", name),
            Pattern::Tick(name) => write!(f, "'{}", name),
            Pattern::Cons(p, q) => write!(f, "(cons {} {})", p, q),
            Pattern::Ctor(name, args) => {
                write!(f, "({}", name)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            },
        }
    }
}

impl Pattern {
    /// The names this pattern binds, in left-to-right order.
    pub fn vars(&self) -> Vec<Symbol> {
        match self {
            Pattern::Hole | Pattern::Tick(_) => Vec::new(),
            Pattern::Var(name) => vec![name.clone()],
            Pattern::Cons(p, q) => {
                let mut vars = p.vars();
                vars.extend(q.vars());
                vars
            },
            Pattern::Ctor(_, args) => args.iter().flat_map(Pattern::vars).collect(),
        }
    }

    /// Does this pattern match `value`? Assumes `value` is already in
    /// canonical (non-neutral) form where the pattern requires it to be.
    pub fn admits(&self, value: &RcValue) -> bool {
        match (self, value.as_ref()) {
            (Pattern::Hole, _) | (Pattern::Var(_), _) => true,
            (Pattern::Tick(name), Value::Tick(other)) => name == other,
            (Pattern::Tick(_), _) => false,
            (Pattern::Cons(p, q), Value::Cons(a, b)) => p.admits(a) && q.admits(b),
            (Pattern::Cons(_, _), _) => false,
            (Pattern::Ctor(name, args), Value::Constr(ctor_name, ctor_args, _, _)) => {
                name == ctor_name
                    && args.len() == ctor_args.len()
                    && args.iter().zip(ctor_args).all(|(p, a)| p.admits(a))
            },
            (Pattern::Ctor(_, _), _) => false,
        }
    }

    /// Bind this pattern's variables to the corresponding parts of `value`,
    /// for reducing a matched arm. Only meaningful when `self.admits(value)`.
    pub fn extend_rho(&self, rho: &Rho, value: &RcValue) -> Rho {
        match (self, value.as_ref()) {
            (Pattern::Hole, _) | (Pattern::Tick(_), _) => rho.clone(),
            (Pattern::Var(name), _) => rho.extend(name.clone(), value.clone()),
            (Pattern::Cons(p, q), Value::Cons(a, b)) => {
                let rho = p.extend_rho(rho, a);
                q.extend_rho(&rho, b)
            },
            (Pattern::Ctor(_, pats), Value::Constr(_, args, _, _)) => {
                pats.iter().zip(args).fold(rho.clone(), |rho, (p, a)| p.extend_rho(&rho, a))
            },
            _ => rho.clone(),
        }
    }

    /// Extend `gamma` with this pattern's bindings, given that the
    /// scrutinee has type `ty`. Returns the extended context together with
    /// the "generic" value this pattern stands for (a fresh neutral
    /// variable for each bound name) - used to type dependent constructor
    /// arguments occurring later in the same telescope.
    pub fn extend_gamma(
        &self,
        gamma: &Gamma,
        ty: &RcType,
    ) -> Result<(Gamma, RcValue), PatternError> {
        match self {
            Pattern::Hole => {
                let fresh = gamma.fresh(&Symbol::new("_"));
                Ok((gamma.clone(), RcValue::var(fresh, ty.clone())))
            },
            Pattern::Var(name) => {
                let extended = gamma.add_hastype(name.clone(), ty.clone());
                Ok((extended, RcValue::var(name.clone(), ty.clone())))
            },
            Pattern::Tick(name) => match ty.as_ref() {
                Value::Atom => Ok((gamma.clone(), RcValue::from(Value::Tick(name.clone())))),
                _ => Err(PatternError::ExpectedType("Atom")),
            },
            Pattern::Cons(p, q) => match ty.as_ref() {
                Value::Sigma(_, fst_ty, snd_ty) => {
                    let (gamma, fst_val) = p.extend_gamma(gamma, fst_ty)?;
                    let snd_ty = snd_ty.instantiate(fst_val.clone())?;
                    let (gamma, snd_val) = q.extend_gamma(&gamma, &snd_ty)?;
                    Ok((gamma, RcValue::from(Value::Cons(fst_val, snd_val))))
                },
                _ => Err(PatternError::ExpectedType("Sigma")),
            },
            Pattern::Ctor(name, subpats) => match ty.as_ref() {
                Value::Datatype(decl, params, _indices) => {
                    let ctor = decl
                        .constructor(name)
                        .ok_or_else(|| PatternError::UnknownConstructor(name.clone()))?;
                    if ctor.args.len() != subpats.len() {
                        return Err(PatternError::Arity {
                            expected: ctor.args.len(),
                            found: subpats.len(),
                        });
                    }

                    let mut local_rho = Rho::new();
                    for ((pname, _), pval) in decl.params.iter().zip(params.iter()) {
                        local_rho = local_rho.extend(pname.clone(), pval.clone());
                    }

                    let mut gamma = gamma.clone();
                    let mut values = Vec::with_capacity(subpats.len());
                    for ((arg_name, arg_ty_core), subpat) in ctor.args.iter().zip(subpats.iter()) {
                        let arg_ty_val = arg_ty_core.eval(&local_rho)?;
                        let (next_gamma, value) = subpat.extend_gamma(&gamma, &arg_ty_val)?;
                        gamma = next_gamma;
                        local_rho = local_rho.extend(arg_name.clone(), value.clone());
                        values.push(value);
                    }

                    Ok((gamma, RcValue::from(Value::Constr(name.clone(), values, decl.clone(), params.clone()))))
                },
                _ => Err(PatternError::ExpectedType("Datatype")),
            },
        }
    }

    /// Compare the shape of `self` and `other`, threading `Renamings`
    /// through corresponding binders, for alpha-equivalence of `match` arms.
    pub fn extend_renamings(&self, other: &Pattern, renamings: &Renamings) -> Option<Renamings> {
        match (self, other) {
            (Pattern::Hole, Pattern::Hole) => Some(renamings.clone()),
            (Pattern::Var(l), Pattern::Var(r)) => Some(renamings.extend(l, r)),
            (Pattern::Tick(l), Pattern::Tick(r)) if l == r => Some(renamings.clone()),
            (Pattern::Cons(p1, q1), Pattern::Cons(p2, q2)) => {
                let renamings = p1.extend_renamings(p2, renamings)?;
                q1.extend_renamings(q2, &renamings)
            },
            (Pattern::Ctor(n1, ps1), Pattern::Ctor(n2, ps2))
                if n1 == n2 && ps1.len() == ps2.len() =>
            {
                ps1.iter().zip(ps2).try_fold(renamings.clone(), |renamings, (p, q)| {
                    p.extend_renamings(q, &renamings)
                })
            },
            _ => None,
        }
    }
}

impl Arm {
    pub fn alpha_equiv(&self, other: &Arm, renamings: &Renamings) -> bool {
        match self.pattern.extend_renamings(&other.pattern, renamings) {
            Some(renamings) => self.body.alpha_equiv(&other.body, &renamings),
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hole_and_var_patterns_admit_anything() {
        assert!(Pattern::Hole.admits(&RcValue::from(Value::Zero)));
        assert!(Pattern::Var(Symbol::new("x")).admits(&RcValue::from(Value::Tick(Symbol::new("a")))));
    }

    #[test]
    fn tick_pattern_only_admits_the_identical_tick() {
        let pat = Pattern::Tick(Symbol::new("a"));
        assert!(pat.admits(&RcValue::from(Value::Tick(Symbol::new("a")))));
        assert!(!pat.admits(&RcValue::from(Value::Tick(Symbol::new("b")))));
    }

    #[test]
    fn var_pattern_extends_rho_with_the_bound_name() {
        let pat = Pattern::Var(Symbol::new("x"));
        let rho = pat.extend_rho(&Rho::new(), &RcValue::from(Value::Zero));
        assert_eq!(rho.lookup(&Symbol::new("x")), Some(RcValue::from(Value::Zero)));
    }

    #[test]
    fn var_pattern_extends_gamma_with_a_hastype_binding() {
        let gamma = Gamma::from_sigma(&crate::context::Sigma::new());
        let (gamma, value) = Pattern::Var(Symbol::new("x"))
            .extend_gamma(&gamma, &RcValue::from(Value::Nat))
            .expect("a variable pattern always extends cleanly");
        assert_eq!(gamma.lookup_type(&Symbol::new("x")), Some(RcValue::from(Value::Nat)));
        assert!(matches!(value.as_ref(), Value::Neutral(_, _)));
    }

    #[test]
    fn tick_pattern_against_a_non_atom_type_is_an_expected_type_error() {
        let gamma = Gamma::from_sigma(&crate::context::Sigma::new());
        let err = Pattern::Tick(Symbol::new("a")).extend_gamma(&gamma, &RcValue::from(Value::Nat)).unwrap_err();
        assert!(matches!(err, PatternError::ExpectedType("Atom")));
    }

    #[test]
    fn var_patterns_with_different_names_are_alpha_equivalent_by_renaming() {
        let left = Pattern::Var(Symbol::new("x"));
        let right = Pattern::Var(Symbol::new("y"));
        assert!(left.extend_renamings(&right, &Renamings::new()).is_some());
    }

    #[test]
    fn ctor_patterns_with_different_names_are_not_alpha_equivalent() {
        let left = Pattern::Ctor(Symbol::new("true"), vec![]);
        let right = Pattern::Ctor(Symbol::new("false"), vec![]);
        assert!(left.extend_renamings(&right, &Renamings::new()).is_none());
    }
}
