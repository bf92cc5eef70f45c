use std::rc::Rc;

use crate::core::RcCore;
use crate::ident::Symbol;

/// An ordered telescope of names and the (unevaluated) core types that
/// classify them, each type depending only on the names bound earlier in the
/// telescope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Telescope(pub Vec<(Symbol, RcCore)>);

impl Telescope {
    pub fn new(entries: Vec<(Symbol, RcCore)>) -> Telescope {
        Telescope(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Symbol, RcCore)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// One constructor of a user-defined datatype.
///
/// `result_indices` are the core terms (mentioning the constructor's own
/// parameters and the datatype's params) that instantiate the datatype's
/// index telescope for values built from this constructor - i.e. the `i'` in
/// `D p i'` from the declaration's result type.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub name: Symbol,
    pub args: Telescope,
    pub result_indices: Vec<RcCore>,
}

/// The full declaration of a user-defined datatype, shared by every
/// constructor and every use of `D` or `Cᵢ` in a program.
#[derive(Debug, Clone, PartialEq)]
pub struct DataDecl {
    pub name: Symbol,
    pub params: Telescope,
    pub indices: Telescope,
    pub constructors: Vec<ConstructorDecl>,
}

impl DataDecl {
    pub fn constructor(&self, name: &Symbol) -> Option<&ConstructorDecl> {
        self.constructors.iter().find(|c| &c.name == name)
    }
}

pub type RcDataDecl = Rc<DataDecl>;
