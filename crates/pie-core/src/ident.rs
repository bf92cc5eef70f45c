use std::fmt;
use std::rc::Rc;

/// An identifier bound by the surface syntax, a binder, or a datatype
/// declaration.
///
/// Symbols are compared by the equality of the strings they wrap. We wrap the
/// string in an `Rc` so that cloning a symbol - something we do constantly
/// while threading contexts through the checker and evaluator - is cheap.
#[derive(Clone, Eq, Ord, PartialOrd, Hash)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Symbol {
        Symbol(Rc::from(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Produce a name that does not clash with any name accepted by `avoid`,
    /// by repeatedly suffixing an apostrophe.
    ///
    /// This is the only freshening scheme used anywhere in the kernel: it is
    /// simple, and deterministic freshening is what makes read-back
    /// alpha-canonical.
    pub fn fresh(&self, avoid: impl Fn(&Symbol) -> bool) -> Symbol {
        let mut candidate = self.clone();
        while avoid(&candidate) {
            let mut next = candidate.as_str().to_owned();
            next.push('\'');
            candidate = Symbol::new(next);
        }
        candidate
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Symbol) -> bool {
        self.0 == other.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(src: &str) -> Symbol {
        Symbol::new(src)
    }
}

impl From<String> for Symbol {
    fn from(src: String) -> Symbol {
        Symbol::new(src)
    }
}
