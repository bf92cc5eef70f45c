//! Pretty-printing surface expressions with the `pretty` Wadler-style doc
//! builder, the same crate the rest of this kernel's ancestry uses for
//! laying out terms wider than a line.

use pretty::RcDoc;

use crate::expr::Expr;

fn parens(doc: RcDoc<'static>) -> RcDoc<'static> {
    RcDoc::text("(").append(doc).append(RcDoc::text(")"))
}

fn sexpr(head: &'static str, args: Vec<RcDoc<'static>>) -> RcDoc<'static> {
    let mut doc = RcDoc::text(head);
    for arg in args {
        doc = doc.append(RcDoc::line()).append(arg);
    }
    parens(doc.nest(2).group())
}

impl Expr {
    pub fn to_doc(&self) -> RcDoc<'static> {
        match self {
            Expr::Var(name) => RcDoc::text(name.to_string()),
            Expr::The(ty, e) => sexpr("the", vec![ty.to_doc(), e.to_doc()]),
            Expr::U => RcDoc::text("U"),
            Expr::Atom => RcDoc::text("Atom"),
            Expr::Tick(name) => RcDoc::text(format!("'{}", name)),
            Expr::Nat => RcDoc::text("Nat"),
            Expr::Zero => RcDoc::text("zero"),
            Expr::NatLit(n) => RcDoc::text(n.to_string()),
            Expr::Nil => RcDoc::text("nil"),
            Expr::VecNil => RcDoc::text("vecnil"),
            Expr::Trivial => RcDoc::text("Trivial"),
            Expr::Sole => RcDoc::text("sole"),
            Expr::Absurd => RcDoc::text("Absurd"),

            Expr::Add1(n) => sexpr("add1", vec![n.to_doc()]),
            Expr::Car(p) => sexpr("car", vec![p.to_doc()]),
            Expr::Cdr(p) => sexpr("cdr", vec![p.to_doc()]),
            Expr::List(e) => sexpr("List", vec![e.to_doc()]),
            Expr::Head(v) => sexpr("head", vec![v.to_doc()]),
            Expr::Tail(v) => sexpr("tail", vec![v.to_doc()]),
            Expr::Same(w) => sexpr("same", vec![w.to_doc()]),
            Expr::Symm(w) => sexpr("symm", vec![w.to_doc()]),
            Expr::Left(v) => sexpr("left", vec![v.to_doc()]),
            Expr::Right(v) => sexpr("right", vec![v.to_doc()]),

            Expr::App(f, args) => {
                let mut docs = vec![f.to_doc()];
                docs.extend(args.iter().map(|a| a.to_doc()));
                let mut doc = docs.remove(0);
                for d in docs {
                    doc = doc.append(RcDoc::line()).append(d);
                }
                parens(doc.nest(2).group())
            },

            Expr::Lambda(xs, body) => {
                let mut params = RcDoc::nil();
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        params = params.append(RcDoc::line());
                    }
                    params = params.append(RcDoc::text(x.to_string()));
                }
                sexpr("lambda", vec![parens(params), body.to_doc()])
            },

            Expr::Pi(binders, codomain) => {
                let mut parts = Vec::new();
                for (name, ty) in binders {
                    parts.push(parens(RcDoc::text(name.to_string()).append(RcDoc::line()).append(ty.to_doc())));
                }
                let mut binder_doc = RcDoc::nil();
                for (i, p) in parts.into_iter().enumerate() {
                    if i > 0 {
                        binder_doc = binder_doc.append(RcDoc::line());
                    }
                    binder_doc = binder_doc.append(p);
                }
                sexpr("Pi", vec![parens(binder_doc), codomain.to_doc()])
            },

            Expr::Arrow(doms, codomain) => {
                let mut docs: Vec<RcDoc<'static>> = doms.iter().map(|d| d.to_doc()).collect();
                docs.push(codomain.to_doc());
                let mut doc = RcDoc::text("->");
                for d in docs {
                    doc = doc.append(RcDoc::line()).append(d);
                }
                parens(doc.nest(2).group())
            },

            Expr::Sigma(binders, codomain) => {
                let mut parts = Vec::new();
                for (name, ty) in binders {
                    parts.push(parens(RcDoc::text(name.to_string()).append(RcDoc::line()).append(ty.to_doc())));
                }
                let mut binder_doc = RcDoc::nil();
                for (i, p) in parts.into_iter().enumerate() {
                    if i > 0 {
                        binder_doc = binder_doc.append(RcDoc::line());
                    }
                    binder_doc = binder_doc.append(p);
                }
                sexpr("Sigma", vec![parens(binder_doc), codomain.to_doc()])
            },
            Expr::Pair(a, b) => sexpr("Pair", vec![a.to_doc(), b.to_doc()]),
            Expr::Cons(a, b) => sexpr("cons", vec![a.to_doc(), b.to_doc()]),

            Expr::WhichNat(t, b, s) => sexpr("which-Nat", vec![t.to_doc(), b.to_doc(), s.to_doc()]),
            Expr::IterNat(t, b, s) => sexpr("iter-Nat", vec![t.to_doc(), b.to_doc(), s.to_doc()]),
            Expr::RecNat(t, b, s) => sexpr("rec-Nat", vec![t.to_doc(), b.to_doc(), s.to_doc()]),
            Expr::IndNat(t, m, b, s) => sexpr("ind-Nat", vec![t.to_doc(), m.to_doc(), b.to_doc(), s.to_doc()]),

            Expr::ListCons(e, es) => sexpr("::", vec![e.to_doc(), es.to_doc()]),
            Expr::RecList(t, b, s) => sexpr("rec-List", vec![t.to_doc(), b.to_doc(), s.to_doc()]),
            Expr::IndList(t, m, b, s) => sexpr("ind-List", vec![t.to_doc(), m.to_doc(), b.to_doc(), s.to_doc()]),

            Expr::Vec(e, n) => sexpr("Vec", vec![e.to_doc(), n.to_doc()]),
            Expr::VecCons(e, es) => sexpr("vec::", vec![e.to_doc(), es.to_doc()]),
            Expr::IndVec(len, t, m, b, s) => {
                sexpr("ind-Vec", vec![len.to_doc(), t.to_doc(), m.to_doc(), b.to_doc(), s.to_doc()])
            },

            Expr::Equal(a, x, y) => sexpr("=", vec![a.to_doc(), x.to_doc(), y.to_doc()]),
            Expr::Cong(t, f) => sexpr("cong", vec![t.to_doc(), f.to_doc()]),
            Expr::Replace(t, m, b) => sexpr("replace", vec![t.to_doc(), m.to_doc(), b.to_doc()]),
            Expr::Trans(l, r) => sexpr("trans", vec![l.to_doc(), r.to_doc()]),
            Expr::IndEqual(t, m, b) => sexpr("ind-=", vec![t.to_doc(), m.to_doc(), b.to_doc()]),

            Expr::Either(a, b) => sexpr("Either", vec![a.to_doc(), b.to_doc()]),
            Expr::IndEither(t, m, bl, br) => sexpr("ind-Either", vec![t.to_doc(), m.to_doc(), bl.to_doc(), br.to_doc()]),
            Expr::IndAbsurd(t, m) => sexpr("ind-Absurd", vec![t.to_doc(), m.to_doc()]),

            Expr::Match(target, arms) => {
                let mut doc = RcDoc::text("match").append(RcDoc::line()).append(target.to_doc());
                for arm in arms {
                    let arm_doc = parens(
                        RcDoc::text(arm.pattern.to_string()).append(RcDoc::line()).append(arm.body.to_doc()),
                    );
                    doc = doc.append(RcDoc::line()).append(arm_doc);
                }
                parens(doc.nest(2).group())
            },
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_doc().pretty(80))
    }
}
