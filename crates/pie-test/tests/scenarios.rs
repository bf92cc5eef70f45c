//! End-to-end scenarios threading a sequence of top-level forms through
//! `Σ`, exercising `pie-elaborate`'s driver against a handful of complete
//! programs: an identity function, a `List` fold, a type error, a
//! user-defined `Bool` with a total and a non-exhaustive `match`, and an
//! equality check via `same`.

use pie_core::{Gamma, Sigma, Symbol, Value};
use pie_elaborate::{check_same, elaborate_claim, elaborate_data, elaborate_define, synth, ElabError};
use pie_surface::{Expr, RcExpr, SurfaceConstructor};

fn var(name: &str) -> RcExpr {
    RcExpr::from(Expr::Var(Symbol::new(name)))
}

fn sym(name: &str) -> Symbol {
    Symbol::new(name)
}

/// Every scenario below elaborates through `pie-core`/`pie-elaborate`'s
/// `log::trace!`/`log::debug!` call sites; running with `RUST_LOG=trace`
/// surfaces the claim/define/check-same trail. `try_init` because multiple
/// `#[test]` functions in this binary would otherwise double-init the
/// global logger.
fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

#[test]
fn id_applied_to_nat_is_checked_same_as_zero() {
    init_logging();
    // (claim id (Pi ((A U) (x A)) A))
    let id_ty = Expr::Pi(vec![(sym("A"), RcExpr::from(Expr::U)), (sym("x"), var("A"))], var("A"));
    // (define id (lambda (A x) x))
    let id_def = Expr::Lambda(vec![sym("A"), sym("x")], var("x"));

    let sigma = Sigma::new();
    let sigma = elaborate_claim(&sigma, &sym("id"), &RcExpr::from(id_ty)).expect("id claim should elaborate");
    let sigma = elaborate_define(&sigma, &sym("id"), &RcExpr::from(id_def)).expect("id definition should check");

    // ((id Nat) zero)
    let applied = Expr::App(var("id"), vec![RcExpr::from(Expr::Nat), RcExpr::from(Expr::Zero)]);
    check_same(&sigma, &RcExpr::from(Expr::Nat), &RcExpr::from(applied), &RcExpr::from(Expr::Zero))
        .expect("(id Nat zero) should be definitionally zero");
}

#[test]
fn length_of_a_two_element_list_is_two() {
    init_logging();
    // (claim length (-> (List Nat) Nat))
    let length_ty = Expr::Arrow(vec![RcExpr::from(Expr::List(RcExpr::from(Expr::Nat)))], RcExpr::from(Expr::Nat));
    // (define length (lambda (l) (rec-List l zero (lambda (e es n) (add1 n)))))
    let step = Expr::Lambda(
        vec![sym("e"), sym("es"), sym("n")],
        RcExpr::from(Expr::Add1(var("n"))),
    );
    let length_def =
        Expr::Lambda(vec![sym("l")], RcExpr::from(Expr::RecList(var("l"), RcExpr::from(Expr::Zero), RcExpr::from(step))));

    let sigma = Sigma::new();
    let sigma = elaborate_claim(&sigma, &sym("length"), &RcExpr::from(length_ty)).expect("length claim should elaborate");
    let sigma = elaborate_define(&sigma, &sym("length"), &RcExpr::from(length_def)).expect("length definition should check");

    // (:: zero (:: zero nil))
    let two_elem_list =
        Expr::ListCons(RcExpr::from(Expr::Zero), RcExpr::from(Expr::ListCons(RcExpr::from(Expr::Zero), RcExpr::from(Expr::Nil))));
    let applied = Expr::App(var("length"), vec![RcExpr::from(two_elem_list)]);

    check_same(&sigma, &RcExpr::from(Expr::Nat), &RcExpr::from(applied), &RcExpr::from(Expr::NatLit(2)))
        .expect("(length (:: zero (:: zero nil))) should be definitionally 2");
}

#[test]
fn defining_an_atom_against_a_nat_claim_is_a_type_mismatch() {
    init_logging();
    let sigma = Sigma::new();
    let sigma = elaborate_claim(&sigma, &sym("silly"), &RcExpr::from(Expr::Nat)).expect("silly claim should elaborate");

    let err = elaborate_define(&sigma, &sym("silly"), &RcExpr::from(Expr::Tick(sym("hello"))))
        .expect_err("'hello does not check against Nat");
    assert!(matches!(err, ElabError::TypeMismatch { .. }), "expected a TypeMismatch, found {:?}", err);
}

/// `(data Bool () () (true (Bool)) (false (Bool)))`.
fn declare_bool(sigma: &Sigma) -> Sigma {
    let true_ctor = SurfaceConstructor { name: sym("true"), args: vec![], result_type_name: sym("Bool"), result_indices: vec![] };
    let false_ctor = SurfaceConstructor { name: sym("false"), args: vec![], result_type_name: sym("Bool"), result_indices: vec![] };
    elaborate_data(sigma, &sym("Bool"), &[], &[], &[true_ctor, false_ctor]).expect("Bool should elaborate")
}

#[test]
fn total_match_over_bool_negates() {
    init_logging();
    let sigma = declare_bool(&Sigma::new());

    // (claim neg (-> Bool Bool))
    let neg_ty = Expr::Arrow(vec![var("Bool")], var("Bool"));
    let sigma = elaborate_claim(&sigma, &sym("neg"), &RcExpr::from(neg_ty)).expect("neg claim should elaborate");

    // (define neg (lambda (b) (match b (true false) (false true))))
    let arms = vec![
        pie_surface::SurfaceArm { pattern: pie_core::Pattern::Ctor(sym("true"), vec![]), body: var("false") },
        pie_surface::SurfaceArm { pattern: pie_core::Pattern::Ctor(sym("false"), vec![]), body: var("true") },
    ];
    let neg_def = Expr::Lambda(vec![sym("b")], RcExpr::from(Expr::Match(var("b"), arms)));
    let sigma = elaborate_define(&sigma, &sym("neg"), &RcExpr::from(neg_def)).expect("neg should check and cover every constructor");

    let applied = Expr::App(var("neg"), vec![var("true")]);
    check_same(&sigma, &var("Bool"), &RcExpr::from(applied), &var("false")).expect("(neg true) should be definitionally false");
}

#[test]
fn non_exhaustive_match_over_bool_names_the_missing_constructor() {
    init_logging();
    let sigma = declare_bool(&Sigma::new());

    let bad_ty = Expr::Arrow(vec![var("Bool")], var("Bool"));
    let sigma = elaborate_claim(&sigma, &sym("bad"), &RcExpr::from(bad_ty)).expect("bad claim should elaborate");

    // (define bad (lambda (b) (match b (true false))))
    let arms = vec![pie_surface::SurfaceArm { pattern: pie_core::Pattern::Ctor(sym("true"), vec![]), body: var("false") }];
    let bad_def = Expr::Lambda(vec![sym("b")], RcExpr::from(Expr::Match(var("b"), arms)));

    let err = elaborate_define(&sigma, &sym("bad"), &RcExpr::from(bad_def)).expect_err("match leaves out the false arm");
    assert_eq!(err, ElabError::NonExhaustiveMatch(sym("false")));
}

#[test]
fn same_add1_zero_is_checked_same_as_itself() {
    init_logging();
    let sigma = Sigma::new();
    let equal_ty = Expr::Equal(RcExpr::from(Expr::Nat), RcExpr::from(Expr::NatLit(1)), RcExpr::from(Expr::NatLit(1)));
    let lhs = Expr::Same(RcExpr::from(Expr::NatLit(1)));
    let rhs = Expr::Same(RcExpr::from(Expr::NatLit(1)));
    check_same(&sigma, &RcExpr::from(equal_ty), &RcExpr::from(lhs), &RcExpr::from(rhs))
        .expect("(same (add1 zero)) should equal itself");
}

#[test]
fn trans_of_two_neutral_equality_proofs_lands_on_the_outer_endpoints() {
    init_logging();
    // Three free Nat variables and two free equality proofs between them:
    // p : n1 = n2, q : n2 = n3. Neither proof has a definition, so both
    // evaluate to neutral values - this is what exercises `eval`'s `Trans`
    // arm rather than the checker's independent (and already-correct) one.
    let mut sigma = Sigma::new();
    for name in ["n1", "n2", "n3"] {
        sigma = elaborate_claim(&sigma, &sym(name), &RcExpr::from(Expr::Nat)).expect("Nat claim should elaborate");
    }
    let p_ty = Expr::Equal(RcExpr::from(Expr::Nat), var("n1"), var("n2"));
    sigma = elaborate_claim(&sigma, &sym("p"), &RcExpr::from(p_ty)).expect("p claim should elaborate");
    let q_ty = Expr::Equal(RcExpr::from(Expr::Nat), var("n2"), var("n3"));
    sigma = elaborate_claim(&sigma, &sym("q"), &RcExpr::from(q_ty)).expect("q claim should elaborate");

    let gamma = Gamma::from_sigma(&sigma);
    let trans_expr = Expr::Trans(var("p"), var("q"));
    let (trans_core, trans_ty) = synth(&gamma, &trans_expr).expect("trans of two composable proofs should synthesize");

    // The checker's own (eval-independent) synth rule already gets the
    // endpoints right; the point of this test is `eval`, so evaluate the
    // term and inspect the neutral value's own annotated type.
    let trans_value = trans_core.eval(&gamma.to_rho()).expect("trans of two neutral proofs reduces to a neutral value");
    let annotated_ty = match trans_value.as_ref() {
        Value::Neutral(_, ty) => ty.clone(),
        other => panic!("expected trans of two neutral proofs to stay neutral, found {:?}", other),
    };

    assert_eq!(annotated_ty, trans_ty, "eval's own annotation on the reduced value should match the synthesized type");
    match annotated_ty.as_ref() {
        Value::Equal(_, x, z) => {
            assert_eq!(x.as_ref(), &Value::var(sym("n1"), Value::Nat), "left endpoint should be n1");
            assert_eq!(z.as_ref(), &Value::var(sym("n3"), Value::Nat), "right endpoint should be n3, not q's left endpoint n2");
        },
        other => panic!("expected an Equal type, found {:?}", other),
    }
}
