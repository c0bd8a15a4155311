use super::ast::Expr;
use std::collections::BTreeMap;

#[test]
fn constant_folding_on_construction() {
    let a = Expr::constant(2.0);
    let b = Expr::constant(3.0);
    assert_eq!(a.add(&b).as_const(), Some(5.0));
    assert_eq!(a.mul(&b).as_const(), Some(6.0));
}

#[test]
fn parse_roundtrip_matches_structure() {
    let x = Expr::var("x");
    let y = Expr::var("y");
    let built = x.add(&y).mul(&Expr::constant(2.0));
    let printed = built.to_string();
    let reparsed: Expr = printed.parse().unwrap();
    assert_eq!(built, reparsed);
}

#[test]
fn parses_functions_and_precedence() {
    let e: Expr = "2*x + sin(y) - 3".parse().unwrap();
    let mut env = BTreeMap::new();
    env.insert("x".to_string(), 1.0);
    env.insert("y".to_string(), 0.0);
    assert_eq!(e.eval(&env).unwrap(), 2.0 * 1.0 + 0.0_f64.sin() - 3.0);
}

#[test]
fn linear_form_rejects_products_of_variables() {
    let xy = Expr::var("x").mul(&Expr::var("y"));
    assert!(xy.linear_form().is_none());

    let linear = Expr::var("x")
        .add(&Expr::constant(2.0).mul(&Expr::var("y")))
        .sub(&Expr::constant(1.0));
    let form = linear.linear_form().unwrap();
    assert_eq!(form.coeffs.get("x").copied(), Some(1.0));
    assert_eq!(form.coeffs.get("y").copied(), Some(2.0));
    assert_eq!(form.constant, -1.0);
}

#[test]
fn division_by_zero_is_an_eval_error() {
    let e = Expr::var("x").div(&Expr::constant(0.0));
    let mut env = BTreeMap::new();
    env.insert("x".to_string(), 1.0);
    assert!(e.eval(&env).is_err());
}

#[test]
fn collect_vars_deduplicates() {
    let e = Expr::var("x").add(&Expr::var("x")).mul(&Expr::var("y"));
    let mut vars = std::collections::BTreeSet::new();
    e.collect_vars(&mut vars);
    assert_eq!(vars.len(), 2);
}
