//! Prunes a diagram's infeasible branches under an assumed precondition,
//! then evaluates the surviving diagram at one point.

use std::collections::BTreeMap;
use std::sync::Arc;

use xadd_core::expr::LinearForm;
use xadd_core::manager::XaddContext;

fn main() {
    let ctx = XaddContext::new();
    let id = ctx
        .parse("([x <= 0] ([capacity]) ([capacity - x]))")
        .unwrap();

    // Precondition: x >= 10 (as "-x + 10 <= 0"), so the "x <= 0" branch is
    // infeasible and should be pruned away.
    let mut coeffs = BTreeMap::new();
    coeffs.insert(Arc::from("x"), -1.0);
    let precondition = LinearForm {
        coeffs,
        constant: 10.0,
    };

    let pruned = ctx.reduce_lp_default(id, &[precondition]);
    println!("pruned diagram: {}", ctx.print(pruned));

    let mut cont = BTreeMap::new();
    cont.insert("x".to_string(), 15.0);
    cont.insert("capacity".to_string(), 100.0);
    let value = ctx
        .evaluate(pruned, &BTreeMap::new(), &cont, true)
        .unwrap()
        .unwrap();
    println!("value at x=15, capacity=100: {value}");
}
