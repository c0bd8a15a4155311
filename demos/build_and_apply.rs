//! Builds two small diagrams and combines them with `apply`, printing the
//! result in the textual format.

use xadd_core::manager::XaddContext;
use xadd_core::ApplyOp;

fn main() {
    let ctx = XaddContext::new();

    // A piecewise discount: 10% off once quantity reaches 100 units.
    let discount = ctx.parse("([qty <= 99] ([1]) ([0.9]))").unwrap();
    let unit_price = ctx.parse("([12.5])").unwrap();

    let total = ctx.apply(unit_price, discount, ApplyOp::Prod).unwrap();
    println!("unit price after discount: {}", ctx.print(total));
    println!("node count: {}", ctx.node_count());
}
