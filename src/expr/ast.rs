//! Expression tree: variables, constants, arithmetic, and transcendental unary functions.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

/// A finite real constant, hashable and comparable bit-for-bit.
///
/// Expressions are interned by structural equality (see `crate::node::NodeStore`),
/// which requires `Eq`/`Hash` on leaf payloads; plain `f64` has neither. NaN is
/// never produced by a well-formed expression tree, so bitwise comparison is a
/// safe stand-in for value equality here.
#[derive(Debug, Clone, Copy)]
pub struct Real(pub f64);

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}
impl Eq for Real {}
impl Hash for Real {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}
impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

/// Unary transcendental/elementary functions applicable to a leaf expression.
///
/// This is the leaf-level subset of `crate::unary::UnaryOp`: it excludes
/// `Pos`/`Not`/`Sgn`, which are handled at the diagram level (`Pos` is a
/// no-op, `Sgn` and `Not` restructure the diagram rather than rewrite a leaf).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryFn {
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Log2,
    Log10,
    Log1p,
    Floor,
    Ceil,
    Sqrt,
}

impl UnaryFn {
    pub(crate) fn apply_f64(self, x: f64) -> f64 {
        match self {
            UnaryFn::Sin => x.sin(),
            UnaryFn::Cos => x.cos(),
            UnaryFn::Tan => x.tan(),
            UnaryFn::Sinh => x.sinh(),
            UnaryFn::Cosh => x.cosh(),
            UnaryFn::Tanh => x.tanh(),
            UnaryFn::Exp => x.exp(),
            UnaryFn::Log => x.ln(),
            UnaryFn::Log2 => x.log2(),
            UnaryFn::Log10 => x.log10(),
            UnaryFn::Log1p => x.ln_1p(),
            UnaryFn::Floor => x.floor(),
            UnaryFn::Ceil => x.ceil(),
            UnaryFn::Sqrt => x.sqrt(),
        }
    }

    pub(crate) fn symbol(self) -> &'static str {
        match self {
            UnaryFn::Sin => "sin",
            UnaryFn::Cos => "cos",
            UnaryFn::Tan => "tan",
            UnaryFn::Sinh => "sinh",
            UnaryFn::Cosh => "cosh",
            UnaryFn::Tanh => "tanh",
            UnaryFn::Exp => "exp",
            UnaryFn::Log => "log",
            UnaryFn::Log2 => "log2",
            UnaryFn::Log10 => "log10",
            UnaryFn::Log1p => "log1p",
            UnaryFn::Floor => "floor",
            UnaryFn::Ceil => "ceil",
            UnaryFn::Sqrt => "sqrt",
        }
    }
}

/// Inner representation of a symbolic expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprInner {
    /// A named continuous variable.
    Var(Arc<str>),
    /// A constant real value.
    Const(Real),
    Add(Expr, Expr),
    Sub(Expr, Expr),
    Mul(Expr, Expr),
    Div(Expr, Expr),
    Neg(Expr),
    /// Integer power; exponent is symbolic only via `PowExpr`.
    Pow(Expr, i32),
    PowExpr(Expr, Expr),
    Unary(UnaryFn, Expr),
}

/// A symbolic real-valued expression.
///
/// Cheaply cloneable (`Arc`-shared), compared structurally. This is the
/// payload carried by terminal leaves and by the linear forms inside
/// decisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr {
    inner: Arc<ExprInner>,
}

impl Expr {
    pub fn var(name: &str) -> Self {
        Expr {
            inner: Arc::new(ExprInner::Var(Arc::from(name))),
        }
    }

    pub fn constant(value: f64) -> Self {
        Expr {
            inner: Arc::new(ExprInner::Const(Real(value))),
        }
    }

    pub fn zero() -> Self {
        Expr::constant(0.0)
    }

    pub fn one() -> Self {
        Expr::constant(1.0)
    }

    pub fn inner(&self) -> &ExprInner {
        &self.inner
    }

    pub fn as_const(&self) -> Option<f64> {
        match self.inner.as_ref() {
            ExprInner::Const(Real(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_const() == Some(0.0)
    }

    pub fn is_one(&self) -> bool {
        self.as_const() == Some(1.0)
    }

    pub fn add(&self, other: &Expr) -> Expr {
        if let (Some(a), Some(b)) = (self.as_const(), other.as_const()) {
            return Expr::constant(a + b);
        }
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        Expr {
            inner: Arc::new(ExprInner::Add(self.clone(), other.clone())),
        }
    }

    pub fn sub(&self, other: &Expr) -> Expr {
        if let (Some(a), Some(b)) = (self.as_const(), other.as_const()) {
            return Expr::constant(a - b);
        }
        if other.is_zero() {
            return self.clone();
        }
        Expr {
            inner: Arc::new(ExprInner::Sub(self.clone(), other.clone())),
        }
    }

    pub fn mul(&self, other: &Expr) -> Expr {
        if let (Some(a), Some(b)) = (self.as_const(), other.as_const()) {
            return Expr::constant(a * b);
        }
        if self.is_zero() || other.is_zero() {
            return Expr::zero();
        }
        if self.is_one() {
            return other.clone();
        }
        if other.is_one() {
            return self.clone();
        }
        Expr {
            inner: Arc::new(ExprInner::Mul(self.clone(), other.clone())),
        }
    }

    /// Symbolic division. Division by the literal zero constant is the
    /// caller's responsibility to reject (`crate::apply` does so, producing
    /// `LeafEvalError`); this constructor only folds the non-error cases.
    pub fn div(&self, other: &Expr) -> Expr {
        if let (Some(a), Some(b)) = (self.as_const(), other.as_const()) {
            if b != 0.0 {
                return Expr::constant(a / b);
            }
        }
        if other.is_one() {
            return self.clone();
        }
        Expr {
            inner: Arc::new(ExprInner::Div(self.clone(), other.clone())),
        }
    }

    pub fn neg(&self) -> Expr {
        if let Some(a) = self.as_const() {
            return Expr::constant(-a);
        }
        if let ExprInner::Neg(inner) = self.inner.as_ref() {
            return inner.clone();
        }
        Expr {
            inner: Arc::new(ExprInner::Neg(self.clone())),
        }
    }

    pub fn pow_i32(&self, exponent: i32) -> Expr {
        if let Some(a) = self.as_const() {
            return Expr::constant(a.powi(exponent));
        }
        if exponent == 1 {
            return self.clone();
        }
        if exponent == 0 {
            return Expr::one();
        }
        Expr {
            inner: Arc::new(ExprInner::Pow(self.clone(), exponent)),
        }
    }

    pub fn pow_expr(&self, exponent: &Expr) -> Expr {
        if let (Some(a), Some(b)) = (self.as_const(), exponent.as_const()) {
            return Expr::constant(a.powf(b));
        }
        if let Some(e) = exponent.as_const() {
            if e.fract() == 0.0 && e.abs() < i32::MAX as f64 {
                return self.pow_i32(e as i32);
            }
        }
        Expr {
            inner: Arc::new(ExprInner::PowExpr(self.clone(), exponent.clone())),
        }
    }

    pub fn unary(&self, f: UnaryFn) -> Expr {
        if let Some(a) = self.as_const() {
            return Expr::constant(f.apply_f64(a));
        }
        Expr {
            inner: Arc::new(ExprInner::Unary(f, self.clone())),
        }
    }

    /// Free continuous variables occurring in this expression, in first-seen
    /// traversal order deduplicated by name.
    pub fn collect_vars(&self, out: &mut std::collections::BTreeSet<Arc<str>>) {
        match self.inner.as_ref() {
            ExprInner::Var(name) => {
                out.insert(Arc::clone(name));
            }
            ExprInner::Const(_) => {}
            ExprInner::Add(a, b)
            | ExprInner::Sub(a, b)
            | ExprInner::Mul(a, b)
            | ExprInner::Div(a, b)
            | ExprInner::PowExpr(a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
            ExprInner::Neg(a) | ExprInner::Pow(a, _) | ExprInner::Unary(_, a) => {
                a.collect_vars(out);
            }
        }
    }

    /// Substitute every occurrence of `name` with `value`, rebuilding bottom-up
    /// with the same constant-folding applied by the constructors above.
    pub fn substitute_var(&self, name: &str, value: &Expr) -> Expr {
        match self.inner.as_ref() {
            ExprInner::Var(v) => {
                if v.as_ref() == name {
                    value.clone()
                } else {
                    self.clone()
                }
            }
            ExprInner::Const(_) => self.clone(),
            ExprInner::Add(a, b) => a.substitute_var(name, value).add(&b.substitute_var(name, value)),
            ExprInner::Sub(a, b) => a.substitute_var(name, value).sub(&b.substitute_var(name, value)),
            ExprInner::Mul(a, b) => a.substitute_var(name, value).mul(&b.substitute_var(name, value)),
            ExprInner::Div(a, b) => a.substitute_var(name, value).div(&b.substitute_var(name, value)),
            ExprInner::Neg(a) => a.substitute_var(name, value).neg(),
            ExprInner::Pow(a, e) => a.substitute_var(name, value).pow_i32(*e),
            ExprInner::PowExpr(a, b) => a
                .substitute_var(name, value)
                .pow_expr(&b.substitute_var(name, value)),
            ExprInner::Unary(f, a) => a.substitute_var(name, value).unary(*f),
        }
    }
}

impl Add for &Expr {
    type Output = Expr;
    fn add(self, rhs: &Expr) -> Expr {
        Expr::add(self, rhs)
    }
}
impl Sub for &Expr {
    type Output = Expr;
    fn sub(self, rhs: &Expr) -> Expr {
        Expr::sub(self, rhs)
    }
}
impl Mul for &Expr {
    type Output = Expr;
    fn mul(self, rhs: &Expr) -> Expr {
        Expr::mul(self, rhs)
    }
}
impl Div for &Expr {
    type Output = Expr;
    fn div(self, rhs: &Expr) -> Expr {
        Expr::div(self, rhs)
    }
}
impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::neg(self)
    }
}
