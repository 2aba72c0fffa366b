//! Predicate expressions evaluated against a decoded row.
//!
//! An [`Expr`] is a tagged variant tree, not a class hierarchy: constants,
//! positional attribute references, and operators over sub-expressions.
//! Evaluation is a pure function of `(expr, row)` — no schema lookup by
//! name, no mutation, no I/O.


use common::{StorageError, StorageResult};
use types::Value;

/// Typed binary comparisons. Only equality and less-than are in the
/// predicate language; other orderings compose from these plus `NOT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
}

/// Short-circuiting boolean connectives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// Predicate expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A literal value.
    Const(Value),
    /// A reference to the `i`-th attribute of the row being evaluated.
    AttrRef(usize),
    /// Logical negation of a boolean sub-expression.
    Not(Box<Expr>),
    /// A boolean connective over two boolean sub-expressions.
    Bool(BoolOp, Box<Expr>, Box<Expr>),
    /// A typed comparison over two value sub-expressions.
    Compare(CompareOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn attr(i: usize) -> Self {
        Expr::AttrRef(i)
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::Compare(CompareOp::Eq, Box::new(left), Box::new(right))
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Expr::Compare(CompareOp::Lt, Box::new(left), Box::new(right))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::Bool(BoolOp::And, Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Bool(BoolOp::Or, Box::new(left), Box::new(right))
    }

    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    /// Evaluates this node against `row`, returning the resulting value.
    ///
    /// `AttrRef(i)` out of bounds and comparisons between mismatched
    /// dynamic types both fail with [`StorageError::TypeMismatch`].
    pub fn eval(&self, row: &[Value]) -> StorageResult<Value> {
        match self {
            Expr::Const(v) => Ok(v.clone()),
            Expr::AttrRef(i) => row.get(*i).cloned().ok_or_else(|| {
                StorageError::TypeMismatch(format!("attribute index {i} out of bounds"))
            }),
            Expr::Not(inner) => {
                let v = inner.eval(row)?;
                let b = as_bool(&v)?;
                Ok(Value::Bool(!b))
            }
            Expr::Bool(op, left, right) => {
                let lv = as_bool(&left.eval(row)?)?;
                match (op, lv) {
                    (BoolOp::And, false) => Ok(Value::Bool(false)),
                    (BoolOp::Or, true) => Ok(Value::Bool(true)),
                    (BoolOp::And, true) => Ok(Value::Bool(as_bool(&right.eval(row)?)?)),
                    (BoolOp::Or, false) => Ok(Value::Bool(as_bool(&right.eval(row)?)?)),
                }
            }
            Expr::Compare(op, left, right) => {
                let lv = left.eval(row)?;
                let rv = right.eval(row)?;
                match op {
                    CompareOp::Eq => lv.eq_same_type(&rv).map(Value::Bool).ok_or_else(|| {
                        StorageError::TypeMismatch(format!(
                            "cannot compare {:?} = {:?}",
                            lv.data_type(),
                            rv.data_type()
                        ))
                    }),
                    CompareOp::Lt => lv
                        .cmp_same_type(&rv)
                        .map(|ord| Value::Bool(ord == std::cmp::Ordering::Less))
                        .ok_or_else(|| {
                            StorageError::TypeMismatch(format!(
                                "cannot compare {:?} < {:?}",
                                lv.data_type(),
                                rv.data_type()
                            ))
                        }),
                }
            }
        }
    }

    /// Evaluates this node as a predicate, requiring a boolean result.
    pub fn eval_bool(&self, row: &[Value]) -> StorageResult<bool> {
        as_bool(&self.eval(row)?)
    }
}

fn as_bool(v: &Value) -> StorageResult<bool> {
    v.as_bool()
        .ok_or_else(|| StorageError::TypeMismatch(format!("expected BOOL, found {:?}", v.data_type())))
}
