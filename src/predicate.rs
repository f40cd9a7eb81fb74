//! Predicate expressions carried by CONDITION edges and loop continuation
//! fields.
//!
//! The editor authors predicates structurally (dropdowns, not a text
//! language), so the model is a closed, serde-tagged AST rather than a parsed
//! grammar. Evaluation is pure and total: a predicate can never fail a turn,
//! only answer `true` or `false`.

use crate::value::Value;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators available to condition blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Contains => "contains",
        };
        write!(f, "{}", symbol)
    }
}

/// A boolean expression over the context variable map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Predicate {
    /// Compares a variable against a literal value.
    Compare {
        var: String,
        op: CompareOp,
        value: Value,
    },
    /// True when every child predicate is true. Short-circuits.
    All { preds: Vec<Predicate> },
    /// True when any child predicate is true. Short-circuits.
    Any { preds: Vec<Predicate> },
    Not { pred: Box<Predicate> },
    /// True when the variable exists and is not null.
    IsSet { var: String },
}

impl Predicate {
    pub fn compare(var: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            var: var.into(),
            op,
            value: value.into(),
        }
    }

    /// Evaluates the predicate against the variable map.
    ///
    /// A missing variable reads as [`Value::Null`]. Ordered comparisons on
    /// values with no numeric view are `false` rather than an error; a
    /// non-programmer's predicate must never abort a walk.
    pub fn evaluate(&self, variables: &AHashMap<String, Value>) -> bool {
        match self {
            Predicate::Compare { var, op, value } => {
                let lhs = variables.get(var).unwrap_or(&Value::Null);
                compare(lhs, *op, value)
            }
            Predicate::All { preds } => preds.iter().all(|p| p.evaluate(variables)),
            Predicate::Any { preds } => preds.iter().any(|p| p.evaluate(variables)),
            Predicate::Not { pred } => !pred.evaluate(variables),
            Predicate::IsSet { var } => {
                !matches!(variables.get(var), None | Some(Value::Null))
            }
        }
    }
}

fn compare(lhs: &Value, op: CompareOp, rhs: &Value) -> bool {
    match op {
        CompareOp::Eq => loose_eq(lhs, rhs),
        CompareOp::Ne => !loose_eq(lhs, rhs),
        CompareOp::Gt => ordered(lhs, rhs, |l, r| l > r),
        CompareOp::Ge => ordered(lhs, rhs, |l, r| l >= r),
        CompareOp::Lt => ordered(lhs, rhs, |l, r| l < r),
        CompareOp::Le => ordered(lhs, rhs, |l, r| l <= r),
        CompareOp::Contains => lhs.render().contains(&rhs.render()),
    }
}

/// Equality with numeric coercion, so `"5" == 5` holds for postback payloads.
fn loose_eq(lhs: &Value, rhs: &Value) -> bool {
    if lhs == rhs {
        return true;
    }
    match (lhs.as_number(), rhs.as_number()) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

fn ordered(lhs: &Value, rhs: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (lhs.as_number(), rhs.as_number()) {
        (Some(l), Some(r)) => cmp(l, r),
        _ => false,
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { var, op, value } => write!(f, "${} {} {}", var, op, value),
            Predicate::All { preds } => write_joined(f, preds, " AND "),
            Predicate::Any { preds } => write_joined(f, preds, " OR "),
            Predicate::Not { pred } => write!(f, "NOT ({})", pred),
            Predicate::IsSet { var } => write!(f, "${} is set", var),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, preds: &[Predicate], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, pred) in preds.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", pred)?;
    }
    write!(f, ")")
}
