//! Restricted arithmetic for math expressions.
//!
//! Only the five ETL operators over numbers are supported. Operations are
//! applied strictly left to right with no precedence: `(3 + 4 * 2)` is
//! `(3 + 4) * 2`, which is 14.

use etl_types::ast::MathOp;

/// Reason a single operation could not produce a number.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MathError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("{lhs} {op} {rhs} is not a finite number")]
    NotFinite { lhs: f64, op: MathOp, rhs: f64 },
}

/// Apply one operation. The evaluator folds a math group by calling this
/// for each operator in source order.
pub fn apply(op: MathOp, lhs: f64, rhs: f64) -> Result<f64, MathError> {
    let result = match op {
        MathOp::Add => lhs + rhs,
        MathOp::Subtract => lhs - rhs,
        MathOp::Multiply => lhs * rhs,
        MathOp::Divide => {
            if rhs == 0.0 {
                return Err(MathError::DivisionByZero);
            }
            lhs / rhs
        }
        MathOp::Exponent => lhs.powf(rhs),
    };
    if result.is_finite() {
        Ok(result)
    } else {
        Err(MathError::NotFinite { lhs, op, rhs })
    }
}
