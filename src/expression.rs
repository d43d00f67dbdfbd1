//! Expression evaluation framework for filter predicates.
//!
//! This module provides:
//! - Expression AST representation
//! - Operator and built-in function definitions
//! - Expression evaluation against record views

pub mod eval;
pub mod expr;
pub mod operator;

pub use eval::{evaluate_expression, matches, ExpressionEvaluator};
pub use expr::Expression;
pub use operator::{BinaryOperator, Function, UnaryOperator};
