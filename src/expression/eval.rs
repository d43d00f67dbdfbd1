//! Expression evaluation implementation.

use crate::access::{Record, Value};
use crate::error::{QueryError, QueryResult};
use crate::expression::{BinaryOperator, Expression, Function, UnaryOperator};
use std::cmp::Ordering;

/// Evaluator for filter expressions against a single record view
pub struct ExpressionEvaluator<'a> {
    record: &'a Record,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(record: &'a Record) -> Self {
        Self { record }
    }

    /// Evaluate an expression and return the result
    pub fn evaluate(&self, expr: &Expression) -> QueryResult<Value> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::FieldRef(name) => self
                .resolve_field(name)
                .cloned()
                .ok_or_else(|| QueryError::unknown_field(name.as_str())),

            Expression::BinaryOp { op, left, right } => {
                // Both sides are always evaluated so a type error on the right
                // is reported even when the left decides the result.
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                evaluate_binary_op(*op, left_val, right_val)
            }

            Expression::UnaryOp { op, operand } => {
                let operand_val = self.evaluate(operand)?;
                evaluate_unary_op(*op, operand_val)
            }

            Expression::Call { function, args } => {
                if args.len() != function.arity() {
                    return Err(QueryError::malformed(format!(
                        "Function {} expects {} arguments, got {}",
                        function,
                        function.arity(),
                        args.len()
                    )));
                }
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<QueryResult<Vec<_>>>()?;
                evaluate_function(*function, &values)
            }
        }
    }

    /// Look up a field or a `/`-separated path into nested records
    fn resolve_field(&self, path: &str) -> Option<&'a Value> {
        let mut segments = path.split('/');
        let mut current = self.record.get(segments.next()?)?;
        for segment in segments {
            match current {
                Value::Record(nested) => current = nested.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Evaluate an expression that must produce a boolean
    pub fn evaluate_predicate(&self, expr: &Expression) -> QueryResult<bool> {
        match self.evaluate(expr)? {
            Value::Boolean(b) => Ok(b),
            other => Err(QueryError::type_mismatch(
                "filter",
                other.type_name(),
                "Boolean",
            )),
        }
    }
}

fn evaluate_binary_op(op: BinaryOperator, left: Value, right: Value) -> QueryResult<Value> {
    match op {
        BinaryOperator::And | BinaryOperator::Or => match (&left, &right) {
            (Value::Boolean(a), Value::Boolean(b)) => {
                let result = if op == BinaryOperator::And {
                    *a && *b
                } else {
                    *a || *b
                };
                Ok(Value::Boolean(result))
            }
            _ => Err(mismatch(op, &left, &right)),
        },
        _ => compare_values(op, &left, &right).map(Value::Boolean),
    }
}

/// Comparison coercion: numbers compare as f64, strings support only
/// equality, anything else falls back to value equality for `eq`/`ne`.
fn compare_values(op: BinaryOperator, left: &Value, right: &Value) -> QueryResult<bool> {
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return Ok(match op {
            BinaryOperator::Eq => a == b,
            BinaryOperator::Ne => a != b,
            _ => apply_ordering(op, a.partial_cmp(&b)),
        });
    }

    match op {
        BinaryOperator::Eq => Ok(left.loosely_equals(right)),
        BinaryOperator::Ne => Ok(!left.loosely_equals(right)),
        _ => Err(mismatch(op, left, right)),
    }
}

// NaN compares false against everything
fn apply_ordering(op: BinaryOperator, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        BinaryOperator::Gt => ordering == Ordering::Greater,
        BinaryOperator::Ge => ordering != Ordering::Less,
        BinaryOperator::Lt => ordering == Ordering::Less,
        BinaryOperator::Le => ordering != Ordering::Greater,
        _ => false,
    }
}

fn evaluate_unary_op(op: UnaryOperator, operand: Value) -> QueryResult<Value> {
    match (op, &operand) {
        (UnaryOperator::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOperator::Minus, Value::Int32(n)) => Ok(Value::Int32(n.wrapping_neg())),
        (UnaryOperator::Minus, Value::Double(d)) => Ok(Value::Double(-d)),
        _ => Err(QueryError::type_mismatch(
            op.as_str(),
            operand.type_name(),
            "None",
        )),
    }
}

fn evaluate_function(function: Function, args: &[Value]) -> QueryResult<Value> {
    match (args[0].as_str(), args[1].as_str()) {
        (Some(haystack), Some(needle)) => Ok(Value::Boolean(match function {
            Function::Contains => haystack.contains(needle),
            Function::StartsWith => haystack.starts_with(needle),
        })),
        _ => Err(QueryError::type_mismatch(
            function.as_str(),
            args[0].type_name(),
            args[1].type_name(),
        )),
    }
}

fn mismatch(op: BinaryOperator, left: &Value, right: &Value) -> QueryError {
    QueryError::type_mismatch(op.as_str(), left.type_name(), right.type_name())
}

/// Helper function to evaluate an expression against a record
pub fn evaluate_expression(expr: &Expression, record: &Record) -> QueryResult<Value> {
    ExpressionEvaluator::new(record).evaluate(expr)
}

/// Helper function to test whether a record matches a filter
pub fn matches(expr: &Expression, record: &Record) -> QueryResult<bool> {
    ExpressionEvaluator::new(record).evaluate_predicate(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Record {
        Record::new()
            .with("ID", 4)
            .with("Name", "Mouse Optical")
            .with("Description", Value::Null)
            .with("Price", 15.0)
            .with("BrandID", 3)
    }

    fn lit(value: impl Into<Value>) -> Expression {
        Expression::literal(value)
    }

    fn field(name: &str) -> Expression {
        Expression::field(name)
    }

    #[test]
    fn test_navigation_path() {
        let record = product().with(
            "Brand",
            Record::new().with("ID", 3).with("Country", "China"),
        );
        let evaluator = ExpressionEvaluator::new(&record);

        assert_eq!(
            evaluator.evaluate(&field("Brand/Country")).unwrap(),
            Value::from("China")
        );
        assert_eq!(
            evaluator.evaluate(&field("Brand/Founded")),
            Err(QueryError::unknown_field("Brand/Founded"))
        );
        assert_eq!(
            evaluator.evaluate(&field("Name/Length")),
            Err(QueryError::unknown_field("Name/Length"))
        );
    }

    #[test]
    fn test_literal_and_field_evaluation() {
        let record = product();
        let evaluator = ExpressionEvaluator::new(&record);

        assert_eq!(evaluator.evaluate(&lit(42)).unwrap(), Value::Int32(42));
        assert_eq!(evaluator.evaluate(&lit("hi")).unwrap(), Value::from("hi"));
        assert_eq!(evaluator.evaluate(&field("Price")).unwrap(), Value::Double(15.0));
        assert_eq!(evaluator.evaluate(&field("Description")).unwrap(), Value::Null);
    }

    #[test]
    fn test_unknown_field() {
        let record = product();
        let evaluator = ExpressionEvaluator::new(&record);

        assert_eq!(
            evaluator.evaluate(&field("price")),
            Err(QueryError::unknown_field("price"))
        );
        let expr = Expression::gt(field("Weight"), lit(1));
        assert!(matches!(
            evaluator.evaluate(&expr),
            Err(QueryError::UnknownField { name }) if name == "Weight"
        ));
    }

    #[test]
    fn test_numeric_comparisons_promote() {
        let record = product();
        let evaluator = ExpressionEvaluator::new(&record);

        let cases = vec![
            (Expression::gt(field("Price"), lit(10)), true),
            (Expression::lt(field("Price"), lit(20)), true),
            (Expression::ge(field("Price"), lit(15)), true),
            (Expression::le(field("Price"), lit(14.5)), false),
            (Expression::eq(field("Price"), lit(15)), true),
            (Expression::ne(field("BrandID"), lit(3.0)), false),
            (Expression::eq(field("ID"), lit(4)), true),
        ];
        for (expr, expected) in cases {
            assert_eq!(
                evaluator.evaluate(&expr).unwrap(),
                Value::Boolean(expected),
                "{}",
                expr
            );
        }
    }

    #[test]
    fn test_string_comparisons() {
        let record = product();
        let evaluator = ExpressionEvaluator::new(&record);

        let expr = Expression::eq(field("Name"), lit("Mouse Optical"));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(true));

        let expr = Expression::ne(field("Name"), lit("mouse optical"));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(true));

        let expr = Expression::gt(field("Name"), lit("Apple"));
        assert!(matches!(
            evaluator.evaluate(&expr),
            Err(QueryError::TypeMismatch { operator, .. }) if operator == "gt"
        ));
    }

    #[test]
    fn test_mixed_type_comparisons() {
        let record = product();
        let evaluator = ExpressionEvaluator::new(&record);

        let expr = Expression::eq(field("ID"), lit("4"));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(false));

        let expr = Expression::ne(field("ID"), lit("4"));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(true));

        let expr = Expression::eq(field("Description"), Expression::Literal(Value::Null));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(true));

        let expr = Expression::eq(lit(true), lit(true));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(true));

        let expr = Expression::lt(field("ID"), lit("5"));
        assert!(matches!(
            evaluator.evaluate(&expr),
            Err(QueryError::TypeMismatch { .. })
        ));

        let expr = Expression::ge(lit(true), lit(false));
        assert!(matches!(
            evaluator.evaluate(&expr),
            Err(QueryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_logical_operations() {
        let record = product();
        let evaluator = ExpressionEvaluator::new(&record);

        let expr = Expression::and(lit(true), lit(false));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(false));

        let expr = Expression::or(lit(false), lit(true));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(true));

        let expr = Expression::not_expr(Expression::eq(field("ID"), lit(4)));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(false));

        let expr = Expression::and(lit(true), field("Price"));
        assert_eq!(
            evaluator.evaluate(&expr),
            Err(QueryError::type_mismatch("and", "Boolean", "Double"))
        );

        let expr = Expression::not_expr(field("Name"));
        assert!(matches!(
            evaluator.evaluate(&expr),
            Err(QueryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_errors_not_masked_by_short_circuit() {
        let record = product();
        let evaluator = ExpressionEvaluator::new(&record);

        let expr = Expression::or(lit(true), Expression::gt(field("Name"), lit("a")));
        assert!(matches!(
            evaluator.evaluate(&expr),
            Err(QueryError::TypeMismatch { .. })
        ));

        let expr = Expression::and(lit(false), field("Missing"));
        assert!(matches!(
            evaluator.evaluate(&expr),
            Err(QueryError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_unary_minus() {
        let record = product();
        let evaluator = ExpressionEvaluator::new(&record);

        assert_eq!(evaluator.evaluate(&Expression::neg(lit(5))).unwrap(), Value::Int32(-5));
        assert_eq!(
            evaluator.evaluate(&Expression::neg(field("Price"))).unwrap(),
            Value::Double(-15.0)
        );
        assert_eq!(
            evaluator.evaluate(&Expression::neg(lit(i32::MIN))).unwrap(),
            Value::Int32(i32::MIN)
        );
        assert!(matches!(
            evaluator.evaluate(&Expression::neg(lit("x"))),
            Err(QueryError::TypeMismatch { .. })
        ));

        let expr = Expression::gt(field("Price"), Expression::neg(lit(1)));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_string_functions() {
        let record = product();
        let evaluator = ExpressionEvaluator::new(&record);

        let expr = Expression::contains(field("Name"), lit("Mouse"));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(true));

        let expr = Expression::contains(field("Name"), lit("mouse"));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(false));

        let expr = Expression::starts_with(field("Name"), lit("Mouse"));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(true));

        let expr = Expression::starts_with(field("Name"), lit("Optical"));
        assert_eq!(evaluator.evaluate(&expr).unwrap(), Value::Boolean(false));

        let expr = Expression::contains(field("Price"), lit("1"));
        assert_eq!(
            evaluator.evaluate(&expr),
            Err(QueryError::type_mismatch("contains", "Double", "String"))
        );

        let expr = Expression::contains(field("Description"), lit("USB"));
        assert!(matches!(
            evaluator.evaluate(&expr),
            Err(QueryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_wrong_arity_is_malformed() {
        let record = product();
        let expr = Expression::call(Function::Contains, vec![field("Name")]);
        assert!(matches!(
            evaluate_expression(&expr, &record),
            Err(QueryError::MalformedFilter { .. })
        ));
    }

    #[test]
    fn test_predicate_requires_boolean() {
        let record = product();

        assert!(matches(&Expression::gt(field("Price"), lit(10)), &record).unwrap());
        assert!(!matches(&Expression::gt(field("Price"), lit(100)), &record).unwrap());
        assert!(matches!(
            matches(&field("Price"), &record),
            Err(QueryError::TypeMismatch { .. })
        ));
    }
}
