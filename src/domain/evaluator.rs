//! Expression evaluation against tag activation

use super::expression::{Expression, Operator};

/// Source of per-tag activation answers
pub trait LabelActivation {
    fn check_label_activated(&mut self, name: &str) -> bool;
}

/// True iff any of `expressions` holds
pub fn is_any_active<A: LabelActivation + ?Sized>(
    activation: &mut A,
    expressions: &[Expression],
) -> bool {
    expressions
        .iter()
        .any(|expr| evaluate_expression(activation, expr))
}

/// Evaluate a single expression
pub fn evaluate_expression<A: LabelActivation + ?Sized>(
    activation: &mut A,
    expr: &Expression,
) -> bool {
    match expr {
        Expression::Tag(name) => activation.check_label_activated(name),
        Expression::Sequence(items) => is_all_of(activation, items),
        Expression::Operators(ops) => {
            if ops.iter().any(|op| matches!(op, Operator::Invalid(_))) {
                return false;
            }
            ops.iter().all(|op| match op {
                Operator::All(items) => is_all_of(activation, items),
                Operator::Any(items) => is_any_of(activation, items),
                Operator::Not(inner) => is_not_of(activation, inner),
                Operator::Invalid(_) => false,
            })
        }
        Expression::Unsupported => false,
    }
}

fn is_all_of<A: LabelActivation + ?Sized>(activation: &mut A, items: &[Expression]) -> bool {
    items.iter().all(|item| evaluate_expression(activation, item))
}

fn is_any_of<A: LabelActivation + ?Sized>(activation: &mut A, items: &[Expression]) -> bool {
    items.iter().any(|item| evaluate_expression(activation, item))
}

fn is_not_of<A: LabelActivation + ?Sized>(activation: &mut A, inner: &Expression) -> bool {
    !evaluate_expression(activation, inner)
}
