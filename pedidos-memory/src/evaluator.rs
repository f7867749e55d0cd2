//! Filter expression evaluation for the in-memory backend.
//!
//! Evaluates the gateway's filter AST directly against BSON documents,
//! with the same semantics the MongoDB translation produces: numeric types
//! compare by value, string containment is case-insensitive.

use bson::{Bson, Document, oid::ObjectId};
use std::{cmp::Ordering, collections::HashMap};

use pedidos_core::{
    error::{GatewayError, GatewayResult},
    query::{Expr, FieldOp, QueryVisitor},
};

/// Type-erased, comparable view of a BSON value.
///
/// Normalizes all numeric types to f64 so `Int32(5)` and `Int64(5)` compare
/// equal, the way the store's query engine treats them.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    String(&'a str),
    ObjectId(&'a ObjectId),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::ObjectId(value) => Comparable::ObjectId(value),
            Bson::Array(arr) => Comparable::Array(
                arr.iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>(),
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => {
                a.bytes().partial_cmp(&b.bytes())
            }
            _ => None,
        }
    }
}

/// Evaluates filter expressions against one document.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> GatewayResult<bool> {
        self.visit_expr(expr)
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = GatewayError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        match self.document.get(field) {
            Some(field_value) => match op {
                FieldOp::Eq => Ok(Comparable::from(field_value) == Comparable::from(value)),
                FieldOp::Ne => Ok(Comparable::from(field_value) != Comparable::from(value)),
                FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => {
                    match Comparable::from(field_value).partial_cmp(&Comparable::from(value)) {
                        Some(ordering) => Ok(match op {
                            FieldOp::Gt => ordering == Ordering::Greater,
                            FieldOp::Gte => ordering != Ordering::Less,
                            FieldOp::Lt => ordering == Ordering::Less,
                            FieldOp::Lte => ordering != Ordering::Greater,
                            _ => unreachable!(),
                        }),
                        None => Ok(false),
                    }
                }
                FieldOp::Contains => match Comparable::from(field_value) {
                    // String containment matches the store translation:
                    // substring, case-insensitive.
                    Comparable::String(left) => match Comparable::from(value) {
                        Comparable::String(right) => {
                            Ok(left.to_lowercase().contains(&right.to_lowercase()))
                        }
                        _ => Ok(false),
                    },
                    Comparable::Array(array) => Ok(array
                        .iter()
                        .any(|item| item == &Comparable::from(value))),
                    _ => Ok(false),
                },
            },
            None => Ok(false),
        }
    }
}

/// Raw-filter equality match, used by bulk operations whose predicates are
/// plain documents rather than filter expressions. Every filter field must
/// equal the corresponding document field (numeric types compare by value).
pub(crate) fn matches_raw_filter(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(field, expected)| {
        document
            .get(field)
            .is_some_and(|actual| Comparable::from(actual) == Comparable::from(expected))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use pedidos_core::query::Filter;

    fn evaluate(document: &Document, expr: &Expr) -> bool {
        DocumentEvaluator::new(document).evaluate(expr).unwrap()
    }

    #[test]
    fn contains_is_case_insensitive_on_strings() {
        let document = doc! { "name": "Tacos El Rey" };
        assert!(evaluate(&document, &Filter::contains("name", "tacos")));
        assert!(evaluate(&document, &Filter::contains("name", "REY")));
        assert!(!evaluate(&document, &Filter::contains("name", "sushi")));
    }

    #[test]
    fn numeric_types_compare_by_value() {
        let document = doc! { "order_id": 42_i64 };
        assert!(evaluate(&document, &Filter::eq("order_id", 42_i32)));
        assert!(evaluate(&document, &Filter::gte("order_id", 42.0)));
        assert!(!evaluate(&document, &Filter::lt("order_id", 42_i32)));
    }

    #[test]
    fn missing_fields_never_match() {
        let document = doc! { "name": "Pasta House" };
        assert!(!evaluate(&document, &Filter::eq("cuisine", "Italian")));
    }

    #[test]
    fn raw_filter_matches_on_every_field() {
        let document = doc! { "order_id": 42_i64, "restaurant": "Pasta House" };
        assert!(matches_raw_filter(&document, &doc! { "order_id": 42 }));
        assert!(matches_raw_filter(
            &document,
            &doc! { "order_id": 42, "restaurant": "Pasta House" }
        ));
        assert!(!matches_raw_filter(
            &document,
            &doc! { "order_id": 42, "restaurant": "Tacos El Rey" }
        ));
    }
}
