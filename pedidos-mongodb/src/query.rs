//! Query translation from the gateway's filter AST to MongoDB syntax.
//!
//! Filter expressions become native BSON filter documents; the projection
//! mask and sort key become the corresponding find-option documents.

use bson::{Bson, Document, doc};

use pedidos_core::{
    error::GatewayError,
    query::{Expr, FieldOp, QueryVisitor, Sort, SortDirection},
};

/// Translates filter expressions into MongoDB filter documents.
pub(crate) struct MongoQueryTranslator;

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = GatewayError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$or": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::Contains => match value {
                    Bson::String(s) => doc! { "$regex": format!(".*{}.*", s), "$options": "i" },
                    Bson::Array(arr) => doc! { "$all": arr },
                    _ => return Err(GatewayError::Backend(
                        "Contains operator requires a string or array value".to_string(),
                    )),
                },
            }
        })
    }
}

/// Builds the inclusion projection document for a field mask. The identity
/// field is included by the store by default.
pub(crate) fn projection_document(fields: &[String]) -> Document {
    fields.iter().map(|field| (field.clone(), Bson::from(1))).collect()
}

/// Builds the sort document for a single-key sort.
pub(crate) fn sort_document(sort: &Sort) -> Document {
    doc! {
        sort.field.clone(): match sort.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedidos_core::query::Filter;

    #[test]
    fn contains_translates_to_case_insensitive_regex() {
        let filter = MongoQueryTranslator
            .visit_expr(&Filter::contains("name", "tacos"))
            .unwrap();

        assert_eq!(
            filter,
            doc! { "name": { "$regex": ".*tacos.*", "$options": "i" } }
        );
    }

    #[test]
    fn conjunction_translates_to_and() {
        let filter = MongoQueryTranslator
            .visit_expr(&Filter::eq("restaurant", "Pasta House").and(Filter::eq("date", "2026-08-01")))
            .unwrap();

        assert_eq!(
            filter,
            doc! { "$and": [
                { "restaurant": { "$eq": "Pasta House" } },
                { "date": { "$eq": "2026-08-01" } },
            ]}
        );
    }

    #[test]
    fn projection_includes_each_named_field() {
        let projection = projection_document(&[
            "name".to_string(),
            "price".to_string(),
        ]);
        assert_eq!(projection, doc! { "name": 1, "price": 1 });
    }
}
