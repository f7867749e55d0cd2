//! Query construction for the document store.
//!
//! This module provides the pieces a list request is assembled from:
//!
//! - [`Expr`]/[`Filter`] - the filter predicate AST, built by the per-entity
//!   filter types in [`crate::model`]
//! - [`Query`]/[`QueryBuilder`] - the normalized query descriptor a backend
//!   executes (filter, optional field mask, optional sort key, pagination
//!   window)
//! - [`ListParams`] - the entity-agnostic caller inputs (`fields`, `sort_by`,
//!   `order`, `skip`, `limit`) and their defaults
//! - [`QueryVisitor`] - the seam each backend implements to translate or
//!   evaluate filter expressions
//!
//! Filter construction is entity-specific; everything else here is shared
//! across the five entity types.

use bson::Bson;
use std::str::FromStr;

use crate::error::{GatewayError, GatewayResult};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl FromStr for SortDirection {
    type Err = GatewayError;

    /// Parses the caller-supplied `order` token (`asc`/`desc`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(GatewayError::Validation(format!(
                "order must be 'asc' or 'desc', got '{other}'"
            ))),
        }
    }
}

/// Sort specification: a single field name and a direction.
#[derive(Debug, Clone)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone)]
pub enum FieldOp {
    /// Exact match.
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// Case-insensitive substring match on string fields.
    Contains,
}

/// A filter expression over documents.
///
/// Leaf nodes compare one field against a value; `And`/`Or` combine
/// sub-expressions. Backends never see this type directly at execution time,
/// only through their [`QueryVisitor`].
#[derive(Debug, Clone)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Field comparison expression.
    Field {
        /// The field name to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Bson,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }
}

/// Helper struct for constructing filter expressions.
pub struct Filter;

impl Filter {
    /// Exact-match filter on a field.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Not-equal filter on a field.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    /// Greater-than filter on a field.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    /// Greater-than-or-equal filter on a field.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Less-than filter on a field.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    /// Less-than-or-equal filter on a field.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Case-insensitive substring filter on a string field.
    pub fn contains(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Contains, value.into())
    }

    /// Logical AND over a set of expressions.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    /// Logical OR over a set of expressions.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }
}

/// The normalized query descriptor a backend executes.
///
/// A backend applies the parts in order: filter, projection, sort, skip,
/// limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Optional filter expression to match documents.
    pub filter: Option<Expr>,
    /// Optional field-inclusion mask. When present, only the named fields
    /// plus the identity field are returned.
    pub projection: Option<Vec<String>>,
    /// Optional single-key sort.
    pub sort: Option<Sort>,
    /// Number of matching documents to skip.
    pub skip: u64,
    /// Maximum number of documents to return.
    pub limit: Option<i64>,
}

impl Query {
    /// Creates a new empty query: no filter, no mask, no sort, no window.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

/// Fluent builder for [`Query`].
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Sets the filter expression for this query.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Sets the field-inclusion mask.
    pub fn projection(mut self, fields: Vec<String>) -> Self {
        self.query.projection = Some(fields);
        self
    }

    /// Sets the sort key and direction.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort { field: field.into(), direction });
        self
    }

    /// Sets the number of matching documents to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.query.skip = skip;
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: i64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

/// The caller-supplied, entity-agnostic part of a list request.
///
/// Carries the projection list, sort key/direction, and pagination window
/// with the gateway's defaults (`skip = 0`, `limit = 10`, `order = asc`).
/// The entity-specific filter is supplied separately when the descriptor is
/// built, see [`ListParams::into_query`].
#[derive(Debug, Clone)]
pub struct ListParams {
    /// Comma-separated field names to project, or `None` for full documents.
    pub fields: Option<String>,
    /// Field to sort by, or `None` for store order.
    pub sort_by: Option<String>,
    /// Sort direction, applied only when `sort_by` is present.
    pub order: SortDirection,
    /// Number of matching documents to skip.
    pub skip: u64,
    /// Maximum number of documents to return, at least 1.
    pub limit: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            fields: None,
            sort_by: None,
            order: SortDirection::Asc,
            skip: 0,
            limit: 10,
        }
    }
}

impl ListParams {
    /// Builds the normalized [`Query`] from these parameters and an optional
    /// entity-specific filter expression.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when `limit` is below 1.
    pub fn into_query(self, filter: Option<Expr>) -> GatewayResult<Query> {
        if self.limit < 1 {
            return Err(GatewayError::Validation(format!(
                "limit must be at least 1, got {}",
                self.limit
            )));
        }

        let mut builder = Query::builder()
            .skip(self.skip)
            .limit(self.limit);

        if let Some(expr) = filter {
            builder = builder.filter(expr);
        }
        if let Some(fields) = &self.fields {
            let mask = fields
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>();

            if !mask.is_empty() {
                builder = builder.projection(mask);
            }
        }
        if let Some(sort_by) = self.sort_by {
            builder = builder.sort(sort_by, self.order);
        }

        Ok(builder.build())
    }
}

/// Visitor over filter expressions.
///
/// Each backend implements this once: the MongoDB backend translates
/// expressions into native filter documents, the in-memory backend evaluates
/// them against a document.
pub trait QueryVisitor {
    type Output;
    type Error: Into<GatewayError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_list_contract() {
        let params = ListParams::default();
        assert_eq!(params.skip, 0);
        assert_eq!(params.limit, 10);
        assert_eq!(params.order, SortDirection::Asc);

        let query = params.into_query(None).unwrap();
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, Some(10));
        assert!(query.filter.is_none());
        assert!(query.projection.is_none());
        assert!(query.sort.is_none());
    }

    #[test]
    fn rejects_limit_below_one() {
        let params = ListParams { limit: 0, ..Default::default() };
        assert!(matches!(
            params.into_query(None),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn splits_the_projection_list() {
        let params = ListParams {
            fields: Some("name, price,restaurant_id".to_string()),
            ..Default::default()
        };
        let query = params.into_query(None).unwrap();
        assert_eq!(
            query.projection.unwrap(),
            vec!["name", "price", "restaurant_id"]
        );
    }

    #[test]
    fn blank_projection_list_means_no_mask() {
        let params = ListParams { fields: Some(" , ".to_string()), ..Default::default() };
        assert!(params.into_query(None).unwrap().projection.is_none());
    }

    #[test]
    fn parses_order_tokens() {
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!("ascending".parse::<SortDirection>().is_err());
    }

    #[test]
    fn and_flattens_into_existing_conjunction() {
        let expr = Filter::eq("restaurant", "Tacos El Rey")
            .and(Filter::eq("date", "2026-08-01"))
            .and(Filter::gte("rating", 4));

        match expr {
            Expr::And(list) => assert_eq!(list.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
    }
}
