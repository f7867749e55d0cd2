//! Convenient re-exports of commonly used types from pedidos.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use pedidos::prelude::*;
//! ```

pub use pedidos_core::{
    backend::{GroupStats, StoreBackend},
    blob::{BlobBackend, BlobStore, StoredBlob},
    bulk::{BulkEngine, BulkOp, BulkOpRequest, BulkOpType, BulkSummary, KNOWN_COLLECTIONS},
    entity::{Entity, EntityExt},
    error::{ErrorCategory, GatewayError, GatewayResult},
    gateway::Gateway,
    id::EntityId,
    model::{
        GeoPoint, MenuItem, MenuItemFilter, Order, OrderFilter, Restaurant, RestaurantFilter,
        Review, ReviewFilter, User, UserFilter,
    },
    query::{Expr, FieldOp, Filter, ListParams, Query, QueryBuilder, QueryVisitor, Sort, SortDirection},
    report::{CuisineList, DailyRevenue, ExpensiveItem, OrdersTotal, ReportEngine, RestaurantRating},
    repository::Repository,
};
