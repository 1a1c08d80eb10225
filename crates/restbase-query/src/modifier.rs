use crate::filter::validate_column_name;
use crate::parts::{NullsPosition, OrderClause, OrderDirection, QueryParts};

/// Trait providing modifier methods (order, limit, offset, range).
pub trait Modifiable: Sized {
    /// Get a mutable reference to the accumulated parts.
    fn parts_mut(&mut self) -> &mut QueryParts;

    /// Order by a column. Repeated calls add lower-priority sort keys.
    fn order(mut self, column: &str, direction: OrderDirection) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in order: {e}");
            self.parts_mut().reject(format!("order: {}", e.message()));
            return self;
        }
        self.parts_mut().orders.push(OrderClause {
            column: column.to_string(),
            direction,
            nulls: None,
        });
        self
    }

    /// Order by a column with explicit nulls positioning.
    fn order_with_nulls(
        mut self,
        column: &str,
        direction: OrderDirection,
        nulls: NullsPosition,
    ) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in order_with_nulls: {e}");
            self.parts_mut()
                .reject(format!("order_with_nulls: {}", e.message()));
            return self;
        }
        self.parts_mut().orders.push(OrderClause {
            column: column.to_string(),
            direction,
            nulls: Some(nulls),
        });
        self
    }

    /// Limit the number of rows returned.
    fn limit(mut self, count: u64) -> Self {
        self.parts_mut().limit = Some(count);
        self
    }

    /// Skip the first `count` rows.
    fn offset(mut self, count: u64) -> Self {
        self.parts_mut().offset = Some(count);
        self
    }

    /// Inclusive row range: `offset = from`, `limit = to - from + 1`.
    ///
    /// `to < from` yields `limit = 0`.
    fn range(mut self, from: u64, to: u64) -> Self {
        let parts = self.parts_mut();
        parts.offset = Some(from);
        parts.limit = Some(to.saturating_add(1).saturating_sub(from));
        self
    }
}
