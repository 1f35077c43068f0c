//! Compiles `Predicate` conditions into a SQL `WHERE` clause.

use eventhub_core::entity::{Predicate, Value};
use sqlx::{Postgres, QueryBuilder};

/// Appends ` WHERE a = $1 AND b IS NULL ...` for `predicate`. Field names
/// must already be validated against the entity's declared fields; values
/// are always bound.
pub(crate) fn push_where(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    for (i, condition) in predicate.conditions().iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(condition.field);
        match &condition.value {
            Value::Null => {
                builder.push(" IS NULL");
            }
            Value::Text(text) => {
                builder.push(" = ").push_bind(text.clone());
            }
            Value::Decimal(decimal) => {
                builder.push(" = ").push_bind(*decimal);
            }
            Value::Timestamp(timestamp) => {
                builder.push(" = ").push_bind(*timestamp);
            }
        }
    }
}
