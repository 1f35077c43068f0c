//! Entity, predicate and relation-loading vocabulary shared by every store.

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::DomainError;

/// Field name every entity uses for its identity.
pub const ID_FIELD: &str = "id";

/// Returns a fresh opaque identity.
#[must_use]
pub fn new_identity() -> String {
    Uuid::new_v4().to_string()
}

/// A persistence-facing entity with a string identity.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    /// Human-readable entity kind, used in log output.
    const NAME: &'static str;

    /// Scalar fields a `Predicate` may filter on, `id` included.
    const FIELDS: &'static [&'static str];

    /// Returns the identity; empty until assigned.
    fn id(&self) -> &str;

    /// Fills every empty identity in this entity and its attached graph and
    /// wires foreign keys of attached rows to their owners.
    fn assign_identity(&mut self);

    /// Returns the value of a declared scalar field, `None` if `name` is not
    /// one of `FIELDS`.
    fn field(&self, name: &str) -> Option<Value>;
}

/// A scalar value a predicate compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text column.
    Text(String),
    /// Numeric column.
    Decimal(Decimal),
    /// Timestamp column without time zone.
    Timestamp(NaiveDateTime),
    /// SQL `NULL`.
    Null,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One `field = value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Declared field name.
    pub field: &'static str,
    /// Value the field must equal.
    pub value: Value,
}

/// Conjunction of equality conditions. An empty predicate matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// Matches every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches rows whose `field` equals `value`.
    #[must_use]
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    /// Matches the row with the given identity.
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::eq(ID_FIELD, Value::Text(id.into()))
    }

    /// Adds another condition.
    #[must_use]
    pub fn and(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field,
            value: value.into(),
        });
        self
    }

    /// The conditions in insertion order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Checks every condition names a field declared by `T`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the first unknown field.
    pub fn validate<T: Entity>(&self) -> Result<(), DomainError> {
        match self
            .conditions
            .iter()
            .find(|c| !T::FIELDS.contains(&c.field))
        {
            Some(c) => Err(DomainError::Validation(format!(
                "unknown {} field: {}",
                T::NAME,
                c.field
            ))),
            None => Ok(()),
        }
    }

    /// Evaluates the predicate against an in-memory entity.
    #[must_use]
    pub fn matches<T: Entity>(&self, entity: &T) -> bool {
        self.conditions
            .iter()
            .all(|c| entity.field(c.field).is_some_and(|v| v == c.value))
    }
}

/// Relation-loading depth applied to a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Include {
    /// Scalar fields only.
    #[default]
    Nothing,
    /// Join rows, without the rows they point at.
    Joins,
    /// Join rows and the rows they point at.
    JoinsAndTargets,
}

impl Include {
    /// Whether join rows are loaded.
    #[must_use]
    pub fn joins(self) -> bool {
        !matches!(self, Self::Nothing)
    }

    /// Whether join targets are loaded.
    #[must_use]
    pub fn targets(self) -> bool {
        matches!(self, Self::JoinsAndTargets)
    }
}
