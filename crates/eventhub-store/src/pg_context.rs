//! `PostgreSQL` implementation of the `Store` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::debug;

use eventhub_core::entity::{Include, Predicate};
use eventhub_core::error::DomainError;
use eventhub_core::store::Store;
use eventhub_events::data::entities::{EventEntity, EventPackageEntity, PackageEntity};

use crate::predicate::push_where;

const EVENT_COLUMNS: &str = "SELECT id, image, title, description, location, event_date FROM events";
const PACKAGE_COLUMNS: &str =
    "SELECT id, title, seating_arrangement, placement, price, currency FROM packages";
const JOIN_COLUMNS: &str = "SELECT id, event_id, package_id FROM event_packages";

#[derive(Debug, FromRow)]
struct EventRow {
    id: String,
    image: Option<String>,
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    event_date: Option<NaiveDateTime>,
}

impl From<EventRow> for EventEntity {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            image: row.image,
            title: row.title,
            description: row.description,
            location: row.location,
            event_date: row.event_date,
            packages: Vec::new(),
        }
    }
}

#[derive(Debug, FromRow)]
struct PackageRow {
    id: String,
    title: String,
    seating_arrangement: Option<String>,
    placement: Option<String>,
    price: Decimal,
    currency: String,
}

impl From<PackageRow> for PackageEntity {
    fn from(row: PackageRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            seating_arrangement: row.seating_arrangement,
            placement: row.placement,
            price: row.price,
            currency: row.currency,
        }
    }
}

#[derive(Debug, FromRow)]
struct JoinRow {
    id: String,
    event_id: String,
    package_id: String,
}

impl From<JoinRow> for EventPackageEntity {
    fn from(row: JoinRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            package_id: row.package_id,
            package: None,
        }
    }
}

/// Maps a driver error onto the domain taxonomy, keeping its message.
fn to_domain(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return DomainError::Conflict(db.message().to_owned());
        }
        return DomainError::Persistence(db.message().to_owned());
    }
    DomainError::Persistence(err.to_string())
}

async fn insert_package(conn: &mut PgConnection, package: &PackageEntity) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO packages (id, title, seating_arrangement, placement, price, currency) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&package.id)
    .bind(&package.title)
    .bind(&package.seating_arrangement)
    .bind(&package.placement)
    .bind(package.price)
    .bind(&package.currency)
    .execute(conn)
    .await?;
    Ok(())
}

/// Inserts a join row, preceded by the package it carries, if any.
async fn insert_join(conn: &mut PgConnection, join: &EventPackageEntity) -> Result<(), sqlx::Error> {
    if let Some(package) = &join.package {
        insert_package(&mut *conn, package).await?;
    }
    sqlx::query("INSERT INTO event_packages (id, event_id, package_id) VALUES ($1, $2, $3)")
        .bind(&join.id)
        .bind(&join.event_id)
        .bind(&join.package_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// PostgreSQL-backed storage context.
#[derive(Debug, Clone)]
pub struct PgContext {
    pool: PgPool,
}

impl PgContext {
    /// Creates a new `PgContext`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn packages_by_id(&self, ids: Vec<String>) -> Result<HashMap<String, PackageEntity>, sqlx::Error> {
        let rows: Vec<PackageRow> =
            sqlx::query_as(&format!("{PACKAGE_COLUMNS} WHERE id = ANY($1)"))
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.id.clone(), PackageEntity::from(row)))
            .collect())
    }

    /// Attaches join rows (and their packages when asked) to `events`.
    async fn load_relations(
        &self,
        events: &mut [EventEntity],
        include: Include,
    ) -> Result<(), sqlx::Error> {
        if !include.joins() || events.is_empty() {
            return Ok(());
        }
        let event_ids: Vec<String> = events.iter().map(|e| e.id.clone()).collect();
        let joins: Vec<JoinRow> =
            sqlx::query_as(&format!("{JOIN_COLUMNS} WHERE event_id = ANY($1) ORDER BY id"))
                .bind(event_ids)
                .fetch_all(&self.pool)
                .await?;

        let packages = if include.targets() {
            self.packages_by_id(joins.iter().map(|j| j.package_id.clone()).collect())
                .await?
        } else {
            HashMap::new()
        };

        for row in joins {
            let mut join = EventPackageEntity::from(row);
            join.package = packages.get(&join.package_id).cloned();
            if let Some(event) = events.iter_mut().find(|e| e.id == join.event_id) {
                event.packages.push(join);
            }
        }
        Ok(())
    }

    async fn select_events(
        &self,
        predicate: &Predicate,
        limit_one: bool,
    ) -> Result<Vec<EventEntity>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(EVENT_COLUMNS);
        push_where(&mut builder, predicate);
        if limit_one {
            builder.push(" LIMIT 1");
        }
        let rows: Vec<EventRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(EventEntity::from).collect())
    }

    async fn exists(&self, table: &str, predicate: &Predicate) -> Result<bool, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT EXISTS (SELECT 1 FROM ");
        builder.push(table);
        push_where(&mut builder, predicate);
        builder.push(")");
        builder.build_query_scalar().fetch_one(&self.pool).await
    }

    async fn delete_by_id(&self, table: &str, id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Loads join rows; with `Include::Joins` or deeper each row carries its
    /// package.
    async fn fetch_joins(
        &self,
        predicate: &Predicate,
        include: Include,
        limit_one: bool,
    ) -> Result<Vec<EventPackageEntity>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(JOIN_COLUMNS);
        push_where(&mut builder, predicate);
        if limit_one {
            builder.push(" LIMIT 1");
        }
        let rows: Vec<JoinRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(to_domain)?;

        let packages = if include.joins() {
            self.packages_by_id(rows.iter().map(|r| r.package_id.clone()).collect())
                .await
                .map_err(to_domain)?
        } else {
            HashMap::new()
        };
        Ok(rows
            .into_iter()
            .map(|row| {
                let mut join = EventPackageEntity::from(row);
                join.package = packages.get(&join.package_id).cloned();
                join
            })
            .collect())
    }
}

#[async_trait]
impl Store<EventEntity> for PgContext {
    async fn insert(&self, entity: &EventEntity) -> Result<(), DomainError> {
        debug!(id = %entity.id, joins = entity.packages.len(), "inserting event graph");
        let mut tx = self.pool.begin().await.map_err(to_domain)?;
        sqlx::query(
            "INSERT INTO events (id, image, title, description, location, event_date) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&entity.id)
        .bind(&entity.image)
        .bind(&entity.title)
        .bind(&entity.description)
        .bind(&entity.location)
        .bind(entity.event_date)
        .execute(&mut *tx)
        .await
        .map_err(to_domain)?;

        for join in &entity.packages {
            insert_join(&mut *tx, join).await.map_err(to_domain)?;
        }
        tx.commit().await.map_err(to_domain)
    }

    async fn fetch_all(&self, include: Include) -> Result<Vec<EventEntity>, DomainError> {
        let mut events = self
            .select_events(&Predicate::all(), false)
            .await
            .map_err(to_domain)?;
        self.load_relations(&mut events, include)
            .await
            .map_err(to_domain)?;
        Ok(events)
    }

    async fn fetch_first(
        &self,
        predicate: &Predicate,
        include: Include,
    ) -> Result<Option<EventEntity>, DomainError> {
        predicate.validate::<EventEntity>()?;
        let mut events = self.select_events(predicate, true).await.map_err(to_domain)?;
        self.load_relations(&mut events, include)
            .await
            .map_err(to_domain)?;
        Ok(events.into_iter().next())
    }

    async fn find(&self, id: &str) -> Result<Option<EventEntity>, DomainError> {
        let mut events = self
            .select_events(&Predicate::id(id), true)
            .await
            .map_err(to_domain)?;
        Ok(events.pop())
    }

    async fn replace(&self, entity: &EventEntity) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE events SET image = $2, title = $3, description = $4, location = $5, \
             event_date = $6 WHERE id = $1",
        )
        .bind(&entity.id)
        .bind(&entity.image)
        .bind(&entity.title)
        .bind(&entity.description)
        .bind(&entity.location)
        .bind(entity.event_date)
        .execute(&self.pool)
        .await
        .map_err(to_domain)?;
        Ok(result.rows_affected())
    }

    async fn remove(&self, id: &str) -> Result<u64, DomainError> {
        self.delete_by_id("events", id).await.map_err(to_domain)
    }

    async fn any(&self, predicate: &Predicate) -> Result<bool, DomainError> {
        predicate.validate::<EventEntity>()?;
        self.exists("events", predicate).await.map_err(to_domain)
    }
}

#[async_trait]
impl Store<PackageEntity> for PgContext {
    async fn insert(&self, entity: &PackageEntity) -> Result<(), DomainError> {
        let mut conn = self.pool.acquire().await.map_err(to_domain)?;
        insert_package(&mut *conn, entity).await.map_err(to_domain)
    }

    async fn fetch_all(&self, _include: Include) -> Result<Vec<PackageEntity>, DomainError> {
        let rows: Vec<PackageRow> = sqlx::query_as(PACKAGE_COLUMNS)
            .fetch_all(&self.pool)
            .await
            .map_err(to_domain)?;
        Ok(rows.into_iter().map(PackageEntity::from).collect())
    }

    async fn fetch_first(
        &self,
        predicate: &Predicate,
        _include: Include,
    ) -> Result<Option<PackageEntity>, DomainError> {
        predicate.validate::<PackageEntity>()?;
        let mut builder = QueryBuilder::<Postgres>::new(PACKAGE_COLUMNS);
        push_where(&mut builder, predicate);
        builder.push(" LIMIT 1");
        let row: Option<PackageRow> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(to_domain)?;
        Ok(row.map(PackageEntity::from))
    }

    async fn find(&self, id: &str) -> Result<Option<PackageEntity>, DomainError> {
        Store::<PackageEntity>::fetch_first(self, &Predicate::id(id), Include::Nothing).await
    }

    async fn replace(&self, entity: &PackageEntity) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE packages SET title = $2, seating_arrangement = $3, placement = $4, \
             price = $5, currency = $6 WHERE id = $1",
        )
        .bind(&entity.id)
        .bind(&entity.title)
        .bind(&entity.seating_arrangement)
        .bind(&entity.placement)
        .bind(entity.price)
        .bind(&entity.currency)
        .execute(&self.pool)
        .await
        .map_err(to_domain)?;
        Ok(result.rows_affected())
    }

    async fn remove(&self, id: &str) -> Result<u64, DomainError> {
        self.delete_by_id("packages", id).await.map_err(to_domain)
    }

    async fn any(&self, predicate: &Predicate) -> Result<bool, DomainError> {
        predicate.validate::<PackageEntity>()?;
        self.exists("packages", predicate).await.map_err(to_domain)
    }
}

#[async_trait]
impl Store<EventPackageEntity> for PgContext {
    async fn insert(&self, entity: &EventPackageEntity) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(to_domain)?;
        insert_join(&mut *tx, entity).await.map_err(to_domain)?;
        tx.commit().await.map_err(to_domain)
    }

    async fn fetch_all(&self, include: Include) -> Result<Vec<EventPackageEntity>, DomainError> {
        self.fetch_joins(&Predicate::all(), include, false).await
    }

    async fn fetch_first(
        &self,
        predicate: &Predicate,
        include: Include,
    ) -> Result<Option<EventPackageEntity>, DomainError> {
        predicate.validate::<EventPackageEntity>()?;
        let mut joins = self.fetch_joins(predicate, include, true).await?;
        Ok(joins.pop())
    }

    async fn find(&self, id: &str) -> Result<Option<EventPackageEntity>, DomainError> {
        let mut joins = self
            .fetch_joins(&Predicate::id(id), Include::Nothing, true)
            .await?;
        Ok(joins.pop())
    }

    async fn replace(&self, entity: &EventPackageEntity) -> Result<u64, DomainError> {
        let result =
            sqlx::query("UPDATE event_packages SET event_id = $2, package_id = $3 WHERE id = $1")
                .bind(&entity.id)
                .bind(&entity.event_id)
                .bind(&entity.package_id)
                .execute(&self.pool)
                .await
                .map_err(to_domain)?;
        Ok(result.rows_affected())
    }

    async fn remove(&self, id: &str) -> Result<u64, DomainError> {
        self.delete_by_id("event_packages", id)
            .await
            .map_err(to_domain)
    }

    async fn any(&self, predicate: &Predicate) -> Result<bool, DomainError> {
        predicate.validate::<EventPackageEntity>()?;
        self.exists("event_packages", predicate)
            .await
            .map_err(to_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventhub_core::entity::Entity;

    #[test]
    fn test_non_database_errors_become_persistence_faults() {
        let err = to_domain(sqlx::Error::RowNotFound);
        assert!(matches!(err, DomainError::Persistence(_)));
    }

    #[test]
    fn test_entity_names_match_table_fields() {
        assert!(EventEntity::FIELDS.contains(&"event_date"));
        assert!(PackageEntity::FIELDS.contains(&"seating_arrangement"));
        assert!(EventPackageEntity::FIELDS.contains(&"package_id"));
    }
}
