//! Domain shapes for events and packages.
//!
//! These are what callers see. They are never persisted; the join rows
//! between events and packages are flattened away.

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::data::entities::{EventEntity, PackageEntity};

/// An event as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identity.
    pub id: String,
    /// Image reference.
    pub image: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Location.
    pub location: Option<String>,
    /// When the event takes place.
    pub event_date: Option<NaiveDateTime>,
    /// Attached packages; `None` for summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<Package>>,
}

impl Event {
    /// Summary of `entity` without package detail.
    #[must_use]
    pub fn summary(entity: &EventEntity) -> Self {
        Self {
            id: entity.id.clone(),
            image: entity.image.clone(),
            title: entity.title.clone(),
            description: entity.description.clone(),
            location: entity.location.clone(),
            event_date: entity.event_date,
            packages: None,
        }
    }

    /// Full view of `entity`, one `Package` per loaded join row. Join rows
    /// whose package was not loaded are skipped.
    #[must_use]
    pub fn detailed(entity: &EventEntity) -> Self {
        let packages = entity
            .packages
            .iter()
            .filter_map(|join| join.package.as_ref())
            .map(Package::from)
            .collect();
        Self {
            packages: Some(packages),
            ..Self::summary(entity)
        }
    }
}

/// A ticket package as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Package identity.
    pub id: String,
    /// Title.
    pub title: String,
    /// Seating arrangement.
    pub seating_arrangement: Option<String>,
    /// Placement.
    pub placement: Option<String>,
    /// Price, serialized as a decimal string.
    #[schema(value_type = String, example = "199")]
    pub price: Decimal,
    /// Currency code.
    pub currency: String,
}

impl From<&PackageEntity> for Package {
    fn from(entity: &PackageEntity) -> Self {
        Self {
            id: entity.id.clone(),
            title: entity.title.clone(),
            seating_arrangement: entity.seating_arrangement.clone(),
            placement: entity.placement.clone(),
            price: entity.price,
            currency: entity.currency.clone(),
        }
    }
}

/// Fields a caller supplies to create an event. Packages are derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Image reference.
    #[serde(default)]
    pub image: Option<String>,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Location.
    #[serde(default)]
    pub location: Option<String>,
    /// When the event takes place. Offset timestamps are normalized to UTC.
    #[serde(default, deserialize_with = "deserialize_event_date")]
    #[schema(value_type = Option<String>, example = "2025-06-01T18:00:00.000Z")]
    pub event_date: Option<NaiveDateTime>,
}

/// Parses an event date given either as RFC 3339 with an offset
/// (`2025-06-01T18:00:00.000Z`), which is converted to UTC, or as a local
/// timestamp without one (`2025-06-01T18:00:00`).
///
/// # Errors
///
/// Returns a description of the input when neither form matches.
pub fn parse_event_date(raw: &str) -> Result<NaiveDateTime, String> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.naive_utc());
    }
    raw.parse::<NaiveDateTime>()
        .map_err(|e| format!("invalid event date `{raw}`: {e}"))
}

fn deserialize_event_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_event_date(&raw).map_err(serde::de::Error::custom))
        .transpose()
}
