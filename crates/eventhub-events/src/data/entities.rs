//! Persistence entities for events, packages and the join between them.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use eventhub_core::entity::{Entity, Value, new_identity};

/// A stored event. `packages` holds join rows and is only populated when the
/// read asked for them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventEntity {
    /// Identity; assigned on insert when empty.
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
    /// Join rows to the event's packages.
    pub packages: Vec<EventPackageEntity>,
}

impl EventEntity {
    /// A bare entity carrying only an identity.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Copy of this entity without relation data.
    #[must_use]
    pub fn scalars(&self) -> Self {
        Self {
            packages: Vec::new(),
            ..self.clone()
        }
    }
}

impl Entity for EventEntity {
    const NAME: &'static str = "event";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "image",
        "title",
        "description",
        "location",
        "event_date",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self) {
        if self.id.is_empty() {
            self.id = new_identity();
        }
        for join in &mut self.packages {
            join.assign_identity();
            join.event_id.clone_from(&self.id);
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id.as_str()),
            "image" => Value::from(self.image.clone()),
            "title" => Value::from(self.title.clone()),
            "description" => Value::from(self.description.clone()),
            "location" => Value::from(self.location.clone()),
            "event_date" => Value::from(self.event_date),
            _ => return None,
        };
        Some(value)
    }
}

/// A ticket package offered for an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageEntity {
    /// Identity; assigned on insert when empty.
    pub id: String,
    /// Title, e.g. "Standard".
    pub title: String,
    /// Seating arrangement.
    pub seating_arrangement: Option<String>,
    /// Placement within the venue.
    pub placement: Option<String>,
    /// Price in `currency`.
    pub price: Decimal,
    /// ISO currency code.
    pub currency: String,
}

impl Entity for PackageEntity {
    const NAME: &'static str = "package";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "seating_arrangement",
        "placement",
        "price",
        "currency",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self) {
        if self.id.is_empty() {
            self.id = new_identity();
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id.as_str()),
            "title" => Value::from(self.title.as_str()),
            "seating_arrangement" => Value::from(self.seating_arrangement.clone()),
            "placement" => Value::from(self.placement.clone()),
            "price" => Value::from(self.price),
            "currency" => Value::from(self.currency.as_str()),
            _ => return None,
        };
        Some(value)
    }
}

/// Join row linking one event to one package.
///
/// `package` is populated when the read loaded join targets, or when the row
/// is being inserted together with a new package.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPackageEntity {
    /// Identity; assigned on insert when empty.
    pub id: String,
    /// Owning event.
    pub event_id: String,
    /// Linked package.
    pub package_id: String,
    /// The linked package row.
    pub package: Option<PackageEntity>,
}

impl EventPackageEntity {
    /// A join row that will insert `package` alongside itself.
    #[must_use]
    pub fn for_new_package(package: PackageEntity) -> Self {
        Self {
            package: Some(package),
            ..Self::default()
        }
    }
}

impl Entity for EventPackageEntity {
    const NAME: &'static str = "event_package";
    const FIELDS: &'static [&'static str] = &["id", "event_id", "package_id"];

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self) {
        if self.id.is_empty() {
            self.id = new_identity();
        }
        if let Some(package) = &mut self.package {
            package.assign_identity();
            self.package_id.clone_from(&package.id);
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id.as_str()),
            "event_id" => Value::from(self.event_id.as_str()),
            "package_id" => Value::from(self.package_id.as_str()),
            _ => return None,
        };
        Some(value)
    }
}
