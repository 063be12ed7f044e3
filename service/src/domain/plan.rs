//! [`Plan`] definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{marker, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::incorporation;
#[cfg(doc)]
use crate::domain::{Incorporation, Unit};

/// Maximum number of [`Unit`]s a single [`Plan`] may generate from its
/// declared [`Shape`].
pub const MAX_GENERATED_UNITS: u32 = 3000;

/// Unit template ("tipologia") within an [`Incorporation`].
///
/// Describes the shared attributes [`Unit`]s inherit, together with an
/// advisory layout [`Shape`]: actual unit counts can diverge from the shape
/// after manual reconfiguration.
#[derive(Clone, Debug)]
pub struct Plan {
    /// ID of this [`Plan`].
    pub id: Id,

    /// ID of the [`Incorporation`] owning this [`Plan`].
    pub incorporation_id: incorporation::Id,

    /// [`Name`] of this [`Plan`].
    pub name: Name,

    /// Number of bedrooms of [`Unit`]s of this [`Plan`].
    pub bedrooms: Bedrooms,

    /// [`Area`] of [`Unit`]s of this [`Plan`].
    pub area: Area,

    /// Base price of [`Unit`]s of this [`Plan`].
    pub base_price: Option<Money>,

    /// Declared layout [`Shape`] of this [`Plan`].
    pub shape: Shape,

    /// Indicator whether this [`Plan`] is active.
    ///
    /// Only active [`Plan`]s with a [`price`] contribute to the
    /// [`Incorporation`]'s displayed starting price.
    ///
    /// [`price`]: Plan::price
    pub active: bool,

    /// Published price of this [`Plan`].
    ///
    /// Derived on publication as the minimum non-null list price among its
    /// [`Unit`]s, falling back to the [`base_price`].
    ///
    /// [`base_price`]: Plan::base_price
    pub price: Option<Money>,

    /// [`DateTime`] when this [`Plan`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Plan`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    derive_more::FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`Plan`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Number of bedrooms of a [`Plan`]'s [`Unit`]s.
pub type Bedrooms = u16;

/// Area of a [`Plan`]'s [`Unit`]s, in square meters.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Area(Decimal);

impl Area {
    /// Creates a new [`Area`] by checking the provided value is positive.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (val > Decimal::ZERO).then_some(Self(val))
    }

    /// Returns the inner [`Decimal`] value of this [`Area`].
    #[must_use]
    pub fn value(self) -> Decimal {
        self.0
    }
}

impl FromStr for Area {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Area` value")
    }
}

/// Declared layout shape of a [`Plan`].
#[derive(Clone, Debug)]
pub struct Shape {
    /// Number of blocks (towers) to generate.
    pub blocks_count: u16,

    /// Number of floors per block.
    pub floors_per_block: u16,

    /// Number of [`Unit`]s per floor.
    pub units_per_floor: u16,

    /// [`BlockPrefix`] prepended to generated block labels.
    pub block_prefix: Option<BlockPrefix>,
}

impl Shape {
    /// Returns the total number of [`Unit`]s this [`Shape`] generates.
    #[must_use]
    pub fn total_units(&self) -> u32 {
        u32::from(self.blocks_count)
            * u32::from(self.floors_per_block)
            * u32::from(self.units_per_floor)
    }
}

/// Prefix prepended to a [`Plan`]'s generated block labels.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct BlockPrefix(String);

impl BlockPrefix {
    /// Creates a new [`BlockPrefix`] if the given `prefix` is valid.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Option<Self> {
        let prefix = prefix.into();
        Self::check(&prefix).then_some(Self(prefix))
    }

    /// Checks whether the given `prefix` is a valid [`BlockPrefix`].
    fn check(prefix: impl AsRef<str>) -> bool {
        let prefix = prefix.as_ref();
        prefix.trim() == prefix && !prefix.is_empty() && prefix.len() <= 32
    }
}

impl FromStr for BlockPrefix {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `BlockPrefix`")
    }
}

/// [`DateTime`] when a [`Plan`] was created.
pub type CreationDateTime = DateTimeOf<(Plan, marker::Creation)>;
