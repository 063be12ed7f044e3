//! [`Incorporation`] definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{marker, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Plan, Unit};

/// Multi-unit development project owning [`Plan`]s and [`Unit`]s.
#[derive(Clone, Debug)]
pub struct Incorporation {
    /// ID of this [`Incorporation`].
    pub id: Id,

    /// [`Name`] of this [`Incorporation`].
    pub name: Name,

    /// Commission percentage applied to sales in this [`Incorporation`].
    pub commission_percent: Option<Percent>,

    /// Displayed starting price of this [`Incorporation`].
    ///
    /// Derived as the minimum price among its active priced [`Plan`]s.
    pub price_from: Option<Money>,

    /// [`DateTime`] when this [`Incorporation`] was created.
    pub created_at: CreationDateTime,
}

/// ID of an [`Incorporation`].
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

/// Name of an [`Incorporation`].
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

/// [`DateTime`] when an [`Incorporation`] was created.
pub type CreationDateTime = DateTimeOf<(Incorporation, marker::Creation)>;
