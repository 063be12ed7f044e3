//! [`Sale`] definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{marker, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{commission::Commission, reservation, unit};
#[cfg(doc)]
use crate::domain::{Reservation, Unit};

/// Proposal record created when a [`Reservation`] converts into a sale.
///
/// Immutable once created.
#[derive(Clone, Debug)]
pub struct Sale {
    /// ID of this [`Sale`].
    pub id: Id,

    /// ID of the sold [`Unit`].
    pub unit_id: unit::Id,

    /// ID of the converted [`Reservation`].
    pub reservation_id: reservation::Id,

    /// Value the [`Unit`] was sold for.
    pub value: Money,

    /// Free-form [`Note`] attached on conversion.
    pub note: Option<Note>,

    /// [`Commission`] split of this [`Sale`].
    pub commission: Commission,

    /// [`DateTime`] when this [`Sale`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Sale`].
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

/// Free-form note attached to a [`Sale`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Note(String);

impl Note {
    /// Creates a new [`Note`] if the given `note` is valid.
    #[must_use]
    pub fn new(note: impl Into<String>) -> Option<Self> {
        let note = note.into();
        Self::check(&note).then_some(Self(note))
    }

    /// Checks whether the given `note` is a valid [`Note`].
    fn check(note: impl AsRef<str>) -> bool {
        let note = note.as_ref();
        note.trim() == note && !note.is_empty() && note.len() <= 2048
    }
}

impl FromStr for Note {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Note`")
    }
}

/// [`DateTime`] when a [`Sale`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Sale, marker::Creation)>;
