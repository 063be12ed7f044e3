//! [`Reservation`] definitions.

use std::{str::FromStr, time::Duration};

use common::{define_kind, marker, DateTime, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{broker, lead, unit};
#[cfg(doc)]
use crate::domain::{Sale, Unit};

/// Default time-to-live of a [`Reservation`].
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Time-boxed exclusive hold of a [`Unit`] by a broker.
///
/// A [`Unit`] has at most one [`Status::Active`] [`Reservation`] at a time.
#[derive(Clone, Debug)]
pub struct Reservation {
    /// ID of this [`Reservation`].
    pub id: Id,

    /// ID of the held [`Unit`].
    pub unit_id: unit::Id,

    /// ID of the broker holding the [`Unit`].
    pub holder_id: broker::Id,

    /// ID of the CRM lead this [`Reservation`] is made for, if any.
    pub lead_id: Option<lead::Id>,

    /// Free-form [`Note`] attached by the holder.
    pub note: Option<Note>,

    /// Current [`Status`] of this [`Reservation`].
    pub status: Status,

    /// [`DateTime`] when this [`Reservation`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Reservation`] expires.
    ///
    /// [`DateTime`]: common::DateTime
    pub expires_at: ExpirationDateTime,

    /// [`DateTime`] when this [`Reservation`] left the [`Status::Active`]
    /// state, if it has.
    ///
    /// [`DateTime`]: common::DateTime
    pub resolved_at: Option<ResolutionDateTime>,
}

impl Reservation {
    /// Indicates whether this [`Reservation`] is still [`Status::Active`]
    /// but past its expiration.
    #[must_use]
    pub fn is_expired(&self, now: DateTime) -> bool {
        self.status == Status::Active && self.expires_at <= now.coerce()
    }

    /// Marks this [`Reservation`] as [`Status::Expired`].
    pub fn expire(&mut self, now: DateTime) {
        self.status = Status::Expired;
        self.resolved_at = Some(now.coerce());
    }

    /// Marks this [`Reservation`] as [`Status::Cancelled`].
    pub fn cancel(&mut self, now: DateTime) {
        self.status = Status::Cancelled;
        self.resolved_at = Some(now.coerce());
    }

    /// Marks this [`Reservation`] as [`Status::Converted`] into a [`Sale`].
    pub fn convert(&mut self, now: DateTime) {
        self.status = Status::Converted;
        self.resolved_at = Some(now.coerce());
    }
}

/// ID of a [`Reservation`].
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

define_kind! {
    #[doc = "Status of a [`Reservation`]."]
    enum Status {
        #[doc = "Hold is in force."]
        Active = 1,

        #[doc = "Hold was converted into a [`Sale`]."]
        Converted = 2,

        #[doc = "Hold lapsed past its expiration."]
        Expired = 3,

        #[doc = "Hold was explicitly cancelled."]
        Cancelled = 4,
    }
}

/// Free-form note attached to a [`Reservation`].
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

/// [`DateTime`] when a [`Reservation`] was created.
///
/// [`DateTime`]: common::DateTime
pub type CreationDateTime = DateTimeOf<(Reservation, marker::Creation)>;

/// [`DateTime`] when a [`Reservation`] expires.
///
/// [`DateTime`]: common::DateTime
pub type ExpirationDateTime = DateTimeOf<(Reservation, marker::Expiration)>;

/// [`DateTime`] when a [`Reservation`] was resolved.
///
/// [`DateTime`]: common::DateTime
pub type ResolutionDateTime = DateTimeOf<(Reservation, marker::Resolution)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::domain::{broker, unit};

    use super::{Reservation, Status};

    fn reservation(status: Status, expires_at: DateTime) -> Reservation {
        Reservation {
            id: super::Id::new(),
            unit_id: unit::Id::new(),
            holder_id: broker::Id::from(uuid::Uuid::new_v4()),
            lead_id: None,
            note: None,
            status,
            created_at: DateTime::now().coerce(),
            expires_at: expires_at.coerce(),
            resolved_at: None,
        }
    }

    #[test]
    fn active_past_expiration_is_expired() {
        let now = DateTime::now();
        let past = now - Duration::from_secs(10 * 60);

        assert!(reservation(Status::Active, past).is_expired(now));
        assert!(reservation(Status::Active, now).is_expired(now));
    }

    #[test]
    fn active_before_expiration_is_not_expired() {
        let now = DateTime::now();
        let future = now + Duration::from_secs(30 * 60);

        assert!(!reservation(Status::Active, future).is_expired(now));
    }

    #[test]
    fn resolved_statuses_never_expire() {
        let now = DateTime::now();
        let past = now - Duration::from_secs(60);

        assert!(!reservation(Status::Expired, past).is_expired(now));
        assert!(!reservation(Status::Cancelled, past).is_expired(now));
        assert!(!reservation(Status::Converted, past).is_expired(now));
    }

    #[test]
    fn expiring_records_resolution() {
        let now = DateTime::now();
        let mut r = reservation(Status::Active, now);

        r.expire(now);
        assert_eq!(r.status, Status::Expired);
        assert!(r.resolved_at.is_some());
    }
}
