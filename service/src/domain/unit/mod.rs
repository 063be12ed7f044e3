//! [`Unit`] definitions.

pub mod code;

use std::{cmp::Ordering, str::FromStr};

use common::{define_kind, marker, DateTime, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{broker, incorporation, plan, reservation};
#[cfg(doc)]
use crate::domain::{Incorporation, Plan, Reservation};

pub use self::code::Code;

/// Atomic sellable entity of an [`Incorporation`].
///
/// Identified by a unique [`Code`] and a `(tower, floor, stack)` position.
/// Never hard-deleted: trimming a position out of the active layout moves
/// the [`Unit`] to [`Status::Blocked`] instead.
#[derive(Clone, Debug)]
pub struct Unit {
    /// ID of this [`Unit`].
    pub id: Id,

    /// ID of the [`Incorporation`] owning this [`Unit`].
    pub incorporation_id: incorporation::Id,

    /// ID of the [`Plan`] this [`Unit`] is assigned to.
    ///
    /// Unassigned [`Unit`]s exist transiently.
    pub plan_id: Option<plan::Id>,

    /// [`Code`] of this [`Unit`], unique within its [`Incorporation`]
    /// case-insensitively.
    pub code: Code,

    /// [`Tower`] of this [`Unit`], if it belongs to one.
    pub tower: Option<Tower>,

    /// Floor of this [`Unit`].
    pub floor: Floor,

    /// [`Stack`] (column label) of this [`Unit`] within its floor.
    pub stack: Stack,

    /// Number of bedrooms, inherited from the [`Plan`].
    pub bedrooms: plan::Bedrooms,

    /// Area, inherited from the [`Plan`].
    pub area: plan::Area,

    /// List price of this [`Unit`].
    pub list_price: Option<Money>,

    /// Current [`Status`] of this [`Unit`].
    pub status: Status,

    /// ID of the broker holding this [`Unit`], if reserved.
    ///
    /// Set and cleared together with [`reservation_expires_at`] only through
    /// [`Unit::hold()`] and [`Unit::clear_hold()`].
    ///
    /// [`reservation_expires_at`]: Unit::reservation_expires_at
    pub reserved_by: Option<broker::Id>,

    /// [`DateTime`] when the active hold on this [`Unit`] expires.
    pub reservation_expires_at: Option<reservation::ExpirationDateTime>,

    /// [`DateTime`] when this [`Unit`] was created.
    pub created_at: CreationDateTime,
}

impl Unit {
    /// Indicates whether this [`Unit`] is visible (occupies its position in
    /// the active layout).
    #[must_use]
    pub fn is_visible(&self) -> bool {
        match self.status {
            Status::Available | Status::Reserved | Status::Sold => true,
            Status::Blocked => false,
        }
    }

    /// Indicates whether this [`Unit`] is [`Status::Reserved`] under a hold
    /// already past its expiration (or missing its hold pair entirely).
    ///
    /// Expiration is persisted lazily, on the next state transition, so
    /// reads consult this instead of trusting the stored [`Status`].
    #[must_use]
    pub fn hold_lapsed(&self, now: DateTime) -> bool {
        self.status == Status::Reserved
            && !self
                .reservation_expires_at
                .is_some_and(|at| at > now.coerce())
    }

    /// Returns the [`Status`] of this [`Unit`] as observed at `now`: a
    /// [`Status::Reserved`] one whose hold has lapsed is reported
    /// [`Status::Available`], without writing the transition back.
    #[must_use]
    pub fn observed_status(&self, now: DateTime) -> Status {
        if self.hold_lapsed(now) {
            Status::Available
        } else {
            self.status
        }
    }

    /// Places a hold on this [`Unit`], setting the hold pair together.
    pub fn hold(
        &mut self,
        holder: broker::Id,
        expires_at: reservation::ExpirationDateTime,
    ) {
        self.status = Status::Reserved;
        self.reserved_by = Some(holder);
        self.reservation_expires_at = Some(expires_at);
    }

    /// Clears the hold pair of this [`Unit`] without touching its
    /// [`Status`].
    pub fn clear_hold(&mut self) {
        self.reserved_by = None;
        self.reservation_expires_at = None;
    }

    /// Applies the provided [`Plan`]'s inheritable attributes to this
    /// [`Unit`].
    pub fn inherit_plan(&mut self, plan: &plan::Plan) {
        self.plan_id = Some(plan.id);
        self.bedrooms = plan.bedrooms;
        self.area = plan.area;
        self.list_price = plan.base_price;
    }
}

/// ID of a [`Unit`].
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
    #[doc = "Status of a [`Unit`]. `Sold` is terminal for this engine."]
    enum Status {
        #[doc = "Open for reservation."]
        Available = 1,

        #[doc = "Held by a broker under an active reservation."]
        Reserved = 2,

        #[doc = "Sold; status, position and plan are immutable."]
        Sold = 3,

        #[doc = "Trimmed out of the active layout."]
        Blocked = 4,
    }
}

/// Block label a [`Unit`] belongs to.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Tower(String);

impl Tower {
    /// Creates a new [`Tower`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `label` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Creates a new [`Tower`] if the given `label` is valid.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        Self::check(&label).then_some(Self(label))
    }

    /// Returns the string view of this [`Tower`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether the given `label` is a valid [`Tower`].
    fn check(label: impl AsRef<str>) -> bool {
        let label = label.as_ref();
        label.trim() == label && !label.is_empty() && label.len() <= 64
    }
}

impl FromStr for Tower {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Tower`")
    }
}

/// Floor number of a [`Unit`].
pub type Floor = i16;

/// Column label of a [`Unit`] within a floor.
///
/// Kept as a string so it can be alphanumeric (`01`, `02A`, `B`).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Stack(String);

impl Stack {
    /// Creates a new [`Stack`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `label` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Creates a new [`Stack`] if the given `label` is valid.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Option<Self> {
        let label = label.into();
        Self::check(&label).then_some(Self(label))
    }

    /// Returns the string view of this [`Stack`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether the given `label` is a valid [`Stack`].
    fn check(label: impl AsRef<str>) -> bool {
        let label = label.as_ref();
        !label.is_empty()
            && label.len() <= 16
            && label.chars().all(|c| c.is_ascii_alphanumeric())
    }

    /// Compares two [`Stack`]s in layout order: numerically when both sides
    /// parse as numbers, lexicographically (case-insensitive) otherwise.
    #[must_use]
    pub fn layout_cmp(&self, other: &Self) -> Ordering {
        if let (Ok(a), Ok(b)) = (self.0.parse::<u64>(), other.0.parse::<u64>())
        {
            a.cmp(&b)
        } else {
            self.0
                .to_ascii_uppercase()
                .cmp(&other.0.to_ascii_uppercase())
        }
    }
}

impl FromStr for Stack {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Stack`")
    }
}

/// [`DateTime`] when a [`Unit`] was created.
pub type CreationDateTime = DateTimeOf<(Unit, marker::Creation)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use rust_decimal::Decimal;

    use crate::domain::{broker, incorporation, plan};

    use super::{Code, Stack, Status, Unit};

    fn stack(s: &str) -> Stack {
        Stack::new(s).unwrap()
    }

    fn unit(status: Status) -> Unit {
        Unit {
            id: super::Id::new(),
            incorporation_id: incorporation::Id::new(),
            plan_id: None,
            code: Code::new("A0101").unwrap(),
            tower: None,
            floor: 1,
            stack: stack("01"),
            bedrooms: 1,
            area: plan::Area::new(Decimal::from(40)).unwrap(),
            list_price: None,
            status,
            reserved_by: None,
            reservation_expires_at: None,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn lapsed_hold_is_observed_as_available() {
        let now = DateTime::now();
        let mut u = unit(Status::Available);
        u.hold(
            broker::Id::from(uuid::Uuid::new_v4()),
            (now - Duration::from_secs(60)).coerce(),
        );

        assert!(u.hold_lapsed(now));
        assert_eq!(u.observed_status(now), Status::Available);
        // The stored state stays untouched until a transition persists it.
        assert_eq!(u.status, Status::Reserved);
    }

    #[test]
    fn live_hold_is_observed_as_reserved() {
        let now = DateTime::now();
        let mut u = unit(Status::Available);
        u.hold(
            broker::Id::from(uuid::Uuid::new_v4()),
            (now + Duration::from_secs(30 * 60)).coerce(),
        );

        assert!(!u.hold_lapsed(now));
        assert_eq!(u.observed_status(now), Status::Reserved);
    }

    #[test]
    fn reserved_unit_without_hold_pair_is_observed_as_available() {
        let now = DateTime::now();
        let mut u = unit(Status::Reserved);
        u.clear_hold();

        assert!(u.hold_lapsed(now));
        assert_eq!(u.observed_status(now), Status::Available);
    }

    #[test]
    fn unreserved_statuses_are_observed_as_stored() {
        let now = DateTime::now();

        for status in [Status::Available, Status::Sold, Status::Blocked] {
            let u = unit(status);
            assert!(!u.hold_lapsed(now));
            assert_eq!(u.observed_status(now), status);
        }
    }

    #[test]
    fn layout_cmp_is_numeric_for_numeric_stacks() {
        assert!(stack("2").layout_cmp(&stack("10")).is_lt());
        assert!(stack("01").layout_cmp(&stack("2")).is_lt());
        assert!(stack("10").layout_cmp(&stack("10")).is_eq());
    }

    #[test]
    fn layout_cmp_falls_back_to_string_order() {
        assert!(stack("A").layout_cmp(&stack("B")).is_lt());
        assert!(stack("a").layout_cmp(&stack("B")).is_lt());
        assert!(stack("02A").layout_cmp(&stack("10")).is_lt());
    }

    #[test]
    fn rejects_non_alphanumeric_labels() {
        assert!(Stack::new("").is_none());
        assert!(Stack::new("0 1").is_none());
        assert!(Stack::new("01-A").is_none());
    }
}
