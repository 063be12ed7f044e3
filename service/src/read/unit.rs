//! [`Unit`] read model definitions.

use crate::domain::{incorporation, unit};
#[cfg(doc)]
use crate::domain::{Incorporation, Unit};

/// Selector of all [`Unit`]s occupying one `(tower, floor)` group of an
/// [`Incorporation`].
#[derive(Clone, Debug)]
pub struct Group {
    /// ID of the [`Incorporation`].
    pub incorporation_id: incorporation::Id,

    /// Tower of the group, if any.
    pub tower: Option<unit::Tower>,

    /// Floor of the group.
    pub floor: unit::Floor,
}

/// Distinct tower labels of an [`Incorporation`]'s [`Unit`]s.
///
/// `None` stands for units outside any tower.
#[derive(Clone, Debug, Default)]
pub struct Towers(pub Vec<Option<unit::Tower>>);
