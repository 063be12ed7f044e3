//! [`Incorporation`] read model definitions.

#[cfg(doc)]
use crate::domain::Incorporation;

/// Selector of all the [`Incorporation`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct All;
