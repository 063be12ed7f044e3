//! [`Query`] collection related to [`Unit`]s.

use common::operations::By;

use crate::domain::{incorporation, plan, unit, Unit};
#[cfg(doc)]
use crate::{domain::{Incorporation, Plan}, Query};

use super::DatabaseQuery;

/// Queries a [`Unit`] by its [`unit::Id`].
pub type ById = DatabaseQuery<By<Option<Unit>, unit::Id>>;

/// Queries all the [`Unit`]s of an [`Incorporation`], mirror feed included.
pub type OfIncorporation = DatabaseQuery<By<Vec<Unit>, incorporation::Id>>;

/// Queries all the [`Unit`]s of a [`Plan`].
pub type OfPlan = DatabaseQuery<By<Vec<Unit>, plan::Id>>;
