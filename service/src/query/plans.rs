//! [`Query`] collection related to multiple [`Plan`]s.

use common::operations::By;

use crate::domain::{incorporation, plan, Plan};
#[cfg(doc)]
use crate::{domain::Incorporation, Query};

use super::DatabaseQuery;

/// Queries a [`Plan`] by its [`plan::Id`].
pub type ById = DatabaseQuery<By<Option<Plan>, plan::Id>>;

/// Queries all the [`Plan`]s of an [`Incorporation`].
pub type OfIncorporation = DatabaseQuery<By<Vec<Plan>, incorporation::Id>>;
