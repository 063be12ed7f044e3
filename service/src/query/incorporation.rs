//! [`Query`] collection related to a single [`Incorporation`].

use common::operations::By;

use crate::domain::{incorporation, Incorporation};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Incorporation`] by its [`incorporation::Id`].
pub type ById = DatabaseQuery<By<Option<Incorporation>, incorporation::Id>>;
