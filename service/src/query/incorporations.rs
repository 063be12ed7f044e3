//! [`Query`] collection related to multiple [`Incorporation`]s.

use common::operations::By;

use crate::{
    domain::Incorporation,
    read::incorporation::All as AllIncorporations,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Incorporation`]s.
pub type All = DatabaseQuery<By<Vec<Incorporation>, AllIncorporations>>;
