//! [`Reservation`] read model definitions.

#[cfg(doc)]
use crate::domain::{reservation::Status, Reservation};

/// Wrapper around a [`Reservation`] indicating that its [`Status`] is
/// [`Status::Active`].
#[derive(Clone, Debug)]
pub struct Active<T>(pub T);
