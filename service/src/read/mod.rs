//! Read entities definitions.

pub mod incorporation;
pub mod reservation;
pub mod unit;
