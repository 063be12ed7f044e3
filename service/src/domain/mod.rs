//! Domain definitions.

pub mod broker;
pub mod commission;
pub mod incorporation;
pub mod layout;
pub mod lead;
pub mod plan;
pub mod reservation;
pub mod sale;
pub mod unit;

pub use self::{
    commission::Commission, incorporation::Incorporation, plan::Plan,
    reservation::Reservation, sale::Sale, unit::Unit,
};
