//! GraphQL API definitions.

pub mod incorporation;
mod mutation;
pub mod plan;
mod query;
pub mod reservation;
pub mod sale;
pub mod scalar;
pub mod unit;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{
    incorporation::Incorporation, mutation::Mutation, plan::Plan,
    query::Query, reservation::Reservation, sale::Sale, unit::Unit,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

define_error! {
    enum PrivilegeError {
        #[code = "NOT_MANAGER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `Broker` must be a manager"]
        Manager,

        #[code = "NOT_HOLDER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `Broker` neither holds the `Reservation` \
                     nor is a manager"]
        Holder,
    }
}
