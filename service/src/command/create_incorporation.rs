//! [`Command`] for creating a new [`Incorporation`].

use common::{operations::Insert, DateTime, Percent};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{broker, incorporation, Incorporation},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Incorporation`].
#[derive(Clone, Debug)]
pub struct CreateIncorporation {
    /// [`broker::Actor`] performing this [`Command`].
    pub actor: broker::Actor,

    /// Name of a new [`Incorporation`].
    pub name: incorporation::Name,

    /// Commission percentage applied to sales within a new
    /// [`Incorporation`].
    pub commission_percent: Option<Percent>,
}

impl<Db> Command<CreateIncorporation> for Service<Db>
where
    Db: Database<Insert<Incorporation>, Err = Traced<database::Error>>,
{
    type Ok = Incorporation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateIncorporation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateIncorporation {
            actor,
            name,
            commission_percent,
        } = cmd;

        if !actor.role.is_manager() {
            return Err(tracerr::new!(E::NotManager(actor.id)));
        }

        let incorporation = Incorporation {
            id: incorporation::Id::new(),
            name,
            commission_percent,
            price_from: None,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(incorporation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(incorporation)
    }
}

/// Error of [`CreateIncorporation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Broker is not allowed to manage inventory.
    #[display("`Broker(id: {_0})` is not a manager")]
    NotManager(#[error(not(source))] broker::Id),
}
