//! [`Command`] for placing a [`Reservation`] on a [`Unit`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{broker, lead, reservation, unit, Reservation, Unit},
    infra::{database, Database},
    read::reservation::Active,
    Service,
};

use super::Command;

/// [`Command`] for placing a [`Reservation`] on a [`Unit`].
///
/// The [`Unit`] row is locked for the whole transition, so two brokers
/// racing for the same [`Unit`] serialize: the first wins, the second
/// observes [`unit::Status::Reserved`] and fails.
#[derive(Clone, Debug)]
pub struct ReserveUnit {
    /// [`broker::Actor`] placing a [`Reservation`].
    pub actor: broker::Actor,

    /// ID of the [`Unit`] to reserve.
    pub unit_id: unit::Id,

    /// ID of the CRM lead a [`Reservation`] is made for.
    pub lead_id: Option<lead::Id>,

    /// Free-form note to attach to a [`Reservation`].
    pub note: Option<reservation::Note>,
}

impl<Db> Command<ReserveUnit> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Reservation>>, unit::Id>>,
            Ok = Option<Active<Reservation>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Reservation>, Err = Traced<database::Error>>
        + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<Update<Unit>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ReserveUnit) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReserveUnit {
            actor,
            unit_id,
            lead_id,
            note,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut unit = tx
            .execute(Lock(By::<Option<Unit>, _>::new(unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(unit_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        drop(
            super::resolve_expired(&tx, &mut unit, now)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?,
        );

        if unit.status != unit::Status::Available {
            return Err(tracerr::new!(E::UnitNotAvailable {
                id: unit.id,
                status: unit.status,
            }));
        }

        let expires_at = (now + self.config.reservation_ttl).coerce();
        let reservation = Reservation {
            id: reservation::Id::new(),
            unit_id: unit.id,
            holder_id: actor.id,
            lead_id,
            note,
            status: reservation::Status::Active,
            created_at: now.coerce(),
            expires_at,
            resolved_at: None,
        };
        unit.hold(actor.id, expires_at);

        tx.execute(Insert(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(unit))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(reservation)
    }
}

/// Error of [`ReserveUnit`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Unit`] is not open for reservation.
    #[display("`Unit(id: {id})` is not available: {status}")]
    UnitNotAvailable {
        /// ID of the [`Unit`].
        id: unit::Id,

        /// Actual [`unit::Status`] of the [`Unit`].
        status: unit::Status,
    },

    /// [`Unit`] with the provided ID does not exist.
    #[display("`Unit(id: {_0})` does not exist")]
    UnitNotExists(#[error(not(source))] unit::Id),
}
