//! [`Command`] for cancelling an active [`Reservation`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{broker, reservation, unit, Reservation, Unit},
    infra::{database, Database},
    read::reservation::Active,
    Service,
};

use super::Command;

/// [`Command`] for cancelling an active [`Reservation`].
///
/// Only the holding broker or a manager may cancel. A [`Reservation`] found
/// lapsed is expired instead (and the expiration is committed), which still
/// fails the cancellation.
#[derive(Clone, Debug)]
pub struct ReleaseReservation {
    /// [`broker::Actor`] performing this [`Command`].
    pub actor: broker::Actor,

    /// ID of the [`Reservation`] to cancel.
    pub reservation_id: reservation::Id,
}

impl<Db> Command<ReleaseReservation> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Reservation>, reservation::Id>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Reservation>>, unit::Id>>,
            Ok = Option<Active<Reservation>>,
            Err = Traced<database::Error>,
        > + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<Update<Unit>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ReleaseReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReleaseReservation {
            actor,
            reservation_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let reservation = tx
            .execute(Select(By::<Option<Reservation>, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())?;
        if !actor.may_act_for(reservation.holder_id) {
            return Err(tracerr::new!(E::NotHolder(actor.id)));
        }

        let mut unit = tx
            .execute(Lock(By::<Option<Unit>, _>::new(reservation.unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(reservation.unit_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let expired = super::resolve_expired(&tx, &mut unit, now)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if expired == Some(reservation_id) {
            // Keep the expiration even though the cancellation fails.
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            return Err(tracerr::new!(E::ReservationNotActive(reservation_id)));
        }

        // Re-read after acquiring the lock: a concurrent resolution could
        // have slipped in between the first select and the lock.
        let mut reservation = tx
            .execute(Select(By::<Option<Reservation>, _>::new(reservation_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReservationNotExists(reservation_id))
            .map_err(tracerr::wrap!())?;
        if reservation.status != reservation::Status::Active {
            return Err(tracerr::new!(E::ReservationNotActive(reservation_id)));
        }

        reservation.cancel(now);
        tx.execute(Update(reservation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if unit.status == unit::Status::Reserved {
            unit.status = unit::Status::Available;
            unit.clear_hold();
            tx.execute(Update(unit))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(reservation)
    }
}

/// Error of [`ReleaseReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Broker neither holds the [`Reservation`] nor is a manager.
    #[display("`Broker(id: {_0})` may not act upon this `Reservation`")]
    NotHolder(#[error(not(source))] broker::Id),

    /// [`Reservation`] is not active anymore.
    #[display("`Reservation(id: {_0})` is not active")]
    ReservationNotActive(#[error(not(source))] reservation::Id),

    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotExists(#[error(not(source))] reservation::Id),

    /// [`Unit`] of the [`Reservation`] does not exist.
    #[display("`Unit(id: {_0})` does not exist")]
    UnitNotExists(#[error(not(source))] unit::Id),
}
