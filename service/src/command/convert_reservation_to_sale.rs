//! [`Command`] for converting an active [`Reservation`] into a [`Sale`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        broker, commission, incorporation, reservation, sale, unit,
        Commission, Incorporation, Reservation, Sale, Unit,
    },
    infra::{database, Database},
    read::reservation::Active,
    Service,
};

use super::Command;

/// [`Command`] for converting an active [`Reservation`] into a [`Sale`].
///
/// The [`Unit`] becomes [`Sold`] and its [`Commission`] is split among
/// broker, company and partner at the moment of conversion. A
/// [`Reservation`] found lapsed is expired instead (and the expiration is
/// committed), which still fails the conversion.
///
/// [`Sold`]: unit::Status::Sold
#[derive(Clone, Debug)]
pub struct ConvertReservationToSale {
    /// [`broker::Actor`] performing this [`Command`].
    pub actor: broker::Actor,

    /// ID of the [`Reservation`] to convert.
    pub reservation_id: reservation::Id,

    /// Final sale value.
    ///
    /// Defaults to the [`Unit`]'s list price.
    pub value: Option<Money>,

    /// Free-form note to attach to a [`Sale`].
    pub note: Option<sale::Note>,
}

impl<Db> Command<ConvertReservationToSale> for Service<Db>
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
        > + Database<
            Select<By<Option<Incorporation>, incorporation::Id>>,
            Ok = Option<Incorporation>,
            Err = Traced<database::Error>,
        > + Database<Insert<Sale>, Err = Traced<database::Error>>
        + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<Update<Unit>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Sale;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ConvertReservationToSale,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConvertReservationToSale {
            actor,
            reservation_id,
            value,
            note,
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
            // Keep the expiration even though the conversion fails.
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
        if reservation.status != reservation::Status::Active
            || unit.status != unit::Status::Reserved
        {
            return Err(tracerr::new!(E::ReservationNotActive(reservation_id)));
        }

        let incorporation = tx
            .execute(Select(By::<Option<Incorporation>, _>::new(
                unit.incorporation_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::IncorporationNotExists(unit.incorporation_id))
            .map_err(tracerr::wrap!())?;
        let percent = incorporation
            .commission_percent
            .ok_or(E::MissingCommissionPercent(incorporation.id))
            .map_err(tracerr::wrap!())?;

        let sale_value = value
            .or(unit.list_price)
            .ok_or(E::NoSaleValue(unit.id))
            .map_err(tracerr::wrap!())?;
        let commission = Commission::split(
            sale_value,
            percent,
            &self.config.commission_split,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let sale = Sale {
            id: sale::Id::new(),
            unit_id: unit.id,
            reservation_id: reservation.id,
            value: sale_value,
            note,
            commission,
            created_at: now.coerce(),
        };
        reservation.convert(now);
        unit.status = unit::Status::Sold;
        unit.clear_hold();

        tx.execute(Insert(sale.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(reservation))
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

        Ok(sale)
    }
}

/// Error of [`ConvertReservationToSale`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Incorporation`] of the [`Unit`] does not exist.
    #[display("`Incorporation(id: {_0})` does not exist")]
    IncorporationNotExists(#[error(not(source))] incorporation::Id),

    /// [`Incorporation`] has no commission percentage configured.
    #[display(
        "`Incorporation(id: {_0})` has no commission percentage configured"
    )]
    MissingCommissionPercent(#[error(not(source))] incorporation::Id),

    /// No sale value was provided and the [`Unit`] has no list price.
    #[display("`Unit(id: {_0})` has no list price and no value was given")]
    NoSaleValue(#[error(not(source))] unit::Id),

    /// Broker neither holds the [`Reservation`] nor is a manager.
    #[display("`Broker(id: {_0})` may not act upon this `Reservation`")]
    NotHolder(#[error(not(source))] broker::Id),

    /// [`Reservation`] is not active anymore.
    #[display("`Reservation(id: {_0})` is not active")]
    ReservationNotActive(#[error(not(source))] reservation::Id),

    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotExists(#[error(not(source))] reservation::Id),

    /// [`Commission`] split failed.
    #[display("Failed to split the commission: {_0}")]
    #[from]
    Split(commission::SplitError),

    /// [`Unit`] of the [`Reservation`] does not exist.
    #[display("`Unit(id: {_0})` does not exist")]
    UnitNotExists(#[error(not(source))] unit::Id),
}
