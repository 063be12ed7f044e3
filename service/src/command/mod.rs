//! [`Command`] definition.

pub mod assign_plan_to_units;
pub mod authorize_access_token;
pub mod convert_reservation_to_sale;
pub mod create_incorporation;
pub mod create_plan;
pub mod reconfigure_floors;
pub mod release_reservation;
pub mod reserve_unit;

use std::cmp::Ordering;

use common::{
    operations::{By, Select, Update},
    DateTime, Money,
};
use tracerr::Traced;

use crate::{
    domain::{
        incorporation, plan, reservation, unit, Incorporation, Plan,
        Reservation, Unit,
    },
    infra::{database, Database},
    read::reservation::Active,
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    assign_plan_to_units::AssignPlanToUnits,
    authorize_access_token::AuthorizeAccessToken,
    convert_reservation_to_sale::ConvertReservationToSale,
    create_incorporation::CreateIncorporation, create_plan::CreatePlan,
    reconfigure_floors::ReconfigureFloors,
    release_reservation::ReleaseReservation, reserve_unit::ReserveUnit,
};

/// Resolves a lapsed hold on the provided locked [`Unit`], if any.
///
/// Every state transition goes through this first, so expiration never needs
/// a background sweeper: if the [`Unit`] is [`Reserved`] and its backing
/// [`Reservation`] is past its expiration, the [`Reservation`] is marked
/// [`Expired`] and the [`Unit`] is returned to [`Available`], both persisted
/// through `db` (expected to be a transaction holding a row lock on the
/// [`Unit`]).
///
/// Returns the ID of the [`Reservation`] that was expired, if one was.
///
/// [`Available`]: unit::Status::Available
/// [`Expired`]: reservation::Status::Expired
/// [`Reserved`]: unit::Status::Reserved
pub(crate) async fn resolve_expired<Db>(
    db: &Db,
    unit: &mut Unit,
    now: DateTime,
) -> Result<Option<reservation::Id>, Traced<database::Error>>
where
    Db: Database<
            Select<By<Option<Active<Reservation>>, unit::Id>>,
            Ok = Option<Active<Reservation>>,
            Err = Traced<database::Error>,
        > + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<Update<Unit>, Err = Traced<database::Error>>,
{
    if unit.status != unit::Status::Reserved {
        return Ok(None);
    }

    let Some(Active(mut reservation)) = db
        .execute(Select(By::<Option<Active<Reservation>>, _>::new(unit.id)))
        .await
        .map_err(tracerr::wrap!())?
    else {
        // Hold without a backing active reservation is a stale pair.
        unit.status = unit::Status::Available;
        unit.clear_hold();
        db.execute(Update(unit.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        return Ok(None);
    };

    if !reservation.is_expired(now) {
        return Ok(None);
    }

    let expired_id = reservation.id;
    reservation.expire(now);
    db.execute(Update(reservation))
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

    unit.status = unit::Status::Available;
    unit.clear_hold();
    db.execute(Update(unit.clone()))
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

    Ok(Some(expired_id))
}

/// Publishes the provided [`Plan`] and refreshes the derived prices.
///
/// The [`Plan`]'s price becomes the minimum non-null list price among its
/// visible [`Unit`]s, falling back to its base price; the
/// [`Incorporation`]'s starting price becomes the minimum price among its
/// active [`Plan`]s.
pub(crate) async fn publish_plan<Db>(
    db: &Db,
    mut plan: Plan,
    mut incorporation: Incorporation,
) -> Result<Plan, Traced<database::Error>>
where
    Db: Database<
            Select<By<Vec<Unit>, plan::Id>>,
            Ok = Vec<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Plan>, incorporation::Id>>,
            Ok = Vec<Plan>,
            Err = Traced<database::Error>,
        > + Database<Update<Plan>, Err = Traced<database::Error>>
        + Database<Update<Incorporation>, Err = Traced<database::Error>>,
{
    let units = db
        .execute(Select(By::<Vec<Unit>, _>::new(plan.id)))
        .await
        .map_err(tracerr::wrap!())?;
    plan.price = min_price(
        units
            .iter()
            .filter(|u| u.is_visible())
            .filter_map(|u| u.list_price),
    )
    .or(plan.base_price);
    plan.active = true;
    db.execute(Update(plan.clone()))
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

    let plans = db
        .execute(Select(By::<Vec<Plan>, _>::new(plan.incorporation_id)))
        .await
        .map_err(tracerr::wrap!())?;
    incorporation.price_from =
        min_price(plans.iter().filter(|p| p.active).filter_map(|p| p.price));
    db.execute(Update(incorporation))
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

    Ok(plan)
}

/// Minimum of the provided prices.
///
/// Incomparable (cross-currency) prices keep the earlier minimum.
fn min_price(prices: impl Iterator<Item = Money>) -> Option<Money> {
    prices.fold(None, |min, price| {
        Some(match min {
            None => price,
            Some(min) => match price.partial_cmp(&min) {
                Some(Ordering::Less) => price,
                Some(Ordering::Equal | Ordering::Greater) | None => min,
            },
        })
    })
}
