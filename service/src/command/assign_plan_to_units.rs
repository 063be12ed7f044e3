//! [`Command`] for assigning a [`Plan`] to existing [`Unit`]s.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        broker, incorporation, plan, unit, Incorporation, Plan, Reservation,
        Unit,
    },
    infra::{database, Database},
    read::reservation::Active,
    Service,
};

use super::Command;

/// [`Command`] for assigning a [`Plan`] to existing [`Unit`]s.
///
/// Every selected [`Unit`] inherits the [`Plan`]'s attributes. [`Sold`] and
/// [`Blocked`] [`Unit`]s are refused, and so are [`Unit`]s of a different
/// [`Incorporation`]: either all selected [`Unit`]s are re-assigned, or
/// none.
///
/// [`Blocked`]: unit::Status::Blocked
/// [`Sold`]: unit::Status::Sold
#[derive(Clone, Debug)]
pub struct AssignPlanToUnits {
    /// [`broker::Actor`] performing this [`Command`].
    pub actor: broker::Actor,

    /// ID of the [`Plan`] to assign.
    pub plan_id: plan::Id,

    /// IDs of the [`Unit`]s to assign the [`Plan`] to.
    pub unit_ids: Vec<unit::Id>,

    /// Indicator whether the [`Plan`] should be published afterwards.
    pub publish: bool,
}

impl<Db> Command<AssignPlanToUnits> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Plan>, plan::Id>>,
            Ok = Option<Plan>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Incorporation>, incorporation::Id>>,
            Ok = Option<Incorporation>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Reservation>>, unit::Id>>,
            Ok = Option<Active<Reservation>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Unit>, plan::Id>>,
            Ok = Vec<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Plan>, incorporation::Id>>,
            Ok = Vec<Plan>,
            Err = Traced<database::Error>,
        > + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<Update<Unit>, Err = Traced<database::Error>>
        + Database<Update<Plan>, Err = Traced<database::Error>>
        + Database<Update<Incorporation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Plan;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AssignPlanToUnits,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AssignPlanToUnits {
            actor,
            plan_id,
            unit_ids,
            publish,
        } = cmd;

        if !actor.role.is_manager() {
            return Err(tracerr::new!(E::NotManager(actor.id)));
        }
        if unit_ids.is_empty() {
            return Err(tracerr::new!(E::NoUnits));
        }

        let plan = self
            .database()
            .execute(Select(By::<Option<Plan>, _>::new(plan_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PlanNotExists(plan_id))
            .map_err(tracerr::wrap!())?;
        let incorporation = self
            .database()
            .execute(Select(By::<Option<Incorporation>, _>::new(
                plan.incorporation_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::IncorporationNotExists(plan.incorporation_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let now = DateTime::now();
        for unit_id in unit_ids {
            let mut unit = tx
                .execute(Lock(By::<Option<Unit>, _>::new(unit_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UnitNotExists(unit_id))
                .map_err(tracerr::wrap!())?;
            if unit.incorporation_id != plan.incorporation_id {
                return Err(tracerr::new!(E::ForeignUnit(unit.code)));
            }

            drop(
                super::resolve_expired(&tx, &mut unit, now)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?,
            );

            match unit.status {
                unit::Status::Available | unit::Status::Reserved => {
                    unit.inherit_plan(&plan);
                    tx.execute(Update(unit))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))
                        .map(drop)?;
                }
                unit::Status::Sold => {
                    return Err(tracerr::new!(E::UnitSold(unit.code)));
                }
                unit::Status::Blocked => {
                    return Err(tracerr::new!(E::UnitBlocked(unit.code)));
                }
            }
        }

        let plan = if publish {
            super::publish_plan(&tx, plan, incorporation)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
        } else {
            plan
        };

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(plan)
    }
}

/// Error of [`AssignPlanToUnits`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Unit`] belongs to a different [`Incorporation`] than the [`Plan`].
    #[display("`Unit(code: {_0})` belongs to another `Incorporation`")]
    ForeignUnit(#[error(not(source))] unit::Code),

    /// [`Incorporation`] of the [`Plan`] does not exist.
    #[display("`Incorporation(id: {_0})` does not exist")]
    IncorporationNotExists(#[error(not(source))] incorporation::Id),

    /// Broker is not allowed to manage inventory.
    #[display("`Broker(id: {_0})` is not a manager")]
    NotManager(#[error(not(source))] broker::Id),

    /// No [`Unit`]s were selected.
    #[display("no `Unit`s were selected")]
    NoUnits,

    /// [`Plan`] with the provided ID does not exist.
    #[display("`Plan(id: {_0})` does not exist")]
    PlanNotExists(#[error(not(source))] plan::Id),

    /// [`Unit`] is trimmed out of the active layout.
    #[display("`Unit(code: {_0})` is blocked")]
    UnitBlocked(#[error(not(source))] unit::Code),

    /// [`Unit`] with the provided ID does not exist.
    #[display("`Unit(id: {_0})` does not exist")]
    UnitNotExists(#[error(not(source))] unit::Id),

    /// [`Unit`] is already sold.
    #[display("`Unit(code: {_0})` is already sold")]
    UnitSold(#[error(not(source))] unit::Code),
}
