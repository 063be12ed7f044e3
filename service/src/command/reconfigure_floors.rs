//! [`Command`] for reconfiguring floors of an [`Incorporation`]'s layout.

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        broker, incorporation, layout, plan,
        unit::{self, code::CodeSet},
        Incorporation, Plan, Reservation, Unit,
    },
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for reconfiguring floors of an [`Incorporation`]'s layout.
///
/// Every addressed `(tower, floor)` group is reconciled to hold exactly the
/// target number of visible [`Unit`]s assigned to the [`Plan`]: excess
/// [`Unit`]s are trimmed to [`Blocked`], missing positions are filled with
/// newly generated [`Unit`]s. One transaction covers all groups: either the
/// whole reconfiguration applies, or none of it.
///
/// Lapsed holds on the addressed [`Unit`]s are resolved before reconciling,
/// so an expired reservation never aborts a trim. The total number of
/// addressed positions (`towers × floors × target`) is capped by
/// [`plan::MAX_GENERATED_UNITS`].
///
/// [`Blocked`]: unit::Status::Blocked
#[derive(Clone, Debug)]
pub struct ReconfigureFloors {
    /// [`broker::Actor`] performing this [`Command`].
    pub actor: broker::Actor,

    /// ID of the [`Plan`] the reconfigured [`Unit`]s belong to.
    pub plan_id: plan::Id,

    /// Tower to reconfigure, if any.
    pub tower: Option<unit::Tower>,

    /// Floors to reconfigure.
    pub floors: Vec<unit::Floor>,

    /// Target number of visible [`Unit`]s per floor.
    pub target_units_per_floor: u16,

    /// Indicator whether the reconfiguration should be replicated across
    /// all towers of the [`Incorporation`].
    pub replicate: bool,

    /// Indicator whether the [`Plan`] should be published afterwards.
    pub publish: bool,
}

/// Summary of an applied [`ReconfigureFloors`] [`Command`].
#[derive(Clone, Debug)]
pub struct Reconfiguration {
    /// Reconfigured [`Plan`], republished if requested.
    pub plan: Plan,

    /// Number of retained [`Unit`]s re-attributed to the [`Plan`].
    pub units_updated: usize,

    /// Number of newly generated [`Unit`]s.
    pub units_created: usize,

    /// Number of [`Unit`]s trimmed out of the active layout.
    pub units_blocked: usize,

    /// Number of towers in which at least one [`Unit`] was changed.
    pub towers_affected: usize,
}

impl<Db> Command<ReconfigureFloors> for Service<Db>
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
            Select<By<read::unit::Towers, incorporation::Id>>,
            Ok = read::unit::Towers,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<CodeSet, incorporation::Id>>,
            Ok = CodeSet,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Vec<Unit>, read::unit::Group>>,
            Ok = Vec<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<Option<read::reservation::Active<Reservation>>, unit::Id>,
            >,
            Ok = Option<read::reservation::Active<Reservation>>,
            Err = Traced<database::Error>,
        > + Database<Update<Reservation>, Err = Traced<database::Error>>
        + Database<
            Select<By<Vec<Unit>, plan::Id>>,
            Ok = Vec<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Plan>, incorporation::Id>>,
            Ok = Vec<Plan>,
            Err = Traced<database::Error>,
        > + Database<Insert<Vec<Unit>>, Err = Traced<database::Error>>
        + Database<Update<Unit>, Err = Traced<database::Error>>
        + Database<Update<Plan>, Err = Traced<database::Error>>
        + Database<Update<Incorporation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reconfiguration;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ReconfigureFloors,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReconfigureFloors {
            actor,
            plan_id,
            tower,
            mut floors,
            target_units_per_floor,
            replicate,
            publish,
        } = cmd;

        if !actor.role.is_manager() {
            return Err(tracerr::new!(E::NotManager(actor.id)));
        }
        floors.sort_unstable();
        floors.dedup();
        if floors.is_empty() {
            return Err(tracerr::new!(E::NoFloors));
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

        let towers = if replicate {
            let read::unit::Towers(mut towers) = tx
                .execute(Select(By::<read::unit::Towers, _>::new(
                    incorporation.id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !towers.contains(&tower) {
                towers.insert(0, tower);
            }
            towers
        } else {
            vec![tower]
        };

        let mut codes = tx
            .execute(Select(By::<CodeSet, _>::new(incorporation.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let target = usize::from(target_units_per_floor);
        let total = u32::try_from(
            towers
                .len()
                .saturating_mul(floors.len())
                .saturating_mul(target),
        )
        .unwrap_or(u32::MAX);
        if total > plan::MAX_GENERATED_UNITS {
            return Err(tracerr::new!(E::TooManyUnits(total)));
        }

        let now = DateTime::now();
        let mut summary = Reconfiguration {
            plan,
            units_updated: 0,
            units_created: 0,
            units_blocked: 0,
            towers_affected: 0,
        };
        for tower in &towers {
            let mut touched = false;
            for floor in &floors {
                let group = read::unit::Group {
                    incorporation_id: incorporation.id,
                    tower: tower.clone(),
                    floor: *floor,
                };
                let mut existing = tx
                    .execute(Lock(By::<Vec<Unit>, _>::new(group)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                for unit in &mut existing {
                    drop(
                        super::resolve_expired(&tx, unit, now)
                            .await
                            .map_err(tracerr::map_from_and_wrap!(=> E))?,
                    );
                }

                let outcome = layout::reconcile_group(
                    tower.as_ref(),
                    *floor,
                    existing,
                    &summary.plan,
                    target,
                    &mut codes,
                )
                .map_err(tracerr::from_and_wrap!(=> E))?;

                summary.units_updated += outcome.updated.len();
                summary.units_created += outcome.created.len();
                summary.units_blocked += outcome.blocked.len();
                touched |= !outcome.updated.is_empty()
                    || !outcome.created.is_empty()
                    || !outcome.blocked.is_empty();
                for unit in
                    outcome.updated.into_iter().chain(outcome.blocked)
                {
                    tx.execute(Update(unit))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))
                        .map(drop)?;
                }
                if !outcome.created.is_empty() {
                    tx.execute(Insert(outcome.created))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))
                        .map(drop)?;
                }
            }
            summary.towers_affected += usize::from(touched);
        }

        if publish {
            summary.plan =
                super::publish_plan(&tx, summary.plan, incorporation)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(summary)
    }
}

/// Error of [`ReconfigureFloors`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Incorporation`] of the [`Plan`] does not exist.
    #[display("`Incorporation(id: {_0})` does not exist")]
    IncorporationNotExists(#[error(not(source))] incorporation::Id),

    /// Reconciling a `(tower, floor)` group failed.
    #[display("Failed to reconcile a floor: {_0}")]
    #[from]
    Layout(layout::Error),

    /// No floors were selected.
    #[display("no floors were selected")]
    NoFloors,

    /// Broker is not allowed to manage inventory.
    #[display("`Broker(id: {_0})` is not a manager")]
    NotManager(#[error(not(source))] broker::Id),

    /// [`Plan`] with the provided ID does not exist.
    #[display("`Plan(id: {_0})` does not exist")]
    PlanNotExists(#[error(not(source))] plan::Id),

    /// Reconfiguration addresses more [`Unit`] positions than can be
    /// processed at once.
    #[display(
        "reconfiguration addresses {_0} `Unit` positions, at most {} are \
         allowed",
        plan::MAX_GENERATED_UNITS
    )]
    TooManyUnits(#[error(not(source))] u32),
}

#[cfg(test)]
mod spec {
    use std::{cell::RefCell, rc::Rc, time::Duration};

    use common::{
        operations::{By, Commit, Insert, Lock, Select, Transact, Update},
        DateTime, Handler,
    };
    use rust_decimal::Decimal;
    use tracerr::Traced;

    use crate::{
        domain::{
            broker, commission::SplitPolicy, incorporation, plan,
            reservation, unit, Incorporation, Plan, Reservation, Unit,
        },
        infra::database,
        read::{self, reservation::Active},
        Config, Service,
    };

    use super::{ExecutionError, ReconfigureFloors};

    /// In-memory [`Handler`] of database operations, backing [`Service`]
    /// executions in tests.
    #[derive(Clone, Debug, Default)]
    struct InMemoryDb(Rc<RefCell<State>>);

    #[derive(Debug, Default)]
    struct State {
        incorporations: Vec<Incorporation>,
        plans: Vec<Plan>,
        units: Vec<Unit>,
        reservations: Vec<Reservation>,
    }

    impl Handler<Transact> for InMemoryDb {
        type Ok = Self;
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
            Ok(self.clone())
        }
    }

    impl Handler<Commit> for InMemoryDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
            Ok(())
        }
    }

    impl Handler<Select<By<Option<Plan>, plan::Id>>> for InMemoryDb {
        type Ok = Option<Plan>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<Plan>, plan::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self
                .0
                .borrow()
                .plans
                .iter()
                .find(|p| p.id == id)
                .cloned())
        }
    }

    impl Handler<Select<By<Option<Incorporation>, incorporation::Id>>>
        for InMemoryDb
    {
        type Ok = Option<Incorporation>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<Incorporation>, incorporation::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self
                .0
                .borrow()
                .incorporations
                .iter()
                .find(|i| i.id == id)
                .cloned())
        }
    }

    impl Handler<Select<By<read::unit::Towers, incorporation::Id>>>
        for InMemoryDb
    {
        type Ok = read::unit::Towers;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<read::unit::Towers, incorporation::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            let mut towers = Vec::new();
            for u in &self.0.borrow().units {
                if u.incorporation_id == id && !towers.contains(&u.tower) {
                    towers.push(u.tower.clone());
                }
            }
            Ok(read::unit::Towers(towers))
        }
    }

    impl Handler<Select<By<unit::code::CodeSet, incorporation::Id>>>
        for InMemoryDb
    {
        type Ok = unit::code::CodeSet;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<unit::code::CodeSet, incorporation::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self
                .0
                .borrow()
                .units
                .iter()
                .filter(|u| u.incorporation_id == id)
                .map(|u| u.code.as_str())
                .collect())
        }
    }

    impl Handler<Lock<By<Vec<Unit>, read::unit::Group>>> for InMemoryDb {
        type Ok = Vec<Unit>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Lock(by): Lock<By<Vec<Unit>, read::unit::Group>>,
        ) -> Result<Self::Ok, Self::Err> {
            let group = by.into_inner();
            Ok(self
                .0
                .borrow()
                .units
                .iter()
                .filter(|u| {
                    u.incorporation_id == group.incorporation_id
                        && u.tower == group.tower
                        && u.floor == group.floor
                })
                .cloned()
                .collect())
        }
    }

    impl Handler<Select<By<Option<Active<Reservation>>, unit::Id>>>
        for InMemoryDb
    {
        type Ok = Option<Active<Reservation>>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<Active<Reservation>>, unit::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self
                .0
                .borrow()
                .reservations
                .iter()
                .find(|r| {
                    r.unit_id == id
                        && r.status == reservation::Status::Active
                })
                .cloned()
                .map(Active))
        }
    }

    impl Handler<Select<By<Vec<Unit>, plan::Id>>> for InMemoryDb {
        type Ok = Vec<Unit>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Vec<Unit>, plan::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self
                .0
                .borrow()
                .units
                .iter()
                .filter(|u| u.plan_id == Some(id))
                .cloned()
                .collect())
        }
    }

    impl Handler<Select<By<Vec<Plan>, incorporation::Id>>> for InMemoryDb {
        type Ok = Vec<Plan>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Vec<Plan>, incorporation::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self
                .0
                .borrow()
                .plans
                .iter()
                .filter(|p| p.incorporation_id == id)
                .cloned()
                .collect())
        }
    }

    impl Handler<Insert<Vec<Unit>>> for InMemoryDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Insert(units): Insert<Vec<Unit>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.borrow_mut().units.extend(units);
            Ok(())
        }
    }

    impl Handler<Update<Unit>> for InMemoryDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Update(unit): Update<Unit>,
        ) -> Result<Self::Ok, Self::Err> {
            let mut state = self.0.borrow_mut();
            if let Some(u) =
                state.units.iter_mut().find(|u| u.id == unit.id)
            {
                *u = unit;
            }
            Ok(())
        }
    }

    impl Handler<Update<Reservation>> for InMemoryDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Update(reservation): Update<Reservation>,
        ) -> Result<Self::Ok, Self::Err> {
            let mut state = self.0.borrow_mut();
            if let Some(r) = state
                .reservations
                .iter_mut()
                .find(|r| r.id == reservation.id)
            {
                *r = reservation;
            }
            Ok(())
        }
    }

    impl Handler<Update<Plan>> for InMemoryDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Update(plan): Update<Plan>,
        ) -> Result<Self::Ok, Self::Err> {
            let mut state = self.0.borrow_mut();
            if let Some(p) = state.plans.iter_mut().find(|p| p.id == plan.id)
            {
                *p = plan;
            }
            Ok(())
        }
    }

    impl Handler<Update<Incorporation>> for InMemoryDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Update(incorporation): Update<Incorporation>,
        ) -> Result<Self::Ok, Self::Err> {
            let mut state = self.0.borrow_mut();
            if let Some(i) = state
                .incorporations
                .iter_mut()
                .find(|i| i.id == incorporation.id)
            {
                *i = incorporation;
            }
            Ok(())
        }
    }

    fn service(db: InMemoryDb) -> Service<InMemoryDb> {
        Service::new(
            Config {
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    b"secret",
                ),
                reservation_ttl: Duration::from_secs(30 * 60),
                commission_split: SplitPolicy::default(),
            },
            db,
        )
    }

    fn manager() -> broker::Actor {
        broker::Actor {
            id: broker::Id::from(uuid::Uuid::new_v4()),
            role: broker::Role::Manager,
        }
    }

    fn incorporation() -> Incorporation {
        Incorporation {
            id: incorporation::Id::new(),
            name: incorporation::Name::new("Residencial Aurora").unwrap(),
            commission_percent: None,
            price_from: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn plan(incorporation_id: incorporation::Id) -> Plan {
        Plan {
            id: plan::Id::new(),
            incorporation_id,
            name: plan::Name::new("2 dorms").unwrap(),
            bedrooms: 2,
            area: plan::Area::new(Decimal::from(64)).unwrap(),
            base_price: None,
            shape: plan::Shape {
                blocks_count: 1,
                floors_per_block: 10,
                units_per_floor: 2,
                block_prefix: None,
            },
            active: false,
            price: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn unit(
        plan: &Plan,
        tower: &str,
        floor: unit::Floor,
        stack: &str,
        status: unit::Status,
    ) -> Unit {
        let tower = unit::Tower::new(tower).unwrap();
        let stack = unit::Stack::new(stack).unwrap();
        let code = unit::Code::generate(
            Some(&tower),
            floor,
            &stack,
            &unit::code::CodeSet::new(),
        )
        .unwrap();
        Unit {
            id: unit::Id::new(),
            incorporation_id: plan.incorporation_id,
            plan_id: Some(plan.id),
            code,
            tower: Some(tower),
            floor,
            stack,
            bedrooms: plan.bedrooms,
            area: plan.area,
            list_price: None,
            status,
            reserved_by: None,
            reservation_expires_at: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn hold(unit: &mut Unit, expires_at: DateTime) -> Reservation {
        let holder = broker::Id::from(uuid::Uuid::new_v4());
        unit.hold(holder, expires_at.coerce());
        Reservation {
            id: reservation::Id::new(),
            unit_id: unit.id,
            holder_id: holder,
            lead_id: None,
            note: None,
            status: reservation::Status::Active,
            created_at: DateTime::now().coerce(),
            expires_at: expires_at.coerce(),
            resolved_at: None,
        }
    }

    #[test]
    fn lapsed_hold_does_not_abort_trimming() {
        let db = InMemoryDb::default();
        let incorporation = incorporation();
        let plan = plan(incorporation.id);
        let kept = unit(&plan, "A", 1, "01", unit::Status::Available);
        let mut excess = unit(&plan, "A", 1, "02", unit::Status::Available);
        let reservation =
            hold(&mut excess, DateTime::now() - Duration::from_secs(3600));
        {
            let mut state = db.0.borrow_mut();
            state.incorporations.push(incorporation);
            state.plans.push(plan.clone());
            state.units.push(kept);
            state.units.push(excess.clone());
            state.reservations.push(reservation.clone());
        }

        let summary = futures::executor::block_on(
            service(db.clone()).execute(ReconfigureFloors {
                actor: manager(),
                plan_id: plan.id,
                tower: Some(unit::Tower::new("A").unwrap()),
                floors: vec![1],
                target_units_per_floor: 1,
                replicate: false,
                publish: false,
            }),
        )
        .unwrap();

        assert_eq!(summary.units_blocked, 1);
        let state = db.0.borrow();
        let trimmed =
            state.units.iter().find(|u| u.id == excess.id).unwrap();
        assert_eq!(trimmed.status, unit::Status::Blocked);
        assert!(trimmed.reserved_by.is_none());
        let expired = state
            .reservations
            .iter()
            .find(|r| r.id == reservation.id)
            .unwrap();
        assert_eq!(expired.status, reservation::Status::Expired);
    }

    #[test]
    fn live_hold_still_aborts_trimming() {
        let db = InMemoryDb::default();
        let incorporation = incorporation();
        let plan = plan(incorporation.id);
        let kept = unit(&plan, "A", 1, "01", unit::Status::Available);
        let mut excess = unit(&plan, "A", 1, "02", unit::Status::Available);
        let reservation =
            hold(&mut excess, DateTime::now() + Duration::from_secs(3600));
        {
            let mut state = db.0.borrow_mut();
            state.incorporations.push(incorporation);
            state.plans.push(plan.clone());
            state.units.push(kept);
            state.units.push(excess);
            state.reservations.push(reservation);
        }

        let err = futures::executor::block_on(
            service(db).execute(ReconfigureFloors {
                actor: manager(),
                plan_id: plan.id,
                tower: Some(unit::Tower::new("A").unwrap()),
                floors: vec![1],
                target_units_per_floor: 1,
                replicate: false,
                publish: false,
            }),
        )
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Layout(
                crate::domain::layout::Error::ExcessReserved { .. },
            ),
        ));
    }

    #[test]
    fn caps_addressed_positions() {
        let db = InMemoryDb::default();
        let incorporation = incorporation();
        let plan = plan(incorporation.id);
        {
            let mut state = db.0.borrow_mut();
            state.incorporations.push(incorporation);
            state.plans.push(plan.clone());
        }

        let err = futures::executor::block_on(
            service(db).execute(ReconfigureFloors {
                actor: manager(),
                plan_id: plan.id,
                tower: None,
                floors: vec![1],
                target_units_per_floor: 3001,
                replicate: false,
                publish: false,
            }),
        )
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::TooManyUnits(3001),
        ));
    }

    #[test]
    fn counts_only_towers_with_changes() {
        let db = InMemoryDb::default();
        let incorporation = incorporation();
        let plan = plan(incorporation.id);
        let touched = unit(&plan, "A", 1, "01", unit::Status::Available);
        // Conforms already: one sold unit of the target plan.
        let conforming = unit(&plan, "B", 1, "01", unit::Status::Sold);
        {
            let mut state = db.0.borrow_mut();
            state.incorporations.push(incorporation);
            state.plans.push(plan.clone());
            state.units.push(touched);
            state.units.push(conforming);
        }

        let summary = futures::executor::block_on(
            service(db).execute(ReconfigureFloors {
                actor: manager(),
                plan_id: plan.id,
                tower: Some(unit::Tower::new("A").unwrap()),
                floors: vec![1],
                target_units_per_floor: 1,
                replicate: true,
                publish: false,
            }),
        )
        .unwrap();

        assert_eq!(summary.units_updated, 1);
        assert_eq!(summary.towers_affected, 1);
    }
}
