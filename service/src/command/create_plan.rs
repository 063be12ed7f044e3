//! [`Command`] for creating a new [`Plan`] and generating its [`Unit`]s.

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        broker, incorporation, plan,
        unit::{
            self,
            code::{self, CodeSet},
            Code,
        },
        Incorporation, Plan, Unit,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Plan`] and generating its [`Unit`]s.
///
/// The whole grid declared by the [`plan::Shape`] is generated in one
/// transaction: blocks are labeled `A`, `B`, …, `Z`, `AA`, `AB`, … (behind
/// the optional prefix), floors start at `1` and stacks at `01`. A created
/// [`Plan`] stays inactive until published.
#[derive(Clone, Debug)]
pub struct CreatePlan {
    /// [`broker::Actor`] performing this [`Command`].
    pub actor: broker::Actor,

    /// ID of the [`Incorporation`] to create a [`Plan`] in.
    pub incorporation_id: incorporation::Id,

    /// Name of a new [`Plan`].
    pub name: plan::Name,

    /// Number of bedrooms of the [`Plan`]'s [`Unit`]s.
    pub bedrooms: plan::Bedrooms,

    /// Area of the [`Plan`]'s [`Unit`]s.
    pub area: plan::Area,

    /// Base price of the [`Plan`]'s [`Unit`]s.
    pub base_price: Option<Money>,

    /// Layout [`plan::Shape`] to generate [`Unit`]s from.
    pub shape: plan::Shape,
}

impl<Db> Command<CreatePlan> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Incorporation>, incorporation::Id>>,
            Ok = Option<Incorporation>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<CodeSet, incorporation::Id>>,
            Ok = CodeSet,
            Err = Traced<database::Error>,
        > + Database<Insert<Plan>, Err = Traced<database::Error>>
        + Database<Insert<Vec<Unit>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Plan;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreatePlan) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePlan {
            actor,
            incorporation_id,
            name,
            bedrooms,
            area,
            base_price,
            shape,
        } = cmd;

        if !actor.role.is_manager() {
            return Err(tracerr::new!(E::NotManager(actor.id)));
        }

        let total = shape.total_units();
        if total == 0 {
            return Err(tracerr::new!(E::EmptyShape));
        }
        if total > plan::MAX_GENERATED_UNITS {
            return Err(tracerr::new!(E::TooManyUnits(total)));
        }

        let incorporation = self
            .database()
            .execute(Select(By::<Option<Incorporation>, _>::new(
                incorporation_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::IncorporationNotExists(incorporation_id))
            .map_err(tracerr::wrap!())?;

        let plan = Plan {
            id: plan::Id::new(),
            incorporation_id: incorporation.id,
            name,
            bedrooms,
            area,
            base_price,
            shape: shape.clone(),
            active: false,
            price: None,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut codes = tx
            .execute(Select(By::<CodeSet, _>::new(incorporation.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // A single block with no prefix stays towerless.
        let towered = shape.blocks_count > 1 || shape.block_prefix.is_some();
        let mut units = Vec::new();
        for block in 0..shape.blocks_count {
            let tower = towered.then(|| {
                let mut label = code::block_label(u32::from(block));
                if let Some(prefix) = &shape.block_prefix {
                    label = format!("{prefix}{label}");
                }
                #[expect(
                    unsafe_code,
                    reason = "concatenation of two validated labels"
                )]
                unsafe {
                    unit::Tower::new_unchecked(label)
                }
            });
            for floor in 1..=shape.floors_per_block {
                let floor = unit::Floor::try_from(floor)
                    .map_err(|_| tracerr::new!(E::TooManyUnits(total)))?;
                for position in 1..=shape.units_per_floor {
                    let label = code::stack_code(u32::from(position));
                    #[expect(
                        unsafe_code,
                        reason = "generated labels are alphanumeric"
                    )]
                    let stack = unsafe { unit::Stack::new_unchecked(label) };
                    let code =
                        Code::generate(tower.as_ref(), floor, &stack, &codes)
                            .map_err(tracerr::from_and_wrap!(=> E))?;
                    let _ = codes.insert(&code);
                    units.push(Unit {
                        id: unit::Id::new(),
                        incorporation_id: incorporation.id,
                        plan_id: Some(plan.id),
                        code,
                        tower: tower.clone(),
                        floor,
                        stack,
                        bedrooms: plan.bedrooms,
                        area: plan.area,
                        list_price: plan.base_price,
                        status: unit::Status::Available,
                        reserved_by: None,
                        reservation_expires_at: None,
                        created_at: DateTime::now().coerce(),
                    });
                }
            }
        }

        tx.execute(Insert(plan.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(units))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(plan)
    }
}

/// Error of [`CreatePlan`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// No unique [`Code`] could be generated for a [`Unit`].
    #[display("Failed to generate a unique `unit::Code`: {_0}")]
    #[from]
    CodeGeneration(code::GenerationError),

    /// [`plan::Shape`] declares no [`Unit`]s at all.
    #[display("`plan::Shape` generates no `Unit`s")]
    EmptyShape,

    /// [`Incorporation`] with the provided ID does not exist.
    #[display("`Incorporation(id: {_0})` does not exist")]
    IncorporationNotExists(#[error(not(source))] incorporation::Id),

    /// Broker is not allowed to manage inventory.
    #[display("`Broker(id: {_0})` is not a manager")]
    NotManager(#[error(not(source))] broker::Id),

    /// [`plan::Shape`] declares more [`Unit`]s than can be generated at
    /// once.
    #[display(
        "`plan::Shape` generates {_0} `Unit`s, at most {} are allowed",
        plan::MAX_GENERATED_UNITS
    )]
    TooManyUnits(#[error(not(source))] u32),
}
