//! Floor layout reconciliation.
//!
//! Pure planning step of the reconfiguration engine: reconciles the existing
//! [`Unit`] rows of one `(tower, floor)` group against a target
//! units-per-floor count, producing the row mutations to persist. Keeping it
//! store-free makes the trim/retain/create rules testable in isolation.

use common::DateTime;
use derive_more::{Display, Error as StdError, From};

use crate::domain::{
    plan::Plan,
    unit::{
        self,
        code::{self, CodeSet},
        Code, Status, Unit,
    },
};

/// Outcome of reconciling one `(tower, floor)` group.
///
/// All [`Unit`]s carry their post-reconciliation state; the caller persists
/// `updated` and `blocked` with updates and `created` with inserts.
#[derive(Clone, Debug, Default)]
pub struct Reconciliation {
    /// Retained [`Unit`]s re-attributed to the target [`Plan`].
    pub updated: Vec<Unit>,

    /// Newly generated [`Unit`]s filling the gap up to the target count.
    pub created: Vec<Unit>,

    /// Excess [`Unit`]s trimmed out of the active layout.
    pub blocked: Vec<Unit>,
}

/// Reconciles the existing [`Unit`]s of one `(tower, floor)` group so the
/// group ends up with exactly `target` visible [`Unit`]s assigned to `plan`.
///
/// Existing [`Unit`]s are processed in stack order. The first `target` of
/// them are retained and inherit the plan's attributes (a retained
/// [`Status::Blocked`] one is reset to [`Status::Available`], a retained
/// [`Status::Sold`] one is left untouched); visible [`Unit`]s beyond the
/// target are trimmed to [`Status::Blocked`]; missing positions are filled
/// with new [`Unit`]s reusing the lowest free stack codes of the group.
///
/// Generated [`Code`]s are registered in `codes`, so one set can be threaded
/// through all groups of a bulk operation.
///
/// # Errors
///
/// - [`Error::ExcessReserved`] / [`Error::ExcessSold`] when trimming would
///   destroy an active deal;
/// - [`Error::SoldPlanMismatch`] when a retained sold [`Unit`] belongs to a
///   different [`Plan`] than the target;
/// - [`Error::Generation`] when no unique [`Code`] could be generated.
pub fn reconcile_group(
    tower: Option<&unit::Tower>,
    floor: unit::Floor,
    mut existing: Vec<Unit>,
    plan: &Plan,
    target: usize,
    codes: &mut CodeSet,
) -> Result<Reconciliation, Error> {
    existing.sort_by(|a, b| a.stack.layout_cmp(&b.stack));

    let mut outcome = Reconciliation::default();
    let missing = target.saturating_sub(existing.len());
    let occupied = existing
        .iter()
        .map(|u| u.stack.as_str().to_ascii_uppercase())
        .collect::<std::collections::HashSet<_>>();

    let excess = existing.split_off(target.min(existing.len()));
    for mut u in excess {
        match u.status {
            Status::Reserved => {
                return Err(Error::ExcessReserved { code: u.code });
            }
            Status::Sold => {
                return Err(Error::ExcessSold { code: u.code });
            }
            Status::Available => {
                u.status = Status::Blocked;
                u.clear_hold();
                outcome.blocked.push(u);
            }
            // Already out of the layout.
            Status::Blocked => {}
        }
    }

    for mut u in existing {
        match u.status {
            Status::Sold => {
                if u.plan_id != Some(plan.id) {
                    return Err(Error::SoldPlanMismatch { code: u.code });
                }
                // Sold units are immutable through this engine.
            }
            Status::Blocked => {
                u.status = Status::Available;
                u.clear_hold();
                u.inherit_plan(plan);
                outcome.updated.push(u);
            }
            Status::Available | Status::Reserved => {
                u.inherit_plan(plan);
                outcome.updated.push(u);
            }
        }
    }

    let mut stack_index = 1;
    for _ in 0..missing {
        let stack = loop {
            let label = code::stack_code(stack_index);
            stack_index += 1;
            if !occupied.contains(&label) {
                break unit::Stack::new(label).ok_or(Error::InvalidStack)?;
            }
        };

        let code = Code::generate(tower, floor, &stack, codes)?;
        _ = codes.insert(&code);

        let mut created = Unit {
            id: unit::Id::new(),
            incorporation_id: plan.incorporation_id,
            plan_id: None,
            code,
            tower: tower.cloned(),
            floor,
            stack,
            bedrooms: plan.bedrooms,
            area: plan.area,
            list_price: None,
            status: Status::Available,
            reserved_by: None,
            reservation_expires_at: None,
            created_at: DateTime::now().coerce(),
        };
        created.inherit_plan(plan);
        outcome.created.push(created);
    }

    Ok(outcome)
}

/// Error of reconciling a `(tower, floor)` group.
#[derive(Clone, Debug, Display, From, StdError)]
pub enum Error {
    /// Trimming the group would block a [`Unit`] under an active hold.
    #[display("excess `Unit(code: {code})` is reserved")]
    ExcessReserved {
        /// [`Code`] of the reserved [`Unit`].
        #[error(not(source))]
        code: Code,
    },

    /// Trimming the group would block a sold [`Unit`].
    #[display("excess `Unit(code: {code})` is sold")]
    ExcessSold {
        /// [`Code`] of the sold [`Unit`].
        #[error(not(source))]
        code: Code,
    },

    /// A retained sold [`Unit`] belongs to a different [`Plan`].
    #[display("sold `Unit(code: {code})` cannot be reassigned to another plan")]
    SoldPlanMismatch {
        /// [`Code`] of the sold [`Unit`].
        #[error(not(source))]
        code: Code,
    },

    /// Generated stack label is not a valid [`unit::Stack`].
    #[display("generated stack label is invalid")]
    InvalidStack,

    /// No unique [`Code`] could be generated.
    #[display("failed to generate a unique unit code: {_0}")]
    #[from]
    Generation(code::GenerationError),
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rust_decimal::Decimal;

    use crate::domain::{
        broker, incorporation,
        plan::{self, Plan, Shape},
        unit::{self, code::CodeSet, Code, Status, Unit},
    };

    use super::{reconcile_group, Error};

    fn plan(incorporation_id: incorporation::Id) -> Plan {
        Plan {
            id: plan::Id::new(),
            incorporation_id,
            name: plan::Name::new("2 dorms").unwrap(),
            bedrooms: 2,
            area: plan::Area::new(Decimal::from(64)).unwrap(),
            base_price: Some("450000BRL".parse().unwrap()),
            shape: Shape {
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

    fn tower() -> unit::Tower {
        unit::Tower::new("A").unwrap()
    }

    fn existing(
        stack: &str,
        status: Status,
        plan_id: Option<plan::Id>,
    ) -> Unit {
        let stack = unit::Stack::new(stack).unwrap();
        let code = Code::generate(
            Some(&tower()),
            5,
            &stack,
            &CodeSet::new(),
        )
        .unwrap();
        Unit {
            id: unit::Id::new(),
            incorporation_id: incorporation::Id::new(),
            plan_id,
            code,
            tower: Some(tower()),
            floor: 5,
            stack,
            bedrooms: 1,
            area: plan::Area::new(Decimal::from(40)).unwrap(),
            list_price: None,
            status,
            reserved_by: (status == Status::Reserved)
                .then(|| broker::Id::from(uuid::Uuid::new_v4())),
            reservation_expires_at: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn codes_of(units: &[Unit]) -> CodeSet {
        units.iter().map(|u| u.code.as_str()).collect()
    }

    #[test]
    fn trims_excess_available_units() {
        let units = vec![
            existing("01", Status::Available, None),
            existing("02", Status::Available, None),
        ];
        let plan = plan(units[0].incorporation_id);
        let mut codes = codes_of(&units);

        let outcome =
            reconcile_group(Some(&tower()), 5, units, &plan, 1, &mut codes)
                .unwrap();

        assert_eq!(outcome.blocked.len(), 1);
        assert_eq!(outcome.blocked[0].stack.as_str(), "02");
        assert_eq!(outcome.blocked[0].status, Status::Blocked);
        assert_eq!(outcome.updated.len(), 1);
        assert_eq!(outcome.updated[0].stack.as_str(), "01");
        assert_eq!(outcome.updated[0].plan_id, Some(plan.id));
        assert!(outcome.created.is_empty());
    }

    #[test]
    fn aborts_when_excess_unit_is_sold() {
        let sold_plan = plan::Id::new();
        let units = vec![
            existing("01", Status::Available, None),
            existing("02", Status::Sold, Some(sold_plan)),
        ];
        let plan = plan(units[0].incorporation_id);
        let mut codes = codes_of(&units);

        assert!(matches!(
            reconcile_group(Some(&tower()), 5, units, &plan, 1, &mut codes),
            Err(Error::ExcessSold { .. }),
        ));
    }

    #[test]
    fn aborts_when_excess_unit_is_reserved() {
        let units = vec![
            existing("01", Status::Available, None),
            existing("02", Status::Reserved, None),
        ];
        let plan = plan(units[0].incorporation_id);
        let mut codes = codes_of(&units);

        assert!(matches!(
            reconcile_group(Some(&tower()), 5, units, &plan, 1, &mut codes),
            Err(Error::ExcessReserved { .. }),
        ));
    }

    #[test]
    fn fills_the_gap_with_lowest_free_stacks() {
        let units = vec![existing("01", Status::Available, None)];
        let plan = plan(units[0].incorporation_id);
        let mut codes = codes_of(&units);

        let outcome =
            reconcile_group(Some(&tower()), 5, units, &plan, 3, &mut codes)
                .unwrap();

        assert_eq!(outcome.updated.len(), 1);
        assert_eq!(outcome.created.len(), 2);
        assert_eq!(outcome.created[0].stack.as_str(), "02");
        assert_eq!(outcome.created[0].code.as_str(), "A0502");
        assert_eq!(outcome.created[1].stack.as_str(), "03");
        assert_eq!(outcome.created[1].code.as_str(), "A0503");
        assert!(outcome
            .created
            .iter()
            .all(|u| u.plan_id == Some(plan.id)
                && u.status == Status::Available));
    }

    #[test]
    fn skips_occupied_stacks_when_filling() {
        let units = vec![existing("02", Status::Available, None)];
        let plan = plan(units[0].incorporation_id);
        let mut codes = codes_of(&units);

        let outcome =
            reconcile_group(Some(&tower()), 5, units, &plan, 2, &mut codes)
                .unwrap();

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.created[0].stack.as_str(), "01");
    }

    #[test]
    fn retained_blocked_unit_is_reset_to_available() {
        let units = vec![existing("01", Status::Blocked, None)];
        let plan = plan(units[0].incorporation_id);
        let mut codes = codes_of(&units);

        let outcome =
            reconcile_group(Some(&tower()), 5, units, &plan, 1, &mut codes)
                .unwrap();

        assert_eq!(outcome.updated.len(), 1);
        assert_eq!(outcome.updated[0].status, Status::Available);
        assert_eq!(outcome.updated[0].plan_id, Some(plan.id));
        assert!(outcome.created.is_empty());
    }

    #[test]
    fn retained_sold_unit_of_target_plan_is_untouched() {
        let incorporation_id = incorporation::Id::new();
        let plan = plan(incorporation_id);
        let units = vec![existing("01", Status::Sold, Some(plan.id))];
        let mut codes = codes_of(&units);

        let outcome =
            reconcile_group(Some(&tower()), 5, units, &plan, 1, &mut codes)
                .unwrap();

        assert!(outcome.updated.is_empty());
        assert!(outcome.created.is_empty());
        assert!(outcome.blocked.is_empty());
    }

    #[test]
    fn aborts_when_retained_sold_unit_has_another_plan() {
        let units = vec![existing("01", Status::Sold, Some(plan::Id::new()))];
        let plan = plan(units[0].incorporation_id);
        let mut codes = codes_of(&units);

        assert!(matches!(
            reconcile_group(Some(&tower()), 5, units, &plan, 1, &mut codes),
            Err(Error::SoldPlanMismatch { .. }),
        ));
    }

    #[test]
    fn excess_is_trimmed_from_the_highest_stacks() {
        let units = vec![
            existing("10", Status::Available, None),
            existing("2", Status::Available, None),
            existing("1", Status::Available, None),
        ];
        let plan = plan(units[0].incorporation_id);
        let mut codes = codes_of(&units);

        let outcome =
            reconcile_group(Some(&tower()), 5, units, &plan, 2, &mut codes)
                .unwrap();

        // Numeric stack order: 1, 2 retained; 10 trimmed.
        assert_eq!(outcome.blocked.len(), 1);
        assert_eq!(outcome.blocked[0].stack.as_str(), "10");
    }

    #[test]
    fn generated_codes_avoid_the_shared_set() {
        let units = vec![existing("01", Status::Available, None)];
        let plan = plan(units[0].incorporation_id);
        // Another group of the bulk operation already took `A0502`.
        let mut codes = codes_of(&units);
        _ = codes.insert("A0502");

        let outcome =
            reconcile_group(Some(&tower()), 5, units, &plan, 2, &mut codes)
                .unwrap();

        assert_eq!(outcome.created.len(), 1);
        assert_eq!(outcome.created[0].code.as_str(), "A0502-1");
    }
}
