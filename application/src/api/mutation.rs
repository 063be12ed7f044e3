//! GraphQL [`Mutation`]s definitions.

use common::{Money, Percent};
use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `Incorporation` with the provided details.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_MANAGER` - the current broker is not a manager.
    #[tracing::instrument(
        skip_all,
        fields(
            commission_percent = ?commission_percent
                .as_ref()
                .map(ToString::to_string),
            gql.name = "createIncorporation",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_incorporation(
        name: api::incorporation::Name,
        commission_percent: Option<Percent>,
        ctx: &Context,
    ) -> Result<api::Incorporation, Error> {
        let actor = ctx.current_session().await?.actor;

        ctx.service()
            .execute(command::CreateIncorporation {
                actor,
                name: name.into(),
                commission_percent,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Plan` in the specified `Incorporation` and generates
    /// its `Unit`s from the declared shape.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMPTY_SHAPE` - the declared shape generates no `Unit`s;
    /// - `INCORPORATION_NOT_EXISTS` - the `Incorporation` with the provided
    ///                                ID does not exist;
    /// - `TOO_MANY_UNITS` - the declared shape generates more `Unit`s than
    ///                      allowed at once;
    /// - `NOT_MANAGER` - the current broker is not a manager.
    #[tracing::instrument(
        skip_all,
        fields(
            area = %area,
            base_price = ?base_price.as_ref().map(ToString::to_string),
            bedrooms = %bedrooms,
            gql.name = "createPlan",
            incorporation_id = %incorporation_id,
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_plan(
        incorporation_id: api::incorporation::Id,
        name: api::plan::Name,
        bedrooms: i32,
        area: api::plan::Area,
        base_price: Option<Money>,
        shape: api::plan::ShapeInput,
        ctx: &Context,
    ) -> Result<api::Plan, Error> {
        let actor = ctx.current_session().await?.actor;
        let bedrooms = bedrooms.try_into().map_err(AsError::into_error)?;
        let shape = shape.try_into().map_err(AsError::into_error)?;

        ctx.service()
            .execute(command::CreatePlan {
                actor,
                incorporation_id: incorporation_id.into(),
                name: name.into(),
                bedrooms,
                area: area.into(),
                base_price,
                shape,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Places a time-boxed hold on the specified `Unit` for the current
    /// broker.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `UNIT_NOT_AVAILABLE` - the `Unit` is not open for reservation;
    /// - `UNIT_NOT_EXISTS` - the `Unit` with the provided ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reserveUnit",
            lead_id = ?lead_id.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            unit_id = %unit_id,
        ),
    )]
    pub async fn reserve_unit(
        unit_id: api::unit::Id,
        lead_id: Option<api::reservation::LeadId>,
        note: Option<api::reservation::Note>,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let actor = ctx.current_session().await?.actor;

        ctx.service()
            .execute(command::ReserveUnit {
                actor,
                unit_id: unit_id.into(),
                lead_id: lead_id.map(Into::into),
                note: note.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the specified `Reservation`, returning its `Unit` to the
    /// available pool.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_HOLDER` - the current broker neither holds the `Reservation`
    ///                  nor is a manager;
    /// - `RESERVATION_NOT_ACTIVE` - the `Reservation` is not active anymore;
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the provided ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "releaseReservation",
            otel.name = Self::SPAN_NAME,
            reservation_id = %reservation_id,
        ),
    )]
    pub async fn release_reservation(
        reservation_id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let actor = ctx.current_session().await?.actor;

        ctx.service()
            .execute(command::ReleaseReservation {
                actor,
                reservation_id: reservation_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Converts the specified `Reservation` into a `Sale`, computing the
    /// commission split.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NO_COMMISSION_PERCENT` - the `Incorporation` has no commission
    ///                             percentage configured;
    /// - `NO_SALE_VALUE` - no value was provided and the `Unit` has no list
    ///                     price;
    /// - `NON_POSITIVE_SALE_VALUE` - the sale value is zero or negative;
    /// - `NOT_HOLDER` - the current broker neither holds the `Reservation`
    ///                  nor is a manager;
    /// - `RESERVATION_NOT_ACTIVE` - the `Reservation` is not active anymore;
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the provided ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "convertReservationToSale",
            otel.name = Self::SPAN_NAME,
            reservation_id = %reservation_id,
            value = ?value.as_ref().map(ToString::to_string),
        ),
    )]
    pub async fn convert_reservation_to_sale(
        reservation_id: api::reservation::Id,
        value: Option<Money>,
        note: Option<api::sale::Note>,
        ctx: &Context,
    ) -> Result<api::Sale, Error> {
        let actor = ctx.current_session().await?.actor;

        ctx.service()
            .execute(command::ConvertReservationToSale {
                actor,
                reservation_id: reservation_id.into(),
                value,
                note: note.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Assigns the specified `Plan` to the specified `Unit`s, optionally
    /// publishing the `Plan` afterwards.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `FOREIGN_UNIT` - a `Unit` belongs to another `Incorporation`;
    /// - `NO_UNITS` - no `Unit`s were selected;
    /// - `PLAN_NOT_EXISTS` - the `Plan` with the provided ID does not exist;
    /// - `UNIT_BLOCKED` - a `Unit` is trimmed out of the active layout;
    /// - `UNIT_NOT_EXISTS` - a `Unit` with the provided ID does not exist;
    /// - `UNIT_SOLD` - a `Unit` is already sold;
    /// - `NOT_MANAGER` - the current broker is not a manager.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "assignPlanToUnits",
            otel.name = Self::SPAN_NAME,
            plan_id = %plan_id,
            publish = ?publish,
            units_count = unit_ids.len(),
        ),
    )]
    pub async fn assign_plan_to_units(
        plan_id: api::plan::Id,
        unit_ids: Vec<api::unit::Id>,
        publish: Option<bool>,
        ctx: &Context,
    ) -> Result<api::Plan, Error> {
        let actor = ctx.current_session().await?.actor;

        ctx.service()
            .execute(command::AssignPlanToUnits {
                actor,
                plan_id: plan_id.into(),
                unit_ids: unit_ids.into_iter().map(Into::into).collect(),
                publish: publish.unwrap_or_default(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Reconfigures the selected floors of the `Plan`'s `Incorporation` to
    /// the target number of `Unit`s per floor, all-or-nothing.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EXCESS_UNIT_RESERVED` - trimming would block a reserved `Unit`;
    /// - `EXCESS_UNIT_SOLD` - trimming would block a sold `Unit`;
    /// - `NO_FLOORS` - no floors were selected;
    /// - `PLAN_NOT_EXISTS` - the `Plan` with the provided ID does not exist;
    /// - `SOLD_PLAN_MISMATCH` - a sold `Unit` cannot be reassigned to
    ///                          another plan;
    /// - `TOO_MANY_UNITS` - the reconfiguration addresses more `Unit`
    ///                      positions than allowed at once;
    /// - `NOT_MANAGER` - the current broker is not a manager.
    #[tracing::instrument(
        skip_all,
        fields(
            floors = ?floors,
            gql.name = "reconfigureFloors",
            otel.name = Self::SPAN_NAME,
            plan_id = %plan_id,
            publish = ?publish,
            replicate = ?replicate,
            target_units_per_floor = %target_units_per_floor,
            tower = ?tower.as_ref().map(ToString::to_string),
        ),
    )]
    pub async fn reconfigure_floors(
        plan_id: api::plan::Id,
        tower: Option<api::unit::Tower>,
        floors: Vec<i32>,
        target_units_per_floor: i32,
        replicate: Option<bool>,
        publish: Option<bool>,
        ctx: &Context,
    ) -> Result<api::plan::Reconfiguration, Error> {
        let actor = ctx.current_session().await?.actor;
        let floors = floors
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()
            .map_err(AsError::into_error)?;
        let target_units_per_floor = target_units_per_floor
            .try_into()
            .map_err(AsError::into_error)?;

        ctx.service()
            .execute(command::ReconfigureFloors {
                actor,
                plan_id: plan_id.into(),
                tower: tower.map(Into::into),
                floors,
                target_units_per_floor,
                replicate: replicate.unwrap_or_default(),
                publish: publish.unwrap_or_default(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::create_incorporation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotManager(_) => api::PrivilegeError::Manager.into(),
        })
    }
}

impl AsError for command::create_plan::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMPTY_SHAPE"]
                #[status = BAD_REQUEST]
                #[message = "Declared shape generates no `Unit`s"]
                EmptyShape,

                #[code = "INCORPORATION_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Incorporation` with the provided ID does not \
                             exist"]
                IncorporationNotExists,

                #[code = "TOO_MANY_UNITS"]
                #[status = BAD_REQUEST]
                #[message = "Declared shape generates more `Unit`s than \
                             allowed at once"]
                TooManyUnits,
            }
        }

        Some(match self {
            Self::CodeGeneration(_) => return None,
            Self::Db(e) => return e.try_as_error(),
            Self::EmptyShape => Error::EmptyShape.into(),
            Self::IncorporationNotExists(_) => {
                Error::IncorporationNotExists.into()
            }
            Self::NotManager(_) => api::PrivilegeError::Manager.into(),
            Self::TooManyUnits(_) => Error::TooManyUnits.into(),
        })
    }
}

impl AsError for command::reserve_unit::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "UNIT_NOT_AVAILABLE"]
                #[status = CONFLICT]
                #[message = "`Unit` with the provided ID is not open for \
                             reservation"]
                UnitNotAvailable,

                #[code = "UNIT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Unit` with the provided ID does not exist"]
                UnitNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::UnitNotAvailable { .. } => Error::UnitNotAvailable.into(),
            Self::UnitNotExists(_) => Error::UnitNotExists.into(),
        })
    }
}

impl AsError for command::release_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "RESERVATION_NOT_ACTIVE"]
                #[status = CONFLICT]
                #[message = "`Reservation` with the provided ID is not \
                             active anymore"]
                ReservationNotActive,

                #[code = "RESERVATION_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Reservation` with the provided ID does not \
                             exist"]
                ReservationNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotHolder(_) => api::PrivilegeError::Holder.into(),
            Self::ReservationNotActive(_) => {
                Error::ReservationNotActive.into()
            }
            Self::ReservationNotExists(_) => {
                Error::ReservationNotExists.into()
            }
            Self::UnitNotExists(_) => return None,
        })
    }
}

impl AsError for command::convert_reservation_to_sale::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NO_COMMISSION_PERCENT"]
                #[status = CONFLICT]
                #[message = "`Incorporation` has no commission percentage \
                             configured"]
                NoCommissionPercent,

                #[code = "NO_SALE_VALUE"]
                #[status = BAD_REQUEST]
                #[message = "No value was provided and the `Unit` has no \
                             list price"]
                NoSaleValue,

                #[code = "NON_POSITIVE_SALE_VALUE"]
                #[status = BAD_REQUEST]
                #[message = "Sale value must be positive"]
                NonPositiveSaleValue,

                #[code = "RESERVATION_NOT_ACTIVE"]
                #[status = CONFLICT]
                #[message = "`Reservation` with the provided ID is not \
                             active anymore"]
                ReservationNotActive,

                #[code = "RESERVATION_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Reservation` with the provided ID does not \
                             exist"]
                ReservationNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::IncorporationNotExists(_) | Self::UnitNotExists(_) => {
                return None
            }
            Self::MissingCommissionPercent(_) => {
                Error::NoCommissionPercent.into()
            }
            Self::NoSaleValue(_) => Error::NoSaleValue.into(),
            Self::NotHolder(_) => api::PrivilegeError::Holder.into(),
            Self::ReservationNotActive(_) => {
                Error::ReservationNotActive.into()
            }
            Self::ReservationNotExists(_) => {
                Error::ReservationNotExists.into()
            }
            Self::Split(_) => Error::NonPositiveSaleValue.into(),
        })
    }
}

impl AsError for command::assign_plan_to_units::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "FOREIGN_UNIT"]
                #[status = CONFLICT]
                #[message = "`Unit` belongs to another `Incorporation`"]
                ForeignUnit,

                #[code = "NO_UNITS"]
                #[status = BAD_REQUEST]
                #[message = "No `Unit`s were selected"]
                NoUnits,

                #[code = "PLAN_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Plan` with the provided ID does not exist"]
                PlanNotExists,

                #[code = "UNIT_BLOCKED"]
                #[status = CONFLICT]
                #[message = "`Unit` is trimmed out of the active layout"]
                UnitBlocked,

                #[code = "UNIT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Unit` with the provided ID does not exist"]
                UnitNotExists,

                #[code = "UNIT_SOLD"]
                #[status = CONFLICT]
                #[message = "`Unit` is already sold"]
                UnitSold,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ForeignUnit(_) => Error::ForeignUnit.into(),
            Self::IncorporationNotExists(_) => return None,
            Self::NotManager(_) => api::PrivilegeError::Manager.into(),
            Self::NoUnits => Error::NoUnits.into(),
            Self::PlanNotExists(_) => Error::PlanNotExists.into(),
            Self::UnitBlocked(_) => Error::UnitBlocked.into(),
            Self::UnitNotExists(_) => Error::UnitNotExists.into(),
            Self::UnitSold(_) => Error::UnitSold.into(),
        })
    }
}

impl AsError for command::reconfigure_floors::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use service::domain::layout;

        define_error! {
            enum Error {
                #[code = "EXCESS_UNIT_RESERVED"]
                #[status = CONFLICT]
                #[message = "Trimming the floor would block a reserved \
                             `Unit`"]
                ExcessReserved,

                #[code = "EXCESS_UNIT_SOLD"]
                #[status = CONFLICT]
                #[message = "Trimming the floor would block a sold `Unit`"]
                ExcessSold,

                #[code = "NO_FLOORS"]
                #[status = BAD_REQUEST]
                #[message = "No floors were selected"]
                NoFloors,

                #[code = "PLAN_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Plan` with the provided ID does not exist"]
                PlanNotExists,

                #[code = "SOLD_PLAN_MISMATCH"]
                #[status = CONFLICT]
                #[message = "Sold `Unit` cannot be reassigned to another \
                             plan"]
                SoldPlanMismatch,

                #[code = "TOO_MANY_UNITS"]
                #[status = BAD_REQUEST]
                #[message = "Reconfiguration addresses more `Unit` \
                             positions than allowed at once"]
                TooManyUnits,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::IncorporationNotExists(_) => return None,
            Self::Layout(e) => match e {
                layout::Error::ExcessReserved { .. } => {
                    Error::ExcessReserved.into()
                }
                layout::Error::ExcessSold { .. } => Error::ExcessSold.into(),
                layout::Error::SoldPlanMismatch { .. } => {
                    Error::SoldPlanMismatch.into()
                }
                layout::Error::InvalidStack
                | layout::Error::Generation(_) => return None,
            },
            Self::NoFloors => Error::NoFloors.into(),
            Self::NotManager(_) => api::PrivilegeError::Manager.into(),
            Self::PlanNotExists(_) => Error::PlanNotExists.into(),
            Self::TooManyUnits(_) => Error::TooManyUnits.into(),
        })
    }
}
