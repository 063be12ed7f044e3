//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Incorporation` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INCORPORATION_NOT_EXISTS` - the `Incorporation` with the specified
    ///                                ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "incorporation",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn incorporation(
        id: api::incorporation::Id,
        ctx: &Context,
    ) -> Result<api::Incorporation, Error> {
        ctx.service()
            .execute(query::incorporation::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| IncorporationError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists all the `Incorporation`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "incorporations",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn incorporations(
        ctx: &Context,
    ) -> Result<Vec<api::Incorporation>, Error> {
        ctx.service()
            .execute(query::incorporations::All::by(
                service::read::incorporation::All,
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|all| all.into_iter().map(Into::into).collect())
    }

    /// Returns the `Plan` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PLAN_NOT_EXISTS` - the `Plan` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "plan",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn plan(
        id: api::plan::Id,
        ctx: &Context,
    ) -> Result<api::Plan, Error> {
        ctx.service()
            .execute(query::plans::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| PlanError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists all the `Plan`s of the specified `Incorporation`.
    #[tracing::instrument(
        skip_all,
        fields(
            incorporation_id = %incorporation_id,
            gql.name = "plans",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn plans(
        incorporation_id: api::incorporation::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Plan>, Error> {
        ctx.service()
            .execute(query::plans::OfIncorporation::by(incorporation_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|plans| plans.into_iter().map(Into::into).collect())
    }

    /// Returns the `Unit` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `UNIT_NOT_EXISTS` - the `Unit` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "unit",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn unit(
        id: api::unit::Id,
        ctx: &Context,
    ) -> Result<api::Unit, Error> {
        ctx.service()
            .execute(query::units::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UnitError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists all the `Unit`s of the specified `Incorporation`, including
    /// blocked ones kept for the mirror feed.
    #[tracing::instrument(
        skip_all,
        fields(
            incorporation_id = %incorporation_id,
            gql.name = "units",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn units(
        incorporation_id: api::incorporation::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Unit>, Error> {
        ctx.service()
            .execute(query::units::OfIncorporation::by(incorporation_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|units| units.into_iter().map(Into::into).collect())
    }

    /// Returns the `Reservation` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "reservation",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reservation(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::reservation::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ReservationError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Sale` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SALE_NOT_EXISTS` - the `Sale` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "sale",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn sale(
        id: api::sale::Id,
        ctx: &Context,
    ) -> Result<api::Sale, Error> {
        let _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::sale::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| SaleError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum IncorporationError {
        #[code = "INCORPORATION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Incorporation` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum PlanError {
        #[code = "PLAN_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Plan` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UnitError {
        #[code = "UNIT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Unit` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum ReservationError {
        #[code = "RESERVATION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Reservation` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum SaleError {
        #[code = "SALE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Sale` with the specified ID does not exist"]
        NotExists,
    }
}
