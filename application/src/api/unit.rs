//! [`Unit`]-related definitions.

use std::future;

use common::{DateTime, DateTimeOf, Handler as _, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// A sellable unit.
#[derive(Clone, Debug, From)]
pub struct Unit {
    /// ID of this [`Unit`].
    id: Id,

    /// Underlying [`domain::Unit`].
    unit: OnceCell<domain::Unit>,
}

impl From<domain::Unit> for Unit {
    fn from(unit: domain::Unit) -> Self {
        Self {
            id: unit.id.into(),
            unit: OnceCell::new_with(Some(unit)),
        }
    }
}

impl Unit {
    /// Creates a new [`Unit`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Unit`] with the provided ID exists,
    /// otherwise accessing this [`Unit`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            unit: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Unit`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Unit`] doesn't exist.
    async fn unit(&self, ctx: &Context) -> Result<&domain::Unit, Error> {
        let id = self.id.into();
        self.unit
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::units::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|u| {
                        future::ready(u.ok_or_else(|| {
                            api::query::UnitError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A sellable unit.
#[graphql_object(context = Context)]
impl Unit {
    /// Unique identifier of this `Unit`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `Incorporation` owning this `Unit`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.incorporation",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn incorporation(
        &self,
        ctx: &Context,
    ) -> Result<api::Incorporation, Error> {
        let id = self.unit(ctx).await?.incorporation_id;
        #[expect(
            unsafe_code,
            reason = "loaded `Unit` guarantees `Incorporation` existence"
        )]
        Ok(unsafe { api::Incorporation::new_unchecked(id) })
    }

    /// `Plan` this `Unit` is assigned to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.plan",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn plan(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Plan>, Error> {
        #[expect(
            unsafe_code,
            reason = "loaded `Unit` guarantees `Plan` existence"
        )]
        Ok(self
            .unit(ctx)
            .await?
            .plan_id
            .map(|id| unsafe { api::Plan::new_unchecked(id) }))
    }

    /// Code of this `Unit`, unique within its `Incorporation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.code",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn code(&self, ctx: &Context) -> Result<Code, Error> {
        Ok(self.unit(ctx).await?.code.clone().into())
    }

    /// Tower of this `Unit`, if it belongs to one.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.tower",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn tower(&self, ctx: &Context) -> Result<Option<Tower>, Error> {
        Ok(self.unit(ctx).await?.tower.clone().map(Into::into))
    }

    /// Floor of this `Unit`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.floor",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn floor(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.unit(ctx).await?.floor.into())
    }

    /// Stack (column label) of this `Unit` within its floor.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.stack",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn stack(&self, ctx: &Context) -> Result<Stack, Error> {
        Ok(self.unit(ctx).await?.stack.clone().into())
    }

    /// Number of bedrooms of this `Unit`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.bedrooms",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn bedrooms(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.unit(ctx).await?.bedrooms.into())
    }

    /// Area of this `Unit`, in square meters.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.area",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn area(&self, ctx: &Context) -> Result<api::plan::Area, Error> {
        Ok(self.unit(ctx).await?.area.into())
    }

    /// List price of this `Unit`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.listPrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn list_price(
        &self,
        ctx: &Context,
    ) -> Result<Option<Money>, Error> {
        Ok(self.unit(ctx).await?.list_price)
    }

    /// Current status of this `Unit`.
    ///
    /// A reserved `Unit` whose hold has already lapsed is reported
    /// `AVAILABLE`, even before the expiration is persisted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.unit(ctx).await?.observed_status(DateTime::now()).into())
    }

    /// ID of the broker holding this `Unit`, if reserved.
    ///
    /// `null` once the hold has lapsed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.reservedBy",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn reserved_by(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::reservation::BrokerId>, Error> {
        let unit = self.unit(ctx).await?;
        if unit.hold_lapsed(DateTime::now()) {
            return Ok(None);
        }
        Ok(unit.reserved_by.map(Into::into))
    }

    /// `DateTime` when the active hold on this `Unit` expires.
    ///
    /// `null` once the hold has lapsed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.reservationExpiresAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn reservation_expires_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        let unit = self.unit(ctx).await?;
        if unit.hold_lapsed(DateTime::now()) {
            return Ok(None);
        }
        Ok(unit.reservation_expires_at.map(DateTimeOf::coerce))
    }

    /// `DateTime` when this `Unit` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Unit.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.unit(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Unit`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::unit::Id)]
#[into(domain::unit::Id)]
#[graphql(name = "UnitId", transparent)]
pub struct Id(Uuid);

/// Code of a `Unit`, unique within its `Incorporation`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UnitCode",
    with = scalar::Via::<domain::unit::Code>,
)]
pub struct Code(domain::unit::Code);

/// Tower label of a `Unit`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UnitTower",
    with = scalar::Via::<domain::unit::Tower>,
)]
pub struct Tower(domain::unit::Tower);

/// Stack (column label) of a `Unit` within a floor.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UnitStack",
    with = scalar::Via::<domain::unit::Stack>,
)]
pub struct Stack(domain::unit::Stack);

/// Status of a `Unit`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "UnitStatus")]
pub enum Status {
    /// Open for reservation.
    Available,

    /// Held by a broker under an active reservation.
    Reserved,

    /// Sold.
    Sold,

    /// Trimmed out of the active layout.
    Blocked,
}

impl From<domain::unit::Status> for Status {
    fn from(status: domain::unit::Status) -> Self {
        use domain::unit::Status as S;
        match status {
            S::Available => Self::Available,
            S::Reserved => Self::Reserved,
            S::Sold => Self::Sold,
            S::Blocked => Self::Blocked,
        }
    }
}
