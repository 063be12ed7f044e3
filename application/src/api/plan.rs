//! [`Plan`]-related definitions.

use std::future;

use common::{DateTime, Handler as _, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLInputObject, GraphQLScalar};
use service::{command, domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// A unit plan ("tipologia").
#[derive(Clone, Debug, From)]
pub struct Plan {
    /// ID of this [`Plan`].
    id: Id,

    /// Underlying [`domain::Plan`].
    plan: OnceCell<domain::Plan>,
}

impl From<domain::Plan> for Plan {
    fn from(plan: domain::Plan) -> Self {
        Self {
            id: plan.id.into(),
            plan: OnceCell::new_with(Some(plan)),
        }
    }
}

impl Plan {
    /// Creates a new [`Plan`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Plan`] with the provided ID exists,
    /// otherwise accessing this [`Plan`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            plan: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Plan`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Plan`] doesn't exist.
    async fn plan(&self, ctx: &Context) -> Result<&domain::Plan, Error> {
        let id = self.id.into();
        self.plan
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::plans::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|p| {
                        future::ready(p.ok_or_else(|| {
                            api::query::PlanError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A unit plan ("tipologia").
#[graphql_object(context = Context)]
impl Plan {
    /// Unique identifier of this `Plan`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Plan.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `Incorporation` owning this `Plan`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Plan.incorporation",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn incorporation(
        &self,
        ctx: &Context,
    ) -> Result<api::Incorporation, Error> {
        let id = self.plan(ctx).await?.incorporation_id;
        #[expect(
            unsafe_code,
            reason = "loaded `Plan` guarantees `Incorporation` existence"
        )]
        Ok(unsafe { api::Incorporation::new_unchecked(id) })
    }

    /// Name of this `Plan`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Plan.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.plan(ctx).await?.name.clone().into())
    }

    /// Number of bedrooms of this `Plan`'s `Unit`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Plan.bedrooms",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn bedrooms(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.plan(ctx).await?.bedrooms.into())
    }

    /// Area of this `Plan`'s `Unit`s, in square meters.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Plan.area",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn area(&self, ctx: &Context) -> Result<Area, Error> {
        Ok(self.plan(ctx).await?.area.into())
    }

    /// Base price of this `Plan`'s `Unit`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Plan.basePrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn base_price(
        &self,
        ctx: &Context,
    ) -> Result<Option<Money>, Error> {
        Ok(self.plan(ctx).await?.base_price)
    }

    /// Declared layout shape of this `Plan`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Plan.shape",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn shape(&self, ctx: &Context) -> Result<Shape, Error> {
        Ok(self.plan(ctx).await?.shape.clone().into())
    }

    /// Indicator whether this `Plan` is active.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Plan.active",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn active(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.plan(ctx).await?.active)
    }

    /// Published price of this `Plan`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Plan.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn price(&self, ctx: &Context) -> Result<Option<Money>, Error> {
        Ok(self.plan(ctx).await?.price)
    }

    /// `Unit`s assigned to this `Plan`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Plan.units",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn units(&self, ctx: &Context) -> Result<Vec<api::Unit>, Error> {
        ctx.service()
            .execute(query::units::OfPlan::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|units| units.into_iter().map(Into::into).collect())
    }

    /// `DateTime` when this `Plan` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Plan.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.plan(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Plan`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::plan::Id)]
#[into(domain::plan::Id)]
#[graphql(name = "PlanId", transparent)]
pub struct Id(Uuid);

/// Name of a `Plan`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PlanName",
    with = scalar::Via::<domain::plan::Name>,
)]
pub struct Name(domain::plan::Name);

/// Area of a `Plan`'s `Unit`s, in square meters.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PlanArea",
    with = scalar::Via::<domain::plan::Area>,
)]
pub struct Area(domain::plan::Area);

/// Prefix prepended to a `Plan`'s generated block labels.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PlanBlockPrefix",
    with = scalar::Via::<domain::plan::BlockPrefix>,
)]
pub struct BlockPrefix(domain::plan::BlockPrefix);

/// Declared layout shape of a [`Plan`].
#[derive(Clone, Debug, From, Into)]
pub struct Shape(domain::plan::Shape);

/// Declared layout shape of a `Plan`.
#[graphql_object(name = "PlanShape", context = Context)]
impl Shape {
    /// Number of blocks (towers) the `Plan` generates.
    #[must_use]
    pub fn blocks_count(&self) -> i32 {
        self.0.blocks_count.into()
    }

    /// Number of floors per block.
    #[must_use]
    pub fn floors_per_block(&self) -> i32 {
        self.0.floors_per_block.into()
    }

    /// Number of `Unit`s per floor.
    #[must_use]
    pub fn units_per_floor(&self) -> i32 {
        self.0.units_per_floor.into()
    }

    /// Prefix prepended to generated block labels.
    #[must_use]
    pub fn block_prefix(&self) -> Option<BlockPrefix> {
        self.0.block_prefix.clone().map(Into::into)
    }
}

/// Declared layout shape of a `Plan` to generate `Unit`s from.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "PlanShapeInput")]
pub struct ShapeInput {
    /// Number of blocks (towers) to generate.
    pub blocks_count: i32,

    /// Number of floors per block.
    pub floors_per_block: i32,

    /// Number of `Unit`s per floor.
    pub units_per_floor: i32,

    /// Prefix to prepend to generated block labels.
    pub block_prefix: Option<BlockPrefix>,
}

impl TryFrom<ShapeInput> for domain::plan::Shape {
    type Error = std::num::TryFromIntError;

    fn try_from(shape: ShapeInput) -> Result<Self, Self::Error> {
        Ok(Self {
            blocks_count: shape.blocks_count.try_into()?,
            floors_per_block: shape.floors_per_block.try_into()?,
            units_per_floor: shape.units_per_floor.try_into()?,
            block_prefix: shape.block_prefix.map(Into::into),
        })
    }
}

/// Summary of an applied floor reconfiguration.
#[derive(Clone, Debug, From)]
pub struct Reconfiguration(command::reconfigure_floors::Reconfiguration);

/// Summary of an applied floor reconfiguration.
#[graphql_object(context = Context)]
impl Reconfiguration {
    /// Reconfigured `Plan`, republished if requested.
    #[must_use]
    pub fn plan(&self) -> Plan {
        self.0.plan.clone().into()
    }

    /// Number of retained `Unit`s re-attributed to the `Plan`.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "bounded by the generation limit"
    )]
    #[must_use]
    pub fn units_updated(&self) -> i32 {
        self.0.units_updated as i32
    }

    /// Number of newly generated `Unit`s.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "bounded by the generation limit"
    )]
    #[must_use]
    pub fn units_created(&self) -> i32 {
        self.0.units_created as i32
    }

    /// Number of `Unit`s trimmed out of the active layout.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "bounded by the generation limit"
    )]
    #[must_use]
    pub fn units_blocked(&self) -> i32 {
        self.0.units_blocked as i32
    }

    /// Number of towers the reconfiguration touched.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "bounded by the generation limit"
    )]
    #[must_use]
    pub fn towers_affected(&self) -> i32 {
        self.0.towers_affected as i32
    }
}
