//! [`Incorporation`]-related definitions.

use std::future;

use common::{DateTime, Handler as _, Money, Percent};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// An incorporation.
#[derive(Clone, Debug, From)]
pub struct Incorporation {
    /// ID of this [`Incorporation`].
    id: Id,

    /// Underlying [`domain::Incorporation`].
    incorporation: OnceCell<domain::Incorporation>,
}

impl From<domain::Incorporation> for Incorporation {
    fn from(incorporation: domain::Incorporation) -> Self {
        Self {
            id: incorporation.id.into(),
            incorporation: OnceCell::new_with(Some(incorporation)),
        }
    }
}

impl Incorporation {
    /// Creates a new [`Incorporation`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Incorporation`] with the provided ID exists,
    /// otherwise accessing this [`Incorporation`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            incorporation: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Incorporation`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Incorporation`] doesn't exist.
    async fn incorporation(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Incorporation, Error> {
        let id = self.id.into();
        self.incorporation
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::incorporation::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|i| {
                        future::ready(i.ok_or_else(|| {
                            api::query::IncorporationError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// An incorporation.
#[graphql_object(context = Context)]
impl Incorporation {
    /// Unique identifier of this `Incorporation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Incorporation.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `Incorporation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Incorporation.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.incorporation(ctx).await?.name.clone().into())
    }

    /// Commission percentage applied to sales in this `Incorporation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Incorporation.commissionPercent",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn commission_percent(
        &self,
        ctx: &Context,
    ) -> Result<Option<Percent>, Error> {
        Ok(self.incorporation(ctx).await?.commission_percent)
    }

    /// Displayed starting price of this `Incorporation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Incorporation.priceFrom",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn price_from(
        &self,
        ctx: &Context,
    ) -> Result<Option<Money>, Error> {
        Ok(self.incorporation(ctx).await?.price_from)
    }

    /// `Plan`s of this `Incorporation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Incorporation.plans",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn plans(&self, ctx: &Context) -> Result<Vec<api::Plan>, Error> {
        ctx.service()
            .execute(query::plans::OfIncorporation::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|plans| plans.into_iter().map(Into::into).collect())
    }

    /// `Unit`s of this `Incorporation`, blocked ones included.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Incorporation.units",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn units(&self, ctx: &Context) -> Result<Vec<api::Unit>, Error> {
        ctx.service()
            .execute(query::units::OfIncorporation::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|units| units.into_iter().map(Into::into).collect())
    }

    /// `DateTime` when this `Incorporation` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Incorporation.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.incorporation(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of an `Incorporation`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::incorporation::Id)]
#[into(domain::incorporation::Id)]
#[graphql(name = "IncorporationId", transparent)]
pub struct Id(Uuid);

/// Name of an `Incorporation`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "IncorporationName",
    with = scalar::Via::<domain::incorporation::Name>,
)]
pub struct Name(domain::incorporation::Name);
