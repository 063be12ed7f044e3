//! [`Sale`]-related definitions.

use std::future;

use common::{DateTime, Handler as _, Money, Percent};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// A sale proposal.
#[derive(Clone, Debug, From)]
pub struct Sale {
    /// ID of this [`Sale`].
    id: Id,

    /// Underlying [`domain::Sale`].
    sale: OnceCell<domain::Sale>,
}

impl From<domain::Sale> for Sale {
    fn from(sale: domain::Sale) -> Self {
        Self {
            id: sale.id.into(),
            sale: OnceCell::new_with(Some(sale)),
        }
    }
}

impl Sale {
    /// Creates a new [`Sale`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Sale`] with the provided ID exists,
    /// otherwise accessing this [`Sale`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            sale: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Sale`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Sale`] doesn't exist.
    async fn sale(&self, ctx: &Context) -> Result<&domain::Sale, Error> {
        let id = self.id.into();
        self.sale
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::sale::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|s| {
                        future::ready(s.ok_or_else(|| {
                            api::query::SaleError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A sale proposal.
#[graphql_object(context = Context)]
impl Sale {
    /// Unique identifier of this `Sale`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Sold `Unit`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.unit",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn unit(&self, ctx: &Context) -> Result<api::Unit, Error> {
        let id = self.sale(ctx).await?.unit_id;
        #[expect(
            unsafe_code,
            reason = "loaded `Sale` guarantees `Unit` existence"
        )]
        Ok(unsafe { api::Unit::new_unchecked(id) })
    }

    /// Converted `Reservation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.reservation",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn reservation(
        &self,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let id = self.sale(ctx).await?.reservation_id;
        #[expect(
            unsafe_code,
            reason = "loaded `Sale` guarantees `Reservation` existence"
        )]
        Ok(unsafe { api::Reservation::new_unchecked(id) })
    }

    /// Value the `Unit` was sold for.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.value",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn value(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.sale(ctx).await?.value)
    }

    /// Free-form note attached on conversion.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.note",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn note(&self, ctx: &Context) -> Result<Option<Note>, Error> {
        Ok(self.sale(ctx).await?.note.clone().map(Into::into))
    }

    /// Commission split of this `Sale`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.commission",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn commission(&self, ctx: &Context) -> Result<Commission, Error> {
        Ok(self.sale(ctx).await?.commission.into())
    }

    /// `DateTime` when this `Sale` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sale.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.sale(ctx).await?.created_at.coerce())
    }
}

/// Commission split of a [`Sale`].
#[derive(Clone, Copy, Debug, From)]
pub struct Commission(domain::commission::Commission);

/// Commission split of a `Sale`.
#[graphql_object(name = "SaleCommission", context = Context)]
impl Commission {
    /// Commission percentage the split was computed from.
    #[must_use]
    pub fn percent(&self) -> Percent {
        self.0.percent
    }

    /// Total commission value.
    #[must_use]
    pub fn value(&self) -> Money {
        self.0.value
    }

    /// Share of the broker who closed the sale.
    #[must_use]
    pub fn broker_value(&self) -> Money {
        self.0.broker_value
    }

    /// Share of the brokerage company.
    #[must_use]
    pub fn company_value(&self) -> Money {
        self.0.company_value
    }

    /// Share of the referral partner.
    #[must_use]
    pub fn partner_value(&self) -> Money {
        self.0.partner_value
    }
}

/// Unique identifier of a `Sale`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::sale::Id)]
#[into(domain::sale::Id)]
#[graphql(name = "SaleId", transparent)]
pub struct Id(Uuid);

/// Free-form note attached to a `Sale`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "SaleNote",
    with = scalar::Via::<domain::sale::Note>,
)]
pub struct Note(domain::sale::Note);
