//! [`Reservation`]-related definitions.

use std::future;

use common::{DateTime, DateTimeOf, Handler as _};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// A broker's hold on a unit.
#[derive(Clone, Debug, From)]
pub struct Reservation {
    /// ID of this [`Reservation`].
    id: Id,

    /// Underlying [`domain::Reservation`].
    reservation: OnceCell<domain::Reservation>,
}

impl From<domain::Reservation> for Reservation {
    fn from(reservation: domain::Reservation) -> Self {
        Self {
            id: reservation.id.into(),
            reservation: OnceCell::new_with(Some(reservation)),
        }
    }
}

impl Reservation {
    /// Creates a new [`Reservation`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Reservation`] with the provided ID exists,
    /// otherwise accessing this [`Reservation`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            reservation: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Reservation`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Reservation`] doesn't exist.
    async fn reservation(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Reservation, Error> {
        let id = self.id.into();
        self.reservation
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::reservation::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|r| {
                        future::ready(r.ok_or_else(|| {
                            api::query::ReservationError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A broker's hold on a unit.
#[graphql_object(context = Context)]
impl Reservation {
    /// Unique identifier of this `Reservation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Held `Unit`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.unit",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn unit(&self, ctx: &Context) -> Result<api::Unit, Error> {
        let id = self.reservation(ctx).await?.unit_id;
        #[expect(
            unsafe_code,
            reason = "loaded `Reservation` guarantees `Unit` existence"
        )]
        Ok(unsafe { api::Unit::new_unchecked(id) })
    }

    /// ID of the broker holding the `Unit`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.holderId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn holder_id(&self, ctx: &Context) -> Result<BrokerId, Error> {
        Ok(self.reservation(ctx).await?.holder_id.into())
    }

    /// ID of the CRM lead this `Reservation` is made for, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.leadId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn lead_id(
        &self,
        ctx: &Context,
    ) -> Result<Option<LeadId>, Error> {
        Ok(self.reservation(ctx).await?.lead_id.map(Into::into))
    }

    /// Free-form note attached by the holder.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.note",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn note(&self, ctx: &Context) -> Result<Option<Note>, Error> {
        Ok(self.reservation(ctx).await?.note.clone().map(Into::into))
    }

    /// Current status of this `Reservation`.
    ///
    /// An active `Reservation` past its expiration is reported `EXPIRED`,
    /// even before the expiration is persisted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        let reservation = self.reservation(ctx).await?;
        if reservation.is_expired(DateTime::now()) {
            return Ok(domain::reservation::Status::Expired.into());
        }
        Ok(reservation.status.into())
    }

    /// `DateTime` when this `Reservation` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.reservation(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `Reservation` expires.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.expiresAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn expires_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.reservation(ctx).await?.expires_at.coerce())
    }

    /// `DateTime` when this `Reservation` left the active state, if it has.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.resolvedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn resolved_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.reservation(ctx).await?.resolved_at.map(DateTimeOf::coerce))
    }
}

/// Unique identifier of a `Reservation`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::reservation::Id)]
#[into(domain::reservation::Id)]
#[graphql(name = "ReservationId", transparent)]
pub struct Id(Uuid);

/// Unique identifier of a broker.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::broker::Id)]
#[into(domain::broker::Id)]
#[graphql(name = "BrokerId", transparent)]
pub struct BrokerId(Uuid);

/// Unique identifier of a CRM lead.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::lead::Id)]
#[into(domain::lead::Id)]
#[graphql(name = "LeadId", transparent)]
pub struct LeadId(Uuid);

/// Free-form note attached to a `Reservation`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ReservationNote",
    with = scalar::Via::<domain::reservation::Note>,
)]
pub struct Note(domain::reservation::Note);

/// Status of a `Reservation`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ReservationStatus")]
pub enum Status {
    /// Hold is in force.
    Active,

    /// Hold was converted into a `Sale`.
    Converted,

    /// Hold lapsed past its expiration.
    Expired,

    /// Hold was explicitly cancelled.
    Cancelled,
}

impl From<domain::reservation::Status> for Status {
    fn from(status: domain::reservation::Status) -> Self {
        use domain::reservation::Status as S;
        match status {
            S::Active => Self::Active,
            S::Converted => Self::Converted,
            S::Expired => Self::Expired,
            S::Cancelled => Self::Cancelled,
        }
    }
}
