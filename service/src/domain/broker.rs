//! Broker-related definitions.
//!
//! Brokers are managed by the external identity collaborator; this engine
//! only stores their IDs and resolves their [`Role`] from access tokens.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, marker, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID of a broker.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

define_kind! {
    #[doc = "Role of a broker within the brokerage."]
    enum Role {
        #[doc = "Regular broker, acts on their own reservations only."]
        Broker = 1,

        #[doc = "Manager, acts on any reservation and restructures \
                 inventory."]
        Manager = 2,

        #[doc = "Administrator, same privileges as a manager."]
        Admin = 3,
    }
}

impl Role {
    /// Indicates whether this [`Role`] may manage inventory and act upon
    /// other brokers' reservations.
    #[must_use]
    pub fn is_manager(self) -> bool {
        match self {
            Self::Manager | Self::Admin => true,
            Self::Broker => false,
        }
    }
}

/// Authenticated broker performing an operation.
#[derive(Clone, Copy, Debug)]
pub struct Actor {
    /// ID of the broker.
    pub id: Id,

    /// [`Role`] of the broker.
    pub role: Role,
}

impl Actor {
    /// Indicates whether this [`Actor`] may act upon a reservation held by
    /// the provided broker.
    #[must_use]
    pub fn may_act_for(&self, holder: Id) -> bool {
        self.id == holder || self.role.is_manager()
    }
}

/// Claims of a broker's access token issued by the external identity
/// collaborator.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct AccessToken {
    /// ID of the broker the token was issued to.
    pub broker_id: Id,

    /// [`Role`] of the broker.
    pub role: Role,

    /// [`DateTime`] when the token expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl From<AccessToken> for Actor {
    fn from(token: AccessToken) -> Self {
        Self {
            id: token.broker_id,
            role: token.role,
        }
    }
}

/// Encoded access token of a broker.
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of an [`AccessToken`] expiration.
pub type ExpirationDateTime = DateTimeOf<(AccessToken, marker::Expiration)>;
