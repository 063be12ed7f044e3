//! [`Command`] for authorizing a broker's access token.

use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::broker::{self, AccessToken},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a broker's access token.
///
/// Brokers are managed by the external identity collaborator, so the token
/// is only verified against the configured decoding key, never against the
/// database.
#[derive(Clone, Debug, From)]
pub struct AuthorizeAccessToken {
    /// [`broker::Token`] to authorize.
    pub token: broker::Token,
}

impl<Db> Command<AuthorizeAccessToken> for Service<Db> {
    type Ok = AccessToken;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeAccessToken,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeAccessToken { token } = cmd;

        let token = jsonwebtoken::decode::<AccessToken>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        Ok(token)
    }
}

/// Error of [`AuthorizeAccessToken`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}
