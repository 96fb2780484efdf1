//! Session tokens presented as bearer credentials.
//!
//! Token provisioning (the login flow) lives outside this service; the
//! model here only covers decoding a presented token and hashing it for
//! the lookup against the sessions table.

use crate::model::{Id, user::UserMarker};
use argon2::{Argon2, Params};
use base64::{DecodeError, Engine, display::Base64Display, prelude::BASE64_URL_SAFE_NO_PAD};
use std::{
    fmt::{Debug, Formatter},
    num::ParseIntError,
    str::FromStr,
};
use thiserror::Error;
use time::{Duration, UtcDateTime};

pub const SESSION_TOKEN_SECRET_LEN: usize = 32;
pub const SESSION_TOKEN_SALT_LEN: usize = 16;
pub const SESSION_TOKEN_HASH_LEN: usize = Params::DEFAULT_OUTPUT_LEN;

/// Wire format: `<user id>.<base64url secret>.<base64url salt>`.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SessionToken {
    pub user_id: Id<UserMarker>,
    pub secret: [u8; SESSION_TOKEN_SECRET_LEN],
    pub salt: [u8; SESSION_TOKEN_SALT_LEN],
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SessionTokenHash(pub Box<[u8; SESSION_TOKEN_HASH_LEN]>);

/// A session row as stored, minus the hash preimage.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Session {
    pub user: Id<UserMarker>,
    pub token_hash: SessionTokenHash,
    pub created_at: UtcDateTime,
    pub expires_after: Option<Duration>,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: UtcDateTime) -> bool {
        match self.expires_after {
            Some(expires_after) => self.created_at + expires_after < now,
            None => false,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing session token failed: {0}")]
pub struct SessionTokenHashError(argon2::Error);

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum SessionTokenDecodeError {
    #[error("Not enough parts separated by '.'")]
    NotEnoughParts,
    #[error("Invalid user id: {0}")]
    InvalidUserId(ParseIntError),
    #[error("Decoding base64 failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("The length of the secret part is incorrect")]
    InvalidSecretLength,
    #[error("The length of the salt part is incorrect")]
    InvalidSaltLength,
}

impl SessionToken {
    #[must_use]
    pub fn generate_random(user_id: Id<UserMarker>) -> Self {
        Self {
            user_id,
            secret: rand::random(),
            salt: rand::random(),
        }
    }

    #[must_use]
    pub fn as_token_str(&self) -> String {
        let user_id = self.user_id;
        let secret = Base64Display::new(&self.secret, &BASE64_URL_SAFE_NO_PAD);
        let salt = Base64Display::new(&self.salt, &BASE64_URL_SAFE_NO_PAD);

        format!("{user_id}.{secret}.{salt}")
    }

    pub fn hash(&self) -> Result<SessionTokenHash, SessionTokenHashError> {
        let mut hash = Box::new([0; SESSION_TOKEN_HASH_LEN]);
        Argon2::default()
            .hash_password_into(&self.secret, &self.salt, &mut *hash)
            .map_err(SessionTokenHashError)?;

        Ok(SessionTokenHash(hash))
    }
}

impl FromStr for SessionToken {
    type Err = SessionTokenDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');

        let user_id_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let secret_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let salt_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;

        let user_id = i64::from_str(user_id_part)
            .map_err(Self::Err::InvalidUserId)?
            .into();
        let secret = BASE64_URL_SAFE_NO_PAD
            .decode(secret_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSecretLength)?;
        let salt = BASE64_URL_SAFE_NO_PAD
            .decode(salt_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSaltLength)?;

        Ok(Self {
            user_id,
            secret,
            salt,
        })
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("user_id", &self.user_id)
            .field("secret", &"[redacted]")
            .field("salt", &"[redacted]")
            .finish()
    }
}

impl Debug for SessionTokenHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionTokenHash")
            .field(&"[redacted]")
            .finish()
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The session token hash had an invalid length")]
pub struct InvalidSessionTokenHashError;

impl TryFrom<Vec<u8>> for SessionTokenHash {
    type Error = InvalidSessionTokenHashError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let boxed: Box<[u8; SESSION_TOKEN_HASH_LEN]> = value
            .into_boxed_slice()
            .try_into()
            .map_err(|_| InvalidSessionTokenHashError)?;
        Ok(Self(boxed))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::auth::{Session, SessionToken, SessionTokenDecodeError, SessionTokenHash};
    use std::str::FromStr;
    use time::{Duration, macros::utc_datetime};

    #[test]
    fn token_string_round_trip() {
        let token = SessionToken::generate_random(7.into());
        let parsed = SessionToken::from_str(&token.as_token_str()).unwrap();
        assert_eq!(token, parsed);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert_eq!(
            SessionToken::from_str("no-separators"),
            Err(SessionTokenDecodeError::NotEnoughParts),
        );
        assert!(matches!(
            SessionToken::from_str("x.YWJj.YWJj"),
            Err(SessionTokenDecodeError::InvalidUserId(_)),
        ));
        assert_eq!(
            SessionToken::from_str("1.YWJj.YWJj"),
            Err(SessionTokenDecodeError::InvalidSecretLength),
        );
    }

    #[test]
    fn hashing_is_deterministic_per_token() {
        let token = SessionToken::generate_random(1.into());
        assert_eq!(token.hash().unwrap(), token.hash().unwrap());

        let other = SessionToken::generate_random(1.into());
        assert_ne!(token.hash().unwrap(), other.hash().unwrap());
    }

    #[test]
    fn session_expiry() {
        let hash = SessionTokenHash::try_from(vec![0; 32]).unwrap();
        let session = Session {
            user: 1.into(),
            token_hash: hash,
            created_at: utc_datetime!(2023-02-01 12:00),
            expires_after: Some(Duration::hours(1)),
        };

        assert!(!session.is_expired(utc_datetime!(2023-02-01 12:30)));
        assert!(session.is_expired(utc_datetime!(2023-02-01 14:00)));

        let unlimited = Session {
            expires_after: None,
            ..session
        };
        assert!(!unlimited.is_expired(utc_datetime!(2030-01-01 0:00)));
    }
}
