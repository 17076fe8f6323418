use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, PasswordHash, Version,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::audit::{self, AuditAction, AuditClient, AuditEntity};
use crate::config::AdminSeed;
use crate::domain::SignUpInput;
use crate::entities::user::{self, Role};
use crate::error::AppError;
use crate::store::UserStore;

const INVALID_CREDENTIALS: &str = "invalid email or password";
const INVALID_TOKEN: &str = "invalid token";
/// Verified against when the email is unknown, so both failures cost one
/// argon2 run.
const DUMMY_PASSWORD: &str = "no-such-user-password";

/// Access token payload. Only the user id travels in the token; the rest of
/// the identity is loaded again on every request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub struct AuthService {
    users: UserStore,
    secret: String,
    pepper: String,
    token_ttl: chrono::Duration,
    audit: Arc<dyn AuditClient>,
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        users: UserStore,
        secret: String,
        pepper: String,
        token_ttl: chrono::Duration,
        audit: Arc<dyn AuditClient>,
    ) -> Self {
        Self {
            users,
            secret,
            pepper,
            token_ttl,
            audit,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Registers a plain user and returns its id.
    pub async fn create_user(&self, input: SignUpInput) -> Result<String, AppError> {
        let id = self.insert_user(input, Role::User).await?;
        audit::emit(&self.audit, AuditEntity::User, AuditAction::Register, &id);
        Ok(id)
    }

    /// Creates the configured administrator unless the email is taken.
    pub async fn ensure_admin(&self, seed: &AdminSeed) -> Result<(), AppError> {
        if self.users.find_by_email(&seed.email).await?.is_some() {
            return Ok(());
        }

        let input = SignUpInput {
            name: "admin".to_owned(),
            surname: String::new(),
            email: seed.email.clone(),
            phone: String::new(),
            password: seed.password.clone(),
        };
        let id = self.insert_user(input, Role::Admin).await?;
        info!(user_id = %id, email = %seed.email, "Seeded administrator");
        Ok(())
    }

    pub async fn generate_token(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self.users.find_by_email(email).await?;
        let user = self.check_credentials(user, password)?;

        let token = self.mint_token(&user.id)?;
        audit::emit(&self.audit, AuditEntity::User, AuditAction::Login, &user.id);
        Ok(token)
    }

    /// Runs one password verification whether or not the user exists.
    fn check_credentials(
        &self,
        user: Option<user::Model>,
        password: &str,
    ) -> Result<user::Model, AppError> {
        let invalid = || AppError::Unauthorized(INVALID_CREDENTIALS.to_owned());
        match user {
            Some(user) if self.verify_password(password, &user.password_hash)? => Ok(user),
            Some(_) => Err(invalid()),
            None => {
                self.verify_password(password, self.dummy_hash()?)?;
                Err(invalid())
            }
        }
    }

    fn dummy_hash(&self) -> Result<&str, AppError> {
        self.dummy_hash
            .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD))
            .map(String::as_str)
    }

    /// Verifies signature, algorithm and expiry, and returns the user id.
    pub fn parse_token(&self, token: &str) -> Result<String, AppError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized(INVALID_TOKEN.to_owned()))?;

        Ok(data.claims.sub)
    }

    /// Resolves a token to the user it was issued for.
    pub async fn get_me(&self, token: &str) -> Result<user::Model, AppError> {
        let user_id = self.parse_token(token)?;
        self.users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_TOKEN.to_owned()))
    }

    fn mint_token(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| AppError::Internal("token expiry overflow".to_owned()))?;

        let claims = Claims {
            sub: user_id.to_owned(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|err| AppError::Internal(format!("failed to generate token: {err}")))
    }

    async fn insert_user(&self, input: SignUpInput, role: Role) -> Result<String, AppError> {
        let id = Uuid::new_v4().to_string();
        let new_user = user::ActiveModel {
            id: Set(id.clone()),
            name: Set(input.name),
            surname: Set(input.surname),
            email: Set(input.email),
            phone: Set(input.phone),
            role: Set(role),
            password_hash: Set(self.hash_password(&input.password)?),
            created_at: Set(Utc::now()),
        };

        self.users.create(new_user).await.map_err(|err| match AppError::from(err) {
            AppError::Conflict(_) => AppError::Conflict("email is already registered".to_owned()),
            other => other,
        })?;
        Ok(id)
    }

    fn hasher(&self) -> Result<Argon2<'_>, AppError> {
        Argon2::new_with_secret(
            self.pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|err| AppError::Internal(format!("failed to set up argon2: {err}")))
    }

    fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| AppError::Internal(format!("failed to hash password: {err}")))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|err| AppError::Internal(format!("stored hash is malformed: {err}")))?;

        match self.hasher()?.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(AppError::Internal(format!(
                "failed to verify password: {err}"
            ))),
        }
    }
}
