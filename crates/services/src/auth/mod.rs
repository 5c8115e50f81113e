use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use argon2::password_hash::rand_core::OsRng;
use bson::oid::ObjectId;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use groupframe_config::JwtSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Password hash error: {0}")]
    HashError(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Ambassador,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin user id or ambassador id, depending on `role`.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub token_type: TokenType,
    /// Set on render tokens only: the one order they may read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl Claims {
    pub fn subject_id(&self) -> Result<ObjectId, AuthError> {
        ObjectId::parse_str(&self.sub).map_err(|_| AuthError::InvalidToken("Bad subject".to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    Render,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

pub struct AuthService {
    jwt_settings: JwtSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(jwt_settings: JwtSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(jwt_settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(jwt_settings.secret.as_bytes());
        Self {
            jwt_settings,
            encoding_key,
            decoding_key,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn claims(&self, subject: ObjectId, role: Role, token_type: TokenType, ttl_secs: u64) -> Claims {
        let now = Utc::now();
        Claims {
            sub: subject.to_hex(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
            iss: self.jwt_settings.issuer.clone(),
            token_type,
            order_id: None,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    pub fn generate_tokens(&self, subject: ObjectId, role: Role) -> Result<TokenPair, AuthError> {
        let access = self.claims(
            subject,
            role,
            TokenType::Access,
            self.jwt_settings.access_token_ttl_secs,
        );
        let refresh = self.claims(
            subject,
            role,
            TokenType::Refresh,
            self.jwt_settings.refresh_token_ttl_secs,
        );

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            expires_in: self.jwt_settings.access_token_ttl_secs,
        })
    }

    /// Short-lived token that only unlocks `GET /render/order/{order_id}`.
    pub fn generate_render_token(
        &self,
        issued_by: ObjectId,
        order_id: ObjectId,
    ) -> Result<(String, u64), AuthError> {
        let mut claims = self.claims(
            issued_by,
            Role::Admin,
            TokenType::Render,
            self.jwt_settings.render_token_ttl_secs,
        );
        claims.order_id = Some(order_id.to_hex());
        Ok((self.sign(&claims)?, self.jwt_settings.render_token_ttl_secs))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.jwt_settings.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    fn verify_typed(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = self.verify_token(token)?;
        if claims.token_type != expected {
            return Err(AuthError::InvalidToken(format!(
                "Not a {} token",
                match expected {
                    TokenType::Access => "access",
                    TokenType::Refresh => "refresh",
                    TokenType::Render => "render",
                }
            )));
        }
        Ok(claims)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_typed(token, TokenType::Access)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_typed(token, TokenType::Refresh)
    }

    /// Accepts a render token scoped to `order_id`.
    pub fn verify_render_token(&self, token: &str, order_id: ObjectId) -> Result<Claims, AuthError> {
        let claims = self.verify_typed(token, TokenType::Render)?;
        if claims.order_id.as_deref() != Some(order_id.to_hex().as_str()) {
            return Err(AuthError::InvalidToken(
                "Render token is for a different order".to_string(),
            ));
        }
        Ok(claims)
    }
}
