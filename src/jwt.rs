//! JWT token generation and validation.
//!
//! Dual-token scheme: short-lived access tokens paired with long-lived
//! refresh tokens, both signed with the same HS256 secret and carrying a
//! `typ` claim so one kind can never be replayed as the other. Validity is
//! purely a function of signature and embedded expiry; nothing is stored
//! server-side.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token authorizing protected requests
    Access,
    /// Long-lived token used only to mint new access tokens
    Refresh,
}

/// JWT claims shared by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user UUID)
    pub sub: String,
    /// Username
    pub username: String,
    /// Token type
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// A freshly minted token with its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The JWT token string
    pub token: String,
    /// Token duration in seconds
    pub duration: u64,
}

/// Access and refresh tokens created together at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Configuration for JWT operations: signing key plus expiry policy.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_duration_secs: u64,
    refresh_duration_secs: u64,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret and lifetimes.
    /// The caller is responsible for ensuring `access < refresh`.
    pub fn new(secret: &[u8], access_duration_secs: u64, refresh_duration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_duration_secs,
            refresh_duration_secs,
        }
    }

    /// Access token lifetime in seconds.
    pub fn access_duration_secs(&self) -> u64 {
        self.access_duration_secs
    }

    /// Refresh token lifetime in seconds.
    pub fn refresh_duration_secs(&self) -> u64 {
        self.refresh_duration_secs
    }

    fn mint(
        &self,
        sub: &str,
        username: &str,
        token_type: TokenType,
        duration: u64,
    ) -> Result<IssuedToken, TokenError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TokenError::TimeError)?
            .as_secs();

        let claims = Claims {
            sub: sub.to_string(),
            username: username.to_string(),
            token_type,
            iat: now,
            exp: now + duration,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)?;

        Ok(IssuedToken { token, duration })
    }

    /// Issue a paired access and refresh token for a user.
    /// Pure function of identity, current time, and the configured key.
    pub fn issue(&self, sub: &str, username: &str) -> Result<TokenPair, TokenError> {
        let access = self.mint(sub, username, TokenType::Access, self.access_duration_secs)?;
        let refresh = self.mint(
            sub,
            username,
            TokenType::Refresh,
            self.refresh_duration_secs,
        )?;
        Ok(TokenPair { access, refresh })
    }

    /// Validate a token: signature, expiry, and the expected `typ` claim.
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if token_data.claims.token_type != expected {
            return Err(TokenError::WrongType);
        }

        Ok(token_data.claims)
    }

    /// Mint a new access token from a still-valid refresh token.
    /// The refresh token is reused as-is for the remainder of its lifetime.
    pub fn refresh_access(&self, refresh_token: &str) -> Result<IssuedToken, TokenError> {
        let claims = self.validate(refresh_token, TokenType::Refresh)?;
        self.mint(
            &claims.sub,
            &claims.username,
            TokenType::Access,
            self.access_duration_secs,
        )
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum TokenError {
    /// Signature verified but the embedded expiry has passed
    Expired,
    /// Bad signature, garbage input, or missing claims
    Malformed,
    /// Valid token of the wrong kind (e.g. refresh used as access)
    WrongType,
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::Malformed => write!(f, "Token is malformed"),
            TokenError::WrongType => write!(f, "Wrong token type"),
            TokenError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            TokenError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for TokenError {}
