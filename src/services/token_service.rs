use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::models::user::{Claims, User};

/// token 有效期：7 天
pub const TOKEN_TTL_DAYS: i64 = 7;
const TOKEN_SUBJECT: &str = "user token";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token 签名无效")]
    InvalidToken,
    #[error("token 已过期")]
    ExpiredToken,
    #[error("token 格式错误")]
    MalformedToken,
    #[error("token 签发失败: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// HS256 签发与校验。密钥在启动时加载一次，之后只读
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
}

impl TokenService {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            user_id: user.id,
            user_name: user.name.clone(),
            user_number: user.number.clone(),
            iss: self.issuer.clone(),
            sub: TOKEN_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::ImmatureSignature => TokenError::InvalidToken,
                _ => TokenError::MalformedToken,
            })
    }
}
