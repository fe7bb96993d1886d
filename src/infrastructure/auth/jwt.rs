use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{Utc, Duration};
use uuid::Uuid;
use crate::entities::token::{Claims, RefreshClaims, TokenType};
use crate::entities::user::User;
use crate::repositories::token::TokenServiceRepository;
use crate::settings::{AppConfig, JwtKeys};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    access_expiration: Duration,
    refresh_expiration: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            access_expiration: Duration::minutes(config.jwt_expiration_minutes),
            refresh_expiration: Duration::days(config.refresh_token_exp_days),
        }
    }

    pub fn create_jwt(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.access_expiration).timestamp().max(0) as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            token_type: TokenType::Access,
            exp,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding).map_err(|_| AuthError::TokenCreation)
    }

    pub fn create_refresh_jwt(&self, user_id: &Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.refresh_expiration).timestamp().max(0) as usize;

        let claims = RefreshClaims {
            sub: user_id.to_string(),
            exp,
            token_type: TokenType::Refresh,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.refresh_encoding).map_err(|_| AuthError::TokenCreation)
    }

    pub fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.keys.decoding, &validation).map_err(AuthError::from)?;
        if data.claims.token_type != TokenType::Access {
            return Err(AuthError::InvalidToken);
        }
        Ok(data)
    }

    pub fn decode_refresh_jwt(&self, token: &str) -> Result<TokenData<RefreshClaims>, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        let data = decode::<RefreshClaims>(token, &self.keys.refresh_decoding, &validation)
            .map_err(AuthError::from)?;
        if data.claims.token_type != TokenType::Refresh {
            return Err(AuthError::InvalidToken);
        }
        Ok(data)
    }
}

impl TokenServiceRepository for JwtService {
    fn create_jwt(&self, user: &User) -> Result<String, AuthError> {
        self.create_jwt(user)
    }

    fn create_refresh_jwt(&self, user_id: &Uuid) -> Result<String, AuthError> {
        self.create_refresh_jwt(user_id)
    }

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        self.decode_jwt(token)
    }

    fn decode_refresh_jwt(&self, token: &str) -> Result<TokenData<RefreshClaims>, AuthError> {
        self.decode_refresh_jwt(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use jsonwebtoken::{DecodingKey, EncodingKey};

    fn service(access_minutes: i64) -> JwtService {
        let access = "a".repeat(32);
        let refresh = "b".repeat(32);
        JwtService {
            keys: JwtKeys {
                encoding: EncodingKey::from_secret(access.as_bytes()),
                decoding: DecodingKey::from_secret(access.as_bytes()),
                refresh_encoding: EncodingKey::from_secret(refresh.as_bytes()),
                refresh_decoding: DecodingKey::from_secret(refresh.as_bytes()),
            },
            access_expiration: Duration::minutes(access_minutes),
            refresh_expiration: Duration::days(7),
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Mina".into(),
            last_name: "Das".into(),
            email: "mina@example.com".into(),
            password_hash: String::new(),
            phone_number: None,
            university: None,
            degree: None,
            branch: None,
            graduation_year: None,
            current_cgpa: None,
            tenth_percentage: None,
            twelfth_percentage: None,
            skills: vec![],
            resume: None,
            profile_picture: None,
            role: UserRole::Admin,
            is_active: true,
            is_email_verified: false,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn access_token_carries_identity() {
        let jwt = service(60);
        let user = user();
        let token = jwt.create_jwt(&user).unwrap();

        let claims = jwt.decode_jwt(&token).unwrap().claims;
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.email, "mina@example.com");
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let jwt = service(-10);
        let token = jwt.create_jwt(&user()).unwrap();
        assert!(matches!(jwt.decode_jwt(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let jwt = service(60);
        let refresh = jwt.create_refresh_jwt(&Uuid::new_v4()).unwrap();
        assert!(jwt.decode_jwt(&refresh).is_err());
        assert!(jwt.decode_refresh_jwt(&refresh).is_ok());
    }
}
