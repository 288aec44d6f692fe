//! Role-tagged authentication.
//!
//! Credentials are bcrypt-hashed; logins issue a signed JWT carrying
//! `(sub, role, exp)`. Verification turns the token back into an
//! explicit [`Actor`] value that is passed into every core operation —
//! role context is never read from ambient state.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Token lifetime: 7 days.
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Subject claim for the configured admin identity.
const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

/// A verified caller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin,
    Doctor(Uuid),
    Patient(Uuid),
}

impl Actor {
    pub fn role(&self) -> Role {
        match self {
            Self::Admin => Role::Admin,
            Self::Doctor(_) => Role::Doctor,
            Self::Patient(_) => Role::Patient,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Admin, or the doctor themself.
    pub fn can_manage_doctor(&self, doctor_id: Uuid) -> bool {
        match self {
            Self::Admin => true,
            Self::Doctor(id) => *id == doctor_id,
            Self::Patient(_) => false,
        }
    }

    /// Admin, or the patient themself.
    pub fn can_manage_patient(&self, patient_id: Uuid) -> bool {
        match self {
            Self::Admin => true,
            Self::Patient(id) => *id == patient_id,
            Self::Doctor(_) => false,
        }
    }
}

/// JWT claim set.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid authentication token")]
    InvalidToken,
    #[error("Token has expired, please login again")]
    TokenExpired,
    #[error("Credential hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Generate a random signing secret (URL-safe base64, 32 bytes of
/// entropy). Used when no secret is configured; tokens then survive
/// only for the process lifetime.
pub fn generate_secret() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Constant result shape: verification failures and malformed hashes both
/// read as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Issue a signed token for a verified identity.
pub fn issue_token(secret: &str, actor: &Actor) -> Result<String, AuthError> {
    let sub = match actor {
        Actor::Admin => ADMIN_SUBJECT.to_string(),
        Actor::Doctor(id) | Actor::Patient(id) => id.to_string(),
    };
    let claims = Claims {
        sub,
        role: actor.role(),
        exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Verify a token and recover the caller identity.
pub fn verify_token(secret: &str, token: &str) -> Result<Actor, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    let claims = data.claims;
    match claims.role {
        Role::Admin => Ok(Actor::Admin),
        Role::Doctor => Uuid::parse_str(&claims.sub)
            .map(Actor::Doctor)
            .map_err(|_| AuthError::InvalidToken),
        Role::Patient => Uuid::parse_str(&claims.sub)
            .map(Actor::Patient)
            .map_err(|_| AuthError::InvalidToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn generated_secrets_are_unique() {
        let s1 = generate_secret();
        let s2 = generate_secret();
        assert_ne!(s1, s2);
        assert!(!s1.is_empty());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2-but-longer").unwrap();
        assert!(verify_password("hunter2-but-longer", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn verify_password_tolerates_garbage_hash() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn token_round_trip_per_role() {
        let doctor_id = Uuid::new_v4();
        let patient_id = Uuid::new_v4();
        for actor in [
            Actor::Admin,
            Actor::Doctor(doctor_id),
            Actor::Patient(patient_id),
        ] {
            let token = issue_token(SECRET, &actor).unwrap();
            assert_eq!(verify_token(SECRET, &token).unwrap(), actor);
        }
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue_token(SECRET, &Actor::Admin).unwrap();
        let err = verify_token("other-secret", &token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn expired_token_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: Role::Patient,
            // Well past the default validation leeway
            exp: Utc::now().timestamp() - 600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = verify_token(SECRET, &token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn garbage_token_rejected() {
        assert!(matches!(
            verify_token(SECRET, "not.a.token").unwrap_err(),
            AuthError::InvalidToken
        ));
    }

    #[test]
    fn non_uuid_subject_rejected_for_doctor_role() {
        let claims = Claims {
            sub: "admin".into(),
            role: Role::Doctor,
            exp: Utc::now().timestamp() + 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            verify_token(SECRET, &token).unwrap_err(),
            AuthError::InvalidToken
        ));
    }

    #[test]
    fn ownership_helpers() {
        let doctor_id = Uuid::new_v4();
        let patient_id = Uuid::new_v4();

        assert!(Actor::Admin.can_manage_doctor(doctor_id));
        assert!(Actor::Admin.can_manage_patient(patient_id));

        assert!(Actor::Doctor(doctor_id).can_manage_doctor(doctor_id));
        assert!(!Actor::Doctor(Uuid::new_v4()).can_manage_doctor(doctor_id));
        assert!(!Actor::Doctor(doctor_id).can_manage_patient(patient_id));

        assert!(Actor::Patient(patient_id).can_manage_patient(patient_id));
        assert!(!Actor::Patient(Uuid::new_v4()).can_manage_patient(patient_id));
        assert!(!Actor::Patient(patient_id).can_manage_doctor(doctor_id));
    }
}
