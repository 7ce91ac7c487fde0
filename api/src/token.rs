use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::{
    Result,
    error::{InvalidAuthTokenSnafu, WhateverSnafu},
};
use roster::actor::ActorPayload;
use roster::role::Role;

#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    sub: String,
    oid: i32,
    login: String,
    role: String,
    exp: usize,
}

// Duration in seconds
const EXP_DURATION: i64 = 60 * 60 * 24 * 14; // 2 weeks

pub fn create_auth_token(actor: &ActorPayload, secret: &str) -> Result<String> {
    let exp = Utc::now() + Duration::seconds(EXP_DURATION);
    let data = actor.clone();

    let claims = Claims {
        sub: data.id.to_string(),
        oid: data.org_id,
        login: data.login,
        role: data.role.to_string(),
        exp: exp.timestamp() as usize,
    };

    let Ok(token) = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    ) else {
        return WhateverSnafu {
            msg: "Error creating JWT token".to_string(),
        }
        .fail();
    };

    Ok(token)
}

pub fn verify_auth_token(token: &str, secret: &str) -> Result<ActorPayload> {
    let Ok(decoded) = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) else {
        return InvalidAuthTokenSnafu {}.fail();
    };

    ensure!(decoded.claims.login.len() > 0, InvalidAuthTokenSnafu {});

    let Ok(id) = decoded.claims.sub.parse::<i32>() else {
        return InvalidAuthTokenSnafu {}.fail();
    };

    let Ok(role) = Role::try_from(decoded.claims.role.as_str()) else {
        return InvalidAuthTokenSnafu {}.fail();
    };

    Ok(ActorPayload {
        id,
        org_id: decoded.claims.oid,
        login: decoded.claims.login,
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_token() {
        // Generate token
        let actor = ActorPayload {
            id: 2001,
            org_id: 1000,
            login: "admin".to_string(),
            role: Role::Admin,
        };
        let token = create_auth_token(&actor, "secret").unwrap();
        assert!(token.len() > 0);

        // Validate it back
        let actor = verify_auth_token(&token, "secret").unwrap();
        assert_eq!(actor.id, 2001);
        assert_eq!(actor.org_id, 1000);
        assert_eq!(actor.login, "admin".to_string());
        assert_eq!(actor.role, Role::Admin);
    }

    #[test]
    fn test_wrong_secret() {
        let actor = ActorPayload {
            id: 2001,
            org_id: 1000,
            login: "admin".to_string(),
            role: Role::Admin,
        };
        let token = create_auth_token(&actor, "secret").unwrap();
        let result = verify_auth_token(&token, "other-secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_token() {
        let result = verify_auth_token("not-a-token", "secret");
        assert!(result.is_err());
    }
}
