use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GradError;

/// Role allowed on the registrar routes.
pub const REGISTRAR_ROLE: &str = "ADMIN";

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: String,
}

impl Principal {
    /// Construct from validated JWT claims at the server boundary.
    /// The server middleware calls this; core logic never reads raw tokens.
    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role.clone(),
        }
    }

    pub fn is_registrar(&self) -> bool {
        self.role == REGISTRAR_ROLE
    }

    pub fn require_registrar(&self) -> Result<(), GradError> {
        if self.is_registrar() {
            Ok(())
        } else {
            Err(GradError::Forbidden(format!(
                "{} lacks the {REGISTRAR_ROLE} role",
                self.user_id
            )))
        }
    }
}

/// Bearer token payload: `{userId, role}` plus the standard time claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: &str) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            role: role.into(),
        }
    }

    #[test]
    fn from_claims_copies_identity() {
        let claims = TokenClaims {
            user_id: Uuid::new_v4(),
            role: "ADMIN".into(),
            iat: 0,
            exp: 1,
        };
        let p = Principal::from_claims(&claims);
        assert_eq!(p.user_id, claims.user_id);
        assert!(p.is_registrar());
    }

    #[test]
    fn require_registrar_rejects_other_roles() {
        assert!(principal("ADMIN").require_registrar().is_ok());
        let err = principal("STAFF").require_registrar().unwrap_err();
        assert!(matches!(err, GradError::Forbidden(_)));
        // Role names are case-sensitive.
        assert!(principal("admin").require_registrar().is_err());
    }

    #[test]
    fn claims_wire_shape() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(TokenClaims {
            user_id: id,
            role: "ADMIN".into(),
            iat: 10,
            exp: 20,
        })
        .unwrap();
        assert_eq!(json["userId"], serde_json::json!(id));
        assert_eq!(json["exp"], serde_json::json!(20));
    }
}
