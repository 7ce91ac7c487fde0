use serde::{Deserialize, Serialize};

use crate::role::{Permission, Role, role_permissions};

/// Claims carried by an auth token, before db validation.
#[derive(Clone)]
pub struct ActorPayload {
    pub id: i32,
    pub org_id: i32,
    pub login: String,
    pub role: Role,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ActorDto {
    pub id: i32,
    pub org_id: i32,
    pub login: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// The identity making a request, empty for unauthenticated requests.
#[derive(Clone, Serialize, Deserialize)]
pub struct Actor {
    pub actor: Option<ActorDto>,
}

impl Actor {
    pub fn new(payload: ActorPayload) -> Self {
        let permissions = role_permissions(payload.role);

        Actor {
            actor: Some(ActorDto {
                id: payload.id,
                org_id: payload.org_id,
                login: payload.login,
                role: payload.role,
                permissions,
            }),
        }
    }

    /// Empty actor for unauthenticated requests
    pub fn default() -> Self {
        Actor { actor: None }
    }

    pub fn is_authenticated(&self) -> bool {
        self.actor.is_some()
    }

    pub fn has_permissions(&self, permissions: &Vec<Permission>) -> bool {
        match &self.actor {
            Some(actor) => actor
                .permissions
                .iter()
                .any(|permission| permissions.contains(permission)),
            None => false,
        }
    }

    pub fn is_org_admin(&self) -> bool {
        match &self.actor {
            Some(actor) => actor.role == Role::Admin,
            None => false,
        }
    }

    pub fn login(&self) -> Option<&str> {
        self.actor.as_ref().map(|actor| actor.login.as_str())
    }

    pub fn org_id(&self) -> Option<i32> {
        self.actor.as_ref().map(|actor| actor.org_id)
    }
}
