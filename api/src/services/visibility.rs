use crate::config::Config;
use roster::actor::Actor;

/// Whether a listed login should be suppressed for the requesting actor.
///
/// Hidden logins stay visible to org admins and to the hidden user itself.
pub fn is_hidden_user(login: &str, actor: &Actor, config: &Config) -> bool {
    if !config.users.hidden_users.contains(login) {
        return false;
    }

    if actor.is_org_admin() {
        return false;
    }

    actor.login() != Some(login)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccessControlConfig, DbConfig, ServerConfig, UsersConfig};
    use roster::actor::ActorPayload;
    use roster::role::Role;
    use std::collections::HashSet;

    fn config(hidden: &[&str]) -> Config {
        Config {
            jwt_secret: "secret".to_string(),
            server: ServerConfig { port: 4000 },
            db: DbConfig {
                url: "postgres://localhost/test".to_string(),
            },
            users: UsersConfig {
                hidden_users: HashSet::from_iter(hidden.iter().map(|s| s.to_string())),
            },
            access_control: AccessControlConfig {
                enabled: false,
                extended_roles: false,
            },
        }
    }

    fn actor(login: &str, role: Role) -> Actor {
        Actor::new(ActorPayload {
            id: 2000,
            org_id: 1000,
            login: login.to_string(),
            role,
        })
    }

    #[test]
    fn test_regular_user_is_visible() {
        let config = config(&["sa-metrics"]);
        let viewer = actor("alice", Role::Viewer);
        assert!(!is_hidden_user("bob", &viewer, &config));
    }

    #[test]
    fn test_hidden_user_is_suppressed_for_non_admins() {
        let config = config(&["sa-metrics"]);
        let viewer = actor("alice", Role::Viewer);
        assert!(is_hidden_user("sa-metrics", &viewer, &config));
    }

    #[test]
    fn test_admin_sees_hidden_users() {
        let config = config(&["sa-metrics"]);
        let admin = actor("admin", Role::Admin);
        assert!(!is_hidden_user("sa-metrics", &admin, &config));
    }

    #[test]
    fn test_hidden_user_sees_itself() {
        let config = config(&["sa-metrics"]);
        let hidden = actor("sa-metrics", Role::Viewer);
        assert!(!is_hidden_user("sa-metrics", &hidden, &config));
    }

    #[test]
    fn test_unauthenticated_never_sees_hidden() {
        let config = config(&["sa-metrics"]);
        assert!(is_hidden_user("sa-metrics", &Actor::default(), &config));
    }
}
