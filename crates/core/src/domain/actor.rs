// Caller identity & team ownership

use crate::domain::member::UserId;
use serde::{Deserialize, Serialize};

/// Team identifier (owned by the team directory)
pub type TeamId = String;

/// Role attached to a caller by the identity collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Mentor,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Mentor => write!(f, "mentor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Authenticated caller. The core trusts this value as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn student(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Student)
    }

    pub fn mentor(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Mentor)
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Admin)
    }
}

/// Team record as read from the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub mentor_id: UserId,
    pub is_active: bool,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>, mentor_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mentor_id: mentor_id.into(),
            is_active: true,
        }
    }

    /// Admins manage every team; a mentor only the team they run.
    pub fn is_managed_by(&self, actor: &Actor) -> bool {
        match actor.role {
            Role::Admin => true,
            Role::Mentor => self.mentor_id == actor.user_id,
            Role::Student => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_management_rights() {
        let team = Team::new("t1", "Rustaceans", "mentor-1");

        assert!(team.is_managed_by(&Actor::mentor("mentor-1")));
        assert!(team.is_managed_by(&Actor::admin("anyone")));
        assert!(!team.is_managed_by(&Actor::mentor("mentor-2")));
        // Same id but student role is not enough
        assert!(!team.is_managed_by(&Actor::student("mentor-1")));
    }

    #[test]
    fn test_role_wire_format() {
        let actor: Actor = serde_json::from_str(r#"{"user_id":"u1","role":"mentor"}"#).unwrap();
        assert_eq!(actor, Actor::mentor("u1"));
    }
}
