//! Identity models and auth request/response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Roles recognized by the CRM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// IT administrator
    ItAdmin,
    /// General manager
    GenelMudur,
    /// Sales manager, owns a team
    SatisMuduru,
    /// Sales representative, belongs to a subteam
    SatisGorevlisi,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ItAdmin => "IT_ADMIN",
            Role::GenelMudur => "GENEL_MUDUR",
            Role::SatisMuduru => "SATIS_MUDURU",
            Role::SatisGorevlisi => "SATIS_GOREVLISI",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sales team affiliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

/// Subteam affiliation within a sales team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subteam {
    A1,
    A2,
    B1,
    B2,
}

/// A stored identity as returned by an [`IdentityStore`](crate::store::IdentityStore)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    pub role: Role,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub subteam: Option<Subteam>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Identity {
    /// Create an active identity with a fresh id and no team affiliation
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            team: None,
            subteam: None,
            name: String::new(),
            surname: String::new(),
            is_active: true,
            last_login_at: None,
        }
    }

    pub fn with_team(mut self, team: Team, subteam: Option<Subteam>) -> Self {
        self.team = Some(team);
        self.subteam = subteam;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>, surname: impl Into<String>) -> Self {
        self.name = name.into();
        self.surname = surname.into();
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Snapshot of the attributes embedded in an access token
    pub fn claims(&self) -> IdentityClaims {
        IdentityClaims {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
            team: self.team,
            subteam: self.subteam,
            name: self.name.clone(),
            surname: self.surname.clone(),
        }
    }
}

/// Identity attributes carried by an access token and returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub team: Option<Team>,
    pub subteam: Option<Subteam>,
    pub name: String,
    pub surname: String,
}

/// Login credentials. Both fields are optional so that a missing field is a
/// 400 rather than a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of a successful login or refresh
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub ok: bool,
    pub access_token: String,
    pub user: IdentityClaims,
}

/// Body of `GET /me`
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub ok: bool,
    pub user: IdentityClaims,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::SatisGorevlisi).unwrap(),
            "\"SATIS_GOREVLISI\""
        );
        assert_eq!(
            serde_json::from_str::<Role>("\"GENEL_MUDUR\"").unwrap(),
            Role::GenelMudur
        );
        assert_eq!(Role::ItAdmin.to_string(), "IT_ADMIN");
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(serde_json::from_str::<Role>("\"SUPERUSER\"").is_err());
        assert!(serde_json::from_str::<Subteam>("\"C9\"").is_err());
    }

    #[test]
    fn test_identity_from_json_defaults() {
        let json = r#"{
            "id": "u1",
            "email": "mudur.a@crms.local",
            "passwordHash": "$2b$04$abc",
            "role": "SATIS_MUDURU",
            "team": "A"
        }"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert!(identity.is_active);
        assert_eq!(identity.team, Some(Team::A));
        assert_eq!(identity.subteam, None);
        assert!(identity.last_login_at.is_none());
    }

    #[test]
    fn test_claims_snapshot() {
        let identity = Identity::new("gorevli.a1@crms.local", "hash", Role::SatisGorevlisi)
            .with_team(Team::A, Some(Subteam::A1))
            .with_name("Satici", "A1");
        let claims = identity.claims();

        assert_eq!(claims.id, identity.id);
        assert_eq!(claims.role, Role::SatisGorevlisi);
        assert_eq!(claims.subteam, Some(Subteam::A1));
        assert_eq!(claims.surname, "A1");
    }

    #[test]
    fn test_session_response_uses_camel_case() {
        let identity = Identity::new("a@b.c", "hash", Role::ItAdmin);
        let body = SessionResponse {
            ok: true,
            access_token: "tok".to_string(),
            user: identity.claims(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["accessToken"], "tok");
        assert_eq!(value["user"]["role"], "IT_ADMIN");
        assert!(value["user"]["team"].is_null());
    }
}
