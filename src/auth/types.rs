//! Wire types exchanged with the authentication backend

use serde::{Deserialize, Serialize};

/// A group the user belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

/// A permission granted to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub name: String,
}

/// Profile of the currently authenticated user.
///
/// Always replaced wholesale on a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub user_permissions: Vec<Permission>,
}

impl UserProfile {
    /// Full name when the backend provides one, otherwise the username
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn in_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.user_permissions.iter().any(|p| p.name == name)
    }
}

/// Credentials for `login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// New account data for `register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of a successful login or registration.
///
/// Backends disagree on the field name: some return `token`, JWT pair
/// endpoints return `access` (alongside a `refresh` we do not use).
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
}

impl TokenResponse {
    pub fn into_token(self) -> Option<String> {
        let usable = |t: Option<String>| t.filter(|t| !t.trim().is_empty());
        usable(self.token).or_else(|| usable(self.access))
    }
}

/// Body of the current-user endpoint, bare or wrapped in `{"user": ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CurrentUserBody {
    Wrapped { user: UserProfile },
    Bare(UserProfile),
}

impl CurrentUserBody {
    pub(crate) fn into_profile(self) -> UserProfile {
        match self {
            CurrentUserBody::Wrapped { user } => user,
            CurrentUserBody::Bare(user) => user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_field_names() {
        let body: TokenResponse = serde_json::from_str(r#"{"token": "abc"}"#).unwrap();
        assert_eq!(body.into_token().as_deref(), Some("abc"));

        let body: TokenResponse =
            serde_json::from_str(r#"{"refresh": "r", "access": "xyz"}"#).unwrap();
        assert_eq!(body.into_token().as_deref(), Some("xyz"));

        let body: TokenResponse =
            serde_json::from_str(r#"{"id": 3, "email": "a@b.c"}"#).unwrap();
        assert_eq!(body.into_token(), None);

        let body: TokenResponse = serde_json::from_str(r#"{"token": "  "}"#).unwrap();
        assert_eq!(body.into_token(), None);

        // A blank primary field does not hide a usable fallback
        let body: TokenResponse =
            serde_json::from_str(r#"{"token": "", "access": "abc"}"#).unwrap();
        assert_eq!(body.into_token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_current_user_body_shapes() {
        let bare = r#"{"id": 1, "username": "ada", "email": "ada@example.com"}"#;
        let profile = serde_json::from_str::<CurrentUserBody>(bare)
            .unwrap()
            .into_profile();
        assert_eq!(profile.username, "ada");
        assert!(profile.groups.is_empty());

        let wrapped = r#"{"user": {"id": 2, "username": "bob", "email": "bob@example.com",
            "first_name": "Bob", "last_name": "Lee",
            "groups": [{"id": 1, "name": "staff"}],
            "user_permissions": [{"id": 9, "name": "change_user"}]}}"#;
        let profile = serde_json::from_str::<CurrentUserBody>(wrapped)
            .unwrap()
            .into_profile();
        assert_eq!(profile.id, 2);
        assert!(profile.in_group("staff"));
        assert!(profile.has_permission("change_user"));
        assert_eq!(profile.display_name(), "Bob Lee");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let profile = UserProfile {
            id: 1,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            first_name: String::new(),
            last_name: " ".to_string(),
            groups: vec![],
            user_permissions: vec![],
        };
        assert_eq!(profile.display_name(), "ada");
    }
}
