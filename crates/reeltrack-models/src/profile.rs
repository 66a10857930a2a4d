use serde::{Deserialize, Serialize};

/// Public profile stored next to a user's collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub friends: Vec<String>,
}

impl UserProfile {
    /// Name to show: display name, then username, then the user id.
    pub fn label<'a>(&'a self, user_id: &'a str) -> &'a str {
        self.display_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_tolerates_missing_and_extra_fields() {
        let profile: UserProfile = serde_json::from_value(json!({
            "username": "reeler",
            "theme": "dark"
        }))
        .unwrap();
        assert_eq!(profile.username.as_deref(), Some("reeler"));
        assert!(profile.friends.is_empty());
        assert_eq!(profile.label("uid-1"), "reeler");
        assert_eq!(UserProfile::default().label("uid-1"), "uid-1");
    }
}
