use serde::{Deserialize, Serialize};

/// Where each kind of user data lives in the database tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseLayout {
    #[serde(default = "default_users_root")]
    pub users_root: String,
    #[serde(default = "default_items_key")]
    pub items_key: String,
    #[serde(default = "default_activity_key")]
    pub activity_key: String,
    #[serde(default = "default_profile_key")]
    pub profile_key: String,
}

fn default_users_root() -> String {
    "users".to_string()
}

fn default_items_key() -> String {
    "movies".to_string()
}

fn default_activity_key() -> String {
    "activity".to_string()
}

fn default_profile_key() -> String {
    "profile".to_string()
}

impl Default for DatabaseLayout {
    fn default() -> Self {
        Self {
            users_root: default_users_root(),
            items_key: default_items_key(),
            activity_key: default_activity_key(),
            profile_key: default_profile_key(),
        }
    }
}

impl DatabaseLayout {
    pub fn user_path(&self, user_id: &str) -> String {
        format!("{}/{}", self.users_root, user_id)
    }

    pub fn items_path(&self, user_id: &str) -> String {
        format!("{}/{}", self.user_path(user_id), self.items_key)
    }

    pub fn item_path(&self, user_id: &str, item_id: &str) -> String {
        format!("{}/{}", self.items_path(user_id), item_id)
    }

    pub fn item_field_path(&self, user_id: &str, item_id: &str, field: &str) -> String {
        format!("{}/{}", self.item_path(user_id, item_id), field)
    }

    pub fn activity_entry_path(&self, user_id: &str, entry_id: &str) -> String {
        format!("{}/{}/{}", self.user_path(user_id), self.activity_key, entry_id)
    }

    pub fn profile_path(&self, user_id: &str) -> String {
        format!("{}/{}", self.user_path(user_id), self.profile_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let layout = DatabaseLayout::default();
        assert_eq!(layout.items_path("u1"), "users/u1/movies");
        assert_eq!(layout.item_field_path("u1", "550", "watched"), "users/u1/movies/550/watched");
        assert_eq!(layout.activity_entry_path("u1", "e1"), "users/u1/activity/e1");
        assert_eq!(layout.profile_path("u1"), "users/u1/profile");
    }
}
