use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User profile - public information shown next to posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: Uuid,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub verified: bool,
}

/// Identity asserted by the external identity provider after sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub uid: Uuid,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl UserProfile {
    /// Build the profile created on a user's first sign-in.
    pub fn from_identity(identity: &ProviderIdentity) -> Self {
        let display_name = identity.display_name.clone().unwrap_or_default();
        let email = identity.email.clone().unwrap_or_default();

        Self {
            uid: identity.uid,
            username: derive_username(&display_name, &email, identity.uid),
            display_name,
            email,
            photo_url: identity.photo_url.clone().unwrap_or_default(),
            bio: String::new(),
            created_at: Utc::now(),
            verified: false,
        }
    }

    /// Refresh provider-owned fields on a later sign-in.
    ///
    /// Username, bio, verification and creation time are kept.
    pub fn merge_identity(&mut self, identity: &ProviderIdentity) {
        if let Some(name) = &identity.display_name {
            self.display_name = name.clone();
        }
        if let Some(email) = &identity.email {
            self.email = email.clone();
        }
        if let Some(photo) = &identity.photo_url {
            self.photo_url = photo.clone();
        }
    }
}

/// Username fallback: display name without whitespace, else the email
/// local part, else `user`, suffixed with the first six characters of the uid.
pub fn derive_username(display_name: &str, email: &str, uid: Uuid) -> String {
    let base: String = if !display_name.trim().is_empty() {
        display_name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
    } else {
        match email.split('@').next() {
            Some(local) if !local.is_empty() => local.to_string(),
            _ => "user".to_string(),
        }
    };

    let uid = uid.to_string();
    format!("{}-{}", base, &uid[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid() -> Uuid {
        Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap()
    }

    #[test]
    fn test_username_from_display_name() {
        assert_eq!(derive_username("Ada Love Lace", "", uid()), "adalovelace-a1b2c3");
    }

    #[test]
    fn test_username_from_email() {
        assert_eq!(derive_username("  ", "grace@navy.mil", uid()), "grace-a1b2c3");
    }

    #[test]
    fn test_username_fallback() {
        assert_eq!(derive_username("", "", uid()), "user-a1b2c3");
    }

    #[test]
    fn test_merge_keeps_username_and_bio() {
        let identity = ProviderIdentity {
            uid: uid(),
            display_name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            photo_url: None,
        };
        let mut profile = UserProfile::from_identity(&identity);
        profile.bio = "engines".to_string();

        profile.merge_identity(&ProviderIdentity {
            uid: uid(),
            display_name: Some("Ada L.".to_string()),
            email: None,
            photo_url: Some("https://img/ada.png".to_string()),
        });

        assert_eq!(profile.username, "ada-a1b2c3");
        assert_eq!(profile.display_name, "Ada L.");
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.photo_url, "https://img/ada.png");
        assert_eq!(profile.bio, "engines");
    }
}
