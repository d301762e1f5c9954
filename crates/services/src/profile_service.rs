use std::sync::Arc;

use storage::repository::{PreferenceStore, keys};

use crate::error::ProfileServiceError;

/// Greeting name used when none has been saved.
pub const DEFAULT_USER_NAME: &str = "Math Learner";

/// Player display name stored alongside the streak.
#[derive(Clone)]
pub struct ProfileService {
    preferences: Arc<dyn PreferenceStore>,
}

impl ProfileService {
    #[must_use]
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { preferences }
    }

    /// Load the saved name (or the default if missing or blank).
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError` on storage failures.
    pub async fn user_name(&self) -> Result<String, ProfileServiceError> {
        let name = self.preferences.get_string(keys::USER_NAME).await?;
        Ok(name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_owned()))
    }

    /// Validate and persist a new name.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::EmptyName` for a blank name, or a storage error.
    pub async fn set_user_name(&self, name: &str) -> Result<String, ProfileServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileServiceError::EmptyName);
        }
        self.preferences.set_string(keys::USER_NAME, name).await?;
        Ok(name.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn falls_back_to_default_name() {
        let svc = ProfileService::new(Arc::new(InMemoryRepository::new()));
        assert_eq!(svc.user_name().await.unwrap(), DEFAULT_USER_NAME);
    }

    #[tokio::test]
    async fn saves_trimmed_name_and_rejects_blank() {
        let svc = ProfileService::new(Arc::new(InMemoryRepository::new()));
        assert_eq!(svc.set_user_name("  Ada ").await.unwrap(), "Ada");
        assert_eq!(svc.user_name().await.unwrap(), "Ada");
        assert!(matches!(
            svc.set_user_name("   ").await,
            Err(ProfileServiceError::EmptyName)
        ));
    }
}
