//! Client profile loading and editing.

use chrono::Utc;
use coach_core::{ClientProfile, ProfileUpdate};
use database::{client_profile, Database};
use tracing::debug;

use crate::error::{PortalError, Result};
use crate::identity::Identity;

/// Outcome of loading the signed-in user's profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileLoad {
    Unauthenticated,
    /// No profile existed; a default one was stored.
    Created(ClientProfile),
    Existing(ClientProfile),
}

impl ProfileLoad {
    pub fn into_profile(self) -> Option<ClientProfile> {
        match self {
            ProfileLoad::Unauthenticated => None,
            ProfileLoad::Created(profile) | ProfileLoad::Existing(profile) => Some(profile),
        }
    }
}

/// Profile repository operations.
#[derive(Debug, Clone)]
pub struct ProfileManager {
    database: Database,
}

impl ProfileManager {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Load the user's profile, creating a default one on first visit.
    ///
    /// The default profile takes its name and email from the identity and
    /// leaves every other field blank.
    pub async fn load(&self, identity: Option<&Identity>) -> Result<ProfileLoad> {
        let Some(identity) = identity else {
            return Ok(ProfileLoad::Unauthenticated);
        };
        let pool = self.database.pool();

        if let Some(profile) = client_profile::get_profile(pool, &identity.user_id).await? {
            return Ok(ProfileLoad::Existing(profile));
        }

        let default = ClientProfile::new_default(
            identity.user_id.as_str(),
            identity.display_name.as_deref(),
            identity.email.as_deref(),
            Utc::now(),
        );
        let (profile, created) = client_profile::create_if_missing(pool, &default).await?;
        Ok(if created {
            ProfileLoad::Created(profile)
        } else {
            ProfileLoad::Existing(profile)
        })
    }

    /// Validate and merge `update` into the stored profile.
    pub async fn update(&self, identity: &Identity, update: &ProfileUpdate) -> Result<ClientProfile> {
        update.validate()?;
        Ok(client_profile::update_profile(self.database.pool(), &identity.user_id, update).await?)
    }
}

/// Local profile state of an open session.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileState {
    Unauthenticated,
    Ready(ClientProfile),
}

/// A signed-in user's profile page: stored record plus local copy.
#[derive(Debug)]
pub struct ProfileSession {
    manager: ProfileManager,
    identity: Option<Identity>,
    state: ProfileState,
}

impl ProfileSession {
    /// Load (or create) the profile for `identity`.
    pub async fn open(manager: ProfileManager, identity: Option<Identity>) -> Result<Self> {
        let state = match manager.load(identity.as_ref()).await?.into_profile() {
            Some(profile) => ProfileState::Ready(profile),
            None => ProfileState::Unauthenticated,
        };
        Ok(Self {
            manager,
            identity,
            state,
        })
    }

    pub fn state(&self) -> &ProfileState {
        &self.state
    }

    /// Write `update` to the store, then merge it into the local copy.
    ///
    /// The local copy is not re-read; on a failed write it is left as it was.
    pub async fn update(&mut self, update: ProfileUpdate) -> Result<()> {
        let (Some(identity), ProfileState::Ready(profile)) = (&self.identity, &mut self.state) else {
            return Err(PortalError::Unauthenticated);
        };
        if update.is_empty() {
            return Ok(());
        }

        self.manager.update(identity, &update).await?;
        profile.apply(&update);
        debug!("Merged profile update for {}", identity.user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn manager() -> ProfileManager {
        ProfileManager::new(Database::in_memory().await.unwrap())
    }

    fn dana() -> Identity {
        Identity::new("user-1")
            .with_display_name("Dana")
            .with_email("dana@example.com")
    }

    #[tokio::test]
    async fn test_first_load_creates_default() {
        let manager = manager().await;

        assert_eq!(manager.load(None).await.unwrap(), ProfileLoad::Unauthenticated);

        let first = manager.load(Some(&dana())).await.unwrap();
        let ProfileLoad::Created(profile) = &first else {
            panic!("expected a created profile, got {first:?}");
        };
        assert_eq!(profile.full_name, "Dana");
        assert_eq!(profile.email, "dana@example.com");
        assert!(profile.gender.is_empty());
        assert_eq!(profile.weight, 0.0);

        let second = manager.load(Some(&dana())).await.unwrap();
        assert_eq!(second, ProfileLoad::Existing(profile.clone()));
    }

    #[tokio::test]
    async fn test_session_merges_locally_and_remotely() {
        let manager = manager().await;
        let mut session = ProfileSession::open(manager.clone(), Some(dana())).await.unwrap();

        session
            .update(ProfileUpdate {
                phone: Some("555-0100".to_string()),
                weight: Some(150.0),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap();

        let ProfileState::Ready(local) = session.state() else {
            panic!("expected a ready session");
        };
        assert_eq!(local.phone.as_deref(), Some("555-0100"));
        assert_eq!(local.weight, 150.0);
        assert_eq!(local.full_name, "Dana");

        let stored = manager.load(Some(&dana())).await.unwrap().into_profile().unwrap();
        assert_eq!(stored.phone, local.phone);
        assert_eq!(stored.weight, local.weight);
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_local_state() {
        let manager = manager().await;
        let mut session = ProfileSession::open(manager, Some(dana())).await.unwrap();
        let before = session.state().clone();

        let err = session
            .update(ProfileUpdate {
                email: Some("not-an-email".to_string()),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::ValidationFailed(_)));
        assert_eq!(session.state(), &before);
    }

    #[tokio::test]
    async fn test_signed_out_session() {
        let mut session = ProfileSession::open(manager().await, None).await.unwrap();
        assert_eq!(session.state(), &ProfileState::Unauthenticated);

        let err = session.update(ProfileUpdate::default()).await.unwrap_err();
        assert!(matches!(err, PortalError::Unauthenticated));
    }
}
