//! Profile store: the persisted display name.
//!
//! # Responsibility
//! - Read the saved name once at startup.
//! - Persist explicit saves and mirror them in memory.
//!
//! # Invariants
//! - A blank name is rejected without writing.
//! - Stored values are trimmed; an empty stored value reads as absent.
//! - Names are never logged.

use crate::model::profile::{normalize_display_name, Profile};
use crate::repo::kv_repo::{KvRepository, PROFILE_NAME_KEY};
use crate::service::outcome::{MutationOutcome, PersistStatus, Skip, StoreChange};
use log::{debug, error, info, warn};

pub struct ProfileStore<R: KvRepository> {
    repo: R,
    profile: Profile,
}

impl<R: KvRepository> ProfileStore<R> {
    /// Loads the saved name; read failures leave the profile absent.
    pub fn load(repo: R) -> Self {
        let name = match repo.get(PROFILE_NAME_KEY) {
            Ok(stored) => {
                let name = stored.as_deref().and_then(normalize_display_name);
                info!(
                    "event=profile_load module=profile_store status=ok present={}",
                    name.is_some()
                );
                name
            }
            Err(err) => {
                warn!(
                    "event=profile_load module=profile_store status=error error_code=read_failed error={err}"
                );
                None
            }
        };

        Self {
            repo,
            profile: Profile::new(name),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn name(&self) -> Option<&str> {
        self.profile.name()
    }

    pub fn needs_prompt(&self) -> bool {
        self.profile.needs_prompt()
    }

    pub fn greeting_name(&self) -> &str {
        self.profile.greeting_name()
    }

    /// Saves a trimmed, non-blank name.
    pub fn save(&mut self, raw: &str) -> MutationOutcome {
        let Some(name) = normalize_display_name(raw) else {
            debug!("event=profile_save module=profile_store status=skip reason=empty_name");
            return MutationOutcome::rejected(Skip::EmptyName);
        };

        let persist = match self.repo.set(PROFILE_NAME_KEY, &name) {
            Ok(()) => {
                info!("event=profile_save module=profile_store status=ok");
                PersistStatus::Written
            }
            Err(err) => {
                error!(
                    "event=profile_save module=profile_store status=error error_code=write_failed error={err}"
                );
                PersistStatus::Failed
            }
        };

        self.profile.set_name(name);
        MutationOutcome::new(StoreChange::NameSaved, persist)
    }
}
