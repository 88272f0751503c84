//! Sharing engine - per-user sets of decks shared with them.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::record::{decode, DeckInfo};
use crate::store::{paths, StoreError, StoreGateway, Versioned};

/// A shared deck id resolved to its display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDeck {
    pub deck_id: String,
    pub title: String,
}

/// Maintains each user's deduplicated list of shared deck ids.
///
/// Mutations are read-modify-write guarded by the store's version counter,
/// so a concurrent mutation of the same set surfaces as
/// [`StoreError::Conflict`] instead of silently dropping an update.
pub struct SharingEngine<S> {
    store: S,
}

impl<S: StoreGateway> SharingEngine<S> {
    pub fn new(store: S) -> Self {
        SharingEngine { store }
    }

    /// Grant a user access to a deck. Sharing an already-shared deck fails
    /// with `AlreadyExists` and leaves the set untouched.
    pub fn share_deck(&self, user_id: &str, deck_id: &str) -> Result<(), EngineError> {
        if user_id.is_empty() {
            return Err(EngineError::InvalidArgument("userId"));
        }
        if deck_id.is_empty() {
            return Err(EngineError::InvalidArgument("deckId"));
        }

        let path = paths::sharing(user_id);
        let Versioned { data, version } = self.store.get_versioned(&path)?;
        let mut deck_ids: Vec<String> = match data {
            Some(value) => decode(&path, value)?,
            None => Vec::new(),
        };

        if deck_ids.iter().any(|id| id == deck_id) {
            return Err(EngineError::AlreadyExists {
                kind: "sharing",
                id: deck_id.to_string(),
            });
        }

        deck_ids.push(deck_id.to_string());
        self.write_set(&path, &deck_ids, version)?;
        debug!("deck {} shared with user {}", deck_id, user_id);
        Ok(())
    }

    /// Revoke a share. Unsharing a deck that is not in the set fails with
    /// `NotFound` and leaves the set untouched.
    pub fn unshare_deck(&self, user_id: &str, deck_id: &str) -> Result<(), EngineError> {
        if user_id.is_empty() {
            return Err(EngineError::InvalidArgument("userId"));
        }

        let path = paths::sharing(user_id);
        let Versioned { data, version } = self.store.get_versioned(&path)?;
        let mut deck_ids: Vec<String> = match data {
            Some(value) => decode(&path, value)?,
            None => Vec::new(),
        };

        let Some(position) = deck_ids.iter().position(|id| id == deck_id) else {
            return Err(EngineError::NotFound {
                kind: "sharing",
                id: deck_id.to_string(),
            });
        };
        deck_ids.remove(position);
        self.write_set(&path, &deck_ids, version)?;
        debug!("deck {} unshared from user {}", deck_id, user_id);
        Ok(())
    }

    /// Decks shared with a user, resolved to their display titles, in
    /// share order. Ids whose deck no longer exists are skipped; a user
    /// with no sharing set gets an empty list, never an error.
    pub fn list_shared_decks(&self, user_id: &str) -> Result<Vec<SharedDeck>, EngineError> {
        let path = paths::sharing(user_id);
        let Some(value) = self.store.get(&path)? else {
            return Ok(Vec::new());
        };
        let deck_ids: Vec<String> = decode(&path, value)?;

        let mut decks = Vec::with_capacity(deck_ids.len());
        for deck_id in deck_ids {
            let deck_path = paths::deck(&deck_id);
            match self.store.get(&deck_path)? {
                Some(deck_value) => match serde_json::from_value::<DeckInfo>(deck_value) {
                    Ok(info) => decks.push(SharedDeck {
                        deck_id,
                        title: info.title,
                    }),
                    Err(e) => warn!("skipping malformed deck {}: {}", deck_id, e),
                },
                None => debug!("skipping shared deck {} with no backing deck", deck_id),
            }
        }
        Ok(decks)
    }

    fn write_set(&self, path: &str, deck_ids: &[String], version: u64) -> Result<(), EngineError> {
        let value =
            serde_json::to_value(deck_ids).map_err(|e| StoreError::Serde(e.to_string()))?;
        self.store.set_versioned(path, value, version)?;
        Ok(())
    }
}
