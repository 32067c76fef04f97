//! Key-value persistence boundary
//!
//! The browser's LocalStorage is modeled as a narrow string store. There
//! is no schema versioning; every read falls back to a default when the
//! key is missing or holds an unparseable value, so a corrupted store can
//! never block gameplay.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The injected store interface. The wasm host backs this with
/// LocalStorage; tests and the native build use [`MemStore`].
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Well-known keys
pub mod keys {
    pub const HIGH_SCORE: &str = "snakeHighScore";
    pub const CRYSTALS: &str = "snakeCrystals";
    pub const PLAYER_ID: &str = "snakePlayerId";
    pub const GAMES_PLAYED: &str = "snakeGamesPlayed";
    /// Ad revivals consumed in the current game; missing reads as 0, so a
    /// fresh player has the full allowance
    pub const AD_REVIVALS_USED: &str = "snakeAdRevivalsUsed";

    /// Per-player stats blob
    pub fn player_stats(player_id: &str) -> String {
        format!("snakeStats_{player_id}")
    }
}

pub fn get_i64(store: &dyn KvStore, key: &str) -> i64 {
    store
        .get(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

pub fn get_u32(store: &dyn KvStore, key: &str) -> u32 {
    store
        .get(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

pub fn set_i64(store: &mut dyn KvStore, key: &str, value: i64) {
    store.set(key, &value.to_string());
}

pub fn set_u32(store: &mut dyn KvStore, key: &str, value: u32) {
    store.set(key, &value.to_string());
}

/// Per-player lifetime stats, stored as a JSON blob under
/// `snakeStats_<playerId>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStats {
    pub games_played: u64,
    pub total_score: i64,
}

pub fn load_player_stats(store: &dyn KvStore, player_id: &str) -> PlayerStats {
    store
        .get(&keys::player_stats(player_id))
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

pub fn save_player_stats(store: &mut dyn KvStore, player_id: &str, stats: &PlayerStats) {
    match serde_json::to_string(stats) {
        Ok(json) => store.set(&keys::player_stats(player_id), &json),
        Err(err) => log::warn!("failed to serialize player stats: {err}"),
    }
}

/// In-memory store for tests and the native build
#[derive(Debug, Default)]
pub struct MemStore {
    map: HashMap<String, String>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_defaults_to_zero() {
        let store = MemStore::new();
        assert_eq!(get_i64(&store, keys::HIGH_SCORE), 0);
        assert_eq!(get_u32(&store, keys::CRYSTALS), 0);
    }

    #[test]
    fn test_corrupted_value_treated_as_absent() {
        let mut store = MemStore::new();
        store.set(keys::HIGH_SCORE, "not a number");
        assert_eq!(get_i64(&store, keys::HIGH_SCORE), 0);
    }

    #[test]
    fn test_roundtrip() {
        let mut store = MemStore::new();
        set_i64(&mut store, keys::HIGH_SCORE, 420);
        set_u32(&mut store, keys::CRYSTALS, 17);
        assert_eq!(get_i64(&store, keys::HIGH_SCORE), 420);
        assert_eq!(get_u32(&store, keys::CRYSTALS), 17);
    }

    #[test]
    fn test_player_stats_blob() {
        let mut store = MemStore::new();
        assert_eq!(load_player_stats(&store, "P1"), PlayerStats::default());

        let stats = PlayerStats {
            games_played: 4,
            total_score: 230,
        };
        save_player_stats(&mut store, "P1", &stats);
        assert_eq!(load_player_stats(&store, "P1"), stats);

        // Field names match the original store format
        let json = store.get(&keys::player_stats("P1")).unwrap();
        assert!(json.contains("gamesPlayed"));
        assert!(json.contains("totalScore"));
    }

    #[test]
    fn test_corrupt_stats_blob_falls_back_to_default() {
        let mut store = MemStore::new();
        store.set(&keys::player_stats("P1"), "{broken json");
        assert_eq!(load_player_stats(&store, "P1"), PlayerStats::default());
    }
}
