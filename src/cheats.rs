//! Typed cheat operations behind the developer console
//!
//! The console collaborator owns authentication and command parsing;
//! these are the operations it invokes once a command is accepted. All
//! of them go straight through the key-value store so cheated values
//! persist like earned ones.

use rand::Rng;

use crate::storage::{self, KvStore, keys};

/// `/stats` readout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReadout {
    pub games_played: i64,
    pub player_id: String,
    pub crystals: u32,
}

/// Grant crystals. Returns the new balance, or `None` for a zero amount.
pub fn give_crystals(store: &mut dyn KvStore, amount: u32) -> Option<u32> {
    if amount == 0 {
        return None;
    }
    let total = storage::get_u32(store, keys::CRYSTALS).saturating_add(amount);
    storage::set_u32(store, keys::CRYSTALS, total);
    log::info!("cheat: granted {amount} crystals, balance {total}");
    Some(total)
}

/// Generate and persist a fresh opaque player identifier:
/// `P` + base36 timestamp + six random alphanumerics, uppercased.
pub fn regenerate_player_id<R: Rng>(store: &mut dyn KvStore, rng: &mut R, now_ms: f64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let suffix: String = (0..6)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    let id = format!("P{}{}", base36(now_ms as u64), suffix).to_uppercase();
    store.set(keys::PLAYER_ID, &id);
    id
}

/// The stored player id, generating one on first run
pub fn ensure_player_id<R: Rng>(store: &mut dyn KvStore, rng: &mut R, now_ms: f64) -> String {
    match store.get(keys::PLAYER_ID) {
        Some(id) if !id.is_empty() => id,
        _ => regenerate_player_id(store, rng, now_ms),
    }
}

pub fn stats(store: &dyn KvStore) -> StatsReadout {
    StatsReadout {
        games_played: storage::get_i64(store, keys::GAMES_PLAYED),
        player_id: store.get(keys::PLAYER_ID).unwrap_or_default(),
        crystals: storage::get_u32(store, keys::CRYSTALS),
    }
}

fn base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ascii")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStore;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_give_crystals_persists() {
        let mut store = MemStore::new();
        assert_eq!(give_crystals(&mut store, 25), Some(25));
        assert_eq!(give_crystals(&mut store, 5), Some(30));
        assert_eq!(storage::get_u32(&store, keys::CRYSTALS), 30);
    }

    #[test]
    fn test_zero_grant_rejected() {
        let mut store = MemStore::new();
        assert_eq!(give_crystals(&mut store, 0), None);
        assert_eq!(storage::get_u32(&store, keys::CRYSTALS), 0);
    }

    #[test]
    fn test_player_id_shape_and_stability() {
        let mut store = MemStore::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let id = ensure_player_id(&mut store, &mut rng, 1_700_000_000_000.0);
        assert!(id.starts_with('P'));
        assert!(id.len() > 7);
        assert_eq!(id, id.to_uppercase());
        // Second call returns the stored id unchanged
        assert_eq!(ensure_player_id(&mut store, &mut rng, 9.0), id);
        // Regeneration replaces it
        let fresh = regenerate_player_id(&mut store, &mut rng, 9.0);
        assert_ne!(fresh, id);
        assert_eq!(store.get(keys::PLAYER_ID), Some(fresh));
    }

    #[test]
    fn test_stats_readout() {
        let mut store = MemStore::new();
        storage::set_i64(&mut store, keys::GAMES_PLAYED, 7);
        give_crystals(&mut store, 3);
        store.set(keys::PLAYER_ID, "P123ABC");
        let readout = stats(&store);
        assert_eq!(readout.games_played, 7);
        assert_eq!(readout.player_id, "P123ABC");
        assert_eq!(readout.crystals, 3);
    }

    #[test]
    fn test_base36() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
    }
}
