//! The authoritative real-time driver
//!
//! Owns the game state, the tick clock and the phase transitions the host
//! triggers (pause, revive, restart). Timestamps flow in through the API,
//! so a whole session can be driven in a test without a browser.

use crate::cheats;
use crate::consts::{AD_GATE_TIMEOUT_MS, INPUT_DEBOUNCE_MS, MAX_AD_REVIVALS, REVIVE_COST};
use crate::storage::{self, KvStore, keys};

use super::effects::OrbKind;
use super::render::{self, RenderSnapshot};
use super::snake::Direction;
use super::state::{GameConfig, GamePhase, GameState};
use super::tick::{self, TickOutcome};

/// Gate for the ad-revival flow. The timeout is the failsafe that keeps a
/// broken playback integration from stranding the player in GameOver.
#[derive(Debug, Clone, Copy)]
pub struct AdGate {
    opened_at: f64,
    completed: bool,
}

impl AdGate {
    pub fn new(now: f64) -> Self {
        Self {
            opened_at: now,
            completed: false,
        }
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// Continue is allowed once playback finished, or unconditionally
    /// after the timeout.
    pub fn can_continue(&self, now: f64) -> bool {
        self.completed || now - self.opened_at >= AD_GATE_TIMEOUT_MS
    }
}

/// One game session, owned by the host application
pub struct GameSession {
    state: GameState,
    store: Box<dyn KvStore>,
    player_id: String,
    /// Tick progress in [0, 1); reaches 1 only momentarily inside `frame`
    progress: f64,
    /// Cleared whenever the game is not running so the first frame after
    /// start/resume rebases instead of computing a huge stale elapsed
    last_frame: Option<f64>,
    last_input: f64,
    ad_gate: Option<AdGate>,
}

impl GameSession {
    pub fn new(config: GameConfig, seed: u64, mut store: Box<dyn KvStore>) -> Self {
        let high_score = storage::get_i64(store.as_ref(), keys::HIGH_SCORE);
        let crystals = storage::get_u32(store.as_ref(), keys::CRYSTALS);
        let mut state = GameState::new(config, seed, high_score, crystals);
        state.ad_revivals_used =
            storage::get_u32(store.as_ref(), keys::AD_REVIVALS_USED).min(MAX_AD_REVIVALS);
        let player_id = cheats::ensure_player_id(store.as_mut(), &mut state.rng, seed as f64);
        log::info!(
            "session created: grid {}x{}, high score {high_score}, crystals {crystals}",
            config.grid.size,
            config.grid.size
        );
        Self {
            state,
            store,
            player_id,
            progress: 0.0,
            last_frame: None,
            last_input: -INPUT_DEBOUNCE_MS,
            ad_gate: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for tests and the console overlay
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn store_mut(&mut self) -> &mut dyn KvStore {
        self.store.as_mut()
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn ad_revivals_remaining(&self) -> u32 {
        MAX_AD_REVIVALS.saturating_sub(self.state.ad_revivals_used)
    }

    /// Begin play from Idle
    pub fn start(&mut self, now: f64) {
        if self.state.phase != GamePhase::Idle {
            return;
        }
        self.state.phase = GamePhase::Running;
        self.state.last_orb_spawn = now;
        self.progress = 0.0;
        self.last_frame = None;
    }

    /// Per-animation-frame entry point. Advances interpolation progress,
    /// runs at most one discrete tick when progress crosses 1 (keeping the
    /// fractional remainder to avoid stutter), and returns the snapshot
    /// for this frame.
    pub fn frame(&mut self, now: f64) -> RenderSnapshot {
        if self.state.phase == GamePhase::Running {
            let elapsed = match self.last_frame {
                Some(last) => (now - last).max(0.0),
                None => 0.0,
            };
            self.last_frame = Some(now);

            let interval = self.state.move_interval_ms * self.state.effects.speed_modifier;
            self.progress += elapsed / interval;
            if self.progress >= 1.0 {
                let outcome = tick::tick(&mut self.state, now);
                self.progress = self.progress.fract();
                self.after_tick(outcome);
            }
        } else {
            self.last_frame = None;
        }
        render::snapshot(&self.state, self.progress, now)
    }

    fn after_tick(&mut self, outcome: TickOutcome) {
        if outcome.orb == Some(OrbKind::Crystal) {
            storage::set_u32(self.store.as_mut(), keys::CRYSTALS, self.state.crystals);
        }
        // The in-memory high score is a running max; persist the moment it
        // advances so the stored value is correct at any GameOver.
        if outcome.high_score_beaten {
            storage::set_i64(self.store.as_mut(), keys::HIGH_SCORE, self.state.high_score);
        }
        if outcome.game_over {
            self.progress = 0.0;
            self.last_frame = None;
            self.record_game_played();
        }
    }

    /// Bump the global and per-player games-played counters
    fn record_game_played(&mut self) {
        let played = storage::get_i64(self.store.as_ref(), keys::GAMES_PLAYED) + 1;
        storage::set_i64(self.store.as_mut(), keys::GAMES_PLAYED, played);

        let mut stats = storage::load_player_stats(self.store.as_ref(), &self.player_id);
        stats.games_played += 1;
        stats.total_score += self.state.score;
        storage::save_player_stats(self.store.as_mut(), &self.player_id, &stats);
    }

    /// Direction-change request from the input layer (already resolved to
    /// a cardinal direction). Requests inside the debounce window are
    /// dropped; rejected reversals do not consume the window.
    pub fn request_direction(&mut self, dir: Direction, now: f64) {
        if self.state.phase != GamePhase::Running {
            return;
        }
        if now - self.last_input < INPUT_DEBOUNCE_MS {
            return;
        }
        if self.state.snake.request_direction(dir, self.progress) {
            self.last_input = now;
        }
    }

    /// Cooperative pause (console or menu overlay). Tick progress is kept.
    pub fn pause(&mut self) {
        if self.state.phase == GamePhase::Running {
            self.state.phase = GamePhase::Paused;
            self.last_frame = None;
        }
    }

    /// Resume from pause; the tick clock rebases to `now` so the first
    /// frame back never sees the time spent paused.
    pub fn resume(&mut self, now: f64) {
        if self.state.phase == GamePhase::Paused {
            self.state.phase = GamePhase::Running;
            self.last_frame = Some(now);
        }
    }

    /// Full restart, from any phase. A new game gets the full ad-revival
    /// allowance back.
    pub fn restart(&mut self, now: f64) {
        self.state.reset(now);
        storage::set_u32(self.store.as_mut(), keys::AD_REVIVALS_USED, 0);
        self.progress = 0.0;
        self.last_frame = None;
        self.ad_gate = None;
        log::info!("game restarted");
    }

    /// Leave the session entirely (navigation away)
    pub fn stop(&mut self) {
        self.state.phase = GamePhase::Idle;
        self.last_frame = None;
        self.ad_gate = None;
    }

    /// Spend crystals to revive in place: snake back to the start layout,
    /// speed back to base, score preserved. Only allowed in GameOver with
    /// enough balance.
    pub fn revive_with_crystals(&mut self, now: f64) -> bool {
        if self.state.phase != GamePhase::GameOver || self.state.crystals < REVIVE_COST {
            return false;
        }
        self.state.crystals -= REVIVE_COST;
        storage::set_u32(self.store.as_mut(), keys::CRYSTALS, self.state.crystals);
        self.state.revive(now, true);
        self.progress = 0.0;
        self.last_frame = None;
        log::info!("revived for {REVIVE_COST} crystals, {} left", self.state.crystals);
        true
    }

    /// Open the ad gate. The caller stops the frame loop and shows the
    /// ad modal; the gate's timeout guarantees the player can always
    /// continue even if playback never reports completion.
    pub fn begin_ad_revival(&mut self, now: f64) -> bool {
        if self.state.phase != GamePhase::GameOver || self.ad_revivals_remaining() == 0 {
            return false;
        }
        self.ad_gate = Some(AdGate::new(now));
        true
    }

    /// Playback-finished signal from the ad collaborator
    pub fn ad_playback_completed(&mut self) {
        if let Some(gate) = &mut self.ad_gate {
            gate.mark_completed();
        }
    }

    pub fn can_finish_ad_revival(&self, now: f64) -> bool {
        self.ad_gate.is_some_and(|gate| gate.can_continue(now))
    }

    /// Complete the ad revival: counts against the per-game allowance and
    /// keeps the current speed, unlike the crystal path.
    pub fn finish_ad_revival(&mut self, now: f64) -> bool {
        if !self.can_finish_ad_revival(now) {
            return false;
        }
        self.ad_gate = None;
        self.state.ad_revivals_used += 1;
        storage::set_u32(
            self.store.as_mut(),
            keys::AD_REVIVALS_USED,
            self.state.ad_revivals_used,
        );
        self.state.revive(now, false);
        self.progress = 0.0;
        self.last_frame = None;
        log::info!(
            "revived after ad, {} ad revivals left",
            self.ad_revivals_remaining()
        );
        true
    }

    /// Re-read persisted values after an out-of-band store mutation
    /// (cheat commands write to the store directly)
    pub fn refresh_persisted(&mut self) {
        self.state.crystals = storage::get_u32(self.store.as_ref(), keys::CRYSTALS);
        self.state.high_score = storage::get_i64(self.store.as_ref(), keys::HIGH_SCORE);
    }
}
