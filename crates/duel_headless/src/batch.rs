//! Batch bot-vs-bot runner for balance testing.
//!
//! Both sides are driven by the decision policy on a virtual clock, so a
//! batch of thousands of real-time matches finishes in seconds. Matches run
//! in parallel with rayon; each one is fully determined by its seed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use duel_ai::{BotController, BotPoll, BotTiming, PolicyConfig};
use duel_core::catalog::ToolCatalog;
use duel_core::combatant::Side;
use duel_core::config::{EngineConfig, TimingMode};
use duel_core::engine::CombatEngine;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ProtocolError, Result};
use crate::metrics::{BatchSummary, MatchMetrics};

/// Mixed into the seed for the player-side controller so the two sides do
/// not roll identical numbers.
const PLAYER_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Rules for every match.
    pub engine: EngineConfig,
    /// Decision tuning, shared by both sides.
    pub policy: PolicyConfig,
    /// Think and gap windows, shared by both sides.
    pub bot_timing: BotTiming,
    /// Number of matches to run.
    pub match_count: u32,
    /// Seed of the first match; match `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Worker threads (0 = rayon default).
    pub parallel: u32,
    /// Clock step for real-time matches.
    pub step_ms: u64,
    /// Stop a match after this many turns.
    pub max_turns: u64,
    /// Stop a match after this much virtual time.
    pub max_duration_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            policy: PolicyConfig::default(),
            bot_timing: BotTiming::default(),
            match_count: 100,
            seed_start: 0,
            parallel: 0,
            step_ms: 100,
            max_turns: 1000,
            max_duration_ms: 10 * 60 * 1000,
        }
    }
}

impl BatchConfig {
    /// Config for `match_count` matches in the given mode.
    #[must_use]
    pub fn new(mode: TimingMode, match_count: u32) -> Self {
        Self {
            engine: EngineConfig::for_mode(mode),
            match_count,
            ..Self::default()
        }
    }

    /// Set the first seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Enable or disable dodge tools.
    pub fn with_dodging(mut self, enabled: bool) -> Self {
        self.engine.dodging_enabled = enabled;
        self
    }

    /// Parse from RON text.
    pub fn from_ron_str(ron_text: &str, source: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron_text).map_err(|e| ProtocolError::Config {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text, &path.display().to_string())
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Per-match metrics, in seed order.
    pub matches: Vec<MatchMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Default file name inside an output directory.
    #[must_use]
    pub fn default_path(dir: &Path) -> PathBuf {
        dir.join("batch.json")
    }
}

/// Play one bot-vs-bot match to the end or to a limit.
#[must_use]
pub fn run_match(config: &BatchConfig, catalog: Arc<ToolCatalog>, seed: u64) -> MatchMetrics {
    let mode = config.engine.mode;
    let mut engine = CombatEngine::new(catalog, config.engine.clone());
    engine.start(0);

    let mut sides = [
        BotController::new(
            Side::Player,
            config.policy.clone(),
            config.bot_timing.clone(),
            seed ^ PLAYER_SEED_SALT,
        ),
        BotController::new(
            Side::Bot,
            config.policy.clone(),
            config.bot_timing.clone(),
            seed,
        ),
    ];
    let mut metrics = MatchMetrics::new(seed, mode.into());
    let step = config.step_ms.max(1);
    let mut now = 0u64;
    let mut timed_out = false;

    while !engine.is_over() {
        if now >= config.max_duration_ms || engine.state().turn_count >= config.max_turns {
            timed_out = true;
            break;
        }

        let mut acted = false;
        for controller in &mut sides {
            if let BotPoll::Acted { result, .. } = controller.poll(&mut engine, now) {
                acted = true;
                match result {
                    Ok(record) => metrics.record_action(&record),
                    Err(reason) => {
                        warn!(seed, side = %controller.side(), %reason, "Policy pick was rejected");
                    }
                }
            }
        }
        if engine.is_over() {
            break;
        }
        // The side that just received the turn has not been polled yet.
        if acted && mode == TimingMode::TurnBased {
            continue;
        }

        let next_due = sides.iter().filter_map(BotController::due_at).min();
        match mode {
            TimingMode::TurnBased => match next_due {
                Some(due) => now = now.max(due),
                None => {
                    // The side holding the turn has nothing usable.
                    debug!(
                        seed,
                        side = ?engine.stalled_side(),
                        turn = engine.state().turn_count,
                        "Turn-based match stalled"
                    );
                    timed_out = true;
                    break;
                }
            },
            TimingMode::RealTime => {
                now = next_due.map_or(now + step, |due| due.clamp(now + 1, now + step));
                engine.tick(now);
            }
        }
    }

    metrics.finalize(engine.state(), now, timed_out);
    metrics
}

/// Run a batch of matches in parallel.
pub fn run_batch(config: BatchConfig, catalog: &Arc<ToolCatalog>) -> BatchResults {
    let start = Instant::now();
    info!(
        matches = config.match_count,
        mode = ?config.engine.mode,
        dodging = config.engine.dodging_enabled,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    let play_all = || -> Vec<MatchMetrics> {
        (0..config.match_count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(u64::from(i));
                run_match(&config, Arc::clone(catalog), seed)
            })
            .collect()
    };

    let matches = if config.parallel > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build()
        {
            Ok(pool) => pool.install(play_all),
            Err(e) => {
                warn!(error = %e, "Could not build thread pool, using the global one");
                play_all()
            }
        }
    } else {
        play_all()
    };

    let summary = BatchSummary::from_matches(&matches);
    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        player_wins = summary.player_wins,
        bot_wins = summary.bot_wins,
        draws = summary.draws,
        timeouts = summary.timeouts,
        avg_turns = summary.avg_turns,
        duration_seconds,
        "Batch complete"
    );

    BatchResults {
        config,
        matches,
        summary,
        duration_seconds,
    }
}

#[cfg(test)]
mod tests {
    use duel_test_utils::fixtures::standard_catalog;

    use super::*;

    #[test]
    fn test_turn_based_match_finishes() {
        let config = BatchConfig::new(TimingMode::TurnBased, 1);
        let metrics = run_match(&config, standard_catalog(), 11);
        assert!(metrics.outcome.is_some(), "match should end: {metrics:?}");
        assert!(!metrics.timed_out);
        assert!(metrics.turns > 0);
        assert!(metrics.player.actions + metrics.bot.actions > 0);
    }

    #[test]
    fn test_real_time_match_finishes() {
        let config = BatchConfig::new(TimingMode::RealTime, 1).with_dodging(true);
        let metrics = run_match(&config, standard_catalog(), 5);
        assert_eq!(metrics.timed_out, metrics.outcome.is_none());
        assert!(metrics.duration_ms > 0);
        assert!(metrics.player.actions > 0);
        assert!(metrics.bot.actions > 0);
    }

    #[test]
    fn test_limits_stop_a_match() {
        let config = BatchConfig {
            max_turns: 2,
            ..BatchConfig::new(TimingMode::TurnBased, 1)
        };
        let metrics = run_match(&config, standard_catalog(), 3);
        assert!(metrics.timed_out);
        assert_eq!(metrics.outcome, None);
        assert_eq!(metrics.turns, 2);
    }

    #[test]
    fn test_same_seed_same_metrics() {
        let config = BatchConfig::new(TimingMode::RealTime, 1);
        let a = run_match(&config, standard_catalog(), 42);
        let b = run_match(&config, standard_catalog(), 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_batch_in_seed_order() {
        let config = BatchConfig {
            parallel: 2,
            ..BatchConfig::new(TimingMode::TurnBased, 8).with_seed(100)
        };
        let results = run_batch(config, &standard_catalog());
        assert_eq!(results.matches.len(), 8);
        let seeds: Vec<u64> = results.matches.iter().map(|m| m.seed).collect();
        assert_eq!(seeds, (100..108).collect::<Vec<_>>());
        assert_eq!(results.summary.total_matches, 8);
        assert_eq!(
            results.summary.player_wins
                + results.summary.bot_wins
                + results.summary.draws
                + results.summary.timeouts,
            8
        );
    }
}
