//! Headless runner: one match driven by JSON commands on a virtual clock.
//!
//! The player side is whatever sends commands. The bot side is a
//! [`BotController`] polled against the runner's clock after every command
//! that can change the match.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use duel_ai::{BotController, BotPoll, BotTiming, PolicyConfig};
use duel_core::catalog::ToolCatalog;
use duel_core::combatant::Side;
use duel_core::config::{EngineConfig, TimingMode};
use duel_core::engine::CombatEngine;
use duel_core::result::ActionResult;
use duel_core::state::MatchPhase;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ProtocolError, Result};
use crate::protocol::{Command, Response, WireMode};

/// Headless runner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// Rules for each match.
    pub engine: EngineConfig,
    /// Bot decision tuning.
    pub policy: PolicyConfig,
    /// Bot think and gap windows.
    pub bot_timing: BotTiming,
    /// Bot seed.
    pub seed: u64,
    /// Clock step used when a tick spans several real-time updates.
    pub step_ms: u64,
    /// Output state after every command that changes the match.
    pub auto_state: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            policy: PolicyConfig::default(),
            bot_timing: BotTiming::default(),
            seed: 0,
            step_ms: 100,
            auto_state: false,
        }
    }
}

impl HeadlessConfig {
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

/// Headless runner for scripted or agent-driven play.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    catalog: Arc<ToolCatalog>,
    engine: CombatEngine,
    bot: BotController,
    now_ms: u64,
    game_over_sent: bool,
    stall_sent: bool,
    finished: bool,
}

impl HeadlessRunner {
    /// Create a runner. The first match starts with [`Self::begin`].
    #[must_use]
    pub fn new(config: HeadlessConfig, catalog: Arc<ToolCatalog>) -> Self {
        let engine = CombatEngine::new(Arc::clone(&catalog), config.engine.clone());
        let bot = Self::make_bot(&config);
        Self {
            config,
            catalog,
            engine,
            bot,
            now_ms: 0,
            game_over_sent: false,
            stall_sent: false,
            finished: false,
        }
    }

    fn make_bot(config: &HeadlessConfig) -> BotController {
        BotController::new(
            Side::Bot,
            config.policy.clone(),
            config.bot_timing.clone(),
            config.seed,
        )
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// The engine hosting the current match.
    #[must_use]
    pub const fn engine(&self) -> &CombatEngine {
        &self.engine
    }

    /// Whether a `quit` command has been processed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Start a fresh match with the current config.
    ///
    /// Returns `ready` followed by anything the bot did straight away.
    pub fn begin(&mut self) -> Vec<Response> {
        self.engine = CombatEngine::new(Arc::clone(&self.catalog), self.config.engine.clone());
        self.bot = Self::make_bot(&self.config);
        self.now_ms = 0;
        self.game_over_sent = false;
        self.stall_sent = false;
        self.engine.start(0);
        info!(
            mode = ?self.config.engine.mode,
            dodging = self.config.engine.dodging_enabled,
            seed = self.config.seed,
            "Headless match started"
        );

        let mut out = vec![Response::ready(self.config.engine.mode, self.now_ms)];
        self.drive_bot(&mut out);
        self.report_stall(&mut out);
        out
    }

    /// Parse and process one input line.
    pub fn handle_line(&mut self, line: &str) -> Vec<Response> {
        match Command::from_json(line) {
            Ok(cmd) => self.handle(cmd),
            Err(e) => {
                let err = ProtocolError::from(e);
                warn!(error = %err, "Rejected input line");
                vec![Response::error(err.to_string(), None)]
            }
        }
    }

    /// Process one command.
    pub fn handle(&mut self, cmd: Command) -> Vec<Response> {
        debug!(cmd = cmd.name(), time_ms = self.now_ms, "Command");
        match cmd {
            Command::NewMatch {
                mode,
                dodging,
                seed,
            } => {
                if let Some(mode) = mode {
                    self.config.engine.mode = mode.into();
                }
                if let Some(dodging) = dodging {
                    self.config.engine.dodging_enabled = dodging;
                }
                if let Some(seed) = seed {
                    self.config.seed = seed;
                }
                self.begin()
            }
            Command::UseTool { input } => {
                let mut out = Vec::new();
                let result = self.engine.use_tool(&input, Side::Player, self.now_ms);
                self.push_result(Side::Player, &input, result, &mut out);
                self.drive_bot(&mut out);
                if self.config.auto_state {
                    out.push(self.state_response());
                }
                out
            }
            Command::Tick { ms } => {
                let mut out = Vec::new();
                self.advance(ms.unwrap_or(self.config.step_ms), &mut out);
                out.push(self.state_response());
                out
            }
            Command::Query => vec![self.state_response()],
            Command::Hash => vec![Response::StateHash {
                time_ms: self.now_ms,
                hash: self.engine.state().state_hash(),
            }],
            Command::Quit => {
                self.finished = true;
                vec![Response::Bye]
            }
        }
    }

    /// Run the protocol until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        let hello = self.begin();
        write_responses(&mut output, &hello)?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let responses = self.handle_line(&line);
            write_responses(&mut output, &responses)?;
            if self.finished {
                break;
            }
        }

        info!(
            time_ms = self.now_ms,
            turns = self.engine.state().turn_count,
            "Headless session ended"
        );
        Ok(())
    }

    fn state_response(&self) -> Response {
        Response::State {
            time_ms: self.now_ms,
            state: self.engine.snapshot(),
        }
    }

    /// Move the clock forward in steps so regen pulses and bot decisions
    /// land close to when they are due.
    ///
    /// Only a running real-time match is stepped. Otherwise the clock jumps
    /// straight to the target.
    fn advance(&mut self, ms: u64, out: &mut Vec<Response>) {
        let target = self.now_ms.saturating_add(ms);
        let step = self.config.step_ms.max(1);
        self.drive_bot(out);
        while self.now_ms < target {
            if self.engine.state().phase != MatchPhase::RealTime {
                self.now_ms = target;
                break;
            }
            self.now_ms = self.now_ms.saturating_add(step).min(target);
            self.engine.tick(self.now_ms);
            self.drive_bot(out);
        }
    }

    /// Poll the bot until it has nothing more to do at the current time.
    ///
    /// In turn-based matches the clock skips ahead to the end of the bot's
    /// think delay, so the bot always answers within the same command.
    fn drive_bot(&mut self, out: &mut Vec<Response>) {
        let turn_based = self.engine.config().mode == TimingMode::TurnBased;
        loop {
            match self.bot.poll(&mut self.engine, self.now_ms) {
                BotPoll::Acted { result, .. } => {
                    let input = match &result {
                        Ok(record) => record.tool_id.clone(),
                        Err(_) => String::new(),
                    };
                    self.push_result(Side::Bot, &input, result, out);
                    if !turn_based {
                        break;
                    }
                }
                BotPoll::Thinking { due_ms } if turn_based => {
                    self.now_ms = due_ms;
                }
                BotPoll::Starved => {
                    debug!(time_ms = self.now_ms, "Bot has nothing usable");
                    break;
                }
                BotPoll::Thinking { .. } | BotPoll::Idle | BotPoll::Stopped => break,
            }
        }
    }

    fn push_result(
        &mut self,
        side: Side,
        input: &str,
        result: ActionResult,
        out: &mut Vec<Response>,
    ) {
        match result {
            Ok(record) => out.push(Response::Action { record }),
            Err(rejection) => out.push(Response::rejected(side, input, rejection)),
        }

        let state = self.engine.state();
        if let Some(outcome) = state.outcome() {
            if !self.game_over_sent {
                self.game_over_sent = true;
                info!(?outcome, turns = state.turn_count, "Headless match finished");
                out.push(Response::GameOver {
                    outcome,
                    winner: outcome.winner(),
                    turns: state.turn_count,
                    time_ms: self.now_ms,
                });
            }
        }
        self.report_stall(out);
    }

    fn report_stall(&mut self, out: &mut Vec<Response>) {
        if self.stall_sent {
            return;
        }
        if let Some(side) = self.engine.stalled_side() {
            self.stall_sent = true;
            let turns = self.engine.state().turn_count;
            warn!(%side, turns, "Headless match stalled");
            out.push(Response::Stalled {
                side,
                turns,
                time_ms: self.now_ms,
            });
        }
    }
}

impl std::fmt::Debug for HeadlessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessRunner")
            .field("mode", &WireMode::from(self.config.engine.mode))
            .field("now_ms", &self.now_ms)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

fn write_responses<W: Write>(output: &mut W, responses: &[Response]) -> Result<()> {
    for response in responses {
        output.write_all(response.to_json_line().as_bytes())?;
    }
    output.flush()?;
    Ok(())
}
