//! Match worker that owns the authoritative [`CombatEngine`].
//!
//! Receives commands from [`MatchHandle`], drives real-time ticks and the
//! bot controller, and publishes [`MatchEvent`] notifications. Everything
//! that mutates the engine runs inside this one task, so a tick can never
//! interleave with an action.

use std::sync::Arc;
use std::time::Duration;

use duel_ai::{BotController, BotPoll};
use duel_core::catalog::ToolCatalog;
use duel_core::combatant::Side;
use duel_core::engine::CombatEngine;
use duel_core::result::ActionResult;
use duel_core::state::{MatchPhase, MatchState};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::event::MatchEvent;
use crate::handle::MatchHandle;

/// Commands accepted by the worker.
#[derive(Debug)]
pub enum Command {
    /// Submit typed text for a side.
    UseTool {
        /// Acting side.
        side: Side,
        /// Text as typed.
        input: String,
        /// Engine result.
        reply: oneshot::Sender<ActionResult>,
    },
    /// Read the current state.
    Snapshot {
        /// Observation snapshot.
        reply: oneshot::Sender<MatchState>,
    },
    /// Replace the match with a fresh one and start it.
    Reset {
        /// Snapshot of the fresh match.
        reply: oneshot::Sender<MatchState>,
    },
    /// Stop the worker.
    Shutdown,
}

/// Background task hosting one match.
pub struct MatchWorker {
    engine: CombatEngine,
    bot: BotController,
    origin: Instant,
    tick_interval: Duration,
    game_over_sent: bool,
    stall_sent: bool,
    command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<MatchEvent>,
}

async fn sleep_until_due(deadline: Option<Instant>) {
    tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)).await;
}

/// Spawn a worker for a new match and return its handle.
///
/// The match starts as soon as the task runs. Must be called from within a
/// tokio runtime.
pub fn spawn_match(
    config: &ServerConfig,
    catalog: Arc<ToolCatalog>,
) -> (MatchHandle, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
    let (event_tx, _) = broadcast::channel(config.event_buffer);

    let worker = MatchWorker::new(config, catalog, command_rx, event_tx.clone());
    let join = tokio::spawn(worker.run());
    (MatchHandle::new(command_tx, event_tx), join)
}

impl MatchWorker {
    /// Creates a worker for a fresh, idle match.
    pub fn new(
        config: &ServerConfig,
        catalog: Arc<ToolCatalog>,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<MatchEvent>,
    ) -> Self {
        Self {
            engine: CombatEngine::new(catalog, config.engine.clone()),
            bot: BotController::new(
                Side::Bot,
                config.policy.clone(),
                config.bot_timing.clone(),
                config.seed,
            ),
            origin: Instant::now(),
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            game_over_sent: false,
            stall_sent: false,
            command_rx,
            event_tx,
        }
    }

    /// Milliseconds on the match clock.
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn bot_deadline(&self) -> Option<Instant> {
        self.bot
            .due_at()
            .map(|due| self.origin + Duration::from_millis(due))
    }

    fn is_real_time(&self) -> bool {
        self.engine.state().phase == MatchPhase::RealTime
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        self.begin();

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let deadline = self.bot_deadline();
            let real_time = self.is_real_time();

            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                _ = ticker.tick(), if real_time => self.on_tick(),
                () = sleep_until_due(deadline), if deadline.is_some() => self.drive_bot(),
            }
        }

        info!(turns = self.engine.state().turn_count, "Match worker stopped");
    }

    fn begin(&mut self) {
        self.origin = Instant::now();
        self.game_over_sent = false;
        self.stall_sent = false;
        self.bot.cancel();
        self.engine.start(0);
        self.publish(MatchEvent::Started {
            mode: self.engine.config().mode,
        });
        self.publish_state();
        self.report_stall();
        self.drive_bot();
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::UseTool { side, input, reply } => {
                let result = self.submit(side, &input);
                let _ = reply.send(result);
                self.drive_bot();
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Reset { reply } => {
                self.engine.reset();
                self.begin();
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn submit(&mut self, side: Side, input: &str) -> ActionResult {
        let now = self.now_ms();
        let result = self.engine.use_tool(input, side, now);
        self.publish_result(side, input, &result);
        result
    }

    fn on_tick(&mut self) {
        let now = self.now_ms();
        self.engine.tick(now);
        self.publish_state();
        self.drive_bot();
    }

    /// Let the bot act if its decision is due and schedule the next one.
    fn drive_bot(&mut self) {
        let now = self.now_ms();
        match self.bot.poll(&mut self.engine, now) {
            BotPoll::Acted { result, .. } => {
                let input = match &result {
                    Ok(record) => record.tool_id.clone(),
                    Err(_) => String::new(),
                };
                self.publish_result(Side::Bot, &input, &result);
            }
            BotPoll::Starved => debug!("Bot skipped: nothing usable"),
            BotPoll::Idle | BotPoll::Stopped | BotPoll::Thinking { .. } => {}
        }
    }

    fn publish_result(&mut self, side: Side, input: &str, result: &ActionResult) {
        match result {
            Ok(record) => self.publish(MatchEvent::Action {
                record: record.clone(),
            }),
            Err(reason) => self.publish(MatchEvent::Rejected {
                side,
                input: input.to_string(),
                reason: reason.clone(),
            }),
        }
        self.publish_state();

        if let Some(outcome) = self.engine.state().outcome() {
            if !self.game_over_sent {
                self.game_over_sent = true;
                info!(?outcome, "Match finished");
                self.publish(MatchEvent::GameOver { outcome });
            }
        }
        self.report_stall();
    }

    fn report_stall(&mut self) {
        if self.stall_sent {
            return;
        }
        if let Some(side) = self.engine.stalled_side() {
            self.stall_sent = true;
            warn!(%side, turns = self.engine.state().turn_count, "Match stalled");
            self.publish(MatchEvent::Stalled { side });
        }
    }

    fn publish_state(&self) {
        self.publish(MatchEvent::State(Box::new(self.engine.snapshot())));
    }

    fn publish(&self, event: MatchEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }
}
