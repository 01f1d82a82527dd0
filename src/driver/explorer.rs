//! Exploration driver.
//!
//! Plays one seed path through an engine. Rounds inside the seed are
//! replayed with their recorded choices; rounds past it, up to the depth
//! budget, get fresh choice slots with every cursor at 0. The side that
//! completes a round installs a fresh oracle over that round's rolls before
//! its command goes in, so the resolution replays and extends exactly
//! those rolls.

use crossbeam_channel::Receiver;
use tracing::{debug, trace, warn};

use super::completion::{CompletionSignal, Outcome};
use crate::core::{ExplorerError, SideId};
use crate::engine::{BattleEngine, SideRequest};
use crate::oracle::ReplayOracle;
use crate::record::{ChoiceSlot, Decision, Path};

/// Command submitted for a pre-battle preview.
const PREVIEW_COMMAND: &str = "default";

/// Everything an exploration leaves behind.
#[derive(Debug)]
pub struct ExplorerParts<E> {
    /// The engine in its final state.
    pub engine: E,
    /// The seed path extended with everything discovered.
    pub path: Path,
    /// Narration drained from the engine, in order.
    pub narration: Vec<String>,
    /// Commands the engine rejected as unavailable.
    pub rejected_choices: usize,
    /// How the exploration finished, if it did.
    pub outcome: Option<Outcome>,
}

/// Drives one engine along one path.
pub struct Explorer<E: BattleEngine> {
    engine: E,
    path: Path,
    /// Rounds at the start of `path` that are replayed verbatim.
    seed_len: usize,
    /// Rounds generated past the seed before stopping.
    rounds_to_generate: usize,
    current_round: usize,
    allow_new_rolls: bool,
    oracle: ReplayOracle,
    /// Round the installed oracle records into. `None` before the first
    /// round completes; draws made then are not recorded.
    oracle_round: Option<usize>,
    narration: Vec<String>,
    rejected_choices: usize,
    completion: CompletionSignal,
}

impl<E: BattleEngine> Explorer<E> {
    /// Create a driver replaying `seed` and generating up to
    /// `rounds_to_generate` rounds past it.
    pub fn new(engine: E, seed: Path, rounds_to_generate: usize) -> Self {
        Self {
            engine,
            seed_len: seed.len(),
            path: seed,
            rounds_to_generate,
            current_round: 0,
            allow_new_rolls: true,
            oracle: ReplayOracle::new(Vec::new()),
            oracle_round: None,
            narration: Vec::new(),
            rejected_choices: 0,
            completion: CompletionSignal::new(),
        }
    }

    /// Allow or forbid fabricating rolls beyond the recorded ones.
    pub fn with_new_rolls(mut self, allow: bool) -> Self {
        self.allow_new_rolls = allow;
        self
    }

    /// The path as explored so far.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The driven engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Index of the round currently being chosen.
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    /// Narration collected so far.
    pub fn narration(&self) -> &[String] {
        &self.narration
    }

    /// Commands the engine rejected as unavailable.
    pub fn rejected_choices(&self) -> usize {
        self.rejected_choices
    }

    /// Whether exploration has completed.
    pub fn is_done(&self) -> bool {
        self.completion.is_complete()
    }

    /// The outcome, once complete.
    pub fn outcome(&self) -> Option<Outcome> {
        self.completion.outcome()
    }

    /// Register a callback fired once on completion.
    pub fn on_complete(&mut self, callback: impl FnOnce(Outcome) + Send + 'static) {
        self.completion.register(callback);
    }

    /// A channel receiving the outcome once.
    pub fn wait_for_end(&mut self) -> Receiver<Outcome> {
        self.completion.wait()
    }

    /// Pump engine requests until the exploration completes.
    ///
    /// The first call picks up whatever the engine has outstanding, so a
    /// freshly restored engine can be driven straight away.
    pub fn resume(&mut self) -> Result<Outcome, ExplorerError> {
        loop {
            if let Some(outcome) = self.completion.outcome() {
                return Ok(outcome);
            }
            if self.engine.ended() {
                self.finish(Outcome::Ended);
                continue;
            }

            let requests = self.engine.take_requests();
            self.collect_narration();
            if requests.is_empty() {
                warn!(round = self.current_round, path = %self.path, "engine stalled without ending");
                self.finish(Outcome::Unfinished);
                continue;
            }

            for (side, request) in requests {
                self.on_request(side, request)?;
            }
        }
    }

    /// React to one side's request.
    pub fn on_request(&mut self, side: SideId, request: SideRequest) -> Result<(), ExplorerError> {
        if self.is_done() {
            return Ok(());
        }
        trace!(%side, round = self.current_round, ?request, "request received");

        let slots = match request {
            SideRequest::Wait => return Ok(()),
            SideRequest::Preview => {
                self.submit(side, PREVIEW_COMMAND)?;
                self.check_ended();
                return Ok(());
            }
            _ if self.current_round < self.seed_len => self.replayed_slots(side, &request)?,
            _ if self.current_round < self.seed_len + self.rounds_to_generate => {
                match self.generate_slots(side, &request) {
                    Some(slots) => slots,
                    None => return Ok(()),
                }
            }
            _ => {
                debug!(round = self.current_round, "depth budget reached");
                self.finish(Outcome::Unfinished);
                return Ok(());
            }
        };

        if slots.is_empty() {
            return Ok(());
        }

        let completes_round = SideId::all(self.engine.side_count())
            .all(|other| other == side || self.engine.is_choice_done(other));
        if completes_round {
            self.install_oracle(self.current_round);
        }

        let command = slots
            .iter()
            .filter_map(ChoiceSlot::selected)
            .collect::<Vec<_>>()
            .join(", ");
        self.submit(side, &command)?;

        if completes_round {
            self.current_round += 1;
        }
        self.check_ended();
        Ok(())
    }

    /// Consume the driver.
    pub fn into_parts(self) -> ExplorerParts<E> {
        ExplorerParts {
            outcome: self.completion.outcome(),
            engine: self.engine,
            path: self.path,
            narration: self.narration,
            rejected_choices: self.rejected_choices,
        }
    }

    fn replayed_slots(
        &self,
        side: SideId,
        request: &SideRequest,
    ) -> Result<Vec<ChoiceSlot>, ExplorerError> {
        let slots = self
            .path
            .get(self.current_round)
            .map(|decision| decision.side(side).to_vec())
            .unwrap_or_default();

        if let Some(requested) = request.actable_units() {
            if requested != slots.len() {
                return Err(ExplorerError::ChoiceMismatch {
                    round: self.current_round,
                    side,
                    recorded: slots.len(),
                    requested,
                });
            }
        }
        Ok(slots)
    }

    /// Fresh attack-only slots for an `Act` request, recorded into the
    /// current round.
    fn generate_slots(&mut self, side: SideId, request: &SideRequest) -> Option<Vec<ChoiceSlot>> {
        let SideRequest::Act { active } = request else {
            warn!(%side, round = self.current_round, ?request, "received unrecognized request");
            return None;
        };

        let slots: Vec<ChoiceSlot> = active
            .iter()
            .map(|unit| {
                ChoiceSlot::new((1..=unit.moves.len()).map(|i| format!("move {i}")).collect())
            })
            .collect();

        while self.path.len() <= self.current_round {
            self.path.push(Decision::new());
        }
        if let Some(decision) = self.path.get_mut(self.current_round) {
            decision.set_side(side, slots.clone());
        }
        Some(slots)
    }

    fn install_oracle(&mut self, round: usize) {
        let rolls = self
            .path
            .get(round)
            .map(|decision| decision.rolls.clone())
            .unwrap_or_default();
        trace!(round, recorded = rolls.len(), "installing oracle");
        self.oracle = ReplayOracle::new(rolls).with_new_rolls(self.allow_new_rolls);
        self.oracle_round = Some(round);
    }

    fn submit(&mut self, side: SideId, command: &str) -> Result<(), ExplorerError> {
        trace!(%side, command, "submitting choice");
        let result = self.engine.choose(side, command, &mut self.oracle);
        self.sync_rolls();
        self.collect_narration();

        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_unavailable_choice() => {
                warn!(%side, command, error = %err, "engine rejected choice");
                self.rejected_choices += 1;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Copy rolls the oracle fabricated back into the round it serves.
    fn sync_rolls(&mut self) {
        let Some(round) = self.oracle_round else {
            return;
        };
        let recorded = self.oracle.rolls();
        if let Some(decision) = self.path.get_mut(round) {
            if decision.rolls.len() != recorded.len() {
                decision.rolls = recorded.to_vec();
            }
        }
    }

    fn collect_narration(&mut self) {
        self.narration.extend(self.engine.drain_narration());
    }

    fn check_ended(&mut self) {
        if self.engine.ended() {
            self.finish(Outcome::Ended);
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        if self.completion.complete(outcome) {
            debug!(?outcome, path = %self.path, "exploration complete");
        }
    }
}
