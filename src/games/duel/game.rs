//! Duel engine implementation.

use serde::{Deserialize, Serialize};

use super::combatant::{base_damage, Combatant, MoveSpec};
use crate::core::{shuffle, EngineError, RandomSource, SideId, SideMap};
use crate::engine::{ActiveSlot, BattleEngine, SideRequest, Snapshot};

/// Switches resolve before any move.
const SWITCH_PRIORITY: i8 = 7;

/// Crit odds are 1 in this.
const CRIT_DENOMINATOR: u32 = 24;

/// Damage variance is drawn from `0..VARIANCE_STEPS` and scales damage to
/// 85%..=100%.
const VARIANCE_STEPS: i32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum Phase {
    Preview,
    Battle,
    Ended,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum Action {
    Move { slot: usize, actor: usize, index: usize },
    Switch { slot: usize, actor: usize, target: usize },
}

impl Action {
    fn slot(&self) -> usize {
        match *self {
            Action::Move { slot, .. } | Action::Switch { slot, .. } => slot,
        }
    }

    fn actor(&self) -> usize {
        match *self {
            Action::Move { actor, .. } | Action::Switch { actor, .. } => actor,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SideState {
    team: Vec<Combatant>,
    /// Team index in each active slot.
    active: Vec<Option<usize>>,
    /// Actions submitted this turn.
    pending: Option<Vec<Action>>,
}

impl SideState {
    fn active_units(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(slot, unit)| unit.map(|unit| (slot, unit)))
    }

    fn has_units_left(&self) -> bool {
        self.team.iter().any(|unit| !unit.is_fainted())
    }

    fn is_active(&self, unit: usize) -> bool {
        self.active.contains(&Some(unit))
    }

    fn next_replacement(&self) -> Option<usize> {
        (0..self.team.len()).find(|&i| !self.team[i].is_fainted() && !self.is_active(i))
    }
}

/// An action waiting in the turn order.
struct Queued {
    side: SideId,
    action: Action,
    priority: i8,
    speed: u32,
}

/// Two-sided battle between small teams.
///
/// All randomness comes from the source lent to [`BattleEngine::choose`], so
/// the same choices and draws always give the same narration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Duel {
    sides: SideMap<SideState>,
    phase: Phase,
    turn: u32,
    damage_variance: bool,
    winner: Option<SideId>,
    #[serde(skip)]
    outbox: Vec<(SideId, SideRequest)>,
    #[serde(skip)]
    narration: Vec<String>,
}

/// Builder for creating a Duel.
pub struct DuelBuilder {
    teams: [Vec<Combatant>; 2],
    actives_per_side: usize,
    team_preview: bool,
    damage_variance: bool,
}

impl Default for DuelBuilder {
    fn default() -> Self {
        Self {
            teams: [
                vec![Combatant::new("Wyvern", 80)
                    .with_stats(12, 8, 14)
                    .with_move(MoveSpec::new("Dragon Darts", 50))
                    .with_move(MoveSpec::new("Thunderbolt", 45).with_accuracy(90))],
                vec![Combatant::new("Sentinel", 95)
                    .with_stats(10, 12, 8)
                    .with_move(MoveSpec::new("Brave Bird", 60))
                    .with_move(MoveSpec::new("Iron Head", 40).with_accuracy(95))],
            ],
            actives_per_side: 1,
            team_preview: true,
            damage_variance: true,
        }
    }
}

impl DuelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one side's team.
    pub fn team(mut self, side: SideId, team: Vec<Combatant>) -> Self {
        assert!(side.index() < 2, "A duel has exactly 2 sides");
        assert!(!team.is_empty(), "Each side needs at least one combatant");
        self.teams[side.index()] = team;
        self
    }

    pub fn actives_per_side(mut self, count: usize) -> Self {
        assert!(count >= 1, "At least one unit must be active");
        self.actives_per_side = count;
        self
    }

    pub fn team_preview(mut self, enabled: bool) -> Self {
        self.team_preview = enabled;
        self
    }

    pub fn damage_variance(mut self, enabled: bool) -> Self {
        self.damage_variance = enabled;
        self
    }

    /// Build the duel. Without team preview the battle starts immediately.
    pub fn build(self) -> Duel {
        let actives = self.actives_per_side;
        let sides = SideMap::new(2, |side| {
            let team = self.teams[side.index()].clone();
            let active = (0..actives)
                .map(|slot| (slot < team.len()).then_some(slot))
                .collect();
            SideState {
                team,
                active,
                pending: None,
            }
        });

        let mut duel = Duel {
            sides,
            phase: Phase::Preview,
            turn: 0,
            damage_variance: self.damage_variance,
            winner: None,
            outbox: Vec::new(),
            narration: Vec::new(),
        };

        if self.team_preview {
            duel.narrate(format!("|teampreview|{actives}"));
            duel.emit_requests();
        } else {
            duel.start_battle();
        }
        duel
    }
}

impl Duel {
    /// Current turn number (0 during preview).
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// The winning side, once the duel ended with one.
    pub fn winner(&self) -> Option<SideId> {
        self.winner
    }

    /// A side's team.
    pub fn team(&self, side: SideId) -> &[Combatant] {
        self.sides.get(side).map_or(&[][..], |state| state.team.as_slice())
    }

    /// Play with `default` choices for every side until the duel ends or
    /// `max_turns` pass.
    pub fn play_out(
        &mut self,
        rng: &mut dyn RandomSource,
        max_turns: u32,
    ) -> Result<(), EngineError> {
        while !self.ended() && self.turn <= max_turns {
            let requests = self.take_requests();
            if requests.is_empty() {
                break;
            }
            for (side, request) in requests {
                if request != SideRequest::Wait && !self.is_choice_done(side) {
                    self.choose(side, "default", rng)?;
                }
            }
        }
        Ok(())
    }

    fn narrate(&mut self, line: String) {
        self.narration.push(line);
    }

    fn label(&self, side: SideId, slot: usize) -> String {
        let name = self.sides[side].active[slot]
            .map(|unit| self.sides[side].team[unit].name.as_str())
            .unwrap_or("");
        format!("{side}{}: {name}", slot_letter(slot))
    }

    fn start_battle(&mut self) {
        self.phase = Phase::Battle;
        self.turn = 1;
        self.narrate("|start".to_string());

        for side in SideId::all(2) {
            let leads: Vec<_> = self.sides[side].active_units().collect();
            for (slot, unit) in leads {
                let line = format!(
                    "|switch|{}|{}",
                    self.label(side, slot),
                    self.sides[side].team[unit].condition()
                );
                self.narrate(line);
            }
        }

        self.narrate("|turn|1".to_string());
        self.emit_requests();
    }

    fn emit_requests(&mut self) {
        self.outbox.clear();
        for (side, state) in self.sides.iter() {
            if state.pending.is_some() {
                continue;
            }
            let request = match self.phase {
                Phase::Preview => SideRequest::Preview,
                Phase::Battle => {
                    let can_switch = state.next_replacement().is_some();
                    SideRequest::Act {
                        active: state
                            .active_units()
                            .map(|(_, unit)| ActiveSlot {
                                moves: state.team[unit].moves.iter().map(|m| m.name.clone()).collect(),
                                can_switch,
                            })
                            .collect(),
                    }
                }
                Phase::Ended => continue,
            };
            self.outbox.push((side, request));
        }
    }

    fn parse_choice(&self, side: SideId, command: &str) -> Result<Vec<Action>, EngineError> {
        let state = &self.sides[side];
        let units: Vec<_> = state.active_units().collect();

        if command.trim() == "default" {
            return Ok(units
                .into_iter()
                .map(|(slot, actor)| Action::Move {
                    slot,
                    actor,
                    index: 0,
                })
                .collect());
        }

        let parts: Vec<&str> = command.split(',').map(str::trim).collect();
        if parts.len() != units.len() {
            return Err(EngineError::InvalidChoice {
                side,
                reason: format!("expected {} actions, got {}", units.len(), parts.len()),
            });
        }

        parts
            .into_iter()
            .zip(units)
            .map(|(part, (slot, actor))| self.parse_action(side, part, slot, actor))
            .collect()
    }

    fn parse_action(
        &self,
        side: SideId,
        part: &str,
        slot: usize,
        actor: usize,
    ) -> Result<Action, EngineError> {
        let invalid = || EngineError::InvalidChoice {
            side,
            reason: format!("unrecognized command '{part}'"),
        };
        let (verb, arg) = part.split_once(' ').ok_or_else(invalid)?;
        let number: usize = arg.trim().parse().map_err(|_| invalid())?;
        let state = &self.sides[side];

        match verb {
            "move" => {
                let unit = &state.team[actor];
                if number == 0 || number > unit.moves.len() {
                    return Err(EngineError::UnavailableChoice {
                        side,
                        reason: format!("{} has no move {number}", unit.name),
                    });
                }
                Ok(Action::Move {
                    slot,
                    actor,
                    index: number - 1,
                })
            }
            "switch" => {
                let target = number
                    .checked_sub(1)
                    .filter(|&target| target < state.team.len())
                    .filter(|&target| !state.team[target].is_fainted() && !state.is_active(target))
                    .ok_or_else(|| EngineError::UnavailableChoice {
                        side,
                        reason: format!("cannot switch to unit {number}"),
                    })?;
                Ok(Action::Switch {
                    slot,
                    actor,
                    target,
                })
            }
            _ => Err(invalid()),
        }
    }

    fn resolve_turn(&mut self, rng: &mut dyn RandomSource) -> Result<(), EngineError> {
        let mut queue = Vec::new();
        for (side, state) in self.sides.iter_mut() {
            for action in state.pending.take().unwrap_or_default() {
                let unit = &state.team[action.actor()];
                let priority = match action {
                    Action::Switch { .. } => SWITCH_PRIORITY,
                    Action::Move { index, .. } => unit.moves[index].priority,
                };
                queue.push(Queued {
                    side,
                    speed: unit.speed,
                    priority,
                    action,
                });
            }
        }

        queue.sort_by(|a, b| b.priority.cmp(&a.priority).then(b.speed.cmp(&a.speed)));
        let mut start = 0;
        while start < queue.len() {
            let (priority, speed) = (queue[start].priority, queue[start].speed);
            let tied = queue[start..]
                .iter()
                .take_while(|q| q.priority == priority && q.speed == speed)
                .count();
            shuffle(&mut *rng, &mut queue[start..start + tied])?;
            start += tied;
        }

        for queued in queue {
            let state = &self.sides[queued.side];
            let actor = queued.action.actor();
            let slot = queued.action.slot();
            if state.team[actor].is_fainted() || state.active[slot] != Some(actor) {
                continue;
            }
            match queued.action {
                Action::Switch { target, .. } => self.switch_in(queued.side, slot, target),
                Action::Move { index, .. } => self.use_move(queued.side, slot, actor, index, rng)?,
            }
        }

        self.replace_fainted();
        self.check_winner();
        if self.phase == Phase::Battle {
            self.turn += 1;
            self.narrate(format!("|turn|{}", self.turn));
            self.emit_requests();
        }
        Ok(())
    }

    fn switch_in(&mut self, side: SideId, slot: usize, target: usize) {
        let state = &self.sides[side];
        if state.team[target].is_fainted() || state.is_active(target) {
            let line = format!("|-fail|{}|switch", self.label(side, slot));
            self.narrate(line);
            return;
        }
        self.sides[side].active[slot] = Some(target);
        let line = format!(
            "|switch|{}|{}",
            self.label(side, slot),
            self.sides[side].team[target].condition()
        );
        self.narrate(line);
    }

    fn use_move(
        &mut self,
        side: SideId,
        slot: usize,
        actor: usize,
        index: usize,
        rng: &mut dyn RandomSource,
    ) -> Result<(), EngineError> {
        let attacker = &self.sides[side].team[actor];
        let spec = attacker.moves[index].clone();
        let attack = attacker.attack;
        let user = self.label(side, slot);
        let foe = opponent(side);

        let Some((target_slot, target)) = self.target(foe, slot) else {
            self.narrate(format!("|move|{user}|{}|", spec.name));
            self.narrate("|-notarget".to_string());
            return Ok(());
        };
        let target_label = self.label(foe, target_slot);
        self.narrate(format!("|move|{user}|{}|{target_label}", spec.name));

        if !rng.chance(spec.accuracy.min(100), 100)? {
            self.narrate(format!("|-miss|{user}|{target_label}"));
            return Ok(());
        }

        let crit = spec.can_crit && rng.chance(1, CRIT_DENOMINATOR)?;
        let defense = self.sides[foe].team[target].defense;
        let mut damage = base_damage(spec.power, attack, defense);
        if self.damage_variance {
            let roll = rng.range(0..VARIANCE_STEPS)?;
            damage = damage * (85 + roll.unsigned_abs()) / 100;
        }
        if crit {
            damage = damage * 3 / 2;
            self.narrate(format!("|-crit|{target_label}"));
        }

        let unit = &mut self.sides[foe].team[target];
        unit.take_damage(damage.max(1));
        let (condition, fainted) = (unit.condition(), unit.is_fainted());
        self.narrate(format!("|-damage|{target_label}|{condition}"));
        if fainted {
            self.narrate(format!("|faint|{target_label}"));
        }
        Ok(())
    }

    /// The foe across from `slot`, or the first standing foe.
    fn target(&self, foe: SideId, slot: usize) -> Option<(usize, usize)> {
        let state = &self.sides[foe];
        let standing = |&(_, unit): &(usize, usize)| !state.team[unit].is_fainted();
        state
            .active
            .get(slot)
            .copied()
            .flatten()
            .map(|unit| (slot, unit))
            .filter(standing)
            .or_else(|| state.active_units().find(standing))
    }

    fn replace_fainted(&mut self) {
        for side in SideId::all(2) {
            for slot in 0..self.sides[side].active.len() {
                let state = &mut self.sides[side];
                if state.active[slot].is_some_and(|unit| state.team[unit].is_fainted()) {
                    state.active[slot] = None;
                }
                if state.active[slot].is_none() {
                    if let Some(unit) = state.next_replacement() {
                        state.active[slot] = Some(unit);
                        let line = format!(
                            "|switch|{}|{}",
                            self.label(side, slot),
                            self.sides[side].team[unit].condition()
                        );
                        self.narrate(line);
                    }
                }
            }
        }
    }

    fn check_winner(&mut self) {
        let standing: Vec<_> = self
            .sides
            .iter()
            .filter(|(_, state)| state.has_units_left())
            .map(|(side, _)| side)
            .collect();

        match standing.as_slice() {
            [_, _] => {}
            [winner] => {
                self.phase = Phase::Ended;
                self.winner = Some(*winner);
                self.narrate(format!("|win|{winner}"));
            }
            _ => {
                self.phase = Phase::Ended;
                self.narrate("|tie".to_string());
            }
        }
        if self.phase == Phase::Ended {
            self.outbox.clear();
        }
    }
}

impl BattleEngine for Duel {
    fn side_count(&self) -> usize {
        self.sides.side_count()
    }

    fn take_requests(&mut self) -> Vec<(SideId, SideRequest)> {
        std::mem::take(&mut self.outbox)
    }

    fn is_choice_done(&self, side: SideId) -> bool {
        self.phase == Phase::Ended
            || self
                .sides
                .get(side)
                .map_or(true, |state| state.pending.is_some())
    }

    fn choose(
        &mut self,
        side: SideId,
        command: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<(), EngineError> {
        let invalid = |reason: &str| EngineError::InvalidChoice {
            side,
            reason: reason.to_string(),
        };
        if self.phase == Phase::Ended {
            return Err(invalid("the duel is over"));
        }
        let pending = self
            .sides
            .get(side)
            .map(|state| state.pending.is_some())
            .ok_or_else(|| invalid("no such side"))?;
        if pending {
            return Err(invalid("already chose this turn"));
        }

        let actions = match self.phase {
            Phase::Preview if command == "default" || command.starts_with("team") => Vec::new(),
            Phase::Preview => return Err(invalid("only team order can be chosen in preview")),
            _ => self.parse_choice(side, command)?,
        };
        self.sides[side].pending = Some(actions);

        if SideId::all(2).all(|side| self.is_choice_done(side)) {
            match self.phase {
                Phase::Preview => {
                    for (_, state) in self.sides.iter_mut() {
                        state.pending = None;
                    }
                    self.start_battle();
                }
                _ => self.resolve_turn(rng)?,
            }
        }
        Ok(())
    }

    fn ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    fn drain_narration(&mut self) -> Vec<String> {
        std::mem::take(&mut self.narration)
    }

    fn snapshot(&self) -> Result<Snapshot, EngineError> {
        Snapshot::encode(self)
    }

    fn restore(snapshot: &Snapshot) -> Result<Self, EngineError> {
        let mut duel: Duel = snapshot.decode()?;
        duel.emit_requests();
        Ok(duel)
    }
}

fn opponent(side: SideId) -> SideId {
    SideId::new(1 - side.0.min(1))
}

fn slot_letter(slot: usize) -> char {
    (b'a' + (slot % 26) as u8) as char
}
