//! Units and moves for the duel.

use serde::{Deserialize, Serialize};

/// An attacking move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSpec {
    pub name: String,
    pub power: u32,
    /// Hit chance in percent. 100 or more never misses.
    pub accuracy: u32,
    /// Higher priority moves go first regardless of speed.
    pub priority: i8,
    /// Whether the move can land a critical hit.
    pub can_crit: bool,
}

impl MoveSpec {
    /// A sure-hit move with no priority that can crit.
    pub fn new(name: impl Into<String>, power: u32) -> Self {
        Self {
            name: name.into(),
            power,
            accuracy: 100,
            priority: 0,
            can_crit: true,
        }
    }

    pub fn with_accuracy(mut self, accuracy: u32) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_crit(mut self, can_crit: bool) -> Self {
        self.can_crit = can_crit;
        self
    }
}

/// One unit on a team.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub moves: Vec<MoveSpec>,
}

impl Combatant {
    /// A unit at full health with neutral stats and no moves.
    pub fn new(name: impl Into<String>, max_hp: u32) -> Self {
        Self {
            name: name.into(),
            hp: max_hp,
            max_hp,
            attack: 10,
            defense: 10,
            speed: 10,
            moves: Vec::new(),
        }
    }

    pub fn with_stats(mut self, attack: u32, defense: u32, speed: u32) -> Self {
        self.attack = attack;
        self.defense = defense;
        self.speed = speed;
        self
    }

    pub fn with_move(mut self, spec: MoveSpec) -> Self {
        self.moves.push(spec);
        self
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    /// Remove up to `amount` hp, returning what was actually dealt.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Health as `hp/max`, the way narration prints it.
    pub fn condition(&self) -> String {
        if self.is_fainted() {
            "0 fnt".to_string()
        } else {
            format!("{}/{}", self.hp, self.max_hp)
        }
    }
}

/// Base damage before variance and crits.
///
/// Never below 1 so every hit makes progress.
pub fn base_damage(power: u32, attack: u32, defense: u32) -> u32 {
    (power * attack / defense.max(1)) / 2 + 2
}
