//! Pilot rankings
//!
//! Positions are fixed (player first, then AI pilots in id order) so the HUD
//! rows never reshuffle mid-flight. The leader is only marked once somebody
//! has actually scored.

use serde::Serialize;

use crate::sim::{CraftId, World};

/// A single rankings row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub craft: CraftId,
    pub name: String,
    pub score: u64,
    /// Highest score on the board (and above zero)
    pub leading: bool,
}

/// Rankings for the current session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rankings {
    pub entries: Vec<RankingEntry>,
}

impl Rankings {
    /// Build from `(craft, name, score)` rows, keeping their order
    pub fn from_scores<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (CraftId, S, u64)>,
        S: Into<String>,
    {
        let mut entries: Vec<RankingEntry> = rows
            .into_iter()
            .map(|(craft, name, score)| RankingEntry {
                craft,
                name: name.into(),
                score,
                leading: false,
            })
            .collect();

        let top = entries.iter().map(|e| e.score).max().unwrap_or(0);
        if top > 0 {
            for entry in entries.iter_mut().filter(|e| e.score == top) {
                entry.leading = true;
            }
        }
        Self { entries }
    }

    /// Player score from the session, AI scores from each craft
    pub fn capture(world: &World) -> Self {
        Self::from_scores(world.crafts.iter().map(|craft| {
            let score = if craft.is_player() {
                world.session.score
            } else {
                craft.score
            };
            (craft.id, craft.name.clone(), score)
        }))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top score (if anyone has scored)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.iter().find(|e| e.leading).map(|e| e.score)
    }

    /// Entries currently marked as leading
    pub fn leaders(&self) -> impl Iterator<Item = &RankingEntry> {
        self.entries.iter().filter(|e| e.leading)
    }
}
