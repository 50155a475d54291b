//! The `Leaderboard` itself.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use race_agent::Agent;
use race_core::AgentId;

use crate::{Criterion, LeaderboardError, LeaderboardResult, default_criteria};

#[cfg(feature = "fx-hash")]
type IndexMap = rustc_hash::FxHashMap<AgentId, usize>;
#[cfg(not(feature = "fx-hash"))]
type IndexMap = std::collections::HashMap<AgentId, usize>;

/// One row of a ranking.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedEntry {
    /// 1-based.
    pub rank:  usize,
    pub agent: AgentId,
    pub value: f64,
}

/// Every criterion's ranking at one moment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub time:     f64,
    pub rankings: BTreeMap<String, Vec<RankedEntry>>,
}

#[derive(Default)]
struct Ranking {
    entries: Vec<RankedEntry>,
    /// Agent → position in `entries`.
    index:   IndexMap,
}

impl Ranking {
    fn rebuild(&mut self, criterion: &Criterion, agents: &[&Agent]) {
        let mut values: Vec<(AgentId, f64)> =
            agents.iter().map(|a| (a.id, criterion.value(a))).collect();
        let order = criterion.order();
        values.sort_by(|x, y| order.compare(x.1, y.1).then_with(|| x.0.cmp(&y.0)));

        self.entries.clear();
        self.index.clear();
        for (pos, (agent, value)) in values.into_iter().enumerate() {
            self.entries.push(RankedEntry { rank: pos + 1, agent, value });
            self.index.insert(agent, pos);
        }
    }

    fn get(&self, agent: AgentId) -> Option<&RankedEntry> {
        self.index.get(&agent).map(|&pos| &self.entries[pos])
    }
}

pub struct Leaderboard {
    criteria:      Vec<Criterion>,
    rankings:      Vec<Ranking>,
    history:       VecDeque<Snapshot>,
    history_limit: usize,
    last_update:   Option<f64>,
}

impl Leaderboard {
    /// A leaderboard with the [default criteria](default_criteria).
    pub fn new(history_limit: usize) -> Self {
        let mut board = Self::empty(history_limit);
        for c in default_criteria() {
            board.rankings.push(Ranking::default());
            board.criteria.push(c);
        }
        board
    }

    /// A leaderboard with no criteria.
    pub fn empty(history_limit: usize) -> Self {
        Self {
            criteria: Vec::new(),
            rankings: Vec::new(),
            history: VecDeque::with_capacity(history_limit.min(1024)),
            history_limit,
            last_update: None,
        }
    }

    /// Register a criterion.  Its ranking is empty until the next update.
    pub fn add_criterion(&mut self, criterion: Criterion) -> LeaderboardResult<()> {
        if self.position(criterion.name()).is_some() {
            return Err(LeaderboardError::DuplicateCriterion(criterion.name().to_owned()));
        }
        debug!(criterion = criterion.name(), "criterion added");
        self.criteria.push(criterion);
        self.rankings.push(Ranking::default());
        Ok(())
    }

    pub fn remove_criterion(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => {
                self.criteria.remove(i);
                self.rankings.remove(i);
                true
            }
            None => false,
        }
    }

    /// Criterion names in registration order.
    pub fn criteria(&self) -> impl Iterator<Item = &str> {
        self.criteria.iter().map(Criterion::name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.criteria.iter().position(|c| c.name() == name)
    }

    fn ranking(&self, name: &str) -> LeaderboardResult<&Ranking> {
        self.position(name)
            .map(|i| &self.rankings[i])
            .ok_or_else(|| LeaderboardError::UnknownCriterion(name.to_owned()))
    }

    // ── Update ────────────────────────────────────────────────────────────

    /// Recompute every ranking from scratch and record a history snapshot.
    pub fn update<'a, I>(&mut self, agents: I, time: f64)
    where
        I: IntoIterator<Item = &'a Agent>,
    {
        let live: Vec<&Agent> = agents.into_iter().filter(|a| a.is_participating()).collect();
        for (criterion, ranking) in self.criteria.iter().zip(&mut self.rankings) {
            ranking.rebuild(criterion, &live);
        }
        self.last_update = Some(time);

        if self.history_limit > 0 {
            if self.history.len() == self.history_limit {
                self.history.pop_front();
            }
            let snapshot = Snapshot { time, rankings: self.all_standings(None) };
            self.history.push_back(snapshot);
        }
    }

    /// Simulation time of the last update.
    pub fn last_update(&self) -> Option<f64> {
        self.last_update
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The top `limit` entries (all when `None`) of one criterion.
    pub fn get_standings(&self, criterion: &str, limit: Option<usize>) -> LeaderboardResult<&[RankedEntry]> {
        let entries = &self.ranking(criterion)?.entries;
        let n = limit.map_or(entries.len(), |l| l.min(entries.len()));
        Ok(&entries[..n])
    }

    pub fn get_agent_rank(&self, criterion: &str, agent: AgentId) -> Option<usize> {
        self.ranking(criterion).ok()?.get(agent).map(|e| e.rank)
    }

    pub fn get_agent_value(&self, criterion: &str, agent: AgentId) -> Option<f64> {
        self.ranking(criterion).ok()?.get(agent).map(|e| e.value)
    }

    /// Every criterion's standings keyed by name.
    pub fn all_standings(&self, limit: Option<usize>) -> BTreeMap<String, Vec<RankedEntry>> {
        self.criteria
            .iter()
            .zip(&self.rankings)
            .map(|(c, r)| {
                let n = limit.map_or(r.entries.len(), |l| l.min(r.entries.len()));
                (c.name().to_owned(), r.entries[..n].to_vec())
            })
            .collect()
    }

    // ── History ───────────────────────────────────────────────────────────

    /// Snapshots oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Snapshot> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.history.back()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(100)
    }
}
