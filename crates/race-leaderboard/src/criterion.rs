//! Ranking criteria.

use std::cmp::Ordering;
use std::fmt;

use race_agent::Agent;

/// Names of the built-in criteria.
pub mod names {
    pub const DISTANCE: &str = "distance";
    pub const SPEED: &str = "speed";
    pub const EFFICIENCY: &str = "efficiency";
    pub const LAP_TIME: &str = "lap_time";
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortOrder {
    /// Lower is better.
    Ascending,
    /// Higher is better.
    Descending,
}

impl SortOrder {
    /// Ordering that puts the better value first.
    #[inline]
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            SortOrder::Ascending => a.total_cmp(&b),
            SortOrder::Descending => b.total_cmp(&a),
        }
    }

    /// The value that ranks last under this order.
    #[inline]
    pub fn worst(self) -> f64 {
        match self {
            SortOrder::Ascending => f64::INFINITY,
            SortOrder::Descending => f64::NEG_INFINITY,
        }
    }
}

type Extractor = Box<dyn Fn(&Agent) -> f64 + Send + Sync>;

/// A named (value extractor, sort order) pair.
pub struct Criterion {
    name: String,
    order: SortOrder,
    extract: Extractor,
}

impl Criterion {
    pub fn new<F>(name: impl Into<String>, order: SortOrder, extract: F) -> Self
    where
        F: Fn(&Agent) -> f64 + Send + Sync + 'static,
    {
        Self { name: name.into(), order, extract: Box::new(extract) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Extract the agent's value.  NaN is mapped to the worst value so it
    /// always ranks last.
    pub fn value(&self, agent: &Agent) -> f64 {
        let v = (self.extract)(agent);
        if v.is_nan() { self.order.worst() } else { v }
    }
}

impl fmt::Debug for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criterion")
            .field("name", &self.name)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Distance (desc), speed (desc), efficiency (desc), best lap (asc).
///
/// An agent without a completed lap has best lap `+∞`.
pub fn default_criteria() -> Vec<Criterion> {
    vec![
        Criterion::new(names::DISTANCE, SortOrder::Descending, |a| a.metrics.distance),
        Criterion::new(names::SPEED, SortOrder::Descending, |a| a.speed()),
        Criterion::new(names::EFFICIENCY, SortOrder::Descending, |a| a.metrics.efficiency),
        Criterion::new(names::LAP_TIME, SortOrder::Ascending, |a| {
            a.metrics.best_lap_time.unwrap_or(f64::INFINITY)
        }),
    ]
}
