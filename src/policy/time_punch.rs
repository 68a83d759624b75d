//! Time-punch rounding policies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Rounding units a policy may use, in minutes.
pub const ROUNDING_UNITS: [u32; 7] = [1, 5, 6, 10, 15, 30, 60];

/// Direction applied when a value is not on a unit boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingDirection {
    /// Towards the later boundary.
    #[serde(alias = "ceil")]
    Up,
    /// Towards the earlier boundary.
    #[serde(alias = "floor")]
    Down,
    /// Towards the closer boundary; ties go up.
    #[serde(alias = "round")]
    Nearest,
}

/// Which edge of a worked span a value represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Punch-in.
    Start,
    /// Punch-out.
    End,
    /// Break start.
    BreakStart,
    /// Break end.
    BreakEnd,
}

/// Unit and direction for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRounding {
    /// Unit in minutes; one of [`ROUNDING_UNITS`].
    pub unit: u32,
    /// Direction.
    pub direction: RoundingDirection,
}

impl EdgeRounding {
    /// No rounding beyond dropping seconds.
    pub const EXACT: EdgeRounding = EdgeRounding {
        unit: 1,
        direction: RoundingDirection::Down,
    };

    /// Creates a rule.
    pub const fn new(unit: u32, direction: RoundingDirection) -> Self {
        Self { unit, direction }
    }
}

impl Default for EdgeRounding {
    fn default() -> Self {
        Self::EXACT
    }
}

/// Rounding applied to clock punches before calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePunch {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Rule for punch-in.
    #[serde(default)]
    pub start: EdgeRounding,
    /// Rule for punch-out.
    #[serde(default)]
    pub end: EdgeRounding,
    /// Whether break edges are rounded; otherwise they pass through.
    #[serde(default)]
    pub round_breaks: bool,
    /// Rule for break start.
    #[serde(default)]
    pub break_start: EdgeRounding,
    /// Rule for break end.
    #[serde(default)]
    pub break_end: EdgeRounding,
}

impl TimePunch {
    /// Checks every unit is an allowed one.
    pub fn validate(&self) -> EngineResult<()> {
        for (edge, rule) in [
            ("start", self.start),
            ("end", self.end),
            ("break_start", self.break_start),
            ("break_end", self.break_end),
        ] {
            if !ROUNDING_UNITS.contains(&rule.unit) {
                return Err(EngineError::PolicyMisconfigured {
                    policy: self.name.clone(),
                    message: format!("{edge} rounding unit {} is not one of {ROUNDING_UNITS:?}", rule.unit),
                });
            }
        }
        Ok(())
    }

    /// The rule for an edge; break edges pass through unless `round_breaks`.
    pub fn rule_for(&self, edge: Edge) -> EdgeRounding {
        match edge {
            Edge::Start => self.start,
            Edge::End => self.end,
            Edge::BreakStart if self.round_breaks => self.break_start,
            Edge::BreakEnd if self.round_breaks => self.break_end,
            Edge::BreakStart | Edge::BreakEnd => EdgeRounding::EXACT,
        }
    }
}
