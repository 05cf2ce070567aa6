//! Startup configuration supplied by the external collaborator.
//!
//! Tail size, the methodology-specific scenario-id ranges, and the risk-node
//! to asset-class mapping are configuration, not engine literals. The CLI
//! carries the production defaults; the engine only validates and applies
//! whatever it is given.

use crate::error::{Result, TailError};
use crate::model::{AssetClass, Methodology};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Default number of scenarios taken on each side of a tail.
pub const DEFAULT_TAIL_N: usize = 20;

/// Disjoint scenario-id ranges distinguishing DVaR-eligible from
/// SVaR-eligible P&L vectors in the source data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRanges {
    /// Scenario ids carrying historical (DVaR) vectors
    pub dvar: RangeInclusive<u32>,
    /// Scenario ids carrying stressed (SVaR) vectors
    pub svar: RangeInclusive<u32>,
}

impl ScenarioRanges {
    /// Methodology a scenario id belongs to, if any.
    pub fn methodology_for(&self, scenario_id: u32) -> Option<Methodology> {
        if self.dvar.contains(&scenario_id) {
            Some(Methodology::DVaR)
        } else if self.svar.contains(&scenario_id) {
            Some(Methodology::SVaR)
        } else {
            None
        }
    }

    fn validate(&self) -> Result<()> {
        if self.dvar.is_empty() || self.svar.is_empty() {
            return Err(TailError::InvalidConfig(
                "scenario-id ranges must be non-empty".to_string(),
            ));
        }
        let overlap = self.dvar.contains(self.svar.start())
            || self.dvar.contains(self.svar.end())
            || self.svar.contains(self.dvar.start());
        if overlap {
            return Err(TailError::InvalidConfig(format!(
                "DVaR range {}..={} overlaps SVaR range {}..={}",
                self.dvar.start(),
                self.dvar.end(),
                self.svar.start(),
                self.svar.end()
            )));
        }
        Ok(())
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Scenarios taken on each side of a tail (worst and best)
    #[serde(default = "default_tail_n")]
    pub tail_n: usize,
    /// DVaR/SVaR scenario-id ranges
    pub ranges: ScenarioRanges,
    /// Risk-node id to asset-class mapping
    pub nodes: BTreeMap<i64, AssetClass>,
}

const fn default_tail_n() -> usize {
    DEFAULT_TAIL_N
}

impl EngineConfig {
    /// Build and validate a configuration.
    pub fn new(
        tail_n: usize,
        ranges: ScenarioRanges,
        nodes: BTreeMap<i64, AssetClass>,
    ) -> Result<Self> {
        let config = Self {
            tail_n,
            ranges,
            nodes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate an already-constructed configuration (e.g. deserialized).
    pub fn validate(&self) -> Result<()> {
        if self.tail_n == 0 {
            return Err(TailError::InvalidConfig(
                "tail size must be at least 1".to_string(),
            ));
        }
        if self.nodes.is_empty() {
            return Err(TailError::InvalidConfig(
                "node mapping must contain at least one risk node".to_string(),
            ));
        }
        self.ranges.validate()
    }

    /// Asset class for a risk node, if the node is mapped.
    pub fn class_for_node(&self, node: i64) -> Option<AssetClass> {
        self.nodes.get(&node).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges() -> ScenarioRanges {
        ScenarioRanges {
            dvar: 261..=520,
            svar: 1..=260,
        }
    }

    fn nodes() -> BTreeMap<i64, AssetClass> {
        [
            (10, AssetClass::Fx),
            (22194, AssetClass::Rates),
            (137354, AssetClass::EmMacro),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_methodology_classification() {
        let r = ranges();
        assert_eq!(r.methodology_for(1), Some(Methodology::SVaR));
        assert_eq!(r.methodology_for(260), Some(Methodology::SVaR));
        assert_eq!(r.methodology_for(261), Some(Methodology::DVaR));
        assert_eq!(r.methodology_for(520), Some(Methodology::DVaR));
        assert_eq!(r.methodology_for(521), None);
        assert_eq!(r.methodology_for(0), None);
    }

    #[test]
    fn test_rejects_overlapping_ranges() {
        let config = EngineConfig::new(
            20,
            ScenarioRanges {
                dvar: 200..=520,
                svar: 1..=260,
            },
            nodes(),
        );
        assert!(matches!(config, Err(TailError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_tail_size() {
        let config = EngineConfig::new(0, ranges(), nodes());
        assert!(matches!(config, Err(TailError::InvalidConfig(_))));
    }

    #[test]
    fn test_node_lookup() {
        let config = EngineConfig::new(20, ranges(), nodes()).unwrap();
        assert_eq!(config.class_for_node(10), Some(AssetClass::Fx));
        assert_eq!(config.class_for_node(22194), Some(AssetClass::Rates));
        assert_eq!(config.class_for_node(42), None);
    }

    #[test]
    fn test_tail_n_defaults_in_json() {
        let json = r#"{
            "ranges": { "dvar": { "start": 261, "end": 520 }, "svar": { "start": 1, "end": 260 } },
            "nodes": { "10": "FX", "22194": "Rates", "137354": "EM Macro" }
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.tail_n, DEFAULT_TAIL_N);
        config.validate().unwrap();
    }
}
