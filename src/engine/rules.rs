//! Rule presets.
//!
//! `A` is the default preset used across runtime and training drivers.

use serde::{Deserialize, Serialize};

/// Identifier of a rule preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKey {
    #[default]
    A,
}

/// One rule preset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSet {
    pub name: &'static str,
    /// Minimum base score before go/stop is offered.
    pub go_min_score: u32,
    /// Bak doublings.
    pub bak_kwang: u32,
    pub bak_pi: u32,
    pub bak_mong: u32,
    /// Whether reaching the minimum mid-round offers an early stop.
    pub use_early_stop: bool,
}

const RULES_A: RuleSet = RuleSet {
    name: "Unified Project Rules",
    go_min_score: 7,
    bak_kwang: 2,
    bak_pi: 2,
    bak_mong: 2,
    use_early_stop: true,
};

impl RuleKey {
    /// Look up the preset.
    #[must_use]
    pub fn rules(self) -> &'static RuleSet {
        match self {
            RuleKey::A => &RULES_A,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preset() {
        let rules = RuleKey::default().rules();
        assert_eq!(rules.go_min_score, 7);
        assert!(rules.use_early_stop);
        assert_eq!(rules.bak_kwang * rules.bak_pi * rules.bak_mong, 8);
    }

    #[test]
    fn test_rule_key_serde() {
        assert_eq!(serde_json::to_string(&RuleKey::A).unwrap(), "\"A\"");
    }
}
