//! Age bracket classification.
//!
//! Thresholds come from configuration (usually the dataset document), never
//! from the engine logic itself.

use serde::{Deserialize, Serialize};

/// Patient age bracket governing which dose and limit values apply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Child,
    Adolescent,
    Adult,
}

impl AgeGroup {
    /// Whether this bracket uses pediatric dose/limit values.
    pub fn is_pediatric(self) -> bool {
        matches!(self, AgeGroup::Child | AgeGroup::Adolescent)
    }
}

/// Configurable bracket boundaries, inclusive upper bounds in years.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgeBrackets {
    /// Highest age still classified as a child
    #[serde(default = "default_child_max")]
    pub child_max: u32,
    /// Highest age still classified as an adolescent
    #[serde(default = "default_adolescent_max")]
    pub adolescent_max: u32,
}

fn default_child_max() -> u32 {
    12
}

fn default_adolescent_max() -> u32 {
    17
}

impl Default for AgeBrackets {
    fn default() -> Self {
        Self {
            child_max: default_child_max(),
            adolescent_max: default_adolescent_max(),
        }
    }
}

impl AgeBrackets {
    /// Classify an age into its bracket.
    pub fn classify(&self, age: u32) -> AgeGroup {
        if age <= self.child_max {
            AgeGroup::Child
        } else if age <= self.adolescent_max {
            AgeGroup::Adolescent
        } else {
            AgeGroup::Adult
        }
    }
}
