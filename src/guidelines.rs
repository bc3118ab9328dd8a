//! Action guidelines
//!
//! Fixed guidance shown next to each fatigue level.

use crate::types::FatigueLevel;
use serde::Serialize;

/// What a worker and crew should do at a given fatigue level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionGuideline {
    pub level: FatigueLevel,
    /// Leading directive, if the level requires work to stop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<&'static str>,
    pub action: &'static str,
}

impl ActionGuideline {
    /// High and Extreme require work to stop
    pub fn stops_work(&self) -> bool {
        self.directive.is_some()
    }

    /// Directive and action as one line
    pub fn full_text(&self) -> String {
        match self.directive {
            Some(directive) => format!("{directive} {}", self.action),
            None => self.action.to_string(),
        }
    }
}

const LOW: ActionGuideline = ActionGuideline {
    level: FatigueLevel::Low,
    directive: None,
    action: "Good to go? Continue to monitor fatigue. Note the assessment on HazChat.",
};

const MODERATE: ActionGuideline = ActionGuideline {
    level: FatigueLevel::Moderate,
    directive: None,
    action: "Discuss with team/crew, decide on appropriate controls. \
             Consider whether high risk tasks should occur. Advise Supervisor if appropriate. \
             Controls may include self and peer monitoring, task rotation, increased breaks, \
             pacing work load. Note the assessment and actions on HazChat.",
};

const HIGH: ActionGuideline = ActionGuideline {
    level: FatigueLevel::High,
    directive: Some("Stop Work."),
    action: "Discuss controls with crew/team and with Supervisor. \
             High risk tasks should not be performed. Controls may include increased supervision, \
             task re-assignment, buddy check, arrange back-up, transport alternatives may be required. \
             Note the assessment and actions on HazChat.",
};

const EXTREME: ActionGuideline = ActionGuideline {
    level: FatigueLevel::Extreme,
    directive: Some("Stop Work (or do not commence)."),
    action: "Discuss contingency with supervisor. Controls are unlikely to be sufficient. \
             Make arrangements to convey worker home. Continuing with any work requires GM approval. \
             Note the assessment and actions on HazChat.",
};

/// Guideline for a level
pub fn action_for(level: FatigueLevel) -> ActionGuideline {
    match level {
        FatigueLevel::Low => LOW,
        FatigueLevel::Moderate => MODERATE,
        FatigueLevel::High => HIGH,
        FatigueLevel::Extreme => EXTREME,
    }
}

/// All guidelines, lowest level first
pub fn all() -> [ActionGuideline; 4] {
    FatigueLevel::all().map(action_for)
}
