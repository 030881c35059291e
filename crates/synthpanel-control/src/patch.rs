//! Patch persistence seam and value snapshots

use serde::{Deserialize, Serialize};

/// Persistence collaborator bound to utility controllers
pub trait PatchManager {
    fn on_load(&self, synth: &str);
    fn on_save(&self, synth: &str);
    fn on_send(&self, synth: &str);
    fn on_receive(&self, synth: &str);
}

/// Controller values of one synth, in patch parameter order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSnapshot {
    pub synth: String,
    pub values: Vec<u16>,
}

impl PatchSnapshot {
    pub fn new(synth: impl Into<String>, values: Vec<u16>) -> Self {
        Self {
            synth: synth.into(),
            values,
        }
    }

    /// Whether this snapshot was taken from `synth`
    pub fn is_for(&self, synth: &str) -> bool {
        self.synth == synth
    }

    /// Load from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
