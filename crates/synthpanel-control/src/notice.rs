//! Named, non-fatal conditions reported to the log
//!
//! Notices cover configuration that is missing but recoverable. Reporting one
//! never aborts the caller.

use thiserror::Error;
use tracing::warn;

/// Fixed catalog of reportable conditions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Option catalog has nothing for this synth
    #[error("No data for '{0}' type synth.")]
    NoSynthData(String),

    /// Settings registered no synths, the default channel is used
    #[error("No synths registered in settings file using default midi channel: {0}.")]
    NoSynths(u8),

    /// A layout references a synth the settings do not know
    #[error("synth {0} found in layout file, but not registered in settings file.")]
    SynthNotRegistered(String),

    /// Synth settings carry no patch parameter order
    #[error("{0} settings does not have patch details.")]
    NoPatchDetails(String),

    /// Patch data belongs to another synth
    #[error("Patch data is not for a {0}.")]
    IncorrectSynth(String),
}

impl Notice {
    /// Stable catalog name of the condition
    pub fn name(&self) -> &'static str {
        match self {
            Notice::NoSynthData(_) => "NO_SYNTH_DATA",
            Notice::NoSynths(_) => "NO_SYNTHS",
            Notice::SynthNotRegistered(_) => "SYNTH_NOT_REGISTERED",
            Notice::NoPatchDetails(_) => "NO_PATCH_DETAILS",
            Notice::IncorrectSynth(_) => "INCORRECT_SYNTH",
        }
    }

    /// Write the notice to the log
    pub fn report(&self) {
        warn!(notice = self.name(), "{}", self);
    }
}
