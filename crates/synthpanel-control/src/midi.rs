//! NRPN transport seam
//!
//! The manager never frames bytes itself; it hands `(channel, nrpn, value)`
//! triples to whatever [`NrpnOutput`] the application provides.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;

/// Outgoing NRPN sink
pub trait NrpnOutput {
    fn send_nrpn(&self, channel: u8, nrpn: u16, value: u16);
}

impl<F> NrpnOutput for F
where
    F: Fn(u8, u16, u16),
{
    fn send_nrpn(&self, channel: u8, nrpn: u16, value: u16) {
        self(channel, nrpn, value)
    }
}

/// A single NRPN value change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NrpnMessage {
    pub channel: u8,
    pub nrpn: u16,
    pub value: u16,
}

impl fmt::Display for NrpnMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch {} nrpn {} = {}", self.channel, self.nrpn, self.value)
    }
}

/// Output that keeps every message it is given
#[derive(Debug, Default)]
pub struct RecordingOutput {
    sent: RefCell<Vec<NrpnMessage>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first
    pub fn sent(&self) -> Vec<NrpnMessage> {
        self.sent.borrow().clone()
    }

    /// Drain the recorded messages
    pub fn take(&self) -> Vec<NrpnMessage> {
        self.sent.take()
    }
}

impl NrpnOutput for RecordingOutput {
    fn send_nrpn(&self, channel: u8, nrpn: u16, value: u16) {
        self.sent.borrow_mut().push(NrpnMessage {
            channel,
            nrpn,
            value,
        });
    }
}
