//! Transfer state definition

use stripsense_protocol::VendorRequest;

use super::events::TransferEvent;

/// Where the current control transfer stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferState {
    /// No vendor transfer in flight
    #[default]
    Idle,
    /// Setup accepted, data stage armed but not finished
    AwaitingData(VendorRequest),
    /// Data stage finished, waiting for the status stage
    Complete(VendorRequest),
}

impl TransferState {
    /// Request being serviced, if any
    pub fn request(&self) -> Option<VendorRequest> {
        match self {
            TransferState::Idle => None,
            TransferState::AwaitingData(req) | TransferState::Complete(req) => Some(*req),
        }
    }

    /// Check if an ACK from this state must render the pixel buffer
    ///
    /// Only a SET_LED transfer whose data stage completed renders; an ACK
    /// that arrives mid-copy never does.
    pub fn renders_on_ack(&self) -> bool {
        matches!(self, TransferState::Complete(VendorRequest::SetLed))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: TransferEvent) -> Self {
        use TransferEvent::*;
        use TransferState::*;

        match (self, event) {
            // A new setup stage always starts over; the USB stack never
            // overlaps control transfers, so anything in flight is stale
            (_, Setup(req)) => AwaitingData(req),

            (AwaitingData(req), DataComplete) => Complete(req),

            (_, Ack) => Idle,
            (_, Cancel) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
