//! Events that drive the transfer state machine

use stripsense_protocol::VendorRequest;

/// Events delivered by the USB stack, one per control transfer stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferEvent {
    /// Setup stage of a supported vendor request
    Setup(VendorRequest),
    /// Data stage finished moving every armed byte
    DataComplete,
    /// Status stage acknowledged
    Ack,
    /// Setup stage declined or not ours; any transfer in flight is dropped
    Cancel,
}
