//! Maps `Box<dyn Error>` from trait boundaries to typed `WeighError`.
//!
//! The traits in `weigh_traits` box their errors; this module recovers a
//! typed error, downcasting `weigh_hardware::HwError` when the
//! `hardware-errors` feature is on.

use crate::error::WeighError;

/// Map a collaborator error to a typed `WeighError`.
///
/// Known hardware error types are downcast first, then the message is
/// inspected as a fallback.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> WeighError {
    #[cfg(feature = "hardware-errors")]
    {
        use weigh_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::DataReadyTimeout => WeighError::Timeout,
                HwError::Storage(msg) => WeighError::Storage(msg.clone()),
                HwError::Uart(msg) => WeighError::Link(msg.clone()),
                HwError::LinkClosed => WeighError::Link(hw.to_string()),
                other => WeighError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        WeighError::Timeout
    } else {
        WeighError::Hardware(s)
    }
}
