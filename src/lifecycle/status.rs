//! Deal status rules: occupancy, allowed transitions and SOP-gated initial status.

use crate::storage::models::{DealStatus, Partner};

impl DealStatus {
    /// Whether a deal in this status holds its position.
    pub fn is_occupying(self) -> bool {
        matches!(
            self,
            DealStatus::Live | DealStatus::PendingApproval | DealStatus::Paused
        )
    }

    /// Ended and inactive deals never change status again.
    pub fn is_terminal(self) -> bool {
        !self.is_occupying()
    }

    /// Whether an explicit status change from `self` to `to` is allowed.
    ///
    /// `live` and `paused` toggle, `pending_approval` can only be promoted to
    /// `live`, and any occupying deal can be ended or deactivated.
    pub fn can_transition_to(self, to: DealStatus) -> bool {
        match (self, to) {
            (DealStatus::Live, DealStatus::Paused)
            | (DealStatus::Paused, DealStatus::Live)
            | (DealStatus::PendingApproval, DealStatus::Live) => true,
            (from, DealStatus::Ended | DealStatus::Inactive) => from.is_occupying(),
            _ => false,
        }
    }
}

/// Status a new deal starts in.
///
/// Direct partners only go live straight away once contract, license and
/// banking are all on file.
pub fn initial_status(partner: &Partner) -> DealStatus {
    if partner.is_direct && !partner.sop_complete() {
        DealStatus::PendingApproval
    } else {
        DealStatus::Live
    }
}
