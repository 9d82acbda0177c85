use std::sync::Arc;

use crate::gateway::Gateway;
use crate::models::RelationshipKind;
use crate::relationship::RelationshipTable;

/// What became of a toggle request. Failures are deliberately not
/// errors: a rejected or rolled-back toggle is normal operation the UI
/// absorbs silently (the control snaps back, nothing blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Server confirmed; optimistic state stands as-is, no re-fetch
    Confirmed,
    /// Server refused; state snapped back to the pre-toggle values
    RolledBack,
    /// A toggle for this subject was already in flight; nothing happened
    Rejected,
    /// The owning screen was torn down mid-flight; result dropped
    Discarded,
}

/// Optimistic toggle of a binary relationship (star, follow).
///
/// The flip lands in the relationship table before the network call goes
/// out, so the UI reacts immediately; the server's answer then either
/// confirms the flip or snaps it back. While a toggle is pending its
/// subject rejects further toggles, which keeps a rapid
/// activate/deactivate pair from racing the server's confirmations out
/// of order.
pub struct MutationController {
    gateway: Arc<dyn Gateway>,
    table: Arc<RelationshipTable>,
}

impl MutationController {
    pub fn new(gateway: Arc<dyn Gateway>, table: Arc<RelationshipTable>) -> Self {
        Self { gateway, table }
    }

    pub async fn toggle(&self, kind: RelationshipKind, subject_id: &str) -> ToggleOutcome {
        let Some(ticket) = self.table.begin_toggle(subject_id) else {
            tracing::debug!(subject_id, %kind, "toggle rejected, already in flight");
            return ToggleOutcome::Rejected;
        };

        // Exactly one call, targeting the new intended state
        let result = match kind {
            RelationshipKind::Star => self.gateway.set_star(subject_id, ticket.new_active).await,
            RelationshipKind::Follow => {
                self.gateway.set_follow(subject_id, ticket.new_active).await
            }
        };

        match result {
            Ok(()) => {
                if self.table.confirm(subject_id) {
                    tracing::debug!(subject_id, %kind, active = ticket.new_active, "toggle confirmed");
                    ToggleOutcome::Confirmed
                } else {
                    ToggleOutcome::Discarded
                }
            }
            Err(err) => {
                // Swallowed by design: the UI snaps back, no error surfaces
                tracing::debug!(subject_id, %kind, %err, "toggle failed, reverting");
                if self.table.revert(subject_id, &ticket) {
                    ToggleOutcome::RolledBack
                } else {
                    ToggleOutcome::Discarded
                }
            }
        }
    }
}
