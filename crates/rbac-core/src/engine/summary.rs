//! Per-run counters

use super::applier::ApplyOutcome;
use crate::resource::ResourceKind;
use std::fmt;

/// Counts gathered while walking the hierarchy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Organizations processed
    pub organizations: usize,
    /// Workspaces processed
    pub workspaces: usize,
    /// Scenarios processed
    pub scenarios: usize,
    /// Resources whose policy was written
    pub updated: usize,
    /// Resources that kept an existing policy
    pub existing: usize,
    /// Updates that failed remotely (also counted as existing in the report)
    pub failed_updates: usize,
    /// Child listings that failed and were treated as empty
    pub degraded_listings: usize,
    /// Owners whose resolution produced no usable address
    pub unresolved_owners: usize,
    /// Identities in the mapping at the end of the run
    pub cached_identities: usize,
}

impl RunSummary {
    /// Count one processed resource
    pub fn record(&mut self, kind: ResourceKind, outcome: &ApplyOutcome) {
        match kind {
            ResourceKind::Organization => self.organizations += 1,
            ResourceKind::Workspace => self.workspaces += 1,
            ResourceKind::Scenario => self.scenarios += 1,
        }
        match outcome {
            ApplyOutcome::Updated => self.updated += 1,
            ApplyOutcome::Exist => self.existing += 1,
            ApplyOutcome::Failed(_) => {
                self.existing += 1;
                self.failed_updates += 1;
            }
        }
    }

    /// Resources processed across all levels
    pub fn total(&self) -> usize {
        self.organizations + self.workspaces + self.scenarios
    }

    /// Whether any branch ran degraded
    pub fn is_degraded(&self) -> bool {
        self.failed_updates > 0 || self.degraded_listings > 0 || self.unresolved_owners > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} organizations, {} workspaces, {} scenarios: {} updated, {} existing ({} failed), {} degraded listings, {} unresolved owners",
            self.organizations,
            self.workspaces,
            self.scenarios,
            self.updated,
            self.existing,
            self.failed_updates,
            self.degraded_listings,
            self.unresolved_owners,
        )
    }
}
