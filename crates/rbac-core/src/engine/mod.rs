//! Migration engine: traversal, update-and-verify, run accounting

pub mod applier;
pub mod summary;
pub mod walker;

pub use applier::{Applied, ApplyOutcome, ApplyRequest, PolicyApplier};
pub use summary::RunSummary;
pub use walker::{ChildListing, HierarchyWalker};
