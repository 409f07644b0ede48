//! Audit sink that keeps records in memory

use rbac_core::{AuditError, AuditRecord, AuditSink, ResourceKind};

/// Collects records for assertions
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditSink {
    records: Vec<AuditRecord>,
    closes: usize,
}

impl MemoryAuditSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in arrival order
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// The record for `resource_id` at `kind`, if any
    pub fn find(&self, kind: ResourceKind, resource_id: &str) -> Option<&AuditRecord> {
        self.records
            .iter()
            .find(|r| r.resource_kind == kind && r.resource_id == resource_id)
    }

    /// How many times `close` succeeded
    pub fn closes(&self) -> usize {
        self.closes
    }

    /// Whether the sink was closed
    pub fn is_closed(&self) -> bool {
        self.closes > 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&mut self, record: AuditRecord) -> Result<(), AuditError> {
        if self.is_closed() {
            return Err(AuditError::Closed);
        }
        self.records.push(record);
        Ok(())
    }

    fn close(&mut self) -> Result<(), AuditError> {
        if self.is_closed() {
            return Err(AuditError::Closed);
        }
        self.closes += 1;
        Ok(())
    }
}
