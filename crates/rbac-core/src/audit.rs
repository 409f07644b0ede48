//! Audit trail: one record per processed resource
//!
//! The CSV report is the run's durable output. Rows are written in traversal
//! order and the report is closed exactly once, at the end of the run.

use crate::acl::ContributionSet;
use crate::errors::AuditError;
use crate::resource::ResourceKind;
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column header of the CSV report
pub const REPORT_HEADER: [&str; 6] = [
    "resource_kind",
    "resource_id",
    "owner_id",
    "owner_mail",
    "status",
    "contributed_users",
];

/// Outcome of one update-and-verify attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditStatus {
    /// The resource kept a policy it already had
    Exist,
    /// The stored policy now equals the intended one
    Updated,
}

impl AuditStatus {
    /// Report label
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Exist => "EXIST",
            AuditStatus::Updated => "UPDATED",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of what happened to one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    /// Hierarchy level
    pub resource_kind: ResourceKind,
    /// Resource id
    pub resource_id: String,
    /// Owner identity reference
    pub owner_id: String,
    /// Resolved owner address, empty when resolution failed
    pub owner_mail: String,
    /// Update outcome
    pub status: AuditStatus,
    /// Addresses passed to the ACL builder, in first-seen order
    pub contributed_users: Vec<String>,
}

impl AuditRecord {
    /// Build a record from the contribution actually passed to the ACL builder
    pub fn new(
        resource_kind: ResourceKind,
        resource_id: impl Into<String>,
        owner_id: impl Into<String>,
        owner_mail: impl Into<String>,
        status: AuditStatus,
        contributed: Option<&ContributionSet>,
    ) -> Self {
        Self {
            resource_kind,
            resource_id: resource_id.into(),
            owner_id: owner_id.into(),
            owner_mail: owner_mail.into(),
            status,
            contributed_users: contributed.map(ContributionSet::to_vec).unwrap_or_default(),
        }
    }

    /// Fields in report column order
    pub fn columns(&self) -> [String; 6] {
        [
            self.resource_kind.to_string(),
            self.resource_id.clone(),
            self.owner_id.clone(),
            self.owner_mail.clone(),
            self.status.to_string(),
            self.contributed_users.join(","),
        ]
    }
}

/// Append-only destination for audit records
pub trait AuditSink {
    /// Append one record
    fn record(&mut self, record: AuditRecord) -> Result<(), AuditError>;

    /// Flush and close; further records are rejected
    fn close(&mut self) -> Result<(), AuditError>;
}

impl<S: AuditSink + ?Sized> AuditSink for &mut S {
    fn record(&mut self, record: AuditRecord) -> Result<(), AuditError> {
        (**self).record(record)
    }

    fn close(&mut self) -> Result<(), AuditError> {
        (**self).close()
    }
}

/// CSV report writer
#[derive(Debug)]
pub struct CsvAuditSink<W: Write> {
    writer: W,
    rows: usize,
    closed: bool,
}

impl CsvAuditSink<BufWriter<File>> {
    /// Create (or truncate) the report file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvAuditSink<W> {
    /// Wrap a writer and emit the header row
    pub fn new(mut writer: W) -> Result<Self, AuditError> {
        write_row(&mut writer, &REPORT_HEADER)?;
        Ok(Self {
            writer,
            rows: 0,
            closed: false,
        })
    }

    /// Data rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AuditSink for CsvAuditSink<W> {
    fn record(&mut self, record: AuditRecord) -> Result<(), AuditError> {
        if self.closed {
            return Err(AuditError::Closed);
        }
        write_row(&mut self.writer, &record.columns())?;
        self.rows += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), AuditError> {
        if self.closed {
            return Err(AuditError::Closed);
        }
        self.writer.flush()?;
        self.closed = true;
        Ok(())
    }
}

fn write_row<W: Write, S: AsRef<str>>(writer: &mut W, fields: &[S]) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|field| escape_field(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\r\n")
}

/// RFC 4180 quoting: fields with separators, quotes or line breaks are quoted
fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: AuditStatus, users: &[&str]) -> AuditRecord {
        let set: ContributionSet = users.iter().copied().collect();
        AuditRecord::new(
            ResourceKind::Workspace,
            "w-1",
            "oid-1",
            "owner@x",
            status,
            set.into_contribution().as_ref(),
        )
    }

    #[test]
    fn escape_quotes_only_when_needed() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a@x,b@x"), "\"a@x,b@x\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn rows_follow_header_in_order() {
        let mut sink = CsvAuditSink::new(Vec::new()).unwrap();
        sink.record(record(AuditStatus::Updated, &["owner@x", "a@x"]))
            .unwrap();
        sink.record(record(AuditStatus::Exist, &[])).unwrap();
        sink.close().unwrap();
        assert_eq!(sink.rows(), 2);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "resource_kind,resource_id,owner_id,owner_mail,status,contributed_users\r\n\
             workspace,w-1,oid-1,owner@x,UPDATED,\"owner@x,a@x\"\r\n\
             workspace,w-1,oid-1,owner@x,EXIST,\r\n"
        );
    }

    #[test]
    fn closed_sink_rejects_records() {
        let mut sink = CsvAuditSink::new(Vec::new()).unwrap();
        sink.close().unwrap();
        assert!(matches!(
            sink.record(record(AuditStatus::Exist, &[])),
            Err(AuditError::Closed)
        ));
        assert!(matches!(sink.close(), Err(AuditError::Closed)));
    }
}
