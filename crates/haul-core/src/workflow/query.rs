//! Ticket list views: filtered queues, uploader history and dashboard counts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::ticket::{TicketRecord, TicketStatus};

/// Default page size of an uploader's ticket history.
pub const HISTORY_LIMIT: usize = 50;

/// Filter and ordering for listing tickets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub uploader: Option<String>,
    pub fix_needed: Option<bool>,
    pub newest_first: bool,
    pub limit: Option<usize>,
}

impl TicketQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets flagged for a manual fix.
    pub fn fix_queue() -> Self {
        Self::new().with_fix_needed(true)
    }

    /// An uploader's most recent tickets, newest first.
    pub fn history(uploader: impl Into<String>) -> Self {
        Self::new()
            .with_uploader(uploader)
            .newest_first()
            .with_limit(HISTORY_LIMIT)
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_uploader(mut self, uploader: impl Into<String>) -> Self {
        self.uploader = Some(uploader.into());
        self
    }

    pub fn with_fix_needed(mut self, fix_needed: bool) -> Self {
        self.fix_needed = Some(fix_needed);
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &TicketRecord) -> bool {
        self.status.is_none_or(|s| record.status == s)
            && self
                .uploader
                .as_deref()
                .is_none_or(|u| record.uploader.as_deref() == Some(u))
            && self.fix_needed.is_none_or(|f| record.fix_needed == f)
    }

    /// Apply the query to records listed oldest first.
    pub fn apply(&self, records: Vec<TicketRecord>) -> Vec<TicketRecord> {
        let mut selected: Vec<_> = records.into_iter().filter(|r| self.matches(r)).collect();
        if self.newest_first {
            selected.reverse();
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// Manager dashboard counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TicketStats {
    pub pending: usize,
    pub fix_needed: usize,
    pub approved: usize,
    /// Approved tickets created on or after the start of `today` (UTC).
    pub approved_today: usize,
    pub total: usize,
}

impl TicketStats {
    pub fn collect(records: &[TicketRecord], today: NaiveDate) -> Self {
        let midnight: DateTime<Utc> = today.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();

        records.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            if record.fix_needed {
                stats.fix_needed += 1;
            }
            match record.status {
                TicketStatus::Pending => stats.pending += 1,
                TicketStatus::Approved => {
                    stats.approved += 1;
                    if record.created_at >= midnight {
                        stats.approved_today += 1;
                    }
                }
                _ => {}
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use crate::models::ticket::ExtractedFields;

    fn record(uploader: &str, day: u32, status: TicketStatus, fix_needed: bool) -> TicketRecord {
        let mut record = TicketRecord::manual(
            ExtractedFields::default(),
            uploader.to_string(),
            Utc.with_ymd_and_hms(2025, 5, day, 9, 0, 0).unwrap(),
        );
        record.status = status;
        record.fix_needed = fix_needed;
        record
    }

    fn sample() -> Vec<TicketRecord> {
        vec![
            record("drv-1", 1, TicketStatus::Draft, true),
            record("drv-2", 2, TicketStatus::Pending, false),
            record("drv-1", 3, TicketStatus::OcrError, true),
            record("drv-1", 4, TicketStatus::Approved, false),
            record("drv-2", 5, TicketStatus::Approved, false),
        ]
    }

    fn days(records: &[TicketRecord]) -> Vec<String> {
        records.iter().map(|r| r.created_at.format("%d").to_string()).collect()
    }

    #[test]
    fn test_fix_queue() {
        let queue = TicketQuery::fix_queue().apply(sample());
        assert_eq!(days(&queue), vec!["01", "03"]);
    }

    #[test]
    fn test_uploader_history_is_newest_first_and_limited() {
        let history = TicketQuery::history("drv-1").apply(sample());
        assert_eq!(days(&history), vec!["04", "03", "01"]);

        let page = TicketQuery::history("drv-1").with_limit(2).apply(sample());
        assert_eq!(days(&page), vec!["04", "03"]);

        assert!(TicketQuery::history("nobody").apply(sample()).is_empty());
    }

    #[test]
    fn test_history_default_limit() {
        let records: Vec<_> = (0..60)
            .map(|_| record("drv-1", 1, TicketStatus::Pending, false))
            .collect();
        assert_eq!(TicketQuery::history("drv-1").apply(records).len(), HISTORY_LIMIT);
    }

    #[test]
    fn test_combined_filters() {
        let query = TicketQuery::new()
            .with_status(TicketStatus::Approved)
            .with_uploader("drv-2");
        assert_eq!(days(&query.apply(sample())), vec!["05"]);
    }

    #[test]
    fn test_stats() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let stats = TicketStats::collect(&sample(), today);

        assert_eq!(
            stats,
            TicketStats {
                pending: 1,
                fix_needed: 2,
                approved: 2,
                approved_today: 1,
                total: 5,
            }
        );
    }
}
