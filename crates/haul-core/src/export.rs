//! Date-range export of tickets to CSV.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::info;

use crate::error::ExportError;
use crate::models::config::ExportConfig;
use crate::models::ticket::{TicketRecord, TicketStatus};

/// Which tickets to include besides the date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Tickets currently in this status.
    Status(TicketStatus),
    /// Tickets whose latest review was a manual fix.
    Fixed,
}

impl StatusFilter {
    pub fn matches(&self, record: &TicketRecord) -> bool {
        match self {
            StatusFilter::Status(status) => record.status == *status,
            StatusFilter::Fixed => record.was_fixed(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("fixed") {
            return Ok(StatusFilter::Fixed);
        }
        s.parse().map(StatusFilter::Status)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::Status(status) => fmt::Display::fmt(status, f),
            StatusFilter::Fixed => f.write_str("fixed"),
        }
    }
}

/// Export selection: an inclusive range of UTC days plus an optional status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: Option<StatusFilter>,
}

impl ExportFilter {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ExportError> {
        if start > end {
            return Err(ExportError::InvalidRange { start, end });
        }
        Ok(Self {
            start,
            end,
            status: None,
        })
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = Some(status);
        self
    }

    /// Half-open instant range `[start 00:00, end + 1 day 00:00)`.
    fn bounds(&self) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
        let from = self.start.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let until = self
            .end
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc());
        (from, until)
    }

    pub fn matches(&self, record: &TicketRecord) -> bool {
        let (from, until) = self.bounds();
        let in_range =
            record.created_at >= from && until.is_none_or(|until| record.created_at < until);
        in_range && self.status.is_none_or(|s| s.matches(record))
    }
}

/// Records selected by `filter`, oldest first.
pub fn select<'a>(records: &'a [TicketRecord], filter: &ExportFilter) -> Vec<&'a TicketRecord> {
    let mut selected: Vec<_> = records.iter().filter(|r| filter.matches(r)).collect();
    selected.sort_by_key(|r| r.created_at);
    selected
}

/// Parse a strftime pattern up front; formatting with a bad pattern panics.
fn parse_date_format(format: &str) -> Result<Vec<Item<'_>>, ExportError> {
    let items: Vec<_> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(ExportError::InvalidDateFormat(format.to_string()));
    }
    Ok(items)
}

/// CSV column headers.
pub const HEADERS: [&str; 9] = [
    "ticket_number",
    "date",
    "driver",
    "weight_tons",
    "truck_number",
    "driver_badge",
    "debris_type",
    "status",
    "manual",
];

/// Write the selected tickets as CSV. Returns the number of rows written.
pub fn export_csv<W: Write>(
    records: &[TicketRecord],
    filter: &ExportFilter,
    config: &ExportConfig,
    writer: W,
) -> Result<usize, ExportError> {
    if !config.delimiter.is_ascii() {
        return Err(ExportError::InvalidDelimiter(config.delimiter));
    }
    let date_format = parse_date_format(&config.date_format)?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(config.delimiter as u8)
        .from_writer(writer);
    wtr.write_record(HEADERS)?;

    let selected = select(records, filter);
    for record in &selected {
        let fields = &record.fields;
        let date = record
            .created_at
            .format_with_items(date_format.iter())
            .to_string();
        let weight = fields.weight_tons.map(|w| w.to_string()).unwrap_or_default();
        wtr.write_record([
            record.display_number(),
            date.as_str(),
            fields.driver_actual.as_deref().unwrap_or(""),
            weight.as_str(),
            fields.truck_number.as_deref().unwrap_or(""),
            fields.driver_badge.as_deref().unwrap_or(""),
            fields.debris_type.as_deref().unwrap_or(""),
            record.status.as_str(),
            if record.manual { "yes" } else { "no" },
        ])?;
    }
    wtr.flush()?;

    info!(
        "Exported {} tickets from {} to {}",
        selected.len(),
        filter.start,
        filter.end
    );
    Ok(selected.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use crate::models::ticket::{ExtractedFields, Review, ReviewAction};

    fn record_at(day: u32, hour: u32, status: TicketStatus) -> TicketRecord {
        let mut record = TicketRecord::manual(
            ExtractedFields {
                ticket_number: Some(format!("{}{:02}", day, hour)),
                weight_tons: Some(Decimal::new(1250, 2)),
                driver_actual: Some("Jane Doe".to_string()),
                ..Default::default()
            },
            "u".to_string(),
            Utc.with_ymd_and_hms(2025, 4, day, hour, 30, 0).unwrap(),
        );
        record.status = status;
        record
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
    }

    #[test]
    fn test_range_is_inclusive_of_whole_days() {
        let records = vec![
            record_at(9, 23, TicketStatus::Pending),
            record_at(10, 0, TicketStatus::Pending),
            record_at(12, 23, TicketStatus::Approved),
            record_at(13, 0, TicketStatus::Pending),
        ];
        let filter = ExportFilter::new(date(10), date(12)).unwrap();

        let numbers: Vec<_> = select(&records, &filter)
            .into_iter()
            .map(|r| r.display_number().to_string())
            .collect();
        assert_eq!(numbers, vec!["1000", "1223"]);
    }

    #[test]
    fn test_status_filters() {
        let mut fixed = record_at(10, 8, TicketStatus::Pending);
        fixed.reviews.push(Review {
            reviewer: "mgr".to_string(),
            reviewed_at: Utc::now(),
            action: ReviewAction::Fixed,
        });
        let records = vec![fixed, record_at(10, 9, TicketStatus::Pending), record_at(10, 10, TicketStatus::Rejected)];

        let base = ExportFilter::new(date(10), date(10)).unwrap();
        assert_eq!(select(&records, &base.clone().with_status(StatusFilter::Fixed)).len(), 1);
        assert_eq!(
            select(&records, &base.clone().with_status("pending".parse().unwrap())).len(),
            2
        );
        assert_eq!(select(&records, &base.with_status(StatusFilter::Status(TicketStatus::Rejected))).len(), 1);
    }

    #[test]
    fn test_invalid_range() {
        assert!(matches!(
            ExportFilter::new(date(12), date(10)),
            Err(ExportError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_export_csv() {
        let mut missing_number = record_at(11, 7, TicketStatus::Draft);
        missing_number.fields.ticket_number = None;
        let id = missing_number.id.clone();
        let records = vec![record_at(11, 6, TicketStatus::Approved), missing_number];

        let filter = ExportFilter::new(date(11), date(11)).unwrap();
        let mut out = Vec::new();
        let rows = export_csv(&records, &filter, &ExportConfig::default(), &mut out).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], HEADERS.join(","));
        assert_eq!(lines[1], "1106,2025-04-11,Jane Doe,12.50,,,,approved,yes");
        assert_eq!(lines[2], format!("{},2025-04-11,Jane Doe,12.50,,,,draft,yes", id));
    }

    #[test]
    fn test_export_custom_delimiter() {
        let records = vec![record_at(11, 6, TicketStatus::Pending)];
        let filter = ExportFilter::new(date(11), date(11)).unwrap();

        let config = ExportConfig {
            delimiter: ';',
            date_format: "%d/%m/%Y".to_string(),
        };
        let mut out = Vec::new();
        export_csv(&records, &filter, &config, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("1106;11/04/2025;Jane Doe"));

        let bad = ExportConfig {
            delimiter: 'é',
            ..Default::default()
        };
        assert!(matches!(
            export_csv(&records, &filter, &bad, Vec::new()),
            Err(ExportError::InvalidDelimiter('é'))
        ));
    }

    #[test]
    fn test_export_invalid_date_format() {
        let records = vec![record_at(11, 6, TicketStatus::Pending)];
        let filter = ExportFilter::new(date(11), date(11)).unwrap();

        let config = ExportConfig {
            date_format: "%Q".to_string(),
            ..Default::default()
        };
        let mut out = Vec::new();
        let err = export_csv(&records, &filter, &config, &mut out).unwrap_err();
        assert!(matches!(err, ExportError::InvalidDateFormat(ref f) if f == "%Q"));
        assert!(out.is_empty());
    }
}
