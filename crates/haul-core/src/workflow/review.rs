//! Manager review operations: fix, approve, reject, manual entry, discard.

use chrono::Utc;
use tracing::info;

use crate::error::{StoreError, WorkflowError};
use crate::models::ticket::{
    ExtractedFields, FieldPatch, Review, ReviewAction, TicketRecord, TicketStatus,
};

use super::store::TicketStore;

/// Result type for review operations.
pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

/// Review operations over a ticket store.
///
/// Every operation takes the caller id of the signed-in user; `None` means
/// the request is unauthenticated.
pub struct ReviewService<'a> {
    store: &'a dyn TicketStore,
}

impl<'a> ReviewService<'a> {
    pub fn new(store: &'a dyn TicketStore) -> Self {
        Self { store }
    }

    /// Apply manual corrections and send the ticket back for approval.
    pub fn submit_fix(
        &self,
        caller: Option<&str>,
        ticket_id: &str,
        patch: &FieldPatch,
    ) -> WorkflowResult<TicketRecord> {
        let reviewer = require_caller(caller)?;
        if patch.is_empty() {
            return Err(WorkflowError::InvalidArgument("no field updates given".to_string()));
        }

        let mut record = self.load_for(ticket_id, ReviewAction::Fixed)?;
        record.fields.apply(patch);
        self.finish(record, reviewer, ReviewAction::Fixed)
    }

    /// Approve a ticket.
    pub fn approve(&self, caller: Option<&str>, ticket_id: &str) -> WorkflowResult<TicketRecord> {
        let reviewer = require_caller(caller)?;
        let record = self.load_for(ticket_id, ReviewAction::Approved)?;
        self.finish(record, reviewer, ReviewAction::Approved)
    }

    /// Reject a ticket.
    pub fn reject(&self, caller: Option<&str>, ticket_id: &str) -> WorkflowResult<TicketRecord> {
        let reviewer = require_caller(caller)?;
        let record = self.load_for(ticket_id, ReviewAction::Rejected)?;
        self.finish(record, reviewer, ReviewAction::Rejected)
    }

    /// Record a ticket typed in by hand.
    pub fn create_manual(
        &self,
        caller: Option<&str>,
        fields: ExtractedFields,
    ) -> WorkflowResult<TicketRecord> {
        let uploader = require_caller(caller)?;
        if fields.is_empty() {
            return Err(WorkflowError::InvalidArgument("manual ticket has no fields".to_string()));
        }

        let record = TicketRecord::manual(fields, uploader.to_string(), Utc::now());
        self.store.insert(record.clone())?;

        info!("Manual ticket {} entered by {} ({})", record.id, uploader, record.status);
        Ok(record)
    }

    /// Permanently delete a ticket.
    pub fn discard(&self, caller: Option<&str>, ticket_id: &str) -> WorkflowResult<()> {
        let reviewer = require_caller(caller)?;
        let ticket_id = require_ticket_id(ticket_id)?;

        if !self.store.delete(ticket_id)? {
            return Err(WorkflowError::NotFound(ticket_id.to_string()));
        }

        info!("Ticket {} discarded by {}", ticket_id, reviewer);
        Ok(())
    }

    fn load_for(&self, ticket_id: &str, action: ReviewAction) -> WorkflowResult<TicketRecord> {
        let ticket_id = require_ticket_id(ticket_id)?;
        let record = self
            .store
            .get(ticket_id)?
            .ok_or_else(|| WorkflowError::NotFound(ticket_id.to_string()))?;

        if !record.status.allows(action) {
            return Err(WorkflowError::InvalidTransition {
                id: record.id.clone(),
                from: record.status,
                to: action.target_status(&record.fields),
            });
        }
        Ok(record)
    }

    fn finish(
        &self,
        mut record: TicketRecord,
        reviewer: &str,
        action: ReviewAction,
    ) -> WorkflowResult<TicketRecord> {
        let from = record.status;
        record.status = action.target_status(&record.fields);
        record.fix_needed = match action {
            ReviewAction::Approved => false,
            _ => record.fields.needs_fix(),
        };
        if record.status != TicketStatus::OcrError {
            record.ocr_error = None;
        }
        record.reviews.push(Review {
            reviewer: reviewer.to_string(),
            reviewed_at: Utc::now(),
            action,
        });

        match self.store.update_if(&record, from) {
            Ok(()) => {}
            Err(StoreError::Conflict { id, found }) => {
                return Err(WorkflowError::InvalidTransition {
                    id,
                    from: found,
                    to: record.status,
                });
            }
            Err(StoreError::NotFound(id)) => return Err(WorkflowError::NotFound(id)),
            Err(e) => return Err(e.into()),
        }

        info!(
            "Ticket {} {:?} by {} ({} -> {})",
            record.id, action, reviewer, from, record.status
        );
        Ok(record)
    }
}

fn require_caller(caller: Option<&str>) -> WorkflowResult<&str> {
    match caller.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(WorkflowError::Unauthenticated),
    }
}

fn require_ticket_id(ticket_id: &str) -> WorkflowResult<&str> {
    let trimmed = ticket_id.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::InvalidArgument("invalid ticket id".to_string()));
    }
    Ok(trimmed)
}
