//! Ticket collection shared by the pipeline and the ticket endpoints.

use serde::Serialize;
use strata_core::{Ticket, TicketSource, TicketSourceError};

/// Tickets that could be fetched plus one message per id that could not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchReport {
    pub tickets: Vec<Ticket>,
    pub errors: Vec<String>,
}

/// Fetches `ids` one after another, recording failures instead of stopping.
pub async fn fetch_all(source: &dyn TicketSource, ids: &[String]) -> FetchReport {
    let mut report = FetchReport::default();
    for id in ids {
        match source.fetch(id).await {
            Ok(ticket) => report.tickets.push(ticket),
            Err(TicketSourceError::NotFound(_)) => {
                report.errors.push(format!("Ticket {} not found", id))
            }
            Err(err) => report.errors.push(format!("Error fetching {}: {}", id, err)),
        }
    }
    report
}

/// Appends the children of every epic in `tickets`, skipping keys already present.
///
/// A failed child lookup is logged and otherwise ignored.
pub async fn append_epic_children(source: &dyn TicketSource, tickets: &mut Vec<Ticket>) {
    let epics: Vec<String> = tickets.iter().filter(|t| t.is_epic()).map(|t| t.key.clone()).collect();
    for epic in epics {
        match source.fetch_children(&epic).await {
            Ok(children) => {
                for child in children {
                    if !tickets.iter().any(|t| t.key == child.key) {
                        tickets.push(child);
                    }
                }
            }
            Err(err) => tracing::warn!(epic = %epic, error = %err, "could not fetch epic children"),
        }
    }
}
