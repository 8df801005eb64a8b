use serde::Serialize;
use uuid::Uuid;

/// Per-run tally returned to the caller for display and logging.
/// `scraped_count` counts every item the run attempted, so
/// `scraped_count >= created_count + skipped_count` always holds.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub scraped_count: usize,
    pub created_count: usize,
    pub skipped_count: usize,
    pub failed: Vec<FailedItem>,
    pub created: Vec<CreatedItem>,
}

#[derive(Debug, Serialize)]
pub struct FailedItem {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedItem {
    pub id: Uuid,
    pub title: String,
}

impl RunReport {
    pub fn record_created(&mut self, id: Uuid, title: String) {
        self.created_count += 1;
        self.created.push(CreatedItem { id, title });
    }

    /// Duplicate skips are expected outcomes, tallied apart from failures.
    pub fn record_skipped(&mut self) {
        self.skipped_count += 1;
    }

    pub fn record_failed(&mut self, url: &str, reason: String) {
        self.failed.push(FailedItem {
            url: url.to_string(),
            reason,
        });
    }
}
