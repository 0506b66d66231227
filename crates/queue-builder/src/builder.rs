use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, info};

use portalscan_scan_state::WorkItem;

use crate::cache::RowDataCache;
use crate::errors::QueueBuildError;

/// Anchor carried by every schedule entry row.
const ENTRY_SELECTOR: &str = "a.entry-link[data-entry-no]";
/// Billing marker rendered next to an entry once it has been billed.
const BILLING_SELECTOR: &str = "a.billing-flag[data-entry-no]";
const BILLED_CLASS: &str = "billed";

/// Scan the schedule markup and produce the work queue, document order
/// preserved. Rows are dropped when the cache has no key for them, when the
/// markup flags them billed, or when their key was already queued.
pub fn build_queue(
    html: &str,
    cache: &dyn RowDataCache,
) -> Result<Vec<WorkItem>, QueueBuildError> {
    let doc = Html::parse_document(html);
    let entry_sel = selector(ENTRY_SELECTOR)?;
    let billing_sel = selector(BILLING_SELECTOR)?;

    let billed: HashSet<String> = doc
        .select(&billing_sel)
        .filter(|el| el.value().classes().any(|class| class == BILLED_CLASS))
        .filter_map(|el| el.value().attr("data-entry-no"))
        .map(str::to_string)
        .collect();

    let mut seen = HashSet::new();
    let mut queue = Vec::new();

    for entry in doc.select(&entry_sel) {
        let Some(entry_no) = entry.value().attr("data-entry-no") else {
            continue;
        };
        let Some(row) = cache.lookup(entry_no) else {
            debug!(entry_no, "skipping entry without cached row data");
            continue;
        };
        if row.identifier.trim().is_empty() {
            debug!(entry_no, "skipping entry with empty identifier");
            continue;
        }
        if billed.contains(entry_no) {
            debug!(entry_no, identifier = %row.identifier, "skipping billed entry");
            continue;
        }
        if !seen.insert(row.identifier.clone()) {
            debug!(entry_no, identifier = %row.identifier, "skipping duplicate identifier");
            continue;
        }

        let mut item = WorkItem::new(row.identifier);
        item.name = row.name;
        item.birth_date = row.birth_date;
        queue.push(item);
    }

    if queue.is_empty() {
        return Err(QueueBuildError::NoEligibleRows);
    }
    info!(items = queue.len(), "work queue built");
    Ok(queue)
}

fn selector(raw: &str) -> Result<Selector, QueueBuildError> {
    Selector::parse(raw).map_err(|_| QueueBuildError::Selector(raw.to_string()))
}
