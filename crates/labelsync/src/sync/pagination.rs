//! Draining cursor-paged listings

use anyhow::Result;
use log::{debug, warn};

use crate::remote::Page;

/// Fetch every page of a listing and return the items in order.
///
/// Stops when the remote returns no next-page token, when the accumulated
/// item count reaches the reported total, or when the remote hands back the
/// token it was just given.
///
/// # Arguments
/// * `page_size` - Items requested per page
/// * `fetch` - Performs one page fetch given the page size and optional token
pub fn collect_pages<T, F>(page_size: usize, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize, Option<&str>) -> Result<Page<T>>,
{
    let mut all_items: Vec<T> = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch(page_size, page_token.as_deref())?;
        pages += 1;
        all_items.extend(page.items);

        if let Some(total) = page.total_items
            && all_items.len() >= total
        {
            break;
        }

        match page.next_page_token {
            Some(token) if page_token.as_deref() == Some(token.as_str()) => {
                warn!("Listing returned the same page token twice, stopping");
                break;
            }
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    debug!("Collected {} items over {} pages", all_items.len(), pages);
    Ok(all_items)
}
