//! C4: the paginated lister, spec §4.3.
//!
//! Issues list requests until a page comes back with no continuation token,
//! pushing every returned key into the queue as each page arrives. On any
//! list error, logs it, closes the producer side, and abandons the rest of
//! the mirror — the system does not retry list failures.

use std::sync::Arc;

use crate::client::ObjectClient;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::logging::Logger;
use crate::queue::WorkQueue;

/// Runs the lister to completion. Returns `Ok(())` if pagination finished
/// normally (including the empty-prefix no-op case), `Err` if the list API
/// reported a failure — the caller (orchestrator) uses this to decide the
/// process exit code.
pub async fn run(
    client: Arc<dyn ObjectClient>,
    bucket: String,
    prefix: String,
    queue: WorkQueue,
    logger: Arc<Logger>,
) -> Result<(), String> {
    let mut continuation_token: Option<String> = None;

    loop {
        let page = client
            .list_page(&bucket, &prefix, continuation_token.as_deref(), DEFAULT_PAGE_SIZE)
            .await;

        let page = match page {
            Ok(page) => page,
            Err(e) => {
                logger.error(&format!("{e}"));
                queue.close_producer();
                return Err(e.to_string());
            }
        };

        for object in page.objects {
            queue.push(object);
        }

        match page.continuation_token {
            Some(token) => continuation_token = Some(token),
            None => {
                queue.close_producer();
                return Ok(());
            }
        }
    }
}
