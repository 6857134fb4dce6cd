use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// finger_number => employee id, so the scan endpoint resolves without a
/// directory query on the hot path.
pub static FINGER_CACHE: Lazy<Cache<u32, u64>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000) // tune based on headcount
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

/// Remember the mapping for one fingerprint key
pub async fn remember(finger_number: u32, employee_id: u64) {
    FINGER_CACHE.insert(finger_number, employee_id).await;
}

/// Resolve a fingerprint key to an employee id, if cached
pub async fn resolve(finger_number: u32) -> Option<u64> {
    FINGER_CACHE.get(&finger_number).await
}

/// Drop a mapping (employee deleted or re-enrolled)
pub async fn forget(finger_number: u32) {
    FINGER_CACHE.invalidate(&finger_number).await;
}

/// Batch insert mappings
async fn batch_remember(entries: &[(u32, u64)]) {
    let futures: Vec<_> = entries
        .iter()
        .map(|&(finger, employee)| FINGER_CACHE.insert(finger, employee))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load all enrolled fingerprints into the in-memory cache (batched)
pub async fn warmup_finger_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u32, u64)>(
        r#"
        SELECT finger_number, id
        FROM employees
        WHERE finger_number IS NOT NULL AND status = 'active'
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (finger, employee) = row?;
        batch.push((finger, employee));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_remember(&batch).await;
            batch.clear();
        }
    }

    // Insert any remaining mappings
    if !batch.is_empty() {
        batch_remember(&batch).await;
    }

    log::info!(
        "Fingerprint cache warmup complete: {} enrolled employees",
        total_count
    );

    Ok(())
}
