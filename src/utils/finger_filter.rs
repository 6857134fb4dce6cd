use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
/// Tune these based on real enrollment counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static FINGER_FILTER: Lazy<RwLock<CuckooFilter<u32>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Check if a fingerprint key might be enrolled (false positives possible)
pub fn might_exist(finger_number: u32) -> bool {
    FINGER_FILTER
        .read()
        .expect("finger filter poisoned")
        .contains(&finger_number)
}

/// Insert a single fingerprint key into the filter
pub fn insert(finger_number: u32) {
    FINGER_FILTER
        .write()
        .expect("finger filter poisoned")
        .add(&finger_number);
}

/// Remove a fingerprint key from the filter
pub fn remove(finger_number: u32) {
    FINGER_FILTER
        .write()
        .expect("finger filter poisoned")
        .remove(&finger_number);
}

/// Warm up the fingerprint filter using streaming + batching
pub async fn warmup_finger_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u32,)>(
        "SELECT finger_number FROM employees WHERE finger_number IS NOT NULL",
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (finger,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(finger);
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Fingerprint filter warmup complete: {} keys", total);
    Ok(())
}

/// Insert a batch of fingerprint keys
fn insert_batch(fingers: &[u32]) {
    let mut filter = FINGER_FILTER.write().expect("finger filter poisoned");

    for finger in fingers {
        filter.add(finger);
    }
}
