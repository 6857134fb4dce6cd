//! Per-employee serialization for the read-decide-write sequence.
//!
//! Two concurrent check calls for the same employee would otherwise both read
//! "no prior record" and both write an IN, breaking the daily alternation.
//! The lock map hands out one async mutex per employee id; the outer std
//! mutex only guards the map itself and is never held across an await.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

static EMPLOYEE_LOCKS: Lazy<Mutex<HashMap<u64, Arc<AsyncMutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Acquire the lock for one employee. Hold the guard for the whole
/// read-decide-write sequence.
pub async fn lock_employee(employee_id: u64) -> OwnedMutexGuard<()> {
    let cell = {
        let mut map = EMPLOYEE_LOCKS.lock().expect("employee lock map poisoned");
        map.entry(employee_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    };
    cell.lock_owned().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn same_employee_lock_is_exclusive() {
        let guard = lock_employee(42).await;
        // A second acquisition must not be available while the first is held.
        let second = {
            let map = EMPLOYEE_LOCKS.lock().unwrap();
            map.get(&42).unwrap().clone()
        };
        assert!(second.try_lock().is_err());
        drop(guard);
        assert!(second.try_lock().is_ok());
    }

    #[actix_web::test]
    async fn different_employees_do_not_block_each_other() {
        let _a = lock_employee(1).await;
        let _b = lock_employee(2).await;
    }
}
