//! Notification sink consumed by the sweeps. Delivery is someone else's
//! problem: implementations must not block the caller, and a failed delivery
//! must never affect the attendance write that triggered it.

use chrono::NaiveDateTime;
use derive_more::Display;

#[derive(Debug, Clone, Display)]
#[display(fmt = "[{}] employee {}: {}", kind, employee_id, message)]
pub struct NotifyEvent {
    pub employee_id: u64,
    pub kind: String,
    pub message: String,
    pub ts: NaiveDateTime,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, event: &NotifyEvent);
}

/// Default sink: writes the event to the application log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &NotifyEvent) {
        tracing::info!(
            employee_id = event.employee_id,
            kind = %event.kind,
            "notification: {}",
            event
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn notify_event_renders_for_humans() {
        let event = NotifyEvent {
            employee_id: 7,
            kind: "midday".into(),
            message: "No check-out by midday".into(),
            ts: NaiveDate::from_ymd_opt(2026, 1, 5)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap(),
        };
        assert_eq!(event.to_string(), "[midday] employee 7: No check-out by midday");
    }
}
