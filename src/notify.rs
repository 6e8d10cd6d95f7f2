use time::Date;
use tracing::info;
use uuid::Uuid;

use crate::nutrition::AdvisoryEvent;

/// Surfaces advisory events to the user.
pub trait AdvisoryNotifier: Send + Sync {
    fn notify(&self, user_id: Uuid, date: Date, events: &[AdvisoryEvent]);
}

/// Writes advisories to the log. Clients render them from the day view.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl AdvisoryNotifier for TracingNotifier {
    fn notify(&self, user_id: Uuid, date: Date, events: &[AdvisoryEvent]) {
        for event in events {
            info!(%user_id, %date, kind = ?event.kind, message = %event.message, "advisory");
        }
    }
}
