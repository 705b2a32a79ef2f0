//! Abstraction over delivering `UserEvent`s to the UI thread.

use super::events::UserEvent;
use tao::event_loop::EventLoopProxy;

/// Sends `StateUpdate` and `ShowError` events toward the webview.
///
/// Fire-and-forget by design: handlers and fetch tasks never care whether
/// the event arrived. Tests substitute a channel-backed implementation to
/// observe what the backend emitted.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: UserEvent);
}

impl EventProxy for EventLoopProxy<UserEvent> {
    fn send_event(&self, event: UserEvent) {
        // Sending only fails once the event loop is gone, at which point
        // there is no UI left to update. Log and move on.
        if let Err(e) = self.send_event(event) {
            tracing::warn!("Failed to send event to event loop: {}", e);
        }
    }
}
