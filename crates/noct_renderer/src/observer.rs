//! One-way notifications from a running render.

use std::sync::mpsc::Sender;

/// Something a render reports while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// A row finished; `pixels` holds its tone-mapped values left to right.
    RowCompleted { row: u32, pixels: Vec<[u8; 3]> },
    /// Work done and left, in rows.
    ///
    /// Rows finish on several workers, so consecutive events may arrive
    /// slightly out of order.
    Progress { completed: u32, remaining: u32 },
    /// The render returned, either complete or cancelled.
    Finished { completed_rows: u32, cancelled: bool },
}

/// Receiver of [`RenderEvent`]s.
///
/// Called from worker threads, so implementations must return quickly and
/// never block on the consumer.
pub trait RenderObserver: Send + Sync {
    fn notify(&self, event: RenderEvent);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RenderObserver for NullObserver {
    fn notify(&self, _event: RenderEvent) {}
}

/// Forwards events into an unbounded channel.
///
/// A receiver that went away is not an error, the render keeps going.
impl RenderObserver for Sender<RenderEvent> {
    fn notify(&self, event: RenderEvent) {
        let _ = self.send(event);
    }
}

/// Adapts a closure into an observer.
pub struct FnObserver<F>(pub F);

impl<F> RenderObserver for FnObserver<F>
where
    F: Fn(RenderEvent) + Send + Sync,
{
    fn notify(&self, event: RenderEvent) {
        (self.0)(event)
    }
}
