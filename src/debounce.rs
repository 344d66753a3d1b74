//! Trailing-edge debouncer
//!
//! Values pushed inside the quiet window collapse into one callback carrying
//! the last value. The callback runs on a background tokio task.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::trace;

pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debounce task. Must be called inside a tokio runtime.
    pub fn spawn<F>(delay: Duration, mut on_settle: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => latest = value,
                            None => {
                                on_settle(latest);
                                return;
                            }
                        },
                        _ = tokio::time::sleep(delay) => {
                            trace!(delay_ms = delay.as_millis() as u64, "Debounce window settled");
                            on_settle(latest);
                            break;
                        }
                    }
                }
            }
        });

        Self { tx }
    }

    /// Queue a value. Returns false once the task has stopped.
    pub fn push(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}
