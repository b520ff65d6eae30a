//! Recording implementations of the host collaborators

use crate::host::{EventSink, HostUpdater, UpdateEvent, WindowBridge};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Event sink that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<UpdateEvent>>,
}

impl RecordingSink {
    /// Events recorded so far, oldest first.
    pub fn events(&self) -> Vec<UpdateEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: UpdateEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Host updater that counts calls.
#[derive(Debug, Default)]
pub struct CountingHostUpdater {
    checks: AtomicUsize,
    downloads: AtomicUsize,
    fail_check: bool,
}

impl CountingHostUpdater {
    /// Updater whose check always fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_check: true,
            ..Self::default()
        }
    }

    /// Number of `check_for_updates` calls.
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    /// Number of `download_update` calls.
    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostUpdater for CountingHostUpdater {
    async fn check_for_updates(&self) -> anyhow::Result<()> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.fail_check {
            anyhow::bail!("update server unreachable");
        }
        Ok(())
    }

    async fn download_update(&self) -> anyhow::Result<()> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Window bridge with a fixed answer that counts notifications.
#[derive(Debug, Default)]
pub struct RecordingWindow {
    present: bool,
    notified: AtomicUsize,
}

impl RecordingWindow {
    /// A window that accepts notifications.
    #[must_use]
    pub fn present() -> Self {
        Self {
            present: true,
            notified: AtomicUsize::new(0),
        }
    }

    /// No window at all.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// Number of `ready_to_update` calls.
    pub fn notified(&self) -> usize {
        self.notified.load(Ordering::SeqCst)
    }
}

impl WindowBridge for RecordingWindow {
    fn ready_to_update(&self) -> bool {
        self.notified.fetch_add(1, Ordering::SeqCst);
        self.present
    }
}
