//! Barcode scan accumulation
//!
//! Hand scanners behave like a very fast keyboard: they type the barcode and
//! finish with Enter. [`ScanAccumulator`] turns that key stream into discrete
//! scans; keys arriving further apart than the inactivity window are treated
//! as human typing and dropped.
//!
//! [`ScanListener`] drives an accumulator on a background task, owning the
//! inactivity timer. It is the single capture point for keystrokes: nothing
//! else should feed the same key events into picking.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::error::SendError;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Key channel depth; scanners emit ~20 keys per barcode
const KEY_BUFFER: usize = 256;
const SCAN_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    /// Modifiers, arrows, function keys
    Other,
}

/// A window-level key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// A data-entry field currently has focus
    pub field_focused: bool,
}

impl KeyEvent {
    pub fn char(c: char) -> Self {
        Self {
            key: Key::Char(c),
            field_focused: false,
        }
    }

    pub fn enter() -> Self {
        Self {
            key: Key::Enter,
            field_focused: false,
        }
    }

    pub fn in_field(mut self) -> Self {
        self.field_focused = true;
        self
    }
}

/// What the embedding event loop should do with the key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Let the default behaviour run
    Pass,
    /// Swallow the key
    Suppress,
    /// Swallow the key; a complete barcode was read
    Scanned(String),
}

/// Keystroke → barcode state machine
#[derive(Debug)]
pub struct ScanAccumulator {
    buffer: String,
    deadline: Option<Instant>,
    timeout: Duration,
}

impl ScanAccumulator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            buffer: String::new(),
            deadline: None,
            timeout,
        }
    }

    pub fn on_key(&mut self, event: &KeyEvent, now: Instant) -> KeyDisposition {
        self.expire(now);

        match event.key {
            Key::Char(c) if !c.is_control() => {
                self.buffer.push(c);
                self.deadline = Some(now + self.timeout);
                KeyDisposition::Pass
            }
            Key::Enter => {
                self.deadline = None;
                let code = std::mem::take(&mut self.buffer);
                if !code.is_empty() {
                    KeyDisposition::Scanned(code)
                } else if event.field_focused {
                    KeyDisposition::Pass
                } else {
                    KeyDisposition::Suppress
                }
            }
            _ => KeyDisposition::Pass,
        }
    }

    /// Drop the buffer if the inactivity window has elapsed.
    /// Returns true when something was discarded.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                let discarded = !self.buffer.is_empty();
                if discarded {
                    tracing::trace!(len = self.buffer.len(), "Scan buffer timed out");
                }
                self.buffer.clear();
                discarded
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.deadline = None;
    }
}

/// Reset generation a key or scan was stamped with
type Generation = u64;

/// Key input handle for a [`ScanListener`]
///
/// Every event is stamped with the listener's reset generation at send time,
/// so keys queued before a reset are dropped instead of starting a new
/// barcode.
#[derive(Debug, Clone)]
pub struct KeySender {
    tx: mpsc::Sender<(Generation, KeyEvent)>,
    generation: Arc<AtomicU64>,
}

impl KeySender {
    pub async fn send(&self, event: KeyEvent) -> Result<(), SendError<KeyEvent>> {
        let generation = self.generation.load(Ordering::Acquire);
        self.tx
            .send((generation, event))
            .await
            .map_err(|SendError((_, event))| SendError(event))
    }
}

/// Background scan driver
///
/// Dropping the listener cancels its task; a half-typed barcode is lost.
pub struct ScanListener {
    keys: KeySender,
    scans: mpsc::Receiver<(Generation, String)>,
    generation: Arc<AtomicU64>,
    reset: Arc<Notify>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ScanListener {
    /// Start listening. Must be called inside a Tokio runtime.
    pub fn spawn(timeout: Duration) -> Self {
        let (key_tx, key_rx) = mpsc::channel(KEY_BUFFER);
        let (scan_tx, scan_rx) = mpsc::channel(SCAN_BUFFER);
        let generation = Arc::new(AtomicU64::new(0));
        let reset = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run(
            ScanAccumulator::new(timeout),
            key_rx,
            scan_tx,
            generation.clone(),
            reset.clone(),
            cancel.clone(),
        ));

        Self {
            keys: KeySender {
                tx: key_tx,
                generation: generation.clone(),
            },
            scans: scan_rx,
            generation,
            reset,
            cancel,
            handle: Some(handle),
        }
    }

    /// Sender for the window-level key capture
    pub fn keys(&self) -> KeySender {
        self.keys.clone()
    }

    fn current(&self) -> Generation {
        self.generation.load(Ordering::Acquire)
    }

    /// Next completed barcode; `None` once the listener has stopped
    pub async fn next_scan(&mut self) -> Option<String> {
        loop {
            let (generation, code) = self.scans.recv().await?;
            if generation == self.current() {
                return Some(code);
            }
        }
    }

    pub fn try_next_scan(&mut self) -> Option<String> {
        loop {
            let (generation, code) = self.scans.try_recv().ok()?;
            if generation == self.current() {
                return Some(code);
            }
        }
    }

    /// Drop the half-typed buffer, queued keys and any undelivered scans
    pub fn reset(&mut self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.reset.notify_one();
        while self.scans.try_recv().is_ok() {}
    }

    /// Stop the task and wait for it to finish
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!("Scan listener task failed: {e}");
        }
    }
}

impl Drop for ScanListener {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    mut accumulator: ScanAccumulator,
    mut keys: mpsc::Receiver<(Generation, KeyEvent)>,
    scans: mpsc::Sender<(Generation, String)>,
    generation: Arc<AtomicU64>,
    reset: Arc<Notify>,
    cancel: CancellationToken,
) {
    tracing::debug!("Scan listener started");
    let mut seen = generation.load(Ordering::Acquire);

    loop {
        let deadline = accumulator.deadline();
        let sleep_until = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            _ = reset.notified() => {
                seen = generation.load(Ordering::Acquire);
                accumulator.reset();
            }

            _ = tokio::time::sleep_until(sleep_until), if deadline.is_some() => {
                accumulator.expire(Instant::now());
            }

            key = keys.recv() => {
                let Some((stamp, event)) = key else { break };

                let current = generation.load(Ordering::Acquire);
                if current != seen {
                    seen = current;
                    accumulator.reset();
                }
                if stamp != seen {
                    tracing::trace!("Key from before reset dropped");
                    continue;
                }

                if let KeyDisposition::Scanned(code) = accumulator.on_key(&event, Instant::now()) {
                    tracing::debug!(code = %code, "Barcode scanned");
                    // a full scan queue must not block teardown
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        sent = scans.send((seen, code)) => {
                            if sent.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    tracing::debug!("Scan listener stopped");
}
