//! Clock-skew correction.
//!
//! A Hawk server rejects requests whose timestamp is too far from its own clock.  When it does,
//! it sends its current time along with a MAC of that time (`WWW-Authenticate: Hawk ts="..",
//! tsm=".."`), and the client stores the difference between the two clocks.  Every later
//! timestamp the client generates is corrected by that offset.

use crate::error::*;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Key under which the clock offset is persisted.
pub const NTP_OFFSET_KEY: &str = "hawk_ntp_offset";

/// A string-keyed store, typically backed by some form of persistent storage, that holds the
/// clock offset across sessions.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> std::io::Result<()>;
    fn remove(&self, key: &str) -> std::io::Result<()>;
}

/// A non-persistent store, useful for tests and for processes that resynchronize on startup.
#[derive(Debug, Default)]
pub struct MemoryStore(Mutex<HashMap<String, String>>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.0.lock() {
            Ok(map) => map.get(key).cloned(),
            Err(poisoned) => poisoned.into_inner().get(key).cloned(),
        }
    }

    fn set(&self, key: &str, value: String) -> std::io::Result<()> {
        let mut map = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        map.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        let mut map = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        map.remove(key);
        Ok(())
    }
}

/// A source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// The operating system's clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock stopped at a given time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SystemTime);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

/// The clock offset between this client and the Hawk server, along with the clock it corrects.
///
/// A single ClockSync is normally shared by everything that signs requests for one server.
/// Reads and writes go straight to the store, so concurrent updates are last-writer-wins.
pub struct ClockSync {
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
}

impl ClockSync {
    /// Create a ClockSync using the system clock and an in-memory store.
    pub fn new() -> Self {
        ClockSync {
            store: Box::new(MemoryStore::new()),
            clock: Box::new(SystemClock),
        }
    }

    /// Use the given store for the offset; any offset already in the store is used as-is.
    pub fn with_store<S: KeyValueStore + 'static>(mut self, store: S) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Use the given clock as the local wall clock.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Get the current offset in seconds.  A missing or non-numeric stored value is 0.
    pub fn offset(&self) -> i64 {
        self.store
            .get(NTP_OFFSET_KEY)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0)
    }

    /// Set the offset, in seconds.
    pub fn set_offset(&self, offset: i64) -> Result<()> {
        self.store.set(NTP_OFFSET_KEY, offset.to_string())?;
        Ok(())
    }

    /// Forget the offset, returning to the uncorrected local clock.
    pub fn clear_offset(&self) -> Result<()> {
        self.store.remove(NTP_OFFSET_KEY)?;
        Ok(())
    }

    /// Local wall-clock time, in whole seconds since the epoch, without any offset.
    pub fn local_secs(&self) -> i64 {
        millis_since_epoch(self.clock.now()).div_euclid(1000)
    }

    /// The corrected current time: the local clock, shifted by `localtime_offset_ms`, truncated
    /// to whole seconds, plus the stored offset.
    pub fn now(&self, localtime_offset_ms: i64) -> SystemTime {
        let millis = millis_since_epoch(self.clock.now()).saturating_add(localtime_offset_ms);
        let secs = millis.div_euclid(1000).saturating_add(self.offset());
        UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
    }

    /// Record the server's time, as read from a verified timestamp.  Failure to persist the
    /// offset is logged and otherwise ignored.
    pub(crate) fn sync_to(&self, server_secs: u64) {
        let offset = (server_secs as i64).saturating_sub(self.local_secs());
        debug!("updating Hawk clock offset to {}s", offset);
        if let Err(e) = self.set_offset(offset) {
            warn!("could not store Hawk clock offset: {}", e);
        }
    }
}

impl Default for ClockSync {
    fn default() -> Self {
        Self::new()
    }
}

fn millis_since_epoch(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_millis() as i64,
        Err(e) => -(e.duration().as_millis() as i64),
    }
}
