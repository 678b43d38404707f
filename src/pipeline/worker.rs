//! Background conversion with event reporting
//!
//! A run converts rows one at a time, in input order, on a worker thread.
//! The worker never touches a `ResultStore`; it sends `ConversionEvent`s
//! over a channel and the consumer applies them to its own store.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryIter};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::converter::{convert, Vendor};
use super::error::{ConvertError, Result};
use super::loader::read_raw_records;
use super::record::{ConvertedRecord, RawRecord};
use super::store::ResultStore;

/// Progress notifications emitted during a run
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionEvent {
    /// The run is starting; consumers should clear their store
    Started { total: usize },
    /// Row `index` produced a record
    Converted {
        index: usize,
        record: ConvertedRecord,
    },
    /// Row `index` has no mapping for the selected vendor
    Skipped { index: usize },
    /// Every row has been processed
    Finished(ConversionReport),
}

impl ConversionEvent {
    /// Number of rows processed once this event has been applied
    pub fn processed(&self) -> Option<usize> {
        match self {
            ConversionEvent::Started { .. } => Some(0),
            ConversionEvent::Converted { index, .. } | ConversionEvent::Skipped { index } => {
                Some(index + 1)
            }
            ConversionEvent::Finished(report) => Some(report.total_rows),
        }
    }
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub vendor: Vendor,
    pub total_rows: usize,
    pub converted: usize,
    /// Rows dropped because the vendor has no mapping
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Convert `rows` in order, reporting each one through `on_event`.
///
/// Emits `Started`, then one `Converted` or `Skipped` per row. The final
/// report is returned rather than emitted.
pub fn convert_rows(
    rows: &[RawRecord],
    vendor: Vendor,
    mut on_event: impl FnMut(ConversionEvent),
) -> ConversionReport {
    let started_at = Utc::now();
    let total_rows = rows.len();

    info!(vendor = %vendor, rows = total_rows, "starting conversion");
    if !vendor.is_supported() {
        warn!(vendor = %vendor, "vendor has no mapping, every row will be skipped");
    }

    on_event(ConversionEvent::Started { total: total_rows });

    let mut converted = 0;
    let mut skipped = 0;
    for (index, raw) in rows.iter().enumerate() {
        match convert(raw, vendor) {
            Some(record) => {
                converted += 1;
                on_event(ConversionEvent::Converted { index, record });
            }
            None => {
                skipped += 1;
                debug!(row = index, "skipped row without mapping");
                on_event(ConversionEvent::Skipped { index });
            }
        }
    }

    let report = ConversionReport {
        vendor,
        total_rows,
        converted,
        skipped,
        started_at,
        finished_at: Utc::now(),
    };
    info!(
        converted = report.converted,
        skipped = report.skipped,
        "conversion finished"
    );
    report
}

/// Apply one event to `store`. Returns the report on `Finished`.
pub fn apply_event(store: &mut ResultStore, event: ConversionEvent) -> Option<ConversionReport> {
    match event {
        ConversionEvent::Started { .. } => {
            store.clear();
            None
        }
        ConversionEvent::Converted { record, .. } => {
            store.append(record);
            None
        }
        ConversionEvent::Skipped { .. } => None,
        ConversionEvent::Finished(report) => Some(report),
    }
}

/// Synchronous run straight into `store`
pub fn convert_into(store: &mut ResultStore, rows: &[RawRecord], vendor: Vendor) -> ConversionReport {
    convert_rows(rows, vendor, |event| {
        apply_event(store, event);
    })
}

/// Starts conversions, allowing at most one in flight
#[derive(Debug, Clone, Default)]
pub struct ConversionRunner {
    in_flight: Arc<AtomicBool>,
}

impl ConversionRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Read `input` and convert it on a worker thread.
    ///
    /// The file is read before the worker starts, so read errors are
    /// returned here and no event is ever sent for a failed read.
    pub fn start(&self, input: &Path, vendor: Vendor) -> Result<ConversionHandle> {
        let guard = self.claim()?;
        let rows = read_raw_records(input)?;
        Ok(spawn_worker(rows, vendor, guard))
    }

    /// Convert already loaded rows on a worker thread
    pub fn start_rows(&self, rows: Vec<RawRecord>, vendor: Vendor) -> Result<ConversionHandle> {
        let guard = self.claim()?;
        Ok(spawn_worker(rows, vendor, guard))
    }

    fn claim(&self) -> Result<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ConvertError::ConversionInFlight)?;
        Ok(InFlightGuard(Arc::clone(&self.in_flight)))
    }
}

/// Releases the in-flight flag when dropped, including on panic
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn spawn_worker(rows: Vec<RawRecord>, vendor: Vendor, guard: InFlightGuard) -> ConversionHandle {
    let (sender, receiver) = mpsc::channel();

    let thread = thread::spawn(move || {
        let report = convert_rows(&rows, vendor, |event| {
            // A dropped receiver only means nobody is watching any more
            let _ = sender.send(event);
        });
        // Release before announcing completion so the consumer can restart at once
        drop(guard);
        let _ = sender.send(ConversionEvent::Finished(report));
    });

    ConversionHandle {
        receiver,
        thread: Some(thread),
    }
}

/// Consumer side of a running conversion
pub struct ConversionHandle {
    receiver: Receiver<ConversionEvent>,
    thread: Option<JoinHandle<()>>,
}

impl ConversionHandle {
    /// Events available right now, without blocking
    pub fn try_events(&self) -> TryIter<'_, ConversionEvent> {
        self.receiver.try_iter()
    }

    /// True once the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread
            .as_ref()
            .map_or(true, |thread| thread.is_finished())
    }

    /// Block until the run finishes, applying every event to `store`.
    ///
    /// `on_event` sees each event before it is applied.
    pub fn drain_into(
        mut self,
        store: &mut ResultStore,
        mut on_event: impl FnMut(&ConversionEvent),
    ) -> Result<ConversionReport> {
        while let Ok(event) = self.receiver.recv() {
            on_event(&event);
            if let Some(report) = apply_event(store, event) {
                self.join();
                return Ok(report);
            }
        }
        self.join();
        Err(ConvertError::WorkerDisconnected)
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("conversion worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<RawRecord> {
        vec![
            RawRecord::new().with("Name", "Fire // Ice").with("Quantity", "3"),
            RawRecord::new().with("Name", "Bolt").with("Quantity", "2"),
        ]
    }

    #[test]
    fn test_events_follow_input_order() {
        let mut events = Vec::new();
        let report = convert_rows(&rows(), Vendor::CardKingdom, |event| events.push(event));

        assert_eq!(report.converted, 2);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ConversionEvent::Started { total: 2 });
        assert!(matches!(&events[1], ConversionEvent::Converted { index: 0, record } if record.title == "Fire"));
        assert!(matches!(&events[2], ConversionEvent::Converted { index: 1, record } if record.title == "Bolt"));
    }

    #[test]
    fn test_unsupported_vendor_skips_every_row() {
        let mut store = ResultStore::new();
        let report = convert_into(&mut store, &rows(), Vendor::TcgPlayer);

        assert_eq!(report.skipped, 2);
        assert_eq!(report.converted, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_second_start_is_rejected_while_in_flight() {
        let runner = ConversionRunner::new();
        let guard = runner.claim().unwrap();

        let err = runner.start_rows(rows(), Vendor::CardKingdom).err().unwrap();
        assert!(matches!(err, ConvertError::ConversionInFlight));
        assert!(runner.is_running());

        drop(guard);
        assert!(!runner.is_running());
    }

    #[test]
    fn test_failed_read_releases_flag() {
        let runner = ConversionRunner::new();
        let err = runner
            .start(Path::new("/no/such/export.csv"), Vendor::CardKingdom)
            .err()
            .unwrap();
        assert!(err.is_input_error());
        assert!(!runner.is_running());
    }

    #[test]
    fn test_runner_releases_flag_after_finish() {
        let runner = ConversionRunner::new();
        let handle = runner.start_rows(rows(), Vendor::CardKingdom).unwrap();

        let mut store = ResultStore::new();
        let report = handle.drain_into(&mut store, |_| {}).unwrap();

        assert_eq!(report.converted, 2);
        assert!(!runner.is_running());
        assert!(runner.start_rows(rows(), Vendor::CardKingdom).is_ok());
    }
}
