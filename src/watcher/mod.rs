//! Cycle scheduling and the watch loop
//!
//! [`SampleStream`] is the scheduler: it alternates between a sampling
//! future (list the process table, aggregate RSS) and a sleep of exactly the
//! configured interval. The sleep always follows a completed cycle, so
//! successive cycle starts are at least one interval apart and a slow
//! process listing never causes catch-up bursts.
//!
//! [`MemoryWatcher`] consumes the stream without bound: per sample it logs
//! the aggregate, evaluates the threshold and fires the notifier. The loop
//! ends only with the first sampling error, which propagates to the caller;
//! notification failures are logged and swallowed.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::{Future, Stream, StreamExt};
use tracing::{info, warn};

use crate::config::WatcherConfig;
use crate::error::Result;
use crate::memory::{aggregate_usage, MemorySample};
use crate::notify::{NotifySendNotifier, Notifier, NOTIFICATION_TITLE};
use crate::process::{ProcessLister, PsProcessLister};
use crate::units::format_bytes;

/// Suspension point between poll cycles
#[async_trait]
pub trait Clock: Send + Sync {
    /// Suspend the current task for the given duration
    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by the tokio timer
#[derive(Debug, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

async fn collect_sample(lister: Arc<Box<dyn ProcessLister>>) -> Result<MemorySample> {
    let records = lister.list_processes().await?;
    Ok(aggregate_usage(&records))
}

type SampleFuture = Pin<Box<dyn Future<Output = Result<MemorySample>> + Send>>;
type SleepFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

enum StreamState {
    Sampling(SampleFuture),
    Sleeping(SleepFuture),
}

/// Stream of memory samples separated by the poll interval
pub struct SampleStream {
    lister: Arc<Box<dyn ProcessLister>>,
    clock: Arc<Box<dyn Clock>>,
    interval: Duration,
    state: StreamState,
}

impl SampleStream {
    /// Create a new stream that samples immediately, then once per interval
    pub fn new(
        lister: Arc<Box<dyn ProcessLister>>,
        clock: Arc<Box<dyn Clock>>,
        interval: Duration,
    ) -> Self {
        let state = StreamState::Sampling(Box::pin(collect_sample(Arc::clone(&lister))));
        Self {
            lister,
            clock,
            interval,
            state,
        }
    }

    fn start_sampling(&mut self) {
        self.state = StreamState::Sampling(Box::pin(collect_sample(Arc::clone(&self.lister))));
    }

    fn start_sleeping(&mut self) {
        let clock = Arc::clone(&self.clock);
        let interval = self.interval;
        self.state = StreamState::Sleeping(Box::pin(async move {
            clock.sleep(interval).await;
        }));
    }
}

impl Stream for SampleStream {
    type Item = Result<MemorySample>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                StreamState::Sampling(fut) => match fut.as_mut().poll(cx) {
                    Poll::Ready(result) => {
                        this.start_sleeping();
                        return Poll::Ready(Some(result));
                    }
                    Poll::Pending => return Poll::Pending,
                },
                StreamState::Sleeping(fut) => match fut.as_mut().poll(cx) {
                    Poll::Ready(()) => this.start_sampling(),
                    Poll::Pending => return Poll::Pending,
                },
            }
        }
    }
}

/// Periodic memory watcher
///
/// Wires the configuration to the sampling, notification and clock
/// collaborators and drives the poll cycle until the first unrecoverable
/// sampling error.
pub struct MemoryWatcher {
    config: WatcherConfig,
    lister: Arc<Box<dyn ProcessLister>>,
    notifier: Arc<Box<dyn Notifier>>,
    clock: Arc<Box<dyn Clock>>,
}

impl MemoryWatcher {
    /// Create a watcher with explicit collaborators
    pub fn new(
        config: WatcherConfig,
        lister: Arc<Box<dyn ProcessLister>>,
        notifier: Arc<Box<dyn Notifier>>,
        clock: Arc<Box<dyn Clock>>,
    ) -> Self {
        Self {
            config,
            lister,
            notifier,
            clock,
        }
    }

    /// Create a watcher bound to the production collaborators: `ps(1)`,
    /// `notify-send(1)` and the tokio timer
    pub fn with_defaults(config: WatcherConfig) -> Self {
        Self::new(
            config,
            Arc::new(Box::new(PsProcessLister::new())),
            Arc::new(Box::new(NotifySendNotifier::new())),
            Arc::new(Box::new(SystemClock)),
        )
    }

    /// Take a single sample: list the process table and aggregate RSS
    pub async fn sample(&self) -> Result<MemorySample> {
        collect_sample(Arc::clone(&self.lister)).await
    }

    /// Stream of samples separated by the configured poll interval
    pub fn sample_stream(&self) -> SampleStream {
        SampleStream::new(
            Arc::clone(&self.lister),
            Arc::clone(&self.clock),
            self.config.poll_interval,
        )
    }

    /// Run the watch loop until the first sampling error.
    ///
    /// Every cycle logs the aggregate at info level; every over-threshold
    /// cycle re-fires the notification, with no cooldown between repeats.
    pub async fn run(&self) -> Result<()> {
        info!(
            threshold_bytes = self.config.threshold_bytes,
            poll_interval_secs = self.config.poll_interval.as_secs(),
            "starting F5 VPN memory watcher"
        );

        let mut samples = self.sample_stream();
        while let Some(result) = samples.next().await {
            self.evaluate(result?).await;
        }
        Ok(())
    }

    async fn evaluate(&self, sample: MemorySample) {
        info!("Total F5 VPN memory usage: {sample}");

        if sample.exceeds(self.config.threshold_bytes) {
            let body = format!(
                "Total RSS is {} (above threshold {}).",
                sample,
                format_bytes(self.config.threshold_bytes)
            );
            if let Err(e) = self.notifier.notify(NOTIFICATION_TITLE, &body).await {
                warn!("dropping failed notification: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::error::Error;
    use crate::memory::constants::TARGET_COMMAND_PATH;
    use crate::notify::MockNotifier;
    use crate::process::{MockProcessLister, ProcessRecord};

    /// Lister yielding a fixed helper row for a number of cycles, then
    /// failing like a vanished `ps`
    struct ScriptedLister {
        rss_kb: u64,
        ok_cycles: usize,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProcessLister for ScriptedLister {
        async fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call >= self.ok_cycles {
                return Err(Error::execution("ps went away"));
            }
            if self.rss_kb == 0 {
                return Ok(Vec::new());
            }
            Ok(vec![ProcessRecord::new(
                100 + call as u32,
                self.rss_kb,
                format!("{TARGET_COMMAND_PATH} --type=renderer"),
            )])
        }
    }

    struct CountingNotifier {
        calls: Arc<AtomicUsize>,
        last_body: Arc<Mutex<Option<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn notify(&self, _title: &str, body: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_body.lock().unwrap() = Some(body.to_string());
            if self.fail {
                return Err(Error::notification("no notification daemon"));
            }
            Ok(())
        }
    }

    struct RecordingClock {
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    #[async_trait]
    impl Clock for RecordingClock {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    struct Fixture {
        watcher: MemoryWatcher,
        lister_calls: Arc<AtomicUsize>,
        notify_calls: Arc<AtomicUsize>,
        last_body: Arc<Mutex<Option<String>>>,
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    fn fixture(
        config: WatcherConfig,
        rss_kb: u64,
        ok_cycles: usize,
        failing_notifier: bool,
    ) -> Fixture {
        let lister_calls = Arc::new(AtomicUsize::new(0));
        let notify_calls = Arc::new(AtomicUsize::new(0));
        let last_body = Arc::new(Mutex::new(None));
        let sleeps = Arc::new(Mutex::new(Vec::new()));

        let watcher = MemoryWatcher::new(
            config,
            Arc::new(Box::new(ScriptedLister {
                rss_kb,
                ok_cycles,
                calls: Arc::clone(&lister_calls),
            })),
            Arc::new(Box::new(CountingNotifier {
                calls: Arc::clone(&notify_calls),
                last_body: Arc::clone(&last_body),
                fail: failing_notifier,
            })),
            Arc::new(Box::new(RecordingClock {
                sleeps: Arc::clone(&sleeps),
            })),
        );

        Fixture {
            watcher,
            lister_calls,
            notify_calls,
            last_body,
            sleeps,
        }
    }

    fn config(threshold_bytes: u64, interval_secs: u64) -> WatcherConfig {
        WatcherConfig::new(threshold_bytes, Duration::from_secs(interval_secs)).unwrap()
    }

    #[tokio::test]
    async fn sample_aggregates_without_notifying() {
        let mut lister = MockProcessLister::new();
        lister.expect_list_processes().times(1).returning(|| {
            Ok(vec![
                ProcessRecord::new(1, 100_000, format!("{TARGET_COMMAND_PATH} --a")),
                ProcessRecord::new(2, 999_999, "/usr/lib/firefox/firefox".to_string()),
                ProcessRecord::new(3, 50_000, format!("{TARGET_COMMAND_PATH} --b")),
            ])
        });
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(0);

        let watcher = MemoryWatcher::new(
            config(1, 600),
            Arc::new(Box::new(lister)),
            Arc::new(Box::new(notifier)),
            Arc::new(Box::new(SystemClock)),
        );

        let sample = watcher.sample().await.unwrap();
        assert_eq!(sample.bytes, 153_600_000);
    }

    #[tokio::test]
    async fn run_notifies_every_over_threshold_cycle() {
        // 200 MiB of helper RSS against a 1 KiB threshold: every cycle fires
        let f = fixture(config(1024, 600), 204_800, 3, false);

        let err = f.watcher.run().await.unwrap_err();
        assert!(matches!(err, Error::Execution(_)));
        assert_eq!(f.notify_calls.load(Ordering::SeqCst), 3);
        assert_eq!(f.lister_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn usage_equal_to_threshold_does_not_notify() {
        // 100 KB of RSS is exactly 102_400 bytes
        let f = fixture(config(102_400, 600), 100, 1, false);

        f.watcher.run().await.unwrap_err();
        assert_eq!(f.notify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn usage_one_byte_above_threshold_notifies() {
        let f = fixture(config(102_399, 600), 100, 1, false);

        f.watcher.run().await.unwrap_err();
        assert_eq!(f.notify_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn notifier_failure_does_not_abort_the_loop() {
        let f = fixture(config(1024, 600), 204_800, 2, true);

        let err = f.watcher.run().await.unwrap_err();
        // The loop dies on the lister, not on the broken notifier
        assert!(matches!(err, Error::Execution(_)));
        assert_eq!(f.notify_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_table_never_notifies() {
        let f = fixture(config(1, 600), 0, 2, false);

        f.watcher.run().await.unwrap_err();
        assert_eq!(f.notify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_completed_cycle_is_followed_by_one_interval_sleep() {
        let f = fixture(config(1024, 45), 204_800, 3, false);

        f.watcher.run().await.unwrap_err();
        let sleeps = f.sleeps.lock().unwrap();
        assert_eq!(sleeps.len(), 3);
        assert!(sleeps.iter().all(|d| *d == Duration::from_secs(45)));
    }

    #[tokio::test]
    async fn notification_body_names_usage_and_threshold() {
        let f = fixture(config(1024, 600), 204_800, 1, false);

        f.watcher.run().await.unwrap_err();
        let body = f.last_body.lock().unwrap().clone().unwrap();
        assert_eq!(
            body,
            "Total RSS is 200.00 MiB (above threshold 1.00 KiB)."
        );
    }

    #[tokio::test]
    async fn stream_sleeps_between_emissions() {
        let f = fixture(config(1024, 30), 204_800, 2, false);

        let mut stream = f.watcher.sample_stream();
        stream.next().await.unwrap().unwrap();
        assert!(f.sleeps.lock().unwrap().is_empty());

        stream.next().await.unwrap().unwrap();
        assert_eq!(f.sleeps.lock().unwrap().len(), 1);
    }
}
