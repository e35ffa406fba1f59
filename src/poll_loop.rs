use crate::error::Result;
use crate::router_api::models::signal_strength::SignalReading;
use crate::router_api::router_client::RouterApiTrait;
use crate::speech::{Speaker, announcement};
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Remembers the previous reading. Starts out absent, so a first reading that
/// is itself absent is not a change.
#[derive(Debug, Default)]
pub struct SignalTracker {
    last: SignalReading,
}

impl SignalTracker {
    /// Stores `reading` and reports whether it differs from the previous one.
    pub fn observe(&mut self, reading: SignalReading) -> bool {
        let changed = reading != self.last;
        self.last = reading;
        changed
    }

    pub fn last(&self) -> &SignalReading {
        &self.last
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub polls: u64,
    pub announcements: u64,
}

/// Polls until `shutdown` flips to true or something fails.
///
/// Each pass prints `Signal Strength: <reading>` to `out` and speaks the new
/// value when it changed. Router, speech and output errors end the loop.
pub async fn run_poll_loop<R, S, W>(
    router: &R,
    speaker: &S,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    out: &mut W,
) -> Result<PollSummary>
where
    R: RouterApiTrait,
    S: Speaker,
    W: Write,
{
    let mut tracker = SignalTracker::default();
    let mut summary = PollSummary::default();

    loop {
        if *shutdown.borrow() {
            return Ok(summary);
        }

        let response = tokio::select! {
            biased;
            response = router.get_system_status() => response?,
            _ = wait_for_shutdown(&mut shutdown) => return Ok(summary),
        };
        summary.polls += 1;

        let reading = response.reading();
        writeln!(out, "Signal Strength: {}", reading)?;
        out.flush()?;

        if tracker.observe(reading) {
            let sentence = announcement(tracker.last());
            info!("{}", &sentence);
            tokio::select! {
                biased;
                spoken = speaker.speak(&sentence) => spoken?,
                _ = wait_for_shutdown(&mut shutdown) => return Ok(summary),
            }
            summary.announcements += 1;
        } else {
            debug!("Signal strength unchanged at {}", tracker.last());
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = wait_for_shutdown(&mut shutdown) => return Ok(summary),
        }
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender means nobody can ask us to stop.
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
