// anistream stopwatch widget
// Start/pause/lap/reset over a monotonic clock. The `*_at` methods take the
// current instant explicitly; the plain methods use `Instant::now()`.

use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone)]
pub struct Stopwatch {
    /// Time accumulated by earlier runs.
    accumulated: Duration,
    running_since: Option<Instant>,
    laps: Vec<Duration>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn start_at(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn pause_at(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .running_since
                .map(|since| now.saturating_duration_since(since))
                .unwrap_or_default()
    }

    /// Records the total elapsed time as a lap. Only while running.
    pub fn lap_at(&mut self, now: Instant) -> Option<Duration> {
        self.running_since?;
        let total = self.elapsed_at(now);
        self.laps.push(total);
        Some(total)
    }

    pub fn laps(&self) -> &[Duration] {
        &self.laps
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn lap(&mut self) -> Option<Duration> {
        self.lap_at(Instant::now())
    }
}

/// Formats as `MM:SS.cc`, or `H:MM:SS.cc` past an hour.
pub fn format_elapsed(d: Duration) -> String {
    let total_cs = d.as_millis() / 10;
    let cs = total_cs % 100;
    let secs = (total_cs / 100) % 60;
    let mins = (total_cs / 6000) % 60;
    let hours = total_cs / 360_000;
    if hours > 0 {
        format!("{}:{:02}:{:02}.{:02}", hours, mins, secs, cs)
    } else {
        format!("{:02}:{:02}.{:02}", mins, secs, cs)
    }
}
