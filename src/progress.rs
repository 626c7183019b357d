//! Progress reporting and cancellation.
//!
//! An export is split into a fixed number of major steps (faces, points,
//! cells, ...). Each step declares how many units of work it will do and
//! then increments once per unit. Every report goes through a callback
//! that can ask the export to stop; a stop request surfaces as
//! [`ExportError::Cancelled`] at the next increment.
//!
//! # Example
//!
//! ```
//! use foamport::progress::Progress;
//!
//! let progress = Progress::reporting(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//! assert!(progress.report(1, 2, "faces"));
//! ```

use crate::error::{ExportError, Result};

/// A progress callback that receives updates during an export.
///
/// The callback receives:
/// - `current`: Current position (0-based)
/// - `total`: Total number of positions
/// - `message`: Description of the current step
///
/// and returns `true` to continue or `false` to cancel.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) -> bool + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter whose callback may cancel the export.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) -> bool + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Create a progress reporter that only observes and never cancels.
    pub fn reporting<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self::new(move |current, total, message| {
            callback(current, total, message);
            true
        })
    }

    /// Report progress. Returns `false` if the caller asked to stop.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) -> bool {
        (self.callback)(current, total, message)
    }

    /// Report progress within a sub-range.
    ///
    /// Maps progress from `[0, sub_total]` to `[range_current, range_current + 1]`
    /// within a total of `range_total` steps.
    #[inline]
    pub fn report_sub(
        &self,
        sub_current: usize,
        sub_total: usize,
        range_current: usize,
        range_total: usize,
        message: &str,
    ) -> bool {
        if range_total == 0 {
            return true;
        }
        // Fixed-point: 1000 units per major step
        let sub_fraction = if sub_total == 0 {
            0
        } else {
            (sub_current.min(sub_total) * 1000) / sub_total
        };
        let effective = range_current * 1000 + sub_fraction;
        let total_scaled = range_total * 1000;
        (self.callback)(effective, total_scaled, message)
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| true)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

/// Step tracker that drives a [`Progress`] through the major steps of an export.
#[derive(Debug)]
pub struct ProgressSteps<'a> {
    progress: &'a Progress,
    major_total: usize,
    major_done: usize,
    step_total: usize,
    step_done: usize,
    message: &'static str,
    in_step: bool,
}

impl<'a> ProgressSteps<'a> {
    /// Start tracking `major_total` major steps.
    pub fn new(progress: &'a Progress, major_total: usize) -> Self {
        Self {
            progress,
            major_total,
            major_done: 0,
            step_total: 0,
            step_done: 0,
            message: "",
            in_step: false,
        }
    }

    /// Begin a major step with `total` units of work.
    ///
    /// An unfinished previous step is ended first.
    pub fn begin_step(&mut self, total: usize, message: &'static str) -> Result<()> {
        if self.in_step {
            self.end_step()?;
        }
        self.step_total = total;
        self.step_done = 0;
        self.message = message;
        self.in_step = true;
        log::debug!("{} ({} units)", message, total);
        self.report()
    }

    /// Advance the current step by one unit.
    pub fn increment(&mut self) -> Result<()> {
        self.step_done += 1;
        self.report()
    }

    /// Finish the current step.
    pub fn end_step(&mut self) -> Result<()> {
        if !self.in_step {
            return Ok(());
        }
        self.in_step = false;
        self.step_done = self.step_total;
        self.report()?;
        self.major_done = (self.major_done + 1).min(self.major_total);
        Ok(())
    }

    /// Number of completed major steps.
    pub fn steps_done(&self) -> usize {
        self.major_done
    }

    fn report(&self) -> Result<()> {
        let proceed = self.progress.report_sub(
            self.step_done,
            self.step_total,
            self.major_done,
            self.major_total,
            self.message,
        );
        if proceed {
            Ok(())
        } else {
            Err(ExportError::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_steps_report_monotonic() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::reporting(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        let mut steps = ProgressSteps::new(&progress, 2);
        steps.begin_step(4, "faces").unwrap();
        for _ in 0..4 {
            steps.increment().unwrap();
        }
        steps.end_step().unwrap();
        steps.begin_step(0, "points").unwrap();
        steps.end_step().unwrap();
        assert_eq!(steps.steps_done(), 2);

        let seen = seen.lock().unwrap();
        assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(seen.last().unwrap().1, 2000);
    }

    #[test]
    fn test_cancel_on_increment() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let progress = Progress::new(move |_, _, _| counter.fetch_add(1, Ordering::Relaxed) < 3);

        let mut steps = ProgressSteps::new(&progress, 1);
        steps.begin_step(10, "faces").unwrap();
        steps.increment().unwrap();
        steps.increment().unwrap();
        assert!(matches!(steps.increment(), Err(ExportError::Cancelled)));
    }

    #[test]
    fn test_none_never_cancels() {
        let progress = Progress::none();
        assert!(progress.report(0, 0, ""));
        assert!(progress.report_sub(5, 0, 0, 1, "x"));
    }
}
