//! Stopwatch controller: the tick state machine

use std::time::Duration;

use tracing::{debug, info};

use super::{
    notifier::{Alert, AlertChannel, Notifier, OVERTIME_ALERT_ID},
    scheduler::{Scheduler, TickHandle},
};
use crate::{
    error::TimerError,
    state::{format_elapsed, TimeLimit, TimerSnapshot, TimerState},
};

/// Default spacing between ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Owns the stopwatch state and drives it from scheduled ticks.
///
/// Only one tick is pending at any time: each tick schedules its successor
/// after it ran, and the handle of that successor is the only one accepted.
#[derive(Debug)]
pub struct TimerController<S, N> {
    state: TimerState,
    scheduler: S,
    notifier: N,
    pending_tick: Option<TickHandle>,
    interval: Duration,
    initialized: bool,
}

impl<S: Scheduler, N: Notifier> TimerController<S, N> {
    pub fn new(scheduler: S, notifier: N, interval: Duration) -> Self {
        Self {
            state: TimerState::new(),
            scheduler,
            notifier,
            pending_tick: None,
            interval,
            initialized: false,
        }
    }

    /// Register the alert channel. Only the first call has an effect.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.notifier.register_channel(&AlertChannel::stopwatch());
        self.initialized = true;
    }

    /// Start ticking. Returns `false` if the stopwatch was already running.
    pub fn start(&mut self) -> bool {
        if self.state.running {
            debug!("Start ignored, stopwatch already running");
            return false;
        }
        self.state.running = true;
        self.pending_tick = Some(self.scheduler.post());
        info!("Stopwatch started (limit {})", self.state.limit);
        true
    }

    /// Handle a fired tick. Returns `false` if the tick was stale and ignored.
    pub fn tick(&mut self, handle: TickHandle) -> bool {
        if !self.state.running || self.pending_tick != Some(handle) {
            debug!("Ignoring stale {}", handle);
            return false;
        }

        self.state.display = format_elapsed(self.state.elapsed_seconds);
        self.state.indicator_color = self.state.indicator_color.next();

        if self.state.limit.is_exceeded_by(self.state.elapsed_seconds) && !self.state.overtime {
            info!(
                "Limit {} exceeded at {}",
                self.state.limit, self.state.display
            );
            self.state.alert_visual = true;
            self.state.overtime = true;
            self.notify();
        }

        self.state.elapsed_seconds += 1;
        debug!("{} -> {}", handle, self.state.display);

        self.pending_tick = Some(self.scheduler.post_delayed(self.interval));
        true
    }

    /// Stop, zero the clock and dismiss the overtime alert
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.state.reset();
        self.notifier.cancel(OVERTIME_ALERT_ID);
        info!("Stopwatch reset");
    }

    /// Apply raw settings input. Refused while running.
    pub fn set_limit(&mut self, raw: Option<&str>) -> Result<TimeLimit, TimerError> {
        if self.state.running {
            return Err(TimerError::LimitLocked);
        }
        self.state.limit = TimeLimit::parse(raw);
        info!("Time limit set to {}", self.state.limit);
        Ok(self.state.limit)
    }

    /// Cancel the pending tick, if any
    pub fn dispose(&mut self) {
        self.cancel_pending();
        debug!("Stopwatch controller disposed");
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.state.snapshot()
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending_tick
    }

    // Overtime stays marked even when the alert itself is suppressed.
    fn notify(&mut self) {
        if !self.state.limit.allows_alert() {
            debug!("Alert suppressed for non-positive limit {}", self.state.limit);
            return;
        }
        self.notifier.show(&Alert::overtime());
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending_tick.take() {
            self.scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::IndicatorColor;

    #[derive(Debug, Default)]
    struct FakeScheduler {
        next_id: u64,
        posted: Vec<(TickHandle, Option<Duration>)>,
        cancelled: Vec<TickHandle>,
    }

    impl FakeScheduler {
        fn push(&mut self, delay: Option<Duration>) -> TickHandle {
            self.next_id += 1;
            let handle = TickHandle::new(self.next_id);
            self.posted.push((handle, delay));
            handle
        }
    }

    impl Scheduler for FakeScheduler {
        fn post(&mut self) -> TickHandle {
            self.push(None)
        }

        fn post_delayed(&mut self, delay: Duration) -> TickHandle {
            self.push(Some(delay))
        }

        fn cancel(&mut self, handle: TickHandle) {
            self.cancelled.push(handle);
        }
    }

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        channels: Vec<AlertChannel>,
        shown: Vec<Alert>,
        cancelled: Vec<u32>,
    }

    impl Notifier for RecordingNotifier {
        fn register_channel(&mut self, channel: &AlertChannel) {
            self.channels.push(channel.clone());
        }

        fn show(&mut self, alert: &Alert) {
            self.shown.push(alert.clone());
        }

        fn cancel(&mut self, id: u32) {
            self.cancelled.push(id);
        }
    }

    type TestController = TimerController<FakeScheduler, RecordingNotifier>;

    fn controller() -> TestController {
        let mut controller = TimerController::new(
            FakeScheduler::default(),
            RecordingNotifier::default(),
            TICK_INTERVAL,
        );
        controller.init();
        controller
    }

    /// Fire the pending tick as the scheduler would
    fn fire(controller: &mut TestController) -> bool {
        let handle = controller.pending_tick().expect("a tick should be pending");
        controller.tick(handle)
    }

    fn run_ticks(controller: &mut TestController, count: usize) {
        for _ in 0..count {
            assert!(fire(controller));
        }
    }

    #[test]
    fn init_registers_channel_once() {
        let mut controller = controller();
        controller.init();
        assert_eq!(controller.notifier().channels, vec![AlertChannel::stopwatch()]);
    }

    #[test]
    fn start_posts_one_immediate_tick() {
        let mut controller = controller();
        assert!(controller.start());
        assert!(!controller.start());

        assert_eq!(controller.scheduler.posted.len(), 1);
        assert_eq!(controller.scheduler.posted[0].1, None);
        assert!(controller.state().running);
        assert!(!controller.snapshot().settings_enabled);
        assert!(controller.snapshot().indicator_visible);
    }

    #[test]
    fn tick_renders_before_incrementing() {
        let mut controller = controller();
        controller.start();

        run_ticks(&mut controller, 1);
        assert_eq!(controller.state().display, "00:00");
        assert_eq!(controller.state().elapsed_seconds, 1);

        run_ticks(&mut controller, 65);
        assert_eq!(controller.state().display, "01:05");
        assert_eq!(controller.state().elapsed_seconds, 66);
    }

    #[test]
    fn each_tick_reschedules_after_the_interval() {
        let mut controller = controller();
        controller.start();
        run_ticks(&mut controller, 3);

        let delays: Vec<_> = controller.scheduler.posted.iter().map(|(_, d)| *d).collect();
        assert_eq!(
            delays,
            vec![None, Some(TICK_INTERVAL), Some(TICK_INTERVAL), Some(TICK_INTERVAL)]
        );
    }

    #[test]
    fn indicator_color_cycles_every_tick() {
        let mut controller = controller();
        controller.start();

        let mut colors = Vec::new();
        for _ in 0..6 {
            fire(&mut controller);
            colors.push(controller.state().indicator_color);
        }
        assert_eq!(
            colors,
            vec![
                IndicatorColor::Green,
                IndicatorColor::Blue,
                IndicatorColor::Red,
                IndicatorColor::Green,
                IndicatorColor::Blue,
                IndicatorColor::Red,
            ]
        );
    }

    #[test]
    fn alert_fires_once_when_limit_is_passed() {
        let mut controller = controller();
        controller.set_limit(Some("2")).unwrap();
        controller.start();

        // ticks observe elapsed 0, 1, 2
        run_ticks(&mut controller, 3);
        assert!(!controller.state().overtime);
        assert!(controller.notifier().shown.is_empty());

        // tick observing elapsed 3
        run_ticks(&mut controller, 1);
        assert!(controller.state().overtime);
        assert!(controller.state().alert_visual);
        assert_eq!(controller.notifier().shown, vec![Alert::overtime()]);

        run_ticks(&mut controller, 100);
        assert_eq!(controller.notifier().shown.len(), 1);
    }

    #[test]
    fn alert_fires_again_after_reset() {
        let mut controller = controller();
        controller.set_limit(Some("1")).unwrap();
        controller.start();
        run_ticks(&mut controller, 3);
        assert_eq!(controller.notifier().shown.len(), 1);

        controller.reset();
        controller.start();
        run_ticks(&mut controller, 3);
        assert_eq!(controller.notifier().shown.len(), 2);
    }

    #[test]
    fn zero_limit_marks_overtime_without_alert() {
        let mut controller = controller();
        controller.set_limit(Some("0")).unwrap();
        controller.start();

        run_ticks(&mut controller, 1);
        assert!(!controller.state().overtime);

        run_ticks(&mut controller, 1);
        assert!(controller.state().overtime);
        assert!(controller.state().alert_visual);

        run_ticks(&mut controller, 10);
        assert!(controller.notifier().shown.is_empty());
    }

    #[test]
    fn negative_limit_marks_overtime_on_first_tick_without_alert() {
        let mut controller = controller();
        controller.set_limit(Some("-5")).unwrap();
        controller.start();

        run_ticks(&mut controller, 1);
        assert!(controller.state().overtime);

        run_ticks(&mut controller, 10);
        assert!(controller.notifier().shown.is_empty());
    }

    #[test]
    fn invalid_limit_never_alerts() {
        for raw in [Some("abc"), Some(""), None] {
            let mut controller = controller();
            assert_eq!(controller.set_limit(raw), Ok(TimeLimit::Unbounded));
            controller.start();
            run_ticks(&mut controller, 500);
            assert!(!controller.state().overtime);
            assert!(controller.notifier().shown.is_empty());
        }
    }

    #[test]
    fn limit_is_locked_while_running() {
        let mut controller = controller();
        controller.set_limit(Some("10")).unwrap();
        controller.start();

        assert_eq!(controller.set_limit(Some("3")), Err(TimerError::LimitLocked));
        assert_eq!(controller.state().limit, TimeLimit::Seconds(10));

        controller.reset();
        assert_eq!(controller.set_limit(Some("3")), Ok(TimeLimit::Seconds(3)));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut controller = controller();
        controller.set_limit(Some("1")).unwrap();
        controller.start();
        run_ticks(&mut controller, 5);
        let pending = controller.pending_tick().unwrap();

        controller.reset();

        let state = controller.state();
        assert_eq!(state.elapsed_seconds, 0);
        assert!(!state.running);
        assert!(!state.overtime);
        assert!(!state.alert_visual);
        assert_eq!(state.display, "00:00");
        assert!(controller.snapshot().settings_enabled);
        assert!(!controller.snapshot().indicator_visible);
        assert_eq!(controller.pending_tick(), None);
        assert_eq!(controller.scheduler.cancelled, vec![pending]);
        assert_eq!(controller.notifier().cancelled, vec![OVERTIME_ALERT_ID]);
    }

    #[test]
    fn reset_when_idle_still_dismisses_alert() {
        let mut controller = controller();
        controller.reset();
        assert_eq!(controller.notifier().cancelled, vec![OVERTIME_ALERT_ID]);
        assert!(controller.scheduler.cancelled.is_empty());
        assert_eq!(controller.state(), &TimerState::new());
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let mut controller = controller();
        controller.start();
        let first = controller.pending_tick().unwrap();
        assert!(controller.tick(first));

        // already consumed
        assert!(!controller.tick(first));
        assert_eq!(controller.state().elapsed_seconds, 1);

        let pending = controller.pending_tick().unwrap();
        controller.reset();
        assert!(!controller.tick(pending));
        assert_eq!(controller.state().elapsed_seconds, 0);
    }

    #[test]
    fn start_after_reset_begins_a_single_new_stream() {
        let mut controller = controller();
        controller.start();
        run_ticks(&mut controller, 2);
        controller.reset();
        controller.start();
        controller.start();

        let immediate = controller
            .scheduler
            .posted
            .iter()
            .filter(|(_, delay)| delay.is_none())
            .count();
        assert_eq!(immediate, 2);
        run_ticks(&mut controller, 1);
        assert_eq!(controller.state().elapsed_seconds, 1);
    }

    #[test]
    fn dispose_cancels_pending_tick() {
        let mut controller = controller();
        controller.start();
        let pending = controller.pending_tick().unwrap();

        controller.dispose();

        assert_eq!(controller.scheduler.cancelled, vec![pending]);
        assert!(!controller.tick(pending));
        assert!(controller.state().running);
    }
}
