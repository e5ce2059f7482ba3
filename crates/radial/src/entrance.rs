//! Entrance reveal played when a chart scrolls into view.
//!
//! Times are offsets from an arbitrary host epoch. The sequence guard is
//! time-based: a started sequence blocks new starts until its computed total
//! duration has elapsed, whatever the host's animations actually did.

use std::time::Duration;

use serde::Serialize;

use crate::domain::MONTHS_PER_YEAR;

/// Share of the container that must be visible to start the reveal.
pub const VISIBILITY_THRESHOLD: f64 = 0.4;

pub const DOT_BASE_DELAY: Duration = Duration::from_millis(200);
pub const DOT_STEP_DELAY: Duration = Duration::from_millis(60);
pub const DOT_FADE: Duration = Duration::from_millis(300);
pub const OUTLINE_DURATION: Duration = Duration::from_millis(1200);
pub const FILL_DURATION: Duration = Duration::from_millis(600);

/// Fill opacity once the reveal is complete.
pub const FILL_OPACITY: f64 = 0.35;

const DOT_START_SCALE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntranceSchedule {
    pub dot_delays: [Duration; MONTHS_PER_YEAR],
    pub dot_fade: Duration,
    pub outline: Duration,
    pub fill_delay: Duration,
    pub fill: Duration,
}

impl Default for EntranceSchedule {
    fn default() -> Self {
        let mut dot_delays = [DOT_BASE_DELAY; MONTHS_PER_YEAR];
        for (step, delay) in (0_u32..).zip(dot_delays.iter_mut()) {
            *delay = DOT_BASE_DELAY + DOT_STEP_DELAY * step;
        }

        Self {
            dot_delays,
            dot_fade: DOT_FADE,
            outline: OUTLINE_DURATION,
            fill_delay: OUTLINE_DURATION,
            fill: FILL_DURATION,
        }
    }
}

impl EntranceSchedule {
    /// Time until every part of the sequence has settled.
    pub fn total(&self) -> Duration {
        let dots = self
            .dot_delays
            .iter()
            .map(|delay| *delay + self.dot_fade)
            .max()
            .unwrap_or_default();
        dots.max(self.fill_delay + self.fill)
    }
}

/// Visual baseline the host applies before any reveal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Baseline {
    /// Outline dashed with its own length and offset by it.
    Hidden { dash_length: f64 },
    /// Outline could not be measured: draw everything at rest.
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
enum Phase {
    Hidden,
    Revealing { started: Duration },
    Shown,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntranceCommand {
    Start(EntranceSchedule),
    Reset,
    None,
}

/// Sampled visual state of the reveal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntranceFrame {
    pub dot_opacity: [f64; MONTHS_PER_YEAR],
    pub dot_scale: [f64; MONTHS_PER_YEAR],
    /// Fraction of the outline drawn; the dash offset is `length * (1 - progress)`.
    pub outline_progress: f64,
    pub fill_opacity: f64,
}

impl EntranceFrame {
    pub const HIDDEN: Self = Self {
        dot_opacity: [0.0; MONTHS_PER_YEAR],
        dot_scale: [DOT_START_SCALE; MONTHS_PER_YEAR],
        outline_progress: 0.0,
        fill_opacity: 0.0,
    };

    pub const SHOWN: Self = Self {
        dot_opacity: [1.0; MONTHS_PER_YEAR],
        dot_scale: [1.0; MONTHS_PER_YEAR],
        outline_progress: 1.0,
        fill_opacity: FILL_OPACITY,
    };

    pub fn dash_offset(&self, dash_length: f64) -> f64 {
        dash_length * (1.0 - self.outline_progress)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entrance {
    schedule: EntranceSchedule,
    phase: Phase,
    animating_until: Option<Duration>,
    /// Last reported visibility was at or above the threshold.
    visible: bool,
}

impl Default for Entrance {
    fn default() -> Self {
        Self::new()
    }
}

impl Entrance {
    pub fn new() -> Self {
        Self::with_schedule(EntranceSchedule::default())
    }

    pub const fn with_schedule(schedule: EntranceSchedule) -> Self {
        Self {
            schedule,
            phase: Phase::Hidden,
            animating_until: None,
            visible: false,
        }
    }

    pub const fn schedule(&self) -> &EntranceSchedule {
        &self.schedule
    }

    /// Chooses the baseline from the measured outline length. A missing,
    /// zero or non-finite length switches the chart to the static render.
    pub fn arm(&mut self, outline_length: Option<f64>) -> Baseline {
        match outline_length {
            Some(length) if length.is_finite() && length > 0.0 => {
                if self.phase == Phase::Static {
                    self.phase = Phase::Hidden;
                }
                Baseline::Hidden {
                    dash_length: length,
                }
            }
            _ => {
                self.phase = Phase::Static;
                self.animating_until = None;
                Baseline::Static
            }
        }
    }

    pub const fn is_static(&self) -> bool {
        matches!(self.phase, Phase::Static)
    }

    pub fn is_animating(&self, now: Duration) -> bool {
        self.animating_until.is_some_and(|until| now < until)
    }

    /// Visibility change from the host. `ratio` is the visible share of the
    /// container; `intersecting` is false once it has left the viewport.
    pub fn on_visibility(&mut self, ratio: f64, intersecting: bool, now: Duration) -> EntranceCommand {
        self.poll(now);
        self.visible = intersecting && ratio >= VISIBILITY_THRESHOLD;

        if self.is_static() {
            return EntranceCommand::None;
        }

        if !intersecting {
            if self.phase == Phase::Hidden {
                return EntranceCommand::None;
            }
            self.phase = Phase::Hidden;
            return EntranceCommand::Reset;
        }

        if !self.visible || self.is_animating(now) || self.phase != Phase::Hidden {
            return EntranceCommand::None;
        }

        self.start(now)
    }

    /// Polls the guard and starts the reveal an enter had to skip while the
    /// guard was held. Hosts call this when the guard releases.
    pub fn resume(&mut self, now: Duration) -> EntranceCommand {
        self.poll(now);
        if !self.visible || self.phase != Phase::Hidden || self.is_animating(now) {
            return EntranceCommand::None;
        }
        self.start(now)
    }

    /// Release time of the guard when a visible, hidden chart is waiting on
    /// it to start its reveal.
    pub fn pending_release(&self, now: Duration) -> Option<Duration> {
        if !self.visible || self.phase != Phase::Hidden {
            return None;
        }
        self.animating_until.filter(|until| now < *until)
    }

    fn start(&mut self, now: Duration) -> EntranceCommand {
        self.phase = Phase::Revealing { started: now };
        self.animating_until = Some(now + self.schedule.total());
        EntranceCommand::Start(self.schedule)
    }

    /// Releases the guard once the total duration has elapsed. Returns true
    /// when a reveal settled on this call.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.animating_until {
            Some(until) if now >= until => {
                self.animating_until = None;
                if let Phase::Revealing { .. } = self.phase {
                    self.phase = Phase::Shown;
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    pub fn frame_at(&self, now: Duration) -> EntranceFrame {
        match self.phase {
            Phase::Hidden => EntranceFrame::HIDDEN,
            Phase::Shown | Phase::Static => EntranceFrame::SHOWN,
            Phase::Revealing { started } => self.sample(now.saturating_sub(started)),
        }
    }

    /// Fill phase has begun; hosts use this to trigger their own fade.
    pub fn is_filling(&self, now: Duration) -> bool {
        match self.phase {
            Phase::Revealing { started } => now.saturating_sub(started) >= self.schedule.fill_delay,
            Phase::Shown | Phase::Static => true,
            Phase::Hidden => false,
        }
    }

    fn sample(&self, elapsed: Duration) -> EntranceFrame {
        let schedule = &self.schedule;
        let mut frame = EntranceFrame::HIDDEN;

        for (index, delay) in schedule.dot_delays.iter().enumerate() {
            let t = ease_out(phase_fraction(elapsed, *delay, schedule.dot_fade));
            frame.dot_opacity[index] = t;
            frame.dot_scale[index] = (1.0 - DOT_START_SCALE).mul_add(t, DOT_START_SCALE);
        }

        frame.outline_progress = ease_in_out(phase_fraction(elapsed, Duration::ZERO, schedule.outline));
        frame.fill_opacity =
            FILL_OPACITY * ease_out(phase_fraction(elapsed, schedule.fill_delay, schedule.fill));
        frame
    }
}

fn phase_fraction(elapsed: Duration, delay: Duration, length: Duration) -> f64 {
    if elapsed < delay {
        return 0.0;
    }
    if length.is_zero() {
        return 1.0;
    }
    ((elapsed - delay).as_secs_f64() / length.as_secs_f64()).min(1.0)
}

fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0_f64).mul_add(t, 2.0).powi(3) / 2.0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClockMode {
    Running,
    Paused,
}

/// Longest frame gap the animation clock accepts in one step.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Advances a frame-driven animation clock. Gaps longer than
/// [`MAX_FRAME_DELTA`] are clamped so a stalled frame never skips a reveal;
/// wall time going backwards does not move the clock.
pub fn advance_clock(
    clock: Duration,
    last_tick: Option<Duration>,
    now: Duration,
    mode: ClockMode,
) -> (Duration, Option<Duration>) {
    let delta = last_tick
        .map(|last| now.saturating_sub(last).min(MAX_FRAME_DELTA))
        .unwrap_or_default();

    let next_clock = match mode {
        ClockMode::Running => clock + delta,
        ClockMode::Paused => clock,
    };

    (next_clock, Some(now))
}

#[cfg(test)]
mod tests {
    use super::{
        advance_clock, Baseline, ClockMode, Entrance, EntranceCommand, EntranceFrame,
        EntranceSchedule, FILL_OPACITY, MAX_FRAME_DELTA,
    };
    use std::time::Duration;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < 1e-9, "expected {expected}, got {actual}, diff {diff}");
    }

    fn armed() -> Entrance {
        let mut entrance = Entrance::new();
        entrance.arm(Some(640.0));
        entrance
    }

    #[test]
    fn schedule_staggers_dots_and_sums_total() {
        let schedule = EntranceSchedule::default();
        assert_eq!(schedule.dot_delays[0], ms(200));
        assert_eq!(schedule.dot_delays[11], ms(200 + 11 * 60));
        assert_eq!(schedule.total(), ms(1800));
    }

    #[test]
    fn starts_only_above_threshold() {
        let mut entrance = armed();
        assert_eq!(entrance.on_visibility(0.2, true, ms(0)), EntranceCommand::None);
        assert!(matches!(
            entrance.on_visibility(0.4, true, ms(10)),
            EntranceCommand::Start(_)
        ));
        assert!(entrance.is_animating(ms(10)));
    }

    #[test]
    fn second_enter_while_animating_is_ignored() {
        let mut entrance = armed();
        assert!(matches!(
            entrance.on_visibility(1.0, true, ms(0)),
            EntranceCommand::Start(_)
        ));
        assert_eq!(entrance.on_visibility(1.0, true, ms(500)), EntranceCommand::None);
    }

    #[test]
    fn guard_releases_after_total_duration() {
        let mut entrance = armed();
        entrance.on_visibility(1.0, true, ms(0));

        assert!(!entrance.poll(ms(1799)));
        assert!(entrance.is_animating(ms(1799)));
        assert!(entrance.poll(ms(1800)));
        assert!(!entrance.is_animating(ms(1800)));
        assert_eq!(entrance.frame_at(ms(1800)), EntranceFrame::SHOWN);
    }

    #[test]
    fn leaving_resets_and_reentry_replays() {
        let mut entrance = armed();
        entrance.on_visibility(1.0, true, ms(0));
        entrance.poll(ms(2000));

        assert_eq!(entrance.on_visibility(1.0, true, ms(2100)), EntranceCommand::None);
        assert_eq!(entrance.on_visibility(0.0, false, ms(2200)), EntranceCommand::Reset);
        assert_eq!(entrance.frame_at(ms(2200)), EntranceFrame::HIDDEN);
        assert!(matches!(
            entrance.on_visibility(0.9, true, ms(3000)),
            EntranceCommand::Start(_)
        ));
    }

    #[test]
    fn reentry_during_guard_window_waits_for_release() {
        let mut entrance = armed();
        entrance.on_visibility(1.0, true, ms(0));
        assert_eq!(entrance.on_visibility(0.0, false, ms(300)), EntranceCommand::Reset);
        assert_eq!(entrance.on_visibility(1.0, true, ms(600)), EntranceCommand::None);
        assert!(matches!(
            entrance.on_visibility(1.0, true, ms(1900)),
            EntranceCommand::Start(_)
        ));
    }

    #[test]
    fn skipped_reentry_starts_once_the_guard_releases() {
        let mut entrance = armed();
        entrance.on_visibility(1.0, true, ms(0));
        assert_eq!(entrance.on_visibility(0.0, false, ms(300)), EntranceCommand::Reset);
        assert_eq!(entrance.on_visibility(1.0, true, ms(400)), EntranceCommand::None);
        assert_eq!(entrance.pending_release(ms(400)), Some(ms(1800)));

        assert_eq!(entrance.resume(ms(1000)), EntranceCommand::None);
        assert!(matches!(entrance.resume(ms(1800)), EntranceCommand::Start(_)));
        assert_eq!(entrance.pending_release(ms(1800)), None);

        entrance.poll(ms(3600));
        assert_eq!(entrance.frame_at(ms(3600)), EntranceFrame::SHOWN);
    }

    #[test]
    fn resume_waits_for_visibility() {
        let mut entrance = armed();
        entrance.on_visibility(1.0, true, ms(0));
        entrance.on_visibility(0.0, false, ms(300));
        entrance.on_visibility(0.2, true, ms(400));

        assert_eq!(entrance.pending_release(ms(400)), None);
        assert_eq!(entrance.resume(ms(2000)), EntranceCommand::None);
        assert_eq!(entrance.frame_at(ms(2000)), EntranceFrame::HIDDEN);
    }

    #[test]
    fn unmeasurable_outline_falls_back_to_static() {
        let mut entrance = Entrance::new();
        assert_eq!(entrance.arm(Some(f64::NAN)), Baseline::Static);
        assert_eq!(entrance.on_visibility(1.0, true, ms(0)), EntranceCommand::None);
        assert_eq!(entrance.frame_at(ms(0)), EntranceFrame::SHOWN);

        assert_eq!(entrance.arm(None), Baseline::Static);
        assert_eq!(entrance.arm(Some(0.0)), Baseline::Static);
        assert_eq!(
            entrance.arm(Some(12.5)),
            Baseline::Hidden { dash_length: 12.5 }
        );
    }

    #[test]
    fn frames_progress_through_the_sequence() {
        let mut entrance = armed();
        entrance.on_visibility(1.0, true, ms(0));

        let start = entrance.frame_at(ms(0));
        assert_close(start.outline_progress, 0.0);
        assert_close(start.dash_offset(640.0), 640.0);
        assert_close(start.dot_opacity[0], 0.0);

        let mid = entrance.frame_at(ms(600));
        assert_close(mid.outline_progress, 0.5);
        assert!(mid.dot_opacity[0] > mid.dot_opacity[11]);
        assert_close(mid.fill_opacity, 0.0);
        assert!(!entrance.is_filling(ms(600)));

        let end = entrance.frame_at(ms(1800));
        assert_close(end.outline_progress, 1.0);
        assert_close(end.fill_opacity, FILL_OPACITY);
        assert_close(end.dot_scale[11], 1.0);
        assert!(entrance.is_filling(ms(1200)));
    }

    #[test]
    fn first_tick_initializes_time_without_advancing() {
        let (clock, last_tick) = advance_clock(ms(1234), None, ms(10_000), ClockMode::Running);
        assert_eq!(clock, ms(1234));
        assert_eq!(last_tick, Some(ms(10_000)));
    }

    #[test]
    fn running_clock_advances_by_frame_delta() {
        let (clock, last_tick) = advance_clock(ms(100), Some(ms(4000)), ms(4200), ClockMode::Running);
        assert_eq!(clock, ms(300));
        assert_eq!(last_tick, Some(ms(4200)));
    }

    #[test]
    fn paused_clock_holds_but_updates_last_tick() {
        let (clock, last_tick) = advance_clock(ms(2250), Some(ms(1000)), ms(1200), ClockMode::Paused);
        assert_eq!(clock, ms(2250));
        assert_eq!(last_tick, Some(ms(1200)));
    }

    #[test]
    fn large_frame_gap_is_clamped() {
        let (clock, _) = advance_clock(ms(0), Some(ms(3000)), ms(30_000), ClockMode::Running);
        assert_eq!(clock, MAX_FRAME_DELTA);
    }

    #[test]
    fn backwards_time_does_not_reverse_clock() {
        let (clock, last_tick) = advance_clock(ms(3500), Some(ms(10_000)), ms(9000), ClockMode::Running);
        assert_eq!(clock, ms(3500));
        assert_eq!(last_tick, Some(ms(9000)));
    }
}
