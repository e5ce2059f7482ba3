//! Year timeline with an explicit stopped/playing state machine.
//!
//! The timeline never owns a timer. Every transition reports what the host
//! must do with its own timer primitive through [`TimerCommand`].

use std::time::Duration;

use serde::Serialize;

/// Delay between automatic year advances.
pub const PLAYBACK_INTERVAL: Duration = Duration::from_millis(900);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

impl PlaybackState {
    /// Text for the play control while in this state.
    pub const fn button_label(self) -> &'static str {
        match self {
            Self::Stopped => "Play",
            Self::Playing => "Pause",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start(Duration),
    Stop,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    years: Vec<i32>,
    cursor: usize,
    state: PlaybackState,
}

impl Timeline {
    /// `years` must already be sorted and free of duplicates.
    pub fn new(years: Vec<i32>) -> Self {
        Self {
            years,
            cursor: 0,
            state: PlaybackState::Stopped,
        }
    }

    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    pub const fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing)
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn current_year(&self) -> Option<i32> {
        self.years.get(self.cursor).copied()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.years.first().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    /// Position of the cursor within the index, as a fraction in 0..=1.
    pub fn progress(&self) -> f64 {
        match self.years.len() {
            0 | 1 => 0.0,
            len => self.cursor as f64 / (len - 1) as f64,
        }
    }

    pub fn play(&mut self) -> TimerCommand {
        if self.years.is_empty() || self.is_playing() {
            return TimerCommand::None;
        }
        self.state = PlaybackState::Playing;
        TimerCommand::Start(PLAYBACK_INTERVAL)
    }

    pub fn stop(&mut self) -> TimerCommand {
        if !self.is_playing() {
            return TimerCommand::None;
        }
        self.state = PlaybackState::Stopped;
        TimerCommand::Stop
    }

    pub fn toggle(&mut self) -> TimerCommand {
        match self.state {
            PlaybackState::Stopped => self.play(),
            PlaybackState::Playing => self.stop(),
        }
    }

    /// Timer callback: advance one year, wrapping after the last.
    pub fn tick(&mut self) -> Option<i32> {
        if self.years.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.years.len();
        self.current_year()
    }

    /// Step back one year, wrapping before the first. Stops playback.
    pub fn previous(&mut self) -> (TimerCommand, Option<i32>) {
        let command = self.stop();
        if self.years.is_empty() {
            return (command, None);
        }
        self.cursor = if self.cursor == 0 {
            self.years.len() - 1
        } else {
            self.cursor - 1
        };
        (command, self.current_year())
    }

    /// Step forward one year, wrapping after the last. Stops playback.
    pub fn forward(&mut self) -> (TimerCommand, Option<i32>) {
        let command = self.stop();
        (command, self.tick())
    }

    /// Manual jump. Playback is stopped before the cursor moves; a year that
    /// is not indexed snaps to the nearest one, ties going to the earlier.
    pub fn scrub(&mut self, year: i32) -> (TimerCommand, Option<i32>) {
        let command = self.stop();
        if let Some(index) = self.nearest_index(year) {
            self.cursor = index;
        }
        (command, self.current_year())
    }

    /// Stops any live timer; used when the host goes away.
    pub fn teardown(&mut self) -> TimerCommand {
        self.stop()
    }

    fn nearest_index(&self, year: i32) -> Option<usize> {
        match self.years.binary_search(&year) {
            Ok(index) => Some(index),
            Err(_) if self.years.is_empty() => None,
            Err(0) => Some(0),
            Err(index) if index == self.years.len() => Some(index - 1),
            Err(index) => {
                let before = year - self.years[index - 1];
                let after = self.years[index] - year;
                Some(if after < before { index } else { index - 1 })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PlaybackState, Timeline, TimerCommand, PLAYBACK_INTERVAL};

    fn timeline() -> Timeline {
        Timeline::new(vec![2000, 2001, 2002])
    }

    #[test]
    fn starts_stopped_at_first_year() {
        let timeline = timeline();
        assert_eq!(timeline.state(), PlaybackState::Stopped);
        assert_eq!(timeline.current_year(), Some(2000));
        assert_eq!(timeline.state().button_label(), "Play");
    }

    #[test]
    fn toggle_starts_then_stops_the_timer() {
        let mut timeline = timeline();
        assert_eq!(timeline.toggle(), TimerCommand::Start(PLAYBACK_INTERVAL));
        assert_eq!(timeline.state().button_label(), "Pause");
        assert_eq!(timeline.toggle(), TimerCommand::Stop);
        assert_eq!(timeline.state(), PlaybackState::Stopped);
    }

    #[test]
    fn play_twice_does_not_start_a_second_timer() {
        let mut timeline = timeline();
        assert_eq!(timeline.play(), TimerCommand::Start(PLAYBACK_INTERVAL));
        assert_eq!(timeline.play(), TimerCommand::None);
    }

    #[test]
    fn ticks_wrap_after_last_year() {
        let mut timeline = timeline();
        timeline.play();
        assert_eq!(timeline.tick(), Some(2001));
        assert_eq!(timeline.tick(), Some(2002));
        assert_eq!(timeline.tick(), Some(2000));
        assert!(timeline.is_playing());
    }

    #[test]
    fn scrub_stops_playback_before_moving() {
        let mut timeline = timeline();
        timeline.play();

        let (command, year) = timeline.scrub(2002);
        assert_eq!(command, TimerCommand::Stop);
        assert_eq!(year, Some(2002));
        assert_eq!(timeline.state(), PlaybackState::Stopped);

        let (command, _) = timeline.scrub(2001);
        assert_eq!(command, TimerCommand::None);
    }

    #[test]
    fn scrub_snaps_to_nearest_indexed_year() {
        let mut timeline = Timeline::new(vec![1990, 2000, 2010]);
        assert_eq!(timeline.scrub(1994).1, Some(1990));
        assert_eq!(timeline.scrub(1995).1, Some(1990));
        assert_eq!(timeline.scrub(1996).1, Some(2000));
        assert_eq!(timeline.scrub(1800).1, Some(1990));
        assert_eq!(timeline.scrub(2200).1, Some(2010));
    }

    #[test]
    fn previous_wraps_to_last_year() {
        let mut timeline = timeline();
        assert_eq!(timeline.previous().1, Some(2002));
        assert_eq!(timeline.forward().1, Some(2000));
    }

    #[test]
    fn empty_index_refuses_to_play() {
        let mut timeline = Timeline::new(Vec::new());
        assert_eq!(timeline.play(), TimerCommand::None);
        assert_eq!(timeline.tick(), None);
        assert_eq!(timeline.scrub(2000), (TimerCommand::None, None));
        assert_eq!(timeline.progress(), 0.0);
    }

    #[test]
    fn teardown_reports_live_timer_only() {
        let mut timeline = timeline();
        assert_eq!(timeline.teardown(), TimerCommand::None);
        timeline.play();
        assert_eq!(timeline.teardown(), TimerCommand::Stop);
    }
}
