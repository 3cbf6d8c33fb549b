// File: ./src/pomodoro.rs
// Work/break countdown driven by a one-second tick

pub const DEFAULT_WORK_SECS: u32 = 25 * 60;
pub const DEFAULT_BREAK_SECS: u32 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PomodoroEvent {
    /// The given phase ran out; the timer has switched to the other one and stopped.
    PhaseFinished(Phase),
}

impl PomodoroEvent {
    pub fn message(&self) -> &'static str {
        match self {
            PomodoroEvent::PhaseFinished(Phase::Work) => "ポモドーロ終了！休憩しましょう。",
            PomodoroEvent::PhaseFinished(Phase::Break) => "休憩終了！作業に戻りましょう。",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pomodoro {
    pub phase: Phase,
    pub state: RunState,
    pub remaining: u32,
    work_secs: u32,
    break_secs: u32,
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_SECS, DEFAULT_BREAK_SECS)
    }
}

impl Pomodoro {
    pub fn new(work_secs: u32, break_secs: u32) -> Self {
        Self {
            phase: Phase::Work,
            state: RunState::Idle,
            remaining: work_secs,
            work_secs,
            break_secs,
        }
    }

    fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_secs,
            Phase::Break => self.break_secs,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Start/pause button.
    pub fn toggle(&mut self) {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Idle | RunState::Paused => RunState::Running,
        };
    }

    pub fn tick(&mut self) -> Option<PomodoroEvent> {
        if self.state != RunState::Running {
            return None;
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            return None;
        }
        let finished = self.phase;
        self.phase = match finished {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        };
        self.remaining = self.duration_of(self.phase);
        self.state = RunState::Idle;
        tracing::info!(?finished, "pomodoro phase finished");
        Some(PomodoroEvent::PhaseFinished(finished))
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Work;
        self.state = RunState::Idle;
        self.remaining = self.work_secs;
    }

    pub fn button_label(&self) -> &'static str {
        match self.state {
            RunState::Idle => "Start",
            RunState::Running => "Pause",
            RunState::Paused => "Resume",
        }
    }

    pub fn display(&self) -> String {
        format_mmss(self.remaining)
    }
}

pub fn format_mmss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_with_full_work_time() {
        let p = Pomodoro::default();
        assert_eq!(p.display(), "25:00");
        assert_eq!(p.button_label(), "Start");
    }

    #[test]
    fn ticks_only_while_running() {
        let mut p = Pomodoro::new(3, 2);
        assert!(p.tick().is_none());
        assert_eq!(p.remaining, 3);

        p.toggle();
        p.tick();
        assert_eq!(p.remaining, 2);

        p.toggle();
        assert_eq!(p.button_label(), "Resume");
        p.tick();
        assert_eq!(p.remaining, 2);
    }

    #[test]
    fn work_rolls_into_break() {
        let mut p = Pomodoro::new(2, 1);
        p.toggle();
        assert!(p.tick().is_none());
        assert!(p.tick().is_none());
        assert_eq!(p.display(), "00:00");

        let ev = p.tick();
        assert_eq!(ev, Some(PomodoroEvent::PhaseFinished(Phase::Work)));
        assert_eq!(p.phase, Phase::Break);
        assert_eq!(p.state, RunState::Idle);
        assert_eq!(p.remaining, 1);

        p.toggle();
        p.tick();
        assert_eq!(p.tick(), Some(PomodoroEvent::PhaseFinished(Phase::Break)));
        assert_eq!(p.phase, Phase::Work);
        assert_eq!(p.remaining, 2);
    }

    #[test]
    fn reset_returns_to_work() {
        let mut p = Pomodoro::new(60, 30);
        p.phase = Phase::Break;
        p.toggle();
        p.tick();
        p.reset();
        assert_eq!(p.phase, Phase::Work);
        assert_eq!(p.remaining, 60);
        assert!(!p.is_running());
    }

    #[test]
    fn mmss_padding() {
        assert_eq!(format_mmss(65), "01:05");
        assert_eq!(format_mmss(0), "00:00");
    }
}
