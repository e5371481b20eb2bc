//! Navigation progress indicator: debounce and animation model.
//!
//! [`Debounce`] decides *whether* the bar is on screen; [`BarAnimation`]
//! decides *what* it looks like on each frame. Both are clock-free: callers
//! pass timestamps in milliseconds and act on the returned
//! [`IndicatorCommand`]s, which keeps the timing rules testable without a
//! browser. The hydrate-only `Topbar` in `topbar.rs` drives them with real
//! timers.

#[cfg(test)]
#[path = "indicator_test.rs"]
mod indicator_test;

use crate::consts::INDICATOR_FADE_STEP;

/// Visibility phase of the indicator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum IndicatorPhase {
    #[default]
    Hidden,
    /// A start arrived; the bar appears once `due_at` passes.
    Pending { ticket: u64, due_at: f64 },
    Visible { since: f64 },
}

/// What the view layer must do after a debounce transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndicatorCommand {
    /// Nothing changes on screen.
    Nothing,
    /// Arm a timer and call [`Debounce::elapse`] with `ticket` after `after_ms`.
    Schedule { ticket: u64, after_ms: u32 },
    /// Put the bar on screen and start animating.
    Reveal,
    /// Run the bar to completion and fade it out.
    ///
    /// The stop takes effect at once, but a visible bar is not removed on the
    /// same frame: it snaps to full width and fades for
    /// `1 / INDICATOR_FADE_STEP` frames (about 200 ms at 16 ms per frame).
    Conceal,
}

/// Minimum-display-delay debounce for loading start/stop pairs.
///
/// A stop that arrives before the delay has elapsed cancels the pending
/// reveal, so short transitions never flash the bar. Navigation itself is
/// never delayed; start and stop may race and the bar may briefly outlive the
/// navigation it tracks.
#[derive(Clone, Debug)]
pub struct Debounce {
    delay_ms: u32,
    phase: IndicatorPhase,
    next_ticket: u64,
}

impl Debounce {
    #[must_use]
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            phase: IndicatorPhase::Hidden,
            next_ticket: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> IndicatorPhase {
        self.phase
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self.phase, IndicatorPhase::Visible { .. })
    }

    /// Loading started. Repeated starts while pending or visible are ignored.
    pub fn start(&mut self, now_ms: f64) -> IndicatorCommand {
        if !matches!(self.phase, IndicatorPhase::Hidden) {
            return IndicatorCommand::Nothing;
        }
        if self.delay_ms == 0 {
            self.phase = IndicatorPhase::Visible { since: now_ms };
            return IndicatorCommand::Reveal;
        }
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.phase = IndicatorPhase::Pending {
            ticket,
            due_at: now_ms + f64::from(self.delay_ms),
        };
        IndicatorCommand::Schedule {
            ticket,
            after_ms: self.delay_ms,
        }
    }

    /// A scheduled timer fired. Stale tickets (cancelled reveals) are ignored.
    pub fn elapse(&mut self, ticket: u64, now_ms: f64) -> IndicatorCommand {
        match self.phase {
            IndicatorPhase::Pending { ticket: pending, .. } if pending == ticket => {
                self.phase = IndicatorPhase::Visible { since: now_ms };
                IndicatorCommand::Reveal
            }
            _ => IndicatorCommand::Nothing,
        }
    }

    /// Loading stopped: cancel a pending reveal or hide the bar at once.
    pub fn stop(&mut self) -> IndicatorCommand {
        let previous = std::mem::take(&mut self.phase);
        match previous {
            IndicatorPhase::Visible { .. } => IndicatorCommand::Conceal,
            IndicatorPhase::Pending { .. } | IndicatorPhase::Hidden => IndicatorCommand::Nothing,
        }
    }
}

/// Lifecycle of the bar's animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimationStage {
    #[default]
    Idle,
    /// Creeping toward the end while loading continues.
    Running,
    /// Snapped to full width and fading out.
    Finishing,
}

/// Values to paint for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarFrame {
    /// Fraction of the viewport width, `0.0..=1.0`.
    pub progress: f64,
    pub opacity: f64,
}

/// Frame-by-frame progress and fade model.
///
/// Progress advances by `0.1 * (1 - sqrt(p))^2` per frame: fast at first,
/// asymptotically slower, never reaching the end until finished.
#[derive(Clone, Debug, Default)]
pub struct BarAnimation {
    stage: AnimationStage,
    progress: f64,
    opacity: f64,
}

impl BarAnimation {
    #[must_use]
    pub fn stage(&self) -> AnimationStage {
        self.stage
    }

    #[must_use]
    pub fn frame(&self) -> BarFrame {
        BarFrame {
            progress: self.progress,
            opacity: self.opacity,
        }
    }

    /// Start from an empty, fully opaque bar.
    pub fn begin(&mut self) {
        self.stage = AnimationStage::Running;
        self.progress = 0.0;
        self.opacity = 1.0;
    }

    /// Jump to full width and start fading. No-op unless running.
    pub fn finish(&mut self) {
        if self.stage == AnimationStage::Running {
            self.stage = AnimationStage::Finishing;
            self.progress = 1.0;
        }
    }

    /// Advance one frame. Returns `None` once the bar has faded out.
    pub fn tick(&mut self) -> Option<BarFrame> {
        match self.stage {
            AnimationStage::Idle => None,
            AnimationStage::Running => {
                self.progress = advance_progress(self.progress);
                Some(self.frame())
            }
            AnimationStage::Finishing => {
                self.opacity -= INDICATOR_FADE_STEP;
                if self.opacity <= 0.0 {
                    self.stage = AnimationStage::Idle;
                    self.opacity = 0.0;
                    self.progress = 0.0;
                    None
                } else {
                    Some(self.frame())
                }
            }
        }
    }
}

/// One frame's worth of progress.
#[must_use]
pub fn advance_progress(current: f64) -> f64 {
    let p = current.clamp(0.0, 1.0);
    (p + 0.1 * (1.0 - p.sqrt()).powi(2)).min(1.0)
}
