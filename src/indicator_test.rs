use super::*;

// =============================================================
// Debounce
// =============================================================

#[test]
fn start_schedules_reveal_after_delay() {
    let mut d = Debounce::new(300);
    assert_eq!(d.start(1000.0), IndicatorCommand::Schedule { ticket: 1, after_ms: 300 });
    assert_eq!(d.phase(), IndicatorPhase::Pending { ticket: 1, due_at: 1300.0 });
    assert!(!d.is_visible());
}

#[test]
fn stop_within_delay_never_reveals() {
    let mut d = Debounce::new(300);
    let IndicatorCommand::Schedule { ticket, .. } = d.start(0.0) else {
        panic!("expected a scheduled reveal");
    };
    assert_eq!(d.stop(), IndicatorCommand::Nothing);
    // The timer still fires; it must not bring the bar back.
    assert_eq!(d.elapse(ticket, 300.0), IndicatorCommand::Nothing);
    assert!(!d.is_visible());
    assert_eq!(d.phase(), IndicatorPhase::Hidden);
}

#[test]
fn long_cycle_reveals_then_conceals() {
    let mut d = Debounce::new(300);
    let IndicatorCommand::Schedule { ticket, .. } = d.start(0.0) else {
        panic!("expected a scheduled reveal");
    };
    assert_eq!(d.elapse(ticket, 301.0), IndicatorCommand::Reveal);
    assert_eq!(d.phase(), IndicatorPhase::Visible { since: 301.0 });
    assert_eq!(d.stop(), IndicatorCommand::Conceal);
    assert_eq!(d.phase(), IndicatorPhase::Hidden);
}

#[test]
fn repeated_start_is_ignored() {
    let mut d = Debounce::new(300);
    let first = d.start(0.0);
    assert_eq!(d.start(100.0), IndicatorCommand::Nothing);
    assert_eq!(d.phase(), IndicatorPhase::Pending { ticket: 1, due_at: 300.0 });
    let IndicatorCommand::Schedule { ticket, .. } = first else {
        panic!("expected a scheduled reveal");
    };
    assert_eq!(d.elapse(ticket, 300.0), IndicatorCommand::Reveal);
    assert_eq!(d.start(400.0), IndicatorCommand::Nothing);
}

#[test]
fn stale_ticket_from_cancelled_cycle_is_ignored() {
    let mut d = Debounce::new(300);
    let IndicatorCommand::Schedule { ticket: old, .. } = d.start(0.0) else {
        panic!("expected a scheduled reveal");
    };
    d.stop();
    let IndicatorCommand::Schedule { ticket: new, .. } = d.start(250.0) else {
        panic!("expected a scheduled reveal");
    };
    assert_ne!(old, new);
    // Old timer fires at 300ms, only 50ms into the new cycle.
    assert_eq!(d.elapse(old, 300.0), IndicatorCommand::Nothing);
    assert_eq!(d.elapse(new, 550.0), IndicatorCommand::Reveal);
}

#[test]
fn zero_delay_reveals_immediately() {
    let mut d = Debounce::new(0);
    assert_eq!(d.start(5.0), IndicatorCommand::Reveal);
    assert!(d.is_visible());
}

#[test]
fn stop_while_hidden_is_noop() {
    let mut d = Debounce::new(300);
    assert_eq!(d.stop(), IndicatorCommand::Nothing);
}

#[test]
fn simulated_timeline_never_shows_bar_shorter_than_delay_after_start() {
    // Drive a virtual clock: every reveal must happen at least `delay` after
    // the start that caused it.
    let delay = 300_u32;
    let mut d = Debounce::new(delay);
    let mut pending: Option<(u64, f64)> = None;
    let mut last_start = 0.0;
    let events = [(0.0, true), (120.0, false), (200.0, true), (650.0, false), (700.0, true), (710.0, false)];
    let mut clock = 0.0;
    for (at, is_start) in events {
        while let Some((ticket, due)) = pending {
            if due > at {
                break;
            }
            clock = due;
            if d.elapse(ticket, clock) == IndicatorCommand::Reveal {
                assert!(clock - last_start >= f64::from(delay) - 1.0);
            }
            pending = None;
        }
        clock = at;
        if is_start {
            if let IndicatorCommand::Schedule { ticket, after_ms } = d.start(clock) {
                last_start = clock;
                pending = Some((ticket, clock + f64::from(after_ms)));
            }
        } else {
            d.stop();
        }
    }
    assert!(clock >= 710.0);
    assert!(!d.is_visible());
}

// =============================================================
// BarAnimation
// =============================================================

#[test]
fn idle_animation_produces_no_frames() {
    let mut a = BarAnimation::default();
    assert_eq!(a.stage(), AnimationStage::Idle);
    assert_eq!(a.tick(), None);
}

#[test]
fn running_progress_is_monotonic_and_below_one() {
    let mut a = BarAnimation::default();
    a.begin();
    let mut last = 0.0;
    for _ in 0..500 {
        let Some(frame) = a.tick() else {
            panic!("running bar always produces frames");
        };
        assert!(frame.progress >= last);
        assert!(frame.progress < 1.0);
        assert!((frame.opacity - 1.0).abs() < f64::EPSILON);
        last = frame.progress;
    }
    assert!(last > 0.5);
}

#[test]
fn finish_fades_out_to_idle() {
    let mut a = BarAnimation::default();
    a.begin();
    a.tick();
    a.finish();
    assert_eq!(a.stage(), AnimationStage::Finishing);
    assert!((a.frame().progress - 1.0).abs() < f64::EPSILON);

    let mut frames = 0;
    let mut last_opacity = 1.0;
    while let Some(frame) = a.tick() {
        assert!(frame.opacity < last_opacity);
        last_opacity = frame.opacity;
        frames += 1;
        assert!(frames < 100);
    }
    // 1.0 / 0.08 -> 12 visible fade frames before reaching zero.
    assert_eq!(frames, 12);
    assert_eq!(a.stage(), AnimationStage::Idle);
}

#[test]
fn stop_on_visible_bar_hides_within_fade_window() {
    let mut d = Debounce::new(300);
    let mut a = BarAnimation::default();
    let IndicatorCommand::Schedule { ticket, .. } = d.start(0.0) else {
        panic!("expected a scheduled reveal");
    };
    assert_eq!(d.elapse(ticket, 300.0), IndicatorCommand::Reveal);
    a.begin();
    a.tick();

    // The stop is decided at once; only the fade remains.
    assert_eq!(d.stop(), IndicatorCommand::Conceal);
    assert!(!d.is_visible());
    a.finish();
    let mut elapsed_ms = 0;
    while a.tick().is_some() {
        elapsed_ms += crate::consts::INDICATOR_FRAME_MS;
    }
    assert!(elapsed_ms <= 200, "fade took {elapsed_ms}ms");
}

#[test]
fn finish_without_begin_is_noop() {
    let mut a = BarAnimation::default();
    a.finish();
    assert_eq!(a.stage(), AnimationStage::Idle);
}

#[test]
fn advance_progress_clamps_input() {
    assert!((advance_progress(0.0) - 0.1).abs() < 1e-12);
    assert!((advance_progress(1.0) - 1.0).abs() < 1e-12);
    assert!((advance_progress(5.0) - 1.0).abs() < 1e-12);
    assert!((advance_progress(-1.0) - 0.1).abs() < 1e-12);
}
