use super::*;

#[test]
fn starts_on_first_step() {
    let c = WizardController::new(4);
    assert_eq!(c.current_step(), 1);
    assert!(c.is_first());
    assert!(!c.is_last());
}

#[test]
fn zero_steps_is_treated_as_one() {
    let mut c = WizardController::new(0);
    assert_eq!(c.step_count(), 1);
    assert_eq!(c.advance(), Navigation::Submit);
    assert_eq!(c.current_step(), 1);
}

#[test]
fn advance_at_last_step_submits_without_moving() {
    for n in 1..=8 {
        let mut c = WizardController::new(n);
        for _ in 1..n {
            assert!(matches!(c.advance(), Navigation::Moved { .. }));
        }
        assert_eq!(c.current_step(), n);
        assert_eq!(c.advance(), Navigation::Submit);
        assert_eq!(c.advance(), Navigation::Submit);
        assert_eq!(c.current_step(), n, "index must stay at {n}");
    }
}

#[test]
fn retreat_decrements_until_first_step() {
    let n = 6;
    for i in 2..=n {
        let mut c = WizardController::new(n);
        for _ in 1..i {
            c.advance();
        }
        assert_eq!(c.retreat(), Navigation::Moved { from: i, to: i - 1 });
        assert_eq!(c.current_step(), i - 1);
    }
}

#[test]
fn retreat_at_first_step_exits() {
    let mut c = WizardController::new(3);
    assert_eq!(c.retreat(), Navigation::Exit);
    assert_eq!(c.current_step(), 1);
}

#[test]
fn five_step_walk_reaches_last_step_after_four_advances() {
    let mut c = WizardController::new(5);
    for expected in 2..=5 {
        assert_eq!(c.advance(), Navigation::Moved { from: expected - 1, to: expected });
    }
    assert!(c.is_last());
    assert_eq!(c.advance(), Navigation::Submit);
    assert_eq!(c.current_step(), 5);
}

#[test]
fn reset_returns_to_first_step() {
    let mut c = WizardController::new(3);
    c.advance();
    c.advance();
    c.reset();
    assert_eq!(c.current_step(), 1);
}

#[test]
fn progress_percent_tracks_step_position() {
    let mut c = WizardController::new(4);
    assert_eq!(c.progress_percent(), 25);
    c.advance();
    c.advance();
    c.advance();
    assert_eq!(c.progress_percent(), 100);
}
