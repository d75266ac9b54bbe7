use std::time::{Duration, Instant};

use props_terminal::poll::PollSchedule;
use props_terminal::provider::{poll_outcome, PollOutcome};
use props_terminal::state::JobStatus;

const INTERVAL: Duration = Duration::from_secs(5);

#[test]
fn nothing_is_due_before_the_interval_elapses() {
    let mut schedule = PollSchedule::new(INTERVAL);
    let t0 = Instant::now();
    schedule.schedule("1".to_string(), t0);

    assert!(schedule.due(t0).is_empty());
    assert!(schedule.due(t0 + Duration::from_secs(4)).is_empty());
}

#[test]
fn a_poll_comes_due_after_the_interval() {
    let mut schedule = PollSchedule::new(INTERVAL);
    let t0 = Instant::now();
    schedule.schedule("1".to_string(), t0);

    assert_eq!(schedule.due(t0 + INTERVAL), vec!["1".to_string()]);
}

#[test]
fn rearming_replaces_the_existing_timer() {
    let mut schedule = PollSchedule::new(INTERVAL);
    let t0 = Instant::now();
    schedule.schedule("1".to_string(), t0);
    schedule.schedule("1".to_string(), t0 + Duration::from_secs(3));

    // The original deadline no longer fires.
    assert!(schedule.due(t0 + Duration::from_secs(5)).is_empty());
    assert_eq!(schedule.len(), 1);
    assert_eq!(
        schedule.due(t0 + Duration::from_secs(8)),
        vec!["1".to_string()]
    );
}

#[test]
fn cancel_disarms_a_poll() {
    let mut schedule = PollSchedule::new(INTERVAL);
    let t0 = Instant::now();
    schedule.schedule("1".to_string(), t0);

    assert!(schedule.is_scheduled("1"));
    assert!(schedule.cancel("1"));
    assert!(!schedule.is_scheduled("1"));
    assert!(schedule.due(t0 + INTERVAL).is_empty());
    assert!(schedule.is_empty());
}

#[test]
fn cancelling_an_unknown_id_is_a_no_op() {
    let mut schedule = PollSchedule::new(INTERVAL);
    assert!(!schedule.cancel("missing"));
}

#[test]
fn due_entries_stay_armed_until_cancelled_or_rearmed() {
    let mut schedule = PollSchedule::new(INTERVAL);
    let t0 = Instant::now();
    schedule.schedule("1".to_string(), t0);

    let at = t0 + INTERVAL;
    assert_eq!(schedule.due(at), vec!["1".to_string()]);
    assert_eq!(schedule.due(at), vec!["1".to_string()]);

    schedule.schedule("1".to_string(), at);
    assert!(schedule.due(at).is_empty());
}

#[test]
fn active_statuses_rearm_the_chain() {
    assert_eq!(
        poll_outcome(Some(&JobStatus::Starting)),
        PollOutcome::Rearm
    );
    assert_eq!(poll_outcome(Some(&JobStatus::Running)), PollOutcome::Rearm);
}

#[test]
fn terminal_and_unknown_statuses_end_the_chain() {
    assert_eq!(poll_outcome(Some(&JobStatus::Completed)), PollOutcome::Stop);
    assert_eq!(poll_outcome(Some(&JobStatus::Failed)), PollOutcome::Stop);
    assert_eq!(
        poll_outcome(Some(&JobStatus::Other("archived".to_string()))),
        PollOutcome::Stop
    );
}

#[test]
fn a_failed_poll_ends_the_chain() {
    assert_eq!(poll_outcome(None), PollOutcome::Stop);
}

#[test]
fn due_ids_come_back_sorted() {
    let mut schedule = PollSchedule::new(INTERVAL);
    let t0 = Instant::now();
    schedule.schedule("9".to_string(), t0);
    schedule.schedule("2".to_string(), t0);
    schedule.schedule("5".to_string(), t0);

    assert_eq!(
        schedule.due(t0 + INTERVAL),
        vec!["2".to_string(), "5".to_string(), "9".to_string()]
    );
}
