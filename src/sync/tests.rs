use super::*;
use crate::note::{Note, Pitch, Tempo, TimeSignature};
use crate::transport::{SimulatedTransport, Transport};
use crate::Layout;

fn scenario_layout() -> Layout {
    // | 5 6_ 5_ 3 0 | 1 - | at 60 BPM: one second per beat
    let notes = [("5", 1.0), ("6", 0.5), ("5", 0.5), ("3", 1.0), ("0", 1.0), ("1", 2.0)]
        .iter()
        .map(|(p, d)| Note::new(Pitch::parse(p).unwrap(), *d).unwrap())
        .collect();
    Layout::new(notes, TimeSignature::default(), Tempo::new(60.0).unwrap())
}

fn empty_layout() -> Layout {
    Layout::new(Vec::new(), TimeSignature::default(), Tempo::default())
}

fn controller_with_log(layout: Layout) -> (SyncController, EventLog) {
    let log = EventLog::new();
    let mut controller = SyncController::new(layout);
    controller.subscribe(log.clone());
    log.drain(); // initial LayoutReady
    (controller, log)
}

fn note_indices(log: &EventLog) -> Vec<usize> {
    log.highlights().iter().map(|h| h.note_index).collect()
}

#[test]
fn test_subscribe_receives_layout() {
    let log = EventLog::new();
    let mut controller = SyncController::new(scenario_layout());
    controller.subscribe(log.clone());

    let events = log.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        SyncEvent::LayoutReady { layout } => assert_eq!(layout.measures().len(), 2),
        other => panic!("expected LayoutReady, got {:?}", other),
    }
}

#[test]
fn test_play_pause_transitions() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert!(!controller.wants_ticks());

    controller.play();
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert!(controller.wants_ticks());

    controller.play(); // already playing
    controller.pause();
    assert_eq!(controller.state(), PlaybackState::Paused);
    controller.pause(); // already paused
    controller.play();

    assert_eq!(
        log.events(),
        vec![
            SyncEvent::StateChanged { state: PlaybackState::Playing },
            SyncEvent::StateChanged { state: PlaybackState::Paused },
            SyncEvent::StateChanged { state: PlaybackState::Playing },
        ]
    );
}

#[test]
fn test_tick_notifies_only_on_change() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    log.drain();

    controller.tick(0.1);
    controller.tick(0.5);
    controller.tick(0.9);
    controller.tick(1.2);
    controller.tick(1.4);
    controller.tick(1.6);

    assert_eq!(note_indices(&log), vec![0, 1, 2]);
}

#[test]
fn test_two_ticks_same_index_notify_once() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    controller.tick(2.1);
    controller.tick(2.2);

    assert_eq!(log.highlights().len(), 1);
    assert_eq!(controller.current().index(), Some(3));
    assert!((controller.current().progress() - 0.2).abs() < 1e-9);
}

#[test]
fn test_seek_always_notifies() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.seek(2.5);
    controller.seek(2.5);

    assert_eq!(note_indices(&log), vec![3, 3]);
}

#[test]
fn test_seek_returns_to_previous_state() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    log.drain();

    controller.seek(1.0);

    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(
        log.events(),
        vec![
            SyncEvent::StateChanged { state: PlaybackState::Seeking },
            SyncEvent::MeasureChanged { measure_index: 0 },
            SyncEvent::Highlight(Highlight {
                measure_index: 0,
                note_index: 1,
                progress_within_note: 0.0,
            }),
            SyncEvent::StateChanged { state: PlaybackState::Playing },
        ]
    );
}

#[test]
fn test_seek_updates_last_index_for_ticks() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    controller.seek(3.2);
    controller.tick(3.5); // same note as the seek
    controller.tick(4.0);

    assert_eq!(note_indices(&log), vec![4, 5]);
}

#[test]
fn test_seek_while_paused_keeps_paused() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    controller.pause();
    controller.seek(4.5);

    assert_eq!(controller.state(), PlaybackState::Paused);
    assert_eq!(note_indices(&log), vec![5]);
    assert_eq!(controller.last_index(), Some(5));
}

#[test]
fn test_tick_ignored_unless_playing() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.tick(1.0);
    assert!(log.highlights().is_empty());

    controller.play();
    controller.tick(1.0);
    controller.pause();
    controller.tick(3.0);

    assert_eq!(note_indices(&log), vec![1]);
    assert_eq!(controller.last_index(), Some(1));
}

#[test]
fn test_measure_change_precedes_highlight() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    log.drain();

    controller.tick(3.5);
    controller.tick(4.5);

    let events: Vec<SyncEvent> = log
        .events()
        .into_iter()
        .filter(|e| !matches!(e, SyncEvent::Highlight(_)))
        .collect();
    assert_eq!(
        events,
        vec![
            SyncEvent::MeasureChanged { measure_index: 0 },
            SyncEvent::MeasureChanged { measure_index: 1 },
        ]
    );
    let all = log.events();
    assert_eq!(all[2], SyncEvent::MeasureChanged { measure_index: 1 });
    assert!(matches!(all[3], SyncEvent::Highlight(h) if h.note_index == 5));
}

#[test]
fn test_end_of_song_highlights_last_note() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    controller.tick(5.9);
    controller.tick(6.0);
    controller.tick(10.0);

    assert_eq!(note_indices(&log), vec![5]);
    assert!(controller.current().is_finished());
}

#[test]
fn test_pre_roll_clears() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.seek(1.0);
    controller.seek(-1.0);

    let events: Vec<SyncEvent> = log
        .events()
        .into_iter()
        .filter(|e| !matches!(e, SyncEvent::StateChanged { .. }))
        .collect();
    assert_eq!(events.last(), Some(&SyncEvent::Cleared));
    assert_eq!(controller.last_index(), None);
    assert_eq!(controller.current().signed_index(), -1);
}

#[test]
fn test_reset_clears_highlight() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    controller.tick(2.0);
    log.drain();

    controller.reset();

    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(controller.last_index(), None);
    assert_eq!(
        log.events(),
        vec![
            SyncEvent::StateChanged { state: PlaybackState::Idle },
            SyncEvent::Cleared,
        ]
    );

    // After reset the same note is announced again
    controller.play();
    controller.tick(2.0);
    assert_eq!(note_indices(&log), vec![3]);
}

#[test]
fn test_empty_song_never_highlights() {
    let (mut controller, log) = controller_with_log(empty_layout());

    controller.play();
    assert_eq!(controller.state(), PlaybackState::Idle);
    controller.tick(0.0);
    controller.tick(1.0);
    controller.seek(0.5);
    controller.reset();

    assert!(log.events().is_empty());
}

#[test]
fn test_tick_never_panics_on_odd_times() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    for t in [f64::NAN, f64::NEG_INFINITY, -5.0, f64::INFINITY, f64::MAX] {
        controller.tick(t);
    }
    assert_eq!(note_indices(&log), vec![5]);
}

#[test]
fn test_set_tempo_renotifies() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    controller.tick(2.5); // note 3 at 60 BPM
    log.drain();

    controller.set_tempo(Tempo::new(120.0).unwrap());
    controller.tick(1.25); // note 3 at 120 BPM

    let events = log.events();
    assert_eq!(events[0], SyncEvent::Cleared);
    match &events[1] {
        SyncEvent::LayoutReady { layout } => assert_eq!(layout.timeline().total_seconds(), 3.0),
        other => panic!("expected LayoutReady, got {:?}", other),
    }
    assert_eq!(note_indices(&log), vec![3]);
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(controller.layout().measures(), scenario_layout().measures());
}

#[test]
fn test_set_tempo_then_reset_leaves_nothing_highlighted() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    controller.tick(2.5);
    controller.pause();
    log.drain();

    controller.set_tempo(Tempo::new(120.0).unwrap());
    assert_eq!(controller.last_index(), None);
    let after_tempo = log.drain();
    assert_eq!(after_tempo[0], SyncEvent::Cleared);
    assert!(matches!(after_tempo[1], SyncEvent::LayoutReady { .. }));

    // The highlight is already gone, so reset only changes state
    controller.reset();
    assert_eq!(log.events(), vec![SyncEvent::StateChanged { state: PlaybackState::Idle }]);
}

#[test]
fn test_set_tempo_before_any_highlight_sends_no_clear() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.set_tempo(Tempo::new(90.0).unwrap());

    let events = log.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], SyncEvent::LayoutReady { .. }));
}

#[test]
fn test_load_replaces_layout_and_resets() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    controller.play();
    controller.tick(0.5);
    log.drain();

    controller.load(empty_layout());

    let events = log.events();
    assert_eq!(events[0], SyncEvent::StateChanged { state: PlaybackState::Idle });
    assert_eq!(events[1], SyncEvent::Cleared);
    assert!(matches!(&events[2], SyncEvent::LayoutReady { layout } if layout.is_empty()));
    controller.play();
    assert_eq!(controller.state(), PlaybackState::Idle);
}

#[test]
fn test_unsubscribe_stops_notifications() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    let other = EventLog::new();
    let id = controller.subscribe(other.clone());

    assert!(controller.unsubscribe(id));
    assert!(!controller.unsubscribe(id));
    controller.seek(0.0);

    assert_eq!(other.events().len(), 1); // only the initial LayoutReady
    assert_eq!(log.highlights().len(), 1);
}

#[test]
fn test_closure_listener() {
    use std::cell::Cell;
    use std::rc::Rc;

    let count = Rc::new(Cell::new(0));
    let seen = Rc::clone(&count);
    let mut controller = SyncController::new(scenario_layout());
    controller.subscribe(move |event: &SyncEvent| {
        if let SyncEvent::Highlight(_) = event {
            seen.set(seen.get() + 1);
        }
    });

    controller.seek(0.0);
    controller.seek(0.0);
    assert_eq!(count.get(), 2);
}

#[test]
fn test_poll_follows_transport() {
    let (mut controller, log) = controller_with_log(scenario_layout());
    let mut transport = SimulatedTransport::new();

    transport.play();
    controller.play();
    while transport.current_seconds() < 7.0 {
        controller.poll(&transport);
        transport.advance(1.0 / 30.0);
    }

    assert_eq!(note_indices(&log), vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_highlight_serializes_for_renderer() {
    let event = SyncEvent::Highlight(Highlight {
        measure_index: 1,
        note_index: 5,
        progress_within_note: 0.25,
    });
    assert_eq!(
        serde_json::to_string(&event).unwrap(),
        r#"{"event":"highlight","measureIndex":1,"noteIndex":5,"progressWithinNote":0.25}"#
    );
    assert_eq!(
        serde_json::to_string(&SyncEvent::StateChanged { state: PlaybackState::Playing }).unwrap(),
        r#"{"event":"stateChanged","state":"playing"}"#
    );
}
