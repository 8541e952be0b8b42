use std::{cell::Cell, time::Duration};

use anyhow::bail;
use glide_frames::Frames;

use super::*;
use crate::{MoveConfig, Phase};

use MoveKind::{End, Move, Start};

#[test]
fn drag_with_coalesced_moves() {
    let h = Harness::new(4.0);
    h.down(100.0, 100.0);

    h.move_to(101.0, 100.0);
    h.move_to(103.0, 100.0);
    assert!(h.take().is_empty());

    h.move_to(104.0, 100.0);
    let events = h.take_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, Start);
    assert_eq!((events[0].page_x, events[0].page_y), (104.0, 100.0));
    assert_eq!((events[0].start_x, events[0].start_y), (100.0, 100.0));
    assert_eq!((events[0].delta_x, events[0].delta_y), (0.0, 0.0));
    assert_eq!(events[1].kind, Move);
    assert_eq!((events[1].delta_x, events[1].delta_y), (4.0, 0.0));
    assert!(events.iter().all(|e| e.target == h.element));

    h.move_to(110.0, 102.0);
    assert!(h.take().is_empty());
    h.frame();
    let events = h.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, Move);
    assert_eq!(events[0].page(), PagePoint::new(110.0, 102.0));
    assert_eq!(events[0].start(), PagePoint::new(100.0, 100.0));
    assert_eq!((events[0].delta_x, events[0].delta_y), (10.0, 2.0));

    h.up(112.0, 103.0);
    assert_eq!(h.take(), [(End, (12.0, 3.0))]);

    let recognizer = h.events.recognizer(h.element).unwrap();
    assert_eq!(recognizer.phase(), Phase::Idle);
    assert_eq!(h.doc.listener_count(Document::ROOT, EventKind::PointerMove), 0);
    assert_eq!(h.doc.listener_count(Document::ROOT, EventKind::PointerUp), 0);
    assert!(!h.clock.wants_frame());
}

#[test]
fn click_without_movement_emits_nothing() {
    let h = Harness::new(4.0);
    h.down(50.0, 50.0);
    h.up(50.0, 50.0);
    h.frame();
    assert!(h.take().is_empty());
}

#[test]
fn jitter_below_the_threshold_emits_nothing() {
    let h = Harness::new(4.0);
    h.down(0.0, 0.0);
    for (x, y) in [(1.0, 1.0), (-2.0, 3.0), (3.0, -2.0), (0.0, -3.9), (2.0, 2.0)] {
        h.move_to(x, y);
        h.frame();
    }
    h.up(2.0, 2.0);
    assert!(h.take().is_empty());
}

#[test]
fn threshold_boundary_is_inclusive() {
    let h = Harness::new(5.0);
    h.down(0.0, 0.0);
    h.move_to(4.0, 0.0);
    h.move_to(3.0, 3.0);
    assert!(h.take().is_empty());
    // 3² + 4² = 5²
    h.move_to(3.0, 4.0);
    assert_eq!(h.take(), [(Start, (0.0, 0.0)), (Move, (3.0, 4.0))]);
}

#[test]
fn default_threshold_is_four_pixels() {
    let doc = Rc::new(Document::new());
    let element = doc.create_element(Document::ROOT).unwrap();
    let events = MoveEvents::with_config(
        doc.clone(),
        Rc::new(FrameClock::new()),
        &MoveConfig::default(),
    )
    .unwrap();
    let started = Rc::new(Cell::new(false));
    let s = started.clone();
    events.subscribe(element, Start, move |_| {
        s.set(true);
        Ok(())
    });

    let pointer = |kind, target, x| {
        doc.dispatch(Event::new(
            kind,
            target,
            PagePoint::new(x, 0.0),
            Instant::now(),
        ))
        .unwrap();
    };
    pointer(EventKind::PointerDown, element, 0.0);
    pointer(EventKind::PointerMove, Document::ROOT, 3.0);
    assert!(!started.get());
    pointer(EventKind::PointerMove, Document::ROOT, 4.0);
    assert!(started.get());
}

#[test]
fn moves_within_one_frame_are_coalesced() {
    let h = Harness::new(4.0);
    h.down(0.0, 0.0);
    h.move_to(10.0, 0.0);
    h.take();

    for i in 1..=20 {
        h.move_to(10.0 + i as f64, 0.0);
    }
    h.frame();
    assert_eq!(h.take(), [(Move, (30.0, 0.0))]);

    // Without new movement, the next frame emits nothing and the chain ends.
    h.frame();
    assert!(h.take().is_empty());
    assert!(!h.clock.wants_frame());

    h.move_to(31.0, 1.0);
    h.frame();
    assert_eq!(h.take(), [(Move, (31.0, 1.0))]);
}

#[test]
fn moveend_is_last_even_with_a_pending_frame() {
    let h = Harness::new(4.0);
    h.down(0.0, 0.0);
    h.move_to(10.0, 0.0);
    h.move_to(20.0, 5.0);
    assert!(h.clock.wants_frame());

    // The up position differs from the last move.
    h.up(21.0, 6.0);
    h.frame();
    h.frame();
    assert_eq!(
        h.take(),
        [(Start, (0.0, 0.0)), (Move, (10.0, 0.0)), (End, (21.0, 6.0))]
    );
}

#[test]
fn moves_without_a_session_are_ignored() {
    let h = Harness::new(4.0);
    h.move_to(100.0, 100.0);
    h.up(100.0, 100.0);
    h.frame();
    assert!(h.take().is_empty());
    assert_eq!(h.doc.listener_count(Document::ROOT, EventKind::PointerMove), 0);
}

#[test]
fn sessions_are_independent() {
    let h = Harness::new(4.0);
    h.down(0.0, 0.0);
    h.move_to(10.0, 0.0);
    h.up(10.0, 0.0);
    h.take();

    h.down(100.0, 0.0);
    h.move_to(103.0, 0.0);
    assert!(h.take().is_empty());
    h.move_to(96.0, 0.0);
    assert_eq!(h.take(), [(Start, (0.0, 0.0)), (Move, (-4.0, 0.0))]);
}

#[test]
fn failing_listeners_surface_without_breaking_the_session() {
    let h = Harness::new(4.0);
    h.events
        .subscribe(h.element, Start, |_| bail!("movestart listener failed"));
    let fail_moves = Rc::new(Cell::new(true));
    let f = fail_moves.clone();
    h.events.subscribe(h.element, Move, move |_| {
        if f.get() {
            bail!("move listener failed");
        }
        Ok(())
    });

    h.down(0.0, 0.0);
    let err = h
        .pointer(EventKind::PointerMove, 10.0, 0.0)
        .unwrap_err();
    assert_eq!(err.to_string(), "movestart listener failed");
    assert_eq!(h.take(), [(Start, (0.0, 0.0)), (Move, (10.0, 0.0))]);

    h.move_to(12.0, 0.0);
    let err = h.clock.frame(Instant::now()).unwrap_err();
    assert_eq!(err.to_string(), "move listener failed");
    assert_eq!(h.take(), [(Move, (12.0, 0.0))]);

    // The throttle re-armed before the failing listener ran.
    fail_moves.set(false);
    h.move_to(13.0, 0.0);
    h.frame();
    assert_eq!(h.take(), [(Move, (13.0, 0.0))]);

    h.up(14.0, 0.0);
    assert_eq!(h.take(), [(End, (14.0, 0.0))]);
    assert_eq!(h.doc.listener_count(Document::ROOT, EventKind::PointerUp), 0);
}

#[test]
fn unsubscribing_from_a_listener_tears_everything_down() {
    let h = Harness::new(4.0);
    let events = Rc::downgrade(&h.events);
    let subscriptions = h.subscriptions.clone();
    let own: Rc<Cell<Option<Subscription>>> = Rc::default();
    let o = own.clone();
    let subscription = h.events.subscribe(h.element, Start, move |_| {
        if let Some(events) = events.upgrade() {
            for subscription in subscriptions.iter().copied().chain(o.get()) {
                events.unsubscribe(subscription);
            }
        }
        Ok(())
    });
    own.set(Some(subscription));

    h.down(0.0, 0.0);
    h.move_to(10.0, 0.0);
    assert_eq!(h.take(), [(Start, (0.0, 0.0))]);
    assert!(!h.events.is_bound(h.element));
    assert_eq!(h.doc.total_listeners(), 0);

    h.move_to(20.0, 0.0);
    h.frame();
    h.up(20.0, 0.0);
    assert!(h.take().is_empty());
}

#[test]
fn pointer_up_from_movestart_listener_ends_with_moveend() {
    let h = Harness::new(4.0);
    let doc = Rc::downgrade(&h.doc);
    h.events.subscribe(h.element, Start, move |event| {
        let Some(doc) = doc.upgrade() else {
            return Ok(());
        };
        let up = Event::new(EventKind::PointerUp, Document::ROOT, event.page(), Instant::now());
        doc.dispatch(up).map(|_| ())
    });

    h.down(0.0, 0.0);
    h.move_to(10.0, 0.0);
    h.frame();
    assert_eq!(h.take(), [(Start, (0.0, 0.0)), (End, (10.0, 0.0))]);
    assert_eq!(h.doc.listener_count(Document::ROOT, EventKind::PointerMove), 0);
    assert!(!h.clock.wants_frame());
}

#[test]
fn cancel_from_movestart_listener_suppresses_the_first_move() {
    let h = Harness::new(4.0);
    let events = Rc::downgrade(&h.events);
    let element = h.element;
    let cancelled = Rc::new(Cell::new(false));
    let c = cancelled.clone();
    h.events.subscribe(element, Start, move |_| {
        if let Some(recognizer) = events.upgrade().and_then(|e| e.recognizer(element)) {
            c.set(recognizer.cancel());
        }
        Ok(())
    });

    h.down(0.0, 0.0);
    h.move_to(10.0, 0.0);
    h.move_to(20.0, 0.0);
    h.frame();
    h.up(20.0, 0.0);
    assert!(cancelled.get());
    assert_eq!(h.take(), [(Start, (0.0, 0.0))]);
    assert_eq!(
        h.events.recognizer(element).unwrap().phase(),
        Phase::Idle
    );

    // The recognizer stays installed for the next interaction.
    h.down(0.0, 0.0);
    h.move_to(0.0, 4.0);
    assert_eq!(h.take(), [(Start, (0.0, 0.0))]);
}

#[test]
fn teardown_makes_the_scheduled_frame_a_no_op() {
    let h = Harness::new(4.0);
    h.down(0.0, 0.0);
    h.move_to(10.0, 0.0);
    h.move_to(15.0, 0.0);
    h.take();

    h.unsubscribe_all();
    assert!(!h.events.is_bound(h.element));
    assert_eq!(h.doc.total_listeners(), 0);

    h.frame();
    h.up(15.0, 0.0);
    assert!(h.take().is_empty());
    assert!(!h.clock.wants_frame());
}

#[test]
fn native_drag_is_suppressed_while_bound() {
    let h = Harness::new(4.0);
    let drag_start = || {
        h.doc
            .dispatch(Event::new(
                EventKind::DragStart,
                h.element,
                PagePoint::origin(),
                Instant::now(),
            ))
            .unwrap()
            .default_prevented
    };

    assert!(drag_start());
    h.unsubscribe_all();
    assert!(!drag_start());
}

#[test]
fn timer_fallback_delivers_coalesced_moves() {
    let frames = Rc::new(Frames::timer(Duration::ZERO));
    let h = Harness::with_frames(4.0, Rc::new(FrameClock::new()), frames.clone());

    h.down(0.0, 0.0);
    h.move_to(5.0, 0.0);
    h.take();
    h.move_to(6.0, 0.0);
    h.move_to(7.0, 1.0);
    assert!(frames.next_deadline().is_some());

    frames
        .run(Instant::now() + Duration::from_secs(1))
        .unwrap();
    assert_eq!(h.take(), [(Move, (7.0, 1.0))]);
}

/// Random walks, checking the ordering guarantees of every interaction.
#[test]
fn notifications_are_well_formed_for_random_walks() {
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move |range: i64| -> f64 {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((seed >> 33) as i64 % range - range / 2) as f64
    };

    for _ in 0..200 {
        let h = Harness::new(4.0);
        h.down(0.0, 0.0);

        let (mut x, mut y) = (0.0, 0.0);
        let mut max_squared_distance: f64 = 0.0;
        let mut delivered = Vec::new();
        let steps = next(20).abs() as usize + 1;
        for _ in 0..steps {
            x += next(5);
            y += next(5);
            max_squared_distance = max_squared_distance.max(x * x + y * y);
            h.move_to(x, y);
            if next(4) > 0.0 {
                h.frame();
            }
            delivered.extend(h.take_events());
        }
        h.up(x, y);
        delivered.extend(h.take_events());
        h.frame();
        assert!(h.take().is_empty());

        if max_squared_distance < 16.0 {
            assert!(delivered.is_empty());
            continue;
        }

        let first = delivered.first().unwrap();
        assert_eq!(first.kind, Start);
        assert_eq!((first.delta_x, first.delta_y), (0.0, 0.0));
        let last = delivered.last().unwrap();
        assert_eq!(last.kind, End);
        assert_eq!((last.delta_x, last.delta_y), (x, y));

        assert_eq!(delivered.iter().filter(|e| e.kind == Start).count(), 1);
        assert_eq!(delivered.iter().filter(|e| e.kind == End).count(), 1);
        for event in delivered.iter().filter(|e| e.kind != Start) {
            assert_eq!(event.start(), PagePoint::origin());
            assert_eq!(event.page() - event.start(), event.delta());
        }
    }
}
