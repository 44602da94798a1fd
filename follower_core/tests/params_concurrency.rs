use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use follower_core::{ControlParams, ParamSnapshot};

#[test]
fn concurrent_edits_are_never_torn() {
    let params = ControlParams::shared(ParamSnapshot::default());
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let params = params.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            let mut flip = false;
            while !stop.load(Ordering::Relaxed) {
                params.set_gain(if flip { 0.1 } else { -123.456 });
                params.set_base_speed(if flip { 45 } else { 200 }).unwrap();
                params.toggle_engaged();
                flip = !flip;
            }
        })
    };

    for _ in 0..50_000 {
        let s = params.snapshot();
        assert!(s.gain == 0.1 || s.gain == -123.456, "torn gain {}", s.gain);
        assert!(s.base_speed == 45 || s.base_speed == 200);
    }
    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();
}

#[test]
fn shutdown_is_visible_across_threads() {
    let params = ControlParams::shared(ParamSnapshot::default());
    let waiter = {
        let params = params.clone();
        thread::spawn(move || {
            while !params.is_shutdown() {
                thread::yield_now();
            }
        })
    };
    params.request_shutdown();
    waiter.join().unwrap();
}
