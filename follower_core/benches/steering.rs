use std::time::Duration;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use follower_core::mocks::ScriptedLink;
use follower_core::steering::{classify, steer};
use follower_core::{
    CalibrationBounds, ControlLoop, ControlParams, HardwareProxy, LoopCfg, ParamSnapshot,
    ReadPolicy, Thresholds,
};

// Synthetic sensor trace: the line drifting under the robot, plus noise.
fn synth_trace(n: usize, seed: u32) -> Vec<(i32, i32)> {
    let mut state = seed.max(1);
    let mut noise = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        (x % 41) as i32 - 20
    };
    (0..n)
        .map(|i| {
            let drift = ((i as f32) / 50.0).sin() * 150.0;
            let l = 200 + drift as i32 + noise();
            let r = 200 - drift as i32 + noise();
            (l, r)
        })
        .collect()
}

fn bench_steer(c: &mut Criterion) {
    let trace = synth_trace(10_000, 7);
    let bounds = CalibrationBounds::default();
    let th = Thresholds::default();
    let p = ParamSnapshot {
        engaged: true,
        ..ParamSnapshot::default()
    };
    c.bench_function("classify_and_steer_10k", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for &(l, r) in &trace {
                let _ = classify(black_box(l), black_box(r), &th);
                let s = steer(black_box(l), black_box(r), &bounds, &p);
                acc = acc.wrapping_add(u32::from(s.left_speed) + u32::from(s.right_speed));
            }
            black_box(acc)
        })
    });
}

fn bench_step(c: &mut Criterion) {
    let trace = synth_trace(1_000, 11);
    c.bench_function("control_step_scripted_1k", |b| {
        b.iter_batched(
            || {
                let link = ScriptedLink::new();
                for &(l, r) in &trace {
                    link.push_pair(l.max(5), r.max(5));
                }
                let params = ControlParams::shared(ParamSnapshot {
                    engaged: true,
                    ..ParamSnapshot::default()
                });
                let proxy = HardwareProxy::new(link).with_policy(ReadPolicy {
                    poll: Duration::from_millis(1),
                    deadline: None,
                });
                ControlLoop::new(proxy, params, CalibrationBounds::default(), LoopCfg::default())
            },
            |mut cl| {
                for _ in 0..trace.len() {
                    black_box(cl.step().ok());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_steer, bench_step);
criterion_main!(benches);
