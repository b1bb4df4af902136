//! Benchmarks for landmark analysis and temporal stabilization

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gesture_particles::{
    analyzer::{heart_gesture, openness_strength, palm_orientation, GestureThresholds, LandmarkAnalyzer},
    app::LandmarkSource,
    device::{DeviceClass, DeviceProfile},
    landmarks::HandLandmarkSet,
    simulation::{poses, HandPose, SyntheticHandSource},
    stabilizer::TemporalStabilizer,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn benchmark_analyzer(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyzer");
    let analyzer = LandmarkAnalyzer::default();
    let thresholds = GestureThresholds::default();

    let hands = [
        ("open", poses::open_hand()),
        ("fist", poses::fist()),
        ("heart", poses::heart_hand()),
        ("tilted", poses::tilted_hand()),
    ];

    for (name, hand) in &hands {
        group.bench_with_input(BenchmarkId::new("analyze", name), hand, |b, hand| {
            b.iter(|| black_box(analyzer.analyze(black_box(hand))));
        });
    }

    let hand = poses::open_hand();
    group.bench_function("openness_strength", |b| {
        b.iter(|| black_box(openness_strength(black_box(&hand))));
    });
    group.bench_function("palm_orientation", |b| {
        b.iter(|| black_box(palm_orientation(black_box(&hand), thresholds.facing_threshold)));
    });
    group.bench_function("heart_gesture", |b| {
        b.iter(|| black_box(heart_gesture(black_box(&hand), &thresholds)));
    });

    group.finish();
}

fn benchmark_stabilizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("stabilizer");

    // Noisy hands, as a tracker would deliver them
    let mut rng = StdRng::seed_from_u64(42);
    let base = poses::open_hand();
    let noisy: Vec<_> = (0..100)
        .map(|_| {
            let values: Vec<f32> = base
                .points()
                .iter()
                .flat_map(|p| [p.x, p.y, p.z])
                .map(|v| v + rng.gen_range(-0.01..0.01))
                .collect();
            HandLandmarkSet::from_flat(&values).unwrap()
        })
        .collect();

    for class in [DeviceClass::Desktop, DeviceClass::Constrained] {
        let profile = DeviceProfile::for_class(class);
        let mut stabilizer = TemporalStabilizer::new(&profile, LandmarkAnalyzer::default(), 1, 1).unwrap();
        group.bench_function(BenchmarkId::new("update_sequence", class), |b| {
            b.iter(|| {
                for hand in &noisy {
                    stabilizer.update(std::slice::from_ref(hand));
                }
                black_box(stabilizer.signal().strength)
            });
        });
    }

    let profile = DeviceProfile::for_class(DeviceClass::Desktop);
    let mut stabilizer = TemporalStabilizer::new(&profile, LandmarkAnalyzer::default(), 1, 1).unwrap();
    group.bench_function("no_hand_update", |b| {
        b.iter(|| {
            stabilizer.update(&[]);
            black_box(stabilizer.signal().strength)
        });
    });

    group.bench_function("synthetic_detect", |b| {
        let mut source = SyntheticHandSource::new(vec![(HandPose::Open, 30), (HandPose::Fist, 30)])
            .unwrap()
            .with_noise(0.005, 1);
        let mut frame = 0;
        b.iter(|| {
            frame += 1;
            black_box(source.detect(frame).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_analyzer, benchmark_stabilizer);
criterion_main!(benches);
