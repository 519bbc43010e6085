use criterion::{Criterion, criterion_group, criterion_main};
use glam::{Mat4, Quat, Vec3};
use std::hint::black_box;

use posekit::animation::{AnimationLibrary, AnimationPlayer};
use posekit::assets::{ImportedAsset, ImportedChannel, ImportedClip, ImportedNode, ImportedSkin};
use posekit::settings::PlayerSettings;

const CHAIN_LENGTH: usize = 64;
const KEYS: usize = 120;

/// A single chain of `CHAIN_LENGTH` joints, each one unit above its parent.
fn create_chain_asset() -> ImportedAsset {
    let mut node = ImportedNode::new(
        format!("joint_{}", CHAIN_LENGTH - 1),
        Mat4::from_translation(Vec3::Y),
    );
    for i in (0..CHAIN_LENGTH - 1).rev() {
        node = ImportedNode::new(format!("joint_{i}"), Mat4::from_translation(Vec3::Y))
            .with_child(node);
    }

    let mut skin = ImportedSkin::new();
    for i in 0..CHAIN_LENGTH {
        let inverse_bind = Mat4::from_translation(-Vec3::Y * (i + 1) as f32);
        skin = skin.with_bone(format!("joint_{i}"), inverse_bind);
    }

    let clip = |name: &str, axis: Vec3| {
        let mut clip = ImportedClip::new(name, KEYS as f32, 30.0);
        for i in 0..CHAIN_LENGTH {
            let rotations = (0..=KEYS)
                .map(|k| {
                    let angle = (k as f32 * 0.1 + i as f32 * 0.05).sin() * 0.4;
                    (k as f32, Quat::from_axis_angle(axis, angle))
                })
                .collect();
            clip = clip
                .with_channel(ImportedChannel::new(format!("joint_{i}")).with_rotations(rotations));
        }
        clip
    };

    ImportedAsset {
        root: node,
        skin,
        clips: vec![clip("bend", Vec3::Z), clip("twist", Vec3::Y)],
    }
}

fn evaluate_benchmark(c: &mut Criterion) {
    let library = AnimationLibrary::load(&create_chain_asset()).unwrap();
    let bend = library.clip("bend").unwrap();
    let twist = library.clip("twist").unwrap();

    c.bench_function("evaluate_single_clip", |b| {
        let mut player = AnimationPlayer::new(&library, PlayerSettings::default()).unwrap();
        player.play(bend.clone()).unwrap();
        b.iter(|| {
            player.advance(black_box(1.0 / 60.0));
            black_box(player.evaluate(1.0).unwrap());
        });
    });

    c.bench_function("evaluate_dual_clip", |b| {
        let mut player = AnimationPlayer::new(&library, PlayerSettings::default()).unwrap();
        player.play_blend(bend.clone(), twist.clone()).unwrap();
        b.iter(|| {
            player.advance(black_box(1.0 / 60.0));
            black_box(player.evaluate(black_box(0.35)).unwrap());
        });
    });

    c.bench_function("load_library", |b| {
        let asset = create_chain_asset();
        b.iter(|| black_box(AnimationLibrary::load(black_box(&asset)).unwrap()));
    });
}

criterion_group!(benches, evaluate_benchmark);
criterion_main!(benches);
