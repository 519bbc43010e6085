//! AnimationPlayer Tests
//!
//! Tests for:
//! - Idle / SingleClip / DualClip state transitions
//! - Independent looping time cursors
//! - Hierarchical posing and skinning matrix output
//! - Two-clip blending endpoints and monotonicity
//! - Crossfade completion
//! - Precondition failures (blend range, idle, skeleton mismatch)

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use posekit::animation::{AnimationLibrary, AnimationPlayer, PlayerMode};
use posekit::assets::{
    FlatNode, ImportedAsset, ImportedChannel, ImportedClip, ImportedNode, ImportedSkin,
};
use posekit::errors::AnimationError;
use posekit::scene::SkeletonHierarchy;
use posekit::settings::{KeyLookup, LoadSettings, PlayerSettings};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn mats_approx(a: &[Mat4], b: &[Mat4]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.abs_diff_eq(*y, EPSILON))
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Fixtures
// ============================================================================

//   root
//   ├── spine
//   │   └── head
//   └── arm
fn skeleton(root_offset: Vec3) -> ImportedNode {
    ImportedNode::new("root", Mat4::from_translation(root_offset))
        .with_child(
            ImportedNode::new("spine", Mat4::from_translation(Vec3::Y))
                .with_child(ImportedNode::new("head", Mat4::from_translation(Vec3::Y))),
        )
        .with_child(ImportedNode::new("arm", Mat4::from_translation(Vec3::X)))
}

/// Inverse bind matrices of the untranslated skeleton.
fn skin() -> ImportedSkin {
    ImportedSkin::new()
        .with_bone("root", Mat4::IDENTITY)
        .with_bone("spine", Mat4::from_translation(-Vec3::Y))
        .with_bone("head", Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0)))
        .with_bone("arm", Mat4::from_translation(-Vec3::X))
}

fn clips() -> Vec<ImportedClip> {
    vec![
        ImportedClip::new("walk", 10.0, 1.0)
            .with_channel(
                ImportedChannel::new("root")
                    .with_positions(vec![(0.0, Vec3::ZERO), (10.0, Vec3::new(10.0, 0.0, 0.0))]),
            )
            .with_channel(ImportedChannel::new("spine").with_rotations(vec![
                (0.0, Quat::IDENTITY),
                (10.0, Quat::from_rotation_z(1.0)),
            ])),
        ImportedClip::new("run", 4.0, 1.0)
            .with_channel(ImportedChannel::new("root").with_positions(vec![
                (0.0, Vec3::new(0.0, 0.0, 1.0)),
                (4.0, Vec3::new(0.0, 0.0, 5.0)),
            ]))
            .with_channel(ImportedChannel::new("spine").with_rotations(vec![
                (0.0, Quat::from_rotation_x(0.5)),
                (4.0, Quat::from_rotation_x(-0.5)),
            ])),
        ImportedClip::new("ghost", 5.0, 1.0).with_channel(
            ImportedChannel::new("ghost").with_positions(vec![(0.0, Vec3::splat(3.0))]),
        ),
        ImportedClip::new("sway", 10.0, 1.0)
            .with_channel(ImportedChannel::new("root").with_rotations(vec![
                (0.0, Quat::IDENTITY),
                (10.0, Quat::from_rotation_y(2.0)),
            ]))
            .with_channel(ImportedChannel::new("spine").with_rotations(vec![
                (0.0, Quat::from_rotation_z(0.3)),
                (10.0, Quat::from_rotation_z(-0.3)),
            ])),
        ImportedClip::new("short", 10.0, 1.0).with_channel(
            ImportedChannel::new("root")
                .with_positions(vec![(0.0, Vec3::ZERO), (5.0, Vec3::new(5.0, 0.0, 0.0))]),
        ),
    ]
}

fn asset(root_offset: Vec3) -> ImportedAsset {
    ImportedAsset {
        root: skeleton(root_offset),
        skin: skin(),
        clips: clips(),
    }
}

fn library() -> AnimationLibrary {
    init_logger();
    AnimationLibrary::load(&asset(Vec3::ZERO)).expect("fixture library loads")
}

fn player(library: &AnimationLibrary) -> AnimationPlayer {
    AnimationPlayer::new(library, PlayerSettings::default()).expect("fixture player")
}

fn id(library: &AnimationLibrary, name: &str) -> usize {
    library.registry().get(name).unwrap().id
}

// ============================================================================
// Library / registry
// ============================================================================

#[test]
fn library_assigns_ids_skin_first_then_channels() {
    let lib = library();
    assert_eq!(id(&lib, "root"), 0);
    assert_eq!(id(&lib, "spine"), 1);
    assert_eq!(id(&lib, "head"), 2);
    assert_eq!(id(&lib, "arm"), 3);
    assert_eq!(id(&lib, "ghost"), 4);
    assert_eq!(lib.registry().len(), 5);
    assert_eq!(lib.len(), 5);
    assert!(lib.clip("walk").is_some());
    assert!(lib.clip("swim").is_none());
}

#[test]
fn library_rejects_duplicate_clip_names() {
    let mut asset = asset(Vec3::ZERO);
    asset.clips.push(ImportedClip::new("walk", 1.0, 1.0));
    let err = AnimationLibrary::load(&asset).unwrap_err();
    assert!(matches!(err, AnimationError::DuplicateClip(ref name) if name == "walk"));
}

#[test]
fn library_from_flat_hierarchy() -> anyhow::Result<()> {
    let flat = vec![
        FlatNode {
            name: "arm".into(),
            parent: Some(1),
            transform: Mat4::from_translation(Vec3::X),
        },
        FlatNode {
            name: "root".into(),
            parent: None,
            transform: Mat4::IDENTITY,
        },
    ];
    let hierarchy = SkeletonHierarchy::from_flat(&flat)?;
    let lib = AnimationLibrary::from_parts(hierarchy, &skin(), &clips(), &LoadSettings::default())?;

    let mut p = player(&lib);
    p.play(lib.clip("walk").unwrap())?;
    p.advance(2.0);
    let matrices = p.evaluate(1.0)?;
    let arm = matrices[id(&lib, "arm")];
    // Arm follows root's translation (2,0,0); bind and offset cancel
    assert!(arm.w_axis.truncate().abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), EPSILON));
    Ok(())
}

// ============================================================================
// Idle
// ============================================================================

#[test]
fn new_player_is_idle_with_identity_output() {
    let lib = library();
    let mut p = player(&lib);

    assert_eq!(p.mode(), PlayerMode::Idle);
    assert!(!p.is_skinned());
    assert_eq!(p.skinning_matrices().len(), 100);
    assert!(p.skinning_matrices().iter().all(|m| *m == Mat4::IDENTITY));

    let err = p.evaluate(1.0).unwrap_err();
    assert!(matches!(err, AnimationError::PlayerIdle));
    assert!(err.is_precondition());
}

#[test]
fn player_rejects_registry_larger_than_capacity() {
    let lib = library();
    let settings = PlayerSettings {
        max_bones: 2,
        ..Default::default()
    };
    assert!(matches!(
        AnimationPlayer::new(&lib, settings),
        Err(AnimationError::BoneCapacityExceeded { bones: 5, capacity: 2 })
    ));
}

#[test]
fn stop_returns_to_identity() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play(lib.clip("walk").unwrap())?;
    p.advance(3.0);
    p.evaluate(1.0)?;
    assert!(p.skinning_matrices()[0] != Mat4::IDENTITY);

    p.stop();
    assert_eq!(p.mode(), PlayerMode::Idle);
    assert!(p.skinning_matrices().iter().all(|m| *m == Mat4::IDENTITY));
    Ok(())
}

// ============================================================================
// Single clip
// ============================================================================

#[test]
fn unanimated_skeleton_yields_identity_skinning() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play(lib.clip("ghost").unwrap())?;
    p.advance(1.0);
    let matrices = p.evaluate(1.0)?;

    // Bind pose: global bind * inverse bind == identity
    for name in ["root", "spine", "head", "arm"] {
        assert!(
            matrices[id(&lib, name)].abs_diff_eq(Mat4::IDENTITY, EPSILON),
            "{name} not at bind pose"
        );
    }
    // Channel bone without a hierarchy node never reaches the output
    assert_eq!(matrices[id(&lib, "ghost")], Mat4::IDENTITY);
    Ok(())
}

#[test]
fn parent_motion_propagates_to_children() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play(lib.clip("walk").unwrap())?;
    p.advance(5.0);
    let matrices = p.evaluate(1.0)?.to_vec();

    let root = matrices[id(&lib, "root")];
    assert!(root.w_axis.truncate().abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), EPSILON));

    // head = root * spine * head_bind * head_offset; spine rotates 0.5 rad about Z
    let spine_rot = Quat::from_rotation_z(0.5);
    let expected_head = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))
        * Mat4::from_translation(Vec3::Y)
        * Mat4::from_quat(spine_rot)
        * Mat4::from_translation(Vec3::Y)
        * Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0));
    assert!(matrices[id(&lib, "head")].abs_diff_eq(expected_head, EPSILON));

    // Arm is a sibling of spine: only the root translation applies
    assert!(matrices[id(&lib, "arm")].abs_diff_eq(root, EPSILON));
    Ok(())
}

#[test]
fn advance_wraps_time_into_duration() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play(lib.clip("walk").unwrap())?;
    p.advance(8.0);
    assert!(approx(p.primary_time().unwrap(), 8.0));
    p.advance(5.0);
    assert!(approx(p.primary_time().unwrap(), 3.0));
    Ok(())
}

#[test]
fn advance_scales_by_tick_rate() -> anyhow::Result<()> {
    let mut asset = asset(Vec3::ZERO);
    asset.clips[0].ticks_per_second = 4.0;
    let lib = AnimationLibrary::load(&asset)?;
    let mut p = player(&lib);
    p.play(lib.clip("walk").unwrap())?;
    p.advance(0.5);
    assert!(approx(p.primary_time().unwrap(), 2.0));
    Ok(())
}

#[test]
fn single_clip_ignores_blend_factor() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play(lib.clip("walk").unwrap())?;
    assert!(p.evaluate(1.5).is_ok());
    Ok(())
}

#[test]
fn strict_lookup_fails_past_final_key_and_keeps_output() -> anyhow::Result<()> {
    let lib = library();
    let settings = PlayerSettings {
        key_lookup: KeyLookup::Strict,
        ..Default::default()
    };
    let mut p = AnimationPlayer::new(&lib, settings)?;
    p.play(lib.clip("short").unwrap())?;
    p.advance(2.0);
    let before = p.evaluate(1.0)?.to_vec();

    p.advance(5.0);
    let err = p.evaluate(1.0).unwrap_err();
    assert!(matches!(err, AnimationError::KeyTimeOutOfRange { .. }));
    assert!(mats_approx(p.skinning_matrices(), &before));
    assert!(p.global_transforms().iter().all(|m| m.is_finite()));

    let mut clamped = player(&lib);
    clamped.play(lib.clip("short").unwrap())?;
    clamped.advance(7.0);
    let root = clamped.evaluate(1.0)?[id(&lib, "root")];
    assert!(root.w_axis.truncate().abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), EPSILON));
    Ok(())
}

#[test]
fn failed_evaluation_keeps_previous_global_pose() -> anyhow::Result<()> {
    init_logger();
    // Root keys cover the whole clip, spine keys stop halfway
    let mut asset = asset(Vec3::ZERO);
    asset.clips.push(
        ImportedClip::new("stumble", 10.0, 1.0)
            .with_channel(
                ImportedChannel::new("root")
                    .with_positions(vec![(0.0, Vec3::ZERO), (10.0, Vec3::new(10.0, 0.0, 0.0))]),
            )
            .with_channel(ImportedChannel::new("spine").with_positions(vec![
                (0.0, Vec3::Y),
                (5.0, Vec3::new(0.0, 2.0, 0.0)),
            ])),
    );
    let lib = AnimationLibrary::load(&asset)?;
    let settings = PlayerSettings {
        key_lookup: KeyLookup::Strict,
        ..Default::default()
    };
    let mut p = AnimationPlayer::new(&lib, settings)?;
    p.play(lib.clip("stumble").unwrap())?;
    p.advance(2.0);
    p.evaluate(1.0)?;
    let globals = p.global_transforms().to_vec();
    let skinning = p.skinning_matrices().to_vec();

    // Root samples fine at t=7, spine fails
    p.advance(5.0);
    assert!(matches!(
        p.evaluate(1.0),
        Err(AnimationError::KeyTimeOutOfRange { .. })
    ));
    assert_eq!(p.global_transforms(), globals.as_slice());
    assert_eq!(p.skinning_matrices(), skinning.as_slice());
    assert!(approx(p.global_transforms()[0].w_axis.x, 2.0));
    Ok(())
}

#[test]
fn non_finite_time_step_is_ignored() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play_blend(lib.clip("walk").unwrap(), lib.clip("run").unwrap())?;
    p.advance(3.0);
    p.advance(f32::NAN);
    p.update(f32::INFINITY);
    p.advance(f32::NEG_INFINITY);
    assert!(approx(p.primary_time().unwrap(), 3.0));
    assert!(approx(p.secondary_time().unwrap(), 3.0));

    let matrices = p.evaluate(0.5)?;
    assert!(matrices.iter().all(|m| m.is_finite()));
    Ok(())
}

#[test]
fn rigid_root_translation_shifts_every_matrix() -> anyhow::Result<()> {
    init_logger();
    let delta = Vec3::new(3.0, -2.0, 7.5);
    let base = AnimationLibrary::load(&asset(Vec3::ZERO))?;
    let moved = AnimationLibrary::load(&asset(delta))?;

    let mut a = player(&base);
    let mut b = player(&moved);
    a.play(base.clip("sway").unwrap())?;
    b.play(moved.clip("sway").unwrap())?;
    a.advance(3.7);
    b.advance(3.7);

    let ma = a.evaluate(1.0)?.to_vec();
    let mb = b.evaluate(1.0)?.to_vec();
    for name in ["root", "spine", "head", "arm"] {
        let i = id(&base, name);
        let shifted = Mat4::from_translation(delta) * ma[i];
        assert!(mb[i].abs_diff_eq(shifted, EPSILON), "{name} did not shift rigidly");
    }
    Ok(())
}

// ============================================================================
// Dual clip
// ============================================================================

fn single_pose(lib: &AnimationLibrary, clip: &str, dt: f32) -> Vec<Mat4> {
    let mut p = player(lib);
    p.play(lib.clip(clip).unwrap()).unwrap();
    p.advance(dt);
    p.evaluate(1.0).unwrap().to_vec()
}

#[test]
fn blend_endpoints_reproduce_each_clip() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play_blend(lib.clip("walk").unwrap(), lib.clip("run").unwrap())?;
    assert_eq!(p.mode(), PlayerMode::DualClip);
    p.advance(2.5);

    let walk = single_pose(&lib, "walk", 2.5);
    let run = single_pose(&lib, "run", 2.5);

    assert!(mats_approx(p.evaluate(1.0)?, &walk));
    assert!(mats_approx(p.evaluate(0.0)?, &run));
    Ok(())
}

#[test]
fn blend_translation_is_monotonic() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play_blend(lib.clip("walk").unwrap(), lib.clip("run").unwrap())?;
    p.advance(2.0);

    let root = id(&lib, "root");
    let samples: Vec<Vec3> = (0..=10)
        .map(|i| {
            let f = i as f32 / 10.0;
            p.evaluate(f).unwrap()[root].w_axis.truncate()
        })
        .collect();

    // walk root at (2,0,0), run root at (0,0,3)
    assert!(samples[0].abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), EPSILON));
    assert!(samples[10].abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), EPSILON));
    for pair in samples.windows(2) {
        assert!(pair[1].x >= pair[0].x - EPSILON);
        assert!(pair[1].z <= pair[0].z + EPSILON);
        assert!(approx(pair[1].y, 0.0));
    }
    Ok(())
}

#[test]
fn blend_factor_outside_unit_range_fails() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play_blend(lib.clip("walk").unwrap(), lib.clip("run").unwrap())?;

    for bad in [1.5, -0.1, f32::NAN] {
        let err = p.evaluate(bad).unwrap_err();
        assert!(matches!(err, AnimationError::BlendFactorOutOfRange(_)), "{bad}");
        assert!(err.is_precondition());
    }
    assert!(p.skinning_matrices().iter().all(|m| *m == Mat4::IDENTITY));
    Ok(())
}

#[test]
fn dual_cursors_loop_independently() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play_blend(lib.clip("walk").unwrap(), lib.clip("run").unwrap())?;
    p.advance(6.0);
    assert!(approx(p.primary_time().unwrap(), 6.0));
    assert!(approx(p.secondary_time().unwrap(), 2.0));
    Ok(())
}

#[test]
fn single_bone_in_dual_mode_is_used_unweighted() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    // "short" only animates root; "sway" animates root and spine
    p.play_blend(lib.clip("short").unwrap(), lib.clip("sway").unwrap())?;
    p.advance(4.0);
    let dual = p.evaluate(1.0)?.to_vec();

    let sway = single_pose(&lib, "sway", 4.0);
    let spine = id(&lib, "spine");
    let root = id(&lib, "root");
    // With factor 1 root comes from "short", spine's local pose only from "sway"
    let expected_spine = dual[root] * sway[root].inverse() * sway[spine];
    assert!(dual[spine].abs_diff_eq(expected_spine, 1e-3));
    Ok(())
}

// ============================================================================
// Transitions
// ============================================================================

#[test]
fn swap_then_clear_promotes_secondary_with_its_time() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play(lib.clip("walk").unwrap())?;
    p.advance(3.0);
    p.start_secondary(lib.clip("run").unwrap())?;
    assert!(approx(p.primary_time().unwrap(), 3.0));
    assert!(approx(p.secondary_time().unwrap(), 0.0));

    p.advance(1.0);
    p.swap_primary_secondary()?;
    p.clear_secondary();

    assert_eq!(p.mode(), PlayerMode::SingleClip);
    assert_eq!(p.primary().unwrap().clip().name(), "run");
    assert!(approx(p.primary_time().unwrap(), 1.0));
    assert!(p.secondary().is_none());
    Ok(())
}

#[test]
fn play_drops_secondary_and_resets_time() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play_blend(lib.clip("walk").unwrap(), lib.clip("run").unwrap())?;
    p.advance(2.0);
    p.play(lib.clip("run").unwrap())?;
    assert_eq!(p.mode(), PlayerMode::SingleClip);
    assert!(approx(p.primary_time().unwrap(), 0.0));
    Ok(())
}

#[test]
fn invalid_transitions_leave_state_untouched() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);

    assert!(matches!(
        p.start_secondary(lib.clip("run").unwrap()),
        Err(AnimationError::PlayerIdle)
    ));
    assert_eq!(p.mode(), PlayerMode::Idle);

    p.play(lib.clip("walk").unwrap())?;
    p.advance(1.0);
    assert!(matches!(
        p.swap_primary_secondary(),
        Err(AnimationError::NoSecondaryClip)
    ));
    assert_eq!(p.mode(), PlayerMode::SingleClip);
    assert!(approx(p.primary_time().unwrap(), 1.0));

    p.clear_secondary();
    assert_eq!(p.mode(), PlayerMode::SingleClip);
    Ok(())
}

#[test]
fn clips_from_another_skeleton_are_rejected() -> anyhow::Result<()> {
    let lib = library();
    let other = AnimationLibrary::load(&asset(Vec3::ZERO))?;
    let mut p = player(&lib);

    let err = p.play(other.clip("walk").unwrap()).unwrap_err();
    assert!(matches!(err, AnimationError::SkeletonMismatch { ref clip } if clip == "walk"));
    assert!(err.is_precondition());

    p.play(lib.clip("walk").unwrap())?;
    assert!(p.start_secondary(other.clip("run").unwrap()).is_err());
    assert!(p.play_blend(lib.clip("walk").unwrap(), other.clip("run").unwrap()).is_err());
    assert_eq!(p.mode(), PlayerMode::SingleClip);
    Ok(())
}

// ============================================================================
// Crossfade
// ============================================================================

#[test]
fn crossfade_completes_into_secondary() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play(lib.clip("walk").unwrap())?;
    p.cross_fade(lib.clip("run").unwrap(), 1.0)?;
    assert_eq!(p.mode(), PlayerMode::DualClip);
    assert!(approx(p.current_blend_factor(), 1.0));

    p.update(0.25);
    assert!(approx(p.current_blend_factor(), 0.75));
    assert!(approx(p.crossfade().unwrap().progress(), 0.25));
    p.update_and_evaluate(0.0)?;

    p.update(1.0);
    assert_eq!(p.mode(), PlayerMode::SingleClip);
    assert_eq!(p.primary().unwrap().clip().name(), "run");
    assert!(approx(p.primary_time().unwrap(), 1.25));
    assert!(approx(p.current_blend_factor(), 1.0));
    Ok(())
}

#[test]
fn crossfade_rejects_bad_duration_and_idle_player() {
    let lib = library();
    let mut p = player(&lib);
    assert!(matches!(
        p.cross_fade(lib.clip("run").unwrap(), 1.0),
        Err(AnimationError::PlayerIdle)
    ));
    p.play(lib.clip("walk").unwrap()).unwrap();
    for bad in [0.0, -1.0, f32::INFINITY] {
        assert!(matches!(
            p.cross_fade(lib.clip("run").unwrap(), bad),
            Err(AnimationError::InvalidFade(_))
        ));
    }
    assert_eq!(p.mode(), PlayerMode::SingleClip);
}

#[test]
fn manual_swap_cancels_crossfade() -> anyhow::Result<()> {
    let lib = library();
    let mut p = player(&lib);
    p.play(lib.clip("walk").unwrap())?;
    p.cross_fade(lib.clip("run").unwrap(), 2.0)?;
    p.swap_primary_secondary()?;
    assert!(p.crossfade().is_none());
    p.update(5.0);
    assert_eq!(p.mode(), PlayerMode::DualClip);
    Ok(())
}

#[test]
fn players_can_move_between_threads() -> anyhow::Result<()> {
    fn assert_send<T: Send>() {}
    assert_send::<AnimationPlayer>();

    let lib = Arc::new(library());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let lib = Arc::clone(&lib);
            std::thread::spawn(move || {
                let mut p = player(&lib);
                p.play(lib.clip("walk").unwrap()).unwrap();
                p.advance(i as f32);
                p.evaluate(1.0).unwrap()[0].w_axis.x
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let x = handle.join().map_err(|_| anyhow::anyhow!("worker panicked"))?;
        assert!(approx(x, i as f32));
    }
    Ok(())
}
