use approx::assert_abs_diff_eq;
use nalgebra::{UnitQuaternion, Vector3};
use vizij_keyframe_core::{
    AnimationTarget, Channel, EntityId, FrameIndex, HandleSide, InMemoryScene, Interpolation,
    KeyframeEngine, KeyframeError, KeyframeMove, KeyframeRef, PlaybackContext, Pose, RootBinding,
    SceneGraph, Vec2,
};

const FPS: f64 = 30.0;

fn ctx(time: f64) -> PlaybackContext {
    PlaybackContext::new(time, FPS).unwrap()
}

fn set_x(scene: &mut InMemoryScene, entity: EntityId, x: f64) {
    if let Some(pose) = scene.find_entity_mut(entity) {
        pose.position.x = x;
    }
}

/// Root track on entity 1 with one keyframe per (frame, x).
fn keyed(frames: &[(i64, f64)]) -> (KeyframeEngine, InMemoryScene, AnimationTarget) {
    let mut engine = KeyframeEngine::default();
    let mut scene = InMemoryScene::new();
    scene.insert_entity(EntityId(1), Pose::identity());
    let target = AnimationTarget::root(EntityId(1));
    for &(frame, x) in frames {
        set_x(&mut scene, EntityId(1), x);
        engine
            .add_keyframe(
                &scene,
                &target,
                FrameIndex::new(frame).to_time(FPS),
                Interpolation::Linear,
                &ctx(0.0),
            )
            .unwrap();
    }
    (engine, scene, target)
}

fn x_at(engine: &KeyframeEngine, target: &AnimationTarget, frame: i64) -> Option<f64> {
    engine
        .store()
        .keyframe(target, FrameIndex::new(frame))
        .map(|kf| kf.position.x)
}

fn assert_frames_consistent(engine: &KeyframeEngine, target: &AnimationTarget) {
    let track = engine.store().get_track(target).unwrap();
    for kf in track.iter() {
        assert_eq!(kf.frame(), FrameIndex::from_time(kf.time(), FPS));
    }
}

#[test]
fn add_then_resolve_round_trips_captured_transform() {
    let mut scene = InMemoryScene::new();
    let captured = Pose::new(
        Vector3::new(1.0, -2.0, 3.5),
        UnitQuaternion::from_euler_angles(0.3, -0.2, 0.5),
        Vector3::new(1.0, 2.0, 0.5),
    );
    scene.insert_entity(EntityId(4), Pose::identity());
    scene.insert_bone(EntityId(4), "neck", captured);
    let target = AnimationTarget::bone(EntityId(4), "neck");

    let mut engine = KeyframeEngine::default();
    engine
        .add_keyframe(&scene, &target, 0.0, Interpolation::Bezier, &ctx(0.0))
        .unwrap();
    let frame = engine
        .add_keyframe(&scene, &target, 0.51, Interpolation::Bezier, &ctx(0.0))
        .unwrap();
    assert_eq!(frame, FrameIndex::new(15));

    let resolved = engine.resolve_pose(&target, &ctx(0.51)).unwrap();
    assert_eq!(resolved, captured);
}

#[test]
fn add_overwrites_same_frame() {
    let (mut engine, mut scene, target) = keyed(&[(3, 1.0)]);
    set_x(&mut scene, EntityId(1), 7.0);
    // 0.105 s rounds to frame 3 as well
    engine
        .add_keyframe(&scene, &target, 0.105, Interpolation::Constant, &ctx(0.0))
        .unwrap();
    assert_eq!(engine.store().sorted_frames(&target), vec![FrameIndex::new(3)]);
    assert_eq!(x_at(&engine, &target, 3), Some(7.0));
}

#[test]
fn deleting_only_keyframe_removes_track() {
    let (mut engine, _scene, target) = keyed(&[(12, 2.0)]);
    assert!(engine.store().has_custom_animation(&target));

    let report = engine.delete_keyframes(&[KeyframeRef::new(target.clone(), FrameIndex::new(12))]);
    assert_eq!(report.applied, 1);
    assert!(report.is_clean());
    assert!(!engine.store().has_custom_animation(&target));
    assert!(engine.store().root_binding(EntityId(1)).is_none());
    assert!(engine.channel_series(&target, Channel::PositionX).is_empty());
    assert!(engine.resolve_pose(&target, &ctx(0.4)).is_none());
}

#[test]
fn missing_selection_is_a_no_op() {
    let (mut engine, _scene, target) = keyed(&[(0, 1.0), (10, 2.0)]);
    let other = AnimationTarget::bone(EntityId(1), "ghost");

    let report = engine.delete_keyframes(&[
        KeyframeRef::new(target.clone(), FrameIndex::new(4)),
        KeyframeRef::new(other.clone(), FrameIndex::new(0)),
    ]);
    assert_eq!(report.applied, 0);
    assert_eq!(report.warnings.len(), 2);
    assert!(report.warnings.iter().all(|w| w.is_not_found()));
    assert!(matches!(report.warnings[0], KeyframeError::KeyframeNotFound { .. }));
    assert!(matches!(report.warnings[1], KeyframeError::TrackNotFound { .. }));

    let before = engine.store().clone();
    assert!(engine
        .set_interpolation(&target, FrameIndex::new(4), Interpolation::Bezier)
        .is_err());
    assert!(engine
        .move_handle(
            &other,
            FrameIndex::new(0),
            Channel::ScaleY,
            HandleSide::In,
            Vec2::new(0.0, 0.0),
        )
        .is_err());
    assert!(engine
        .move_keyframe(&target, FrameIndex::new(99), 1.0, &ctx(0.0))
        .is_err());
    assert_eq!(
        engine.store().sorted_frames(&target),
        before.sorted_frames(&target)
    );
    assert_eq!(engine.store().track_count(), before.track_count());
}

#[test]
fn crossing_batch_move_keeps_both_keyframes() {
    let (mut engine, _scene, target) = keyed(&[(5, 50.0), (10, 100.0)]);
    let report = engine.apply_moves(
        &[
            KeyframeMove::new(target.clone(), FrameIndex::new(5), 10.0 / FPS),
            KeyframeMove::new(target.clone(), FrameIndex::new(10), 5.0 / FPS),
        ],
        &ctx(0.0),
    );
    assert_eq!(report.applied, 2);
    assert!(report.is_clean());
    assert_eq!(
        engine.store().sorted_frames(&target),
        vec![FrameIndex::new(5), FrameIndex::new(10)]
    );
    assert_eq!(x_at(&engine, &target, 10), Some(50.0));
    assert_eq!(x_at(&engine, &target, 5), Some(100.0));
    assert_frames_consistent(&engine, &target);
}

#[test]
fn drag_onto_neighbour_frame_keeps_both() {
    let (mut engine, _scene, target) = keyed(&[(5, 50.0), (10, 100.0)]);
    let selection = [
        KeyframeRef::new(target.clone(), FrameIndex::new(5)),
        KeyframeRef::new(target.clone(), FrameIndex::new(10)),
    ];
    let mut session = engine
        .begin_drag(&selection, &selection[0], &ctx(0.0))
        .unwrap();
    // 5 frames and a bit; the primary snaps to frame 10
    engine.update_drag(&mut session, 5.3 / FPS);
    let preview = session.preview();
    assert_eq!(preview[0].to_frame, FrameIndex::new(10));
    assert_eq!(preview[1].to_frame, FrameIndex::new(15));
    // Nothing written until commit
    assert_eq!(x_at(&engine, &target, 5), Some(50.0));

    let report = engine.commit_drag(session);
    assert_eq!(report.applied, 2);
    assert_eq!(
        engine.store().sorted_frames(&target),
        vec![FrameIndex::new(10), FrameIndex::new(15)]
    );
    assert_eq!(x_at(&engine, &target, 10), Some(50.0));
    assert_eq!(x_at(&engine, &target, 15), Some(100.0));
    assert_frames_consistent(&engine, &target);
}

#[test]
fn drag_across_targets_moves_in_lockstep() {
    let (mut engine, mut scene, root) = keyed(&[(0, 1.0)]);
    scene.insert_bone(EntityId(1), "arm", Pose::identity());
    let arm = AnimationTarget::bone(EntityId(1), "arm");
    engine
        .add_keyframe(&scene, &arm, 0.5, Interpolation::Linear, &ctx(0.0))
        .unwrap();

    let selection = [
        KeyframeRef::new(root.clone(), FrameIndex::new(0)),
        KeyframeRef::new(arm.clone(), FrameIndex::new(15)),
    ];
    let mut session = engine
        .begin_drag(&selection, &selection[1], &ctx(0.0))
        .unwrap();
    engine.update_drag(&mut session, 0.2);
    let report = engine.commit_drag(session);

    assert_eq!(report.applied, 2);
    assert_eq!(engine.store().sorted_frames(&root), vec![FrameIndex::new(6)]);
    assert_eq!(engine.store().sorted_frames(&arm), vec![FrameIndex::new(21)]);
}

#[test]
fn abandoned_drag_changes_nothing() {
    let (engine, _scene, target) = keyed(&[(5, 50.0)]);
    let primary = KeyframeRef::new(target.clone(), FrameIndex::new(5));
    let mut session = engine.begin_drag(&[], &primary, &ctx(0.0)).unwrap();
    session.update_drag(1.0);
    drop(session);
    assert_eq!(engine.store().sorted_frames(&target), vec![FrameIndex::new(5)]);
}

#[test]
fn commit_skips_keyframes_deleted_mid_drag() {
    let (mut engine, _scene, target) = keyed(&[(0, 1.0), (30, 2.0)]);
    let selection = [
        KeyframeRef::new(target.clone(), FrameIndex::new(0)),
        KeyframeRef::new(target.clone(), FrameIndex::new(30)),
    ];
    let mut session = engine
        .begin_drag(&selection, &selection[0], &ctx(0.0))
        .unwrap();
    session.update_drag(0.1);
    engine
        .delete_keyframe(&target, FrameIndex::new(30))
        .unwrap();

    let report = engine.commit_drag(session);
    assert_eq!(report.applied, 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(engine.store().sorted_frames(&target), vec![FrameIndex::new(3)]);
}

#[test]
fn commit_keeps_handle_edit_made_mid_drag() {
    let (mut engine, _scene, target) = keyed(&[(0, 1.0)]);
    let primary = KeyframeRef::new(target.clone(), FrameIndex::new(0));
    let mut session = engine.begin_drag(&[], &primary, &ctx(0.0)).unwrap();
    engine
        .move_handle(
            &target,
            FrameIndex::new(0),
            Channel::PositionX,
            HandleSide::Out,
            Vec2::new(0.5, 3.0),
        )
        .unwrap();
    engine
        .set_interpolation(&target, FrameIndex::new(0), Interpolation::Bezier)
        .unwrap();
    session.update_drag(0.1);

    let report = engine.commit_drag(session);
    assert_eq!(report.applied, 1);
    let kf = engine.store().keyframe(&target, FrameIndex::new(3)).unwrap();
    assert_eq!(kf.handles[Channel::PositionX].out_offset, Vec2::new(0.5, 2.0));
    assert_eq!(kf.interpolation, Interpolation::Bezier);
}

#[test]
fn commit_keeps_keyframe_re_added_mid_drag() {
    let (mut engine, mut scene, target) = keyed(&[(0, 0.0)]);
    let primary = KeyframeRef::new(target.clone(), FrameIndex::new(0));
    let mut session = engine.begin_drag(&[], &primary, &ctx(0.0)).unwrap();
    engine.delete_keyframe(&target, FrameIndex::new(0)).unwrap();
    set_x(&mut scene, EntityId(1), 42.0);
    engine
        .add_keyframe(&scene, &target, 0.0, Interpolation::Linear, &ctx(0.0))
        .unwrap();
    session.update_drag(0.1);

    let report = engine.commit_drag(session);
    assert_eq!(report.applied, 1);
    assert_eq!(engine.store().sorted_frames(&target), vec![FrameIndex::new(3)]);
    assert_eq!(x_at(&engine, &target, 3), Some(42.0));
}

#[test]
fn single_move_keeps_values_and_rederives_frame() {
    let (mut engine, _scene, target) = keyed(&[(0, 1.0), (30, 2.0)]);
    let frame = engine
        .move_keyframe(&target, FrameIndex::new(30), 0.517, &ctx(0.0))
        .unwrap();
    assert_eq!(frame, FrameIndex::new(16));
    let kf = engine.store().keyframe(&target, frame).unwrap();
    assert_eq!(kf.time(), 0.517);
    assert_eq!(kf.position.x, 2.0);
    assert!(engine.store().keyframe(&target, FrameIndex::new(30)).is_none());
    assert_frames_consistent(&engine, &target);
}

#[test]
fn negative_move_is_clamped_to_zero() {
    let (mut engine, _scene, target) = keyed(&[(9, 1.0)]);
    let report = engine.apply_moves(
        &[KeyframeMove::new(target.clone(), FrameIndex::new(9), -2.0)],
        &ctx(0.0),
    );
    assert_eq!(report.applied, 1);
    assert_eq!(report.warnings[0].category(), "range");
    assert_eq!(engine.store().sorted_frames(&target), vec![FrameIndex::new(0)]);
}

#[test]
fn set_interpolation_returns_previous_mode() {
    let (mut engine, _scene, target) = keyed(&[(0, 0.0), (30, 10.0)]);
    let previous = engine
        .set_interpolation(&target, FrameIndex::new(0), Interpolation::Constant)
        .unwrap();
    assert_eq!(previous, Interpolation::Linear);
    let pose = engine.resolve_pose(&target, &ctx(0.5)).unwrap();
    assert_eq!(pose.position.x, 0.0);
}

#[test]
fn in_handle_follows_channel_value() {
    let (mut engine, _scene, target) = keyed(&[(0, 0.0), (30, 10.0)]);
    let handle = engine
        .move_handle(
            &target,
            FrameIndex::new(30),
            Channel::PositionX,
            HandleSide::In,
            Vec2::new(0.7, 12.0),
        )
        .unwrap();
    assert_abs_diff_eq!(handle.in_offset.x, -0.3, epsilon = 1e-12);
    assert_abs_diff_eq!(handle.in_offset.y, 2.0, epsilon = 1e-12);
    let series = engine.channel_series(&target, Channel::PositionX);
    assert_eq!(series[1].handle_in, handle.in_offset);
}

#[test]
fn root_binding_follows_skeleton_root_and_is_kept() {
    let mut scene = InMemoryScene::new();
    scene.insert_entity(EntityId(8), Pose::identity());
    scene.insert_bone(
        EntityId(8),
        "hips",
        Pose::from_position(Vector3::new(0.0, 0.9, 0.0)),
    );
    scene.set_skeleton_root(EntityId(8), "hips");
    let root = AnimationTarget::root(EntityId(8));

    let mut engine = KeyframeEngine::default();
    engine
        .add_keyframe(&scene, &root, 0.0, Interpolation::Linear, &ctx(0.0))
        .unwrap();
    assert_eq!(
        engine.store().root_binding(EntityId(8)),
        Some(&RootBinding::Bone("hips".into()))
    );
    let kf = engine.store().keyframe(&root, FrameIndex::new(0)).unwrap();
    assert_eq!(kf.position.y, 0.9);

    // A later skeleton change does not rebind an animated root
    scene.insert_bone(EntityId(8), "pelvis", Pose::identity());
    scene.set_skeleton_root(EntityId(8), "pelvis");
    engine
        .add_keyframe(&scene, &root, 1.0, Interpolation::Linear, &ctx(0.0))
        .unwrap();
    assert_eq!(
        engine.store().root_binding(EntityId(8)),
        Some(&RootBinding::Bone("hips".into()))
    );
}

#[test]
fn add_on_missing_entity_is_rejected() {
    let mut engine = KeyframeEngine::default();
    let scene = InMemoryScene::new();
    let err = engine
        .add_keyframe(
            &scene,
            &AnimationTarget::root(EntityId(77)),
            0.0,
            Interpolation::Linear,
            &ctx(0.0),
        )
        .unwrap_err();
    assert_eq!(err, KeyframeError::EntityNotFound { entity: EntityId(77) });
    assert!(engine.store().root_binding(EntityId(77)).is_none());
}

#[test]
fn clear_drops_everything() {
    let (mut engine, _scene, _target) = keyed(&[(0, 0.0), (30, 10.0)]);
    engine.clear();
    assert!(engine.store().is_empty());
    assert!(engine.store().animated_entities().is_empty());
}
