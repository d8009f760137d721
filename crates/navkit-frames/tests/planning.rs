use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use navkit_frames::{
    AdjustKind, Axis, CenterOfRotation, CoupleParams, FrameCouple, FrameError, OperationSide,
    PelvicTilt, Posture, RigidTransform,
};

fn params(side: OperationSide, tilt: PelvicTilt) -> CoupleParams {
    CoupleParams {
        side,
        pelvic_tilt: tilt,
        pivots: CenterOfRotation {
            right: Point3::new(10.0, 20.0, 30.0),
            left: Point3::new(10.0, 20.0, 30.0),
        },
        ..CoupleParams::default()
    }
}

fn postural_tilt() -> PelvicTilt {
    PelvicTilt {
        supine: 2.0,
        stand: -5.0,
        sit: 12.0,
    }
}

#[test]
fn right_plan_angles_per_posture() {
    let mut couple = FrameCouple::new(params(OperationSide::Right, postural_tilt()));
    couple.initialize().expect("init");
    assert_relative_eq!(
        couple.relationship().translation(),
        Vector3::new(-27.9911, -22.3538, 10.8077),
        epsilon = 1e-3
    );

    let angles = couple.clinical_angles().expect("angles");
    let expected = [
        (Posture::Supine, -40.8624, -11.8332),
        (Posture::Stand, -40.1277, -6.5071),
        (Posture::Sit, -42.7237, -19.2982),
    ];
    for (posture, inclination, version) in expected {
        let a = angles.get(posture);
        assert_relative_eq!(a.inclination, inclination, epsilon = 1e-3);
        assert_relative_eq!(a.version, version, epsilon = 1e-3);
    }
}

#[test]
fn left_plan_angles_per_posture() {
    let mut couple = FrameCouple::new(params(OperationSide::Left, postural_tilt()));
    couple.initialize().expect("init");
    let angles = couple.clinical_angles().expect("angles");
    let expected = [
        (Posture::Supine, 40.3882, 8.7968),
        (Posture::Stand, 41.3164, 14.0945),
        (Posture::Sit, 39.8268, 1.1402),
    ];
    for (posture, inclination, version) in expected {
        let a = angles.get(posture);
        assert_relative_eq!(a.inclination, inclination, epsilon = 1e-3);
        assert_relative_eq!(a.version, version, epsilon = 1e-3);
    }
}

#[test]
fn sides_mirror_each_other_without_supine_tilt() {
    for stand in [0.0, 10.0, -7.0] {
        let tilt = PelvicTilt {
            stand,
            ..PelvicTilt::default()
        };
        let mut right = FrameCouple::new(params(OperationSide::Right, tilt));
        let mut left = FrameCouple::new(params(OperationSide::Left, tilt));
        right.initialize().expect("right");
        left.initialize().expect("left");
        let r = right.cup_angles(Posture::Supine).expect("right angles");
        let l = left.cup_angles(Posture::Supine).expect("left angles");
        assert_relative_eq!(r.inclination, -l.inclination, epsilon = 1e-8);
        assert_relative_eq!(r.version, -l.version, epsilon = 1e-8);
    }
}

#[test]
fn nominal_offsets_match_reference_values() {
    let mut couple = FrameCouple::new(params(OperationSide::Right, PelvicTilt::default()));
    couple.initialize().expect("init");
    let off = couple.offsets().expect("offsets");
    assert_relative_eq!(off.superior_inferior, -21.2852, epsilon = 1e-3);
    assert_relative_eq!(off.medial_lateral, -16.9441, epsilon = 1e-3);
    assert_relative_eq!(off.anterior_posterior, 44.4555, epsilon = 1e-3);
}

#[test]
fn translating_the_cup_shifts_offsets() {
    let mut couple = FrameCouple::new(params(OperationSide::Left, PelvicTilt::default()));
    couple.initialize().expect("init");
    let before = couple.offsets().expect("before");

    couple.adjust(AdjustKind::Translate, Axis::Z, 2.5).expect("z");
    couple.adjust(AdjustKind::Translate, Axis::Y, -1.0).expect("y");
    let after = couple.offsets().expect("after");

    assert_relative_eq!(after.superior_inferior - before.superior_inferior, 2.5, epsilon = 1e-9);
    assert_relative_eq!(after.anterior_posterior - before.anterior_posterior, 1.0, epsilon = 1e-9);
    assert_relative_eq!(after.medial_lateral, before.medial_lateral, epsilon = 1e-9);
}

#[test]
fn rotating_the_cup_keeps_offsets() {
    let mut couple = FrameCouple::new(params(OperationSide::Right, postural_tilt()));
    couple.initialize().expect("init");
    let before = couple.offsets_in(Posture::Sit).expect("before");
    let angles_before = couple.cup_angles(Posture::Stand).expect("angles");

    couple.adjust(AdjustKind::Rotate, Axis::X, 5.0).expect("rotate");
    let after = couple.offsets_in(Posture::Sit).expect("after");
    let angles_after = couple.cup_angles(Posture::Stand).expect("angles");

    assert_relative_eq!(after.superior_inferior, before.superior_inferior, epsilon = 1e-9);
    assert_relative_eq!(after.medial_lateral, before.medial_lateral, epsilon = 1e-9);
    assert_relative_eq!(after.anterior_posterior, before.anterior_posterior, epsilon = 1e-9);
    assert!((angles_after.version - angles_before.version).abs() > 1.0);
}

#[test]
fn cup_follows_the_pelvis() {
    let mut couple = FrameCouple::new(params(OperationSide::Right, postural_tilt()));
    let pelvis = RigidTransform::from_axis_angle_deg(Axis::Y, -12.0)
        .pre_translate(Vector3::new(250.0, 80.0, -30.0));
    couple.set_geometry(pelvis);

    let moved = pelvis.pre_rotate(Axis::Z, 20.0);
    couple.set_geometry(moved);
    assert_relative_eq!(
        (moved.inverse() * couple.frame_b_world()).to_matrix(),
        couple.relationship().to_matrix(),
        epsilon = 1e-9
    );
}

#[test]
fn uninitialized_couple_has_no_angles() {
    let couple = FrameCouple::new(CoupleParams::default());
    assert_eq!(couple.clinical_angles(), Err(FrameError::NotInitialized));
    assert_eq!(couple.offsets(), Err(FrameError::NotInitialized));
}

#[test]
fn params_deserialize_with_defaults() {
    let p: CoupleParams = serde_json::from_str(
        r#"{"side": "left", "pelvic_tilt": {"stand": 4.5}, "pivots": {"left": [1, 2, 3]}}"#,
    )
    .expect("json");
    assert_eq!(p.side, OperationSide::Left);
    assert_relative_eq!(p.nominal_inclination, 40.0);
    assert_relative_eq!(p.pelvic_tilt.stand, 4.5);
    assert_relative_eq!(p.pelvic_tilt.sit, 0.0);
    assert_eq!(p.pivot(), Point3::new(1.0, 2.0, 3.0));
}
