use approx::assert_relative_eq;
use indexmap::IndexMap;
use mpl_compiler_core::vmd::{euler_to_quaternion, EulerDegrees, LINEAR_INTERPOLATION};
use mpl_compiler_core::{
    compile, parse, resolve_document, validate, AxisKind, BoneId, CompilerConfig, ResolvedPose,
    VmdMotion,
};

const SRC: &str = "\
@pose lean {
    upper_body bend forward 30, turn left 20, sway right 10;
    head bend backward 15, turn right 45;
    center move left 1.5, move up 0.25, move backward 3;
}
@pose kick {
    leg_r bend forward 120;
    knee_r bend backward 60;
    elbow_l bend forward 150;
}
@animation a { 0: lean; 0.4: kick; 1: lean; }
main { a; }
";

fn resolved() -> IndexMap<String, ResolvedPose> {
    resolve_document(&validate(parse(SRC).unwrap()).unwrap())
}

fn decoded() -> VmdMotion {
    let out = compile(SRC, &CompilerConfig::default()).unwrap();
    VmdMotion::decode(&out.bytes).unwrap()
}

#[test]
fn records_grouped_by_bone_in_declaration_order() {
    let motion = decoded();
    let order: Vec<BoneId> = motion
        .bone_keyframes
        .iter()
        .map(|k| k.bone_id().unwrap())
        .collect();
    let mut expected = Vec::new();
    for bone in [
        BoneId::Center,
        BoneId::UpperBody,
        BoneId::Head,
        BoneId::ElbowL,
        BoneId::LegR,
        BoneId::KneeR,
    ] {
        expected.extend([bone; 3]);
    }
    assert_eq!(order, expected);

    for bone in [BoneId::Center, BoneId::Head, BoneId::KneeR] {
        let frames: Vec<u32> = motion.keyframes_for(bone).map(|k| k.frame).collect();
        assert_eq!(frames, vec![0, 12, 30]);
    }
    assert!(motion
        .bone_keyframes
        .iter()
        .all(|k| k.interpolation == LINEAR_INTERPOLATION));
}

#[test]
fn decoded_angles_match_resolved_poses() {
    let poses = resolved();
    let motion = decoded();
    let pose_at = |frame: u32| match frame {
        12 => &poses["kick"],
        _ => &poses["lean"],
    };

    for record in &motion.bone_keyframes {
        let bone = record.bone_id().unwrap();
        let expected = pose_at(record.frame).bone(bone);
        let pitch = expected.get(AxisKind::Pitch);

        if pitch.abs() < 90.0 {
            let angles = record.euler_degrees();
            assert_relative_eq!(angles.pitch, pitch, epsilon = 1e-3);
            assert_relative_eq!(angles.yaw, expected.get(AxisKind::Yaw), epsilon = 1e-3);
            assert_relative_eq!(angles.roll, expected.get(AxisKind::Roll), epsilon = 1e-3);
        } else {
            // Past 90 degrees of pitch the Euler triple is not unique; compare rotations.
            let want = euler_to_quaternion(EulerDegrees {
                pitch,
                yaw: expected.get(AxisKind::Yaw),
                roll: expected.get(AxisKind::Roll),
            });
            let got = euler_to_quaternion(record.euler_degrees());
            assert_relative_eq!(want.angle_to(&got), 0.0, epsilon = 1e-3);
        }

        let t = expected.translation();
        for (got, want) in record.translation.iter().zip(t) {
            assert_relative_eq!(f64::from(*got), want, epsilon = 1e-6);
        }
    }
}

#[test]
fn translation_signs() {
    let motion = decoded();
    let center = motion.keyframes_for(BoneId::Center).next().unwrap();
    assert_eq!(center.translation, [1.5, 0.25, 3.0]);
}

#[test]
fn trailing_section_counts_are_zero() {
    let motion = decoded();
    assert_eq!(
        (
            motion.morph_count,
            motion.camera_count,
            motion.light_count,
            motion.self_shadow_count,
            motion.ik_count
        ),
        (0, 0, 0, 0, 0)
    );
}

#[test]
fn model_name_round_trips() {
    let out = compile(SRC, &CompilerConfig::default().with_model_name("初音ミク")).unwrap();
    let motion = VmdMotion::decode(&out.bytes).unwrap();
    assert_eq!(motion.model_name, "初音ミク");
}
