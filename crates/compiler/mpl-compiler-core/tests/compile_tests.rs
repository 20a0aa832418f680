use mpl_compiler_core::{
    assemble, compile, parse, resolve_document, validate, AxisKind, BoneId, CompileError,
    CompilerConfig, Diagnostic, IdentKind, VmdMotion,
};

fn compile_default(src: &str) -> Result<mpl_compiler_core::Compiled, CompileError> {
    compile(src, &CompilerConfig::default())
}

#[test]
fn compiling_twice_is_byte_identical() {
    let src = "@pose a { head turn left 12.5, sway right 3; center move up 2; }\n\
               @pose b { arm_l bend forward 80; knee_r bend backward 40; }\n\
               @animation x { 0: a; 0.7: b; 1.3: a; }\n\
               @animation y { 0.2: b; 0.4: a; }\n\
               main { x; y; x; }";
    let first = compile_default(src).unwrap();
    let second = compile_default(src).unwrap();
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first, second);
}

#[test]
fn clamped_elbow_scenario() {
    let src = "@pose p1 { elbow_l bend forward 200; } @animation a { 0: p1; } main { a; }";
    let out = compile_default(src).unwrap();

    assert_eq!(out.warnings.len(), 1);
    let Diagnostic::RangeClamp(w) = &out.warnings[0] else {
        panic!("expected a clamp warning");
    };
    assert_eq!(w.bone, BoneId::ElbowL);
    assert_eq!(w.requested, 200.0);
    assert_eq!(w.limit, 180.0);

    let motion = VmdMotion::decode(&out.bytes).unwrap();
    assert_eq!(motion.bone_keyframes.len(), 1);
    let record = &motion.bone_keyframes[0];
    assert_eq!(record.bone_id(), Some(BoneId::ElbowL));
    assert_eq!(record.frame, 0);
}

#[test]
fn clamping_law_holds_for_every_overshoot() {
    let src = "@pose p {\n\
                 neck bend forward 75;\n\
                 leg_l sway right 31;\n\
                 thumb_r sway left 1000;\n\
                 base move left 250;\n\
               }";
    let validated = validate(parse(src).unwrap()).unwrap();
    let poses = resolve_document(&validated);
    let p = &poses["p"];
    assert_eq!(p.bone(BoneId::Neck).get(AxisKind::Pitch), 60.0);
    assert_eq!(p.bone(BoneId::LegL).get(AxisKind::Roll), 30.0);
    assert_eq!(p.bone(BoneId::ThumbR).get(AxisKind::Roll), -45.0);
    assert_eq!(p.bone(BoneId::Base).get(AxisKind::TranslateX), 100.0);
    assert_eq!(validated.warnings.len(), 4);
}

#[test]
fn rest_law_is_independent_of_other_poses() {
    let alone = resolve_document(&validate(parse("@pose q { head turn left 10; }").unwrap()).unwrap());
    let crowded = resolve_document(
        &validate(
            parse(
                "@pose a { arm_l bend forward 90; leg_r bend forward 90; }\n\
                 @pose q { head turn left 10; }\n\
                 @pose z { center move up 5; }",
            )
            .unwrap(),
        )
        .unwrap(),
    );
    assert_eq!(alone["q"], crowded["q"]);
    for bone in BoneId::ALL {
        if bone != BoneId::Head {
            assert!(crowded["q"].bone(bone).is_rest(), "{bone} should be at rest");
        }
    }
}

#[test]
fn unknown_pose_scenario() {
    let err = compile_default("@animation a { 0: x; }").unwrap_err();
    match err {
        CompileError::UnknownIdentifier { kind, name, .. } => {
            assert_eq!(kind, IdentKind::Pose);
            assert_eq!(name, "x");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn duplicate_timestamp_yields_no_bytes() {
    let result = compile_default(
        "@pose p { head turn left 5; } @animation a { 0: p; 0.5: p; 0.5: p; } main { a; }",
    );
    assert!(matches!(result, Err(CompileError::DuplicateTimestamp { .. })));
}

#[test]
fn second_animation_starts_at_first_ones_end() {
    let src = "@pose p { head turn left 10; } @pose q { head turn right 10; }\n\
               @animation a { 0: p; 1.5: q; }\n\
               @animation b { 0: p; 0.5: q; }\n\
               main { a; b; }";

    let validated = validate(parse(src).unwrap()).unwrap();
    let poses = resolve_document(&validated);
    let timeline = assemble(
        &validated.animations,
        &validated.main,
        &poses,
        &Default::default(),
    )
    .unwrap();
    let b_first = timeline
        .keyframes
        .iter()
        .find(|k| k.animation == "b")
        .unwrap();
    assert_eq!(b_first.time, 1.5);
    assert_eq!((b_first.time * 30.0).round() as u32, 45);

    // a's closing keyframe owns frame 45; b's opening keyframe follows it.
    let out = compile_default(src).unwrap();
    let motion = VmdMotion::decode(&out.bytes).unwrap();
    let frames: Vec<u32> = motion.keyframes_for(BoneId::Head).map(|k| k.frame).collect();
    assert_eq!(frames, vec![0, 45, 46, 60]);
    assert_eq!(out.duration_seconds, 2.0);
}

#[test]
fn empty_main_produces_an_empty_motion() {
    let out = compile_default("@pose p { head turn left 5; } @animation a { 0: p; }").unwrap();
    let motion = VmdMotion::decode(&out.bytes).unwrap();
    assert!(motion.bone_keyframes.is_empty());
    assert_eq!(out.frame_count, 0);
}

#[test]
fn unreferenced_animation_is_still_checked() {
    let err = compile_default(
        "@pose p { } @animation used { 0: p; } @animation unused { 0: missing; } main { used; }",
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::UnknownIdentifier { kind: IdentKind::Pose, .. }));
}

#[test]
fn frame_rate_is_configurable() {
    let src = "@pose p { head turn left 5; } @animation a { 0: p; 1: p; } main { a; }";
    let out = compile(src, &CompilerConfig::new(60.0)).unwrap();
    let motion = VmdMotion::decode(&out.bytes).unwrap();
    let frames: Vec<u32> = motion.bone_keyframes.iter().map(|k| k.frame).collect();
    assert_eq!(frames, vec![0, 60]);
}

#[test]
fn errors_report_location_and_category() {
    let err = compile_default("@pose p {\n  head bend left 10;\n}").unwrap_err();
    assert_eq!(err.category(), "syntax");
    assert_eq!(err.location(), Some((2, 13)));
    assert!(err.to_string().contains("expected 'forward' or 'backward' after 'bend'"));
}

#[test]
fn small_source_cannot_force_a_huge_motion() {
    let src = "@pose p { head turn left 10; }\n\
               @animation a { 0: p; 1: p; 2: p; 3: p; 4: p; }\n\
               main { a; a; a; a; }";
    let mut config = CompilerConfig::default();
    config.limits.max_output_records = 19;
    let err = compile(src, &config).unwrap_err();
    assert!(matches!(err, CompileError::InputTooLarge { limit: 19, .. }));

    config.limits.max_output_records = 20;
    assert_eq!(compile(src, &config).unwrap().record_count, 20);
}

#[test]
fn plain_compile_ignores_cache_capacity() {
    let config = CompilerConfig::default().with_cache_capacity(0);
    let out = compile("@pose p { head turn left 10; } @animation a { 0: p; } main { a; }", &config).unwrap();
    assert_eq!(out.record_count, 1);
}
