#![cfg(target_arch = "wasm32")]
use js_sys::{Reflect, Uint8Array};
use mpl_compiler_core::{CompilerConfig, VmdMotion};
use mpl_compiler_wasm::{abi_version, bone_names, constraint_table_version, WasmMPLCompiler};
use serde_wasm_bindgen as swb;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const WAVE: &str = "@pose up { arm_r bend backward 60; elbow_r bend forward 90; }\n\
                    @pose rest { }\n\
                    @animation wave { 0: rest; 0.5: up; 1: rest; }\n\
                    main { wave; }";

fn get(obj: &JsValue, key: &str) -> JsValue {
    Reflect::get(obj, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
    assert_eq!(constraint_table_version(), 1);
}

#[wasm_bindgen_test]
fn default_config_compiles_to_vmd() {
    let compiler = WasmMPLCompiler::new(JsValue::UNDEFINED).unwrap();
    assert_eq!(compiler.frame_rate(), 30.0);

    let bytes = compiler.compile(WAVE).unwrap();
    let motion = VmdMotion::decode(&bytes).unwrap();
    assert_eq!(motion.bone_keyframes.len(), 6);
}

#[wasm_bindgen_test]
fn config_object_is_honored() {
    let cfg = swb::to_value(&CompilerConfig::new(60.0)).unwrap();
    let compiler = WasmMPLCompiler::new(cfg).unwrap();
    assert_eq!(compiler.frame_rate(), 60.0);

    let bytes = compiler.compile(WAVE).unwrap();
    let motion = VmdMotion::decode(&bytes).unwrap();
    let last = motion.bone_keyframes.last().unwrap();
    assert_eq!(last.frame, 60);
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    let cfg = swb::to_value(&CompilerConfig::new(-1.0)).unwrap();
    assert!(WasmMPLCompiler::new(cfg).is_err());
}

#[wasm_bindgen_test]
fn diagnostics_report_success() {
    let compiler = WasmMPLCompiler::new(JsValue::NULL).unwrap();
    let report = compiler
        .compile_with_diagnostics("@pose p { elbow_l bend forward 200; } @animation a { 0: p; } main { a; }")
        .unwrap();

    assert_eq!(get(&report, "ok").as_bool(), Some(true));
    assert_eq!(get(&report, "record_count").as_f64(), Some(1.0));

    let warnings: js_sys::Array = get(&report, "warnings").dyn_into().unwrap();
    assert_eq!(warnings.length(), 1);
    assert_eq!(get(&warnings.get(0), "kind").as_string().as_deref(), Some("range_clamp"));

    let bytes: Uint8Array = get(&report, "bytes").dyn_into().unwrap();
    assert!(VmdMotion::decode(&bytes.to_vec()).is_ok());
}

#[wasm_bindgen_test]
fn diagnostics_report_failure_without_throwing() {
    let compiler = WasmMPLCompiler::new(JsValue::UNDEFINED).unwrap();
    let report = compiler
        .compile_with_diagnostics("@pose p {\n  tail bend forward 10;\n}")
        .unwrap();

    assert_eq!(get(&report, "ok").as_bool(), Some(false));
    assert!(get(&report, "bytes").is_undefined());
    let error = get(&report, "error");
    assert_eq!(get(&error, "category").as_string().as_deref(), Some("name"));
    assert_eq!(get(&error, "line").as_f64(), Some(2.0));
    assert_eq!(get(&error, "column").as_f64(), Some(3.0));
}

#[wasm_bindgen_test]
fn compile_throws_on_error() {
    let compiler = WasmMPLCompiler::new(JsValue::UNDEFINED).unwrap();
    assert!(compiler.compile("main { missing; }").is_err());
}

#[wasm_bindgen_test]
fn lists_bone_names() {
    let names = bone_names();
    assert_eq!(names.len(), 31);
    assert_eq!(names[0], "base");
    assert!(names.iter().any(|n| n == "elbow_l"));
}
