use js_sys::{Reflect, Uint8Array};
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use mpl_compiler_core::{
    BoneId, CompileCache, CompileError, Compiled, CompilerConfig, Diagnostic,
    CONSTRAINT_TABLE_VERSION,
};

/// The compiler class host pages instantiate: `new WasmMPLCompiler()` then `compile(source)`.
#[wasm_bindgen]
pub struct WasmMPLCompiler {
    cache: CompileCache,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    category: &'static str,
    message: String,
    line: Option<usize>,
    column: Option<usize>,
    detail: &'a CompileError,
}

impl<'a> From<&'a CompileError> for ErrorReport<'a> {
    fn from(err: &'a CompileError) -> Self {
        let location = err.location();
        ErrorReport {
            category: err.category(),
            message: err.to_string(),
            line: location.map(|(line, _)| line),
            column: location.map(|(_, column)| column),
            detail: err,
        }
    }
}

#[derive(Serialize)]
struct CompileReport<'a> {
    ok: bool,
    warnings: &'a [Diagnostic],
    frame_count: usize,
    record_count: usize,
    duration_seconds: f64,
    error: Option<ErrorReport<'a>>,
}

fn js_error(err: &CompileError) -> JsError {
    JsError::new(&format!("{} error: {err}", err.category()))
}

#[wasm_bindgen]
impl WasmMPLCompiler {
    /// Create a compiler. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new WasmMPLCompiler({ frame_rate: 60, model_name: "" })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmMPLCompiler, JsError> {
        #[cfg(feature = "console_error")]
        console_error_panic_hook::set_once();

        let cfg: CompilerConfig = if jsvalue_is_undefined_or_null(&config) {
            CompilerConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let cache = CompileCache::new(cfg).map_err(|e| js_error(&e))?;
        Ok(WasmMPLCompiler { cache })
    }

    /// Compile MPL source to VMD bytes (a `Uint8Array` in JS). Throws on any compile error.
    #[wasm_bindgen]
    pub fn compile(&self, source: &str) -> Result<Vec<u8>, JsError> {
        self.cache
            .get_or_compile(source)
            .map(|out| out.bytes.clone())
            .map_err(|e| js_error(&e))
    }

    /// Compile without throwing. Returns
    /// `{ ok, bytes?, warnings, frame_count, record_count, duration_seconds, error? }`,
    /// where `error` carries `category`, `message`, `line` and `column`.
    #[wasm_bindgen(js_name = compile_with_diagnostics)]
    pub fn compile_with_diagnostics(&self, source: &str) -> Result<JsValue, JsError> {
        let result = self.cache.get_or_compile(source);
        let report = match &result {
            Ok(out) => report_for(out),
            Err(err) => CompileReport {
                ok: false,
                warnings: &[],
                frame_count: 0,
                record_count: 0,
                duration_seconds: 0.0,
                error: Some(ErrorReport::from(err)),
            },
        };
        let value = report
            .serialize(&swb::Serializer::new().serialize_maps_as_objects(true))
            .map_err(|e| JsError::new(&format!("report error: {e}")))?;

        if let Ok(out) = &result {
            Reflect::set(&value, &JsValue::from_str("bytes"), &Uint8Array::from(&out.bytes[..]))
                .map_err(|_| JsError::new("report error: could not attach bytes"))?;
        }
        Ok(value)
    }

    #[wasm_bindgen(getter)]
    pub fn frame_rate(&self) -> f64 {
        self.cache.config().frame_rate
    }

    /// Drop every cached compile result.
    #[wasm_bindgen(js_name = clear_cache)]
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn report_for(out: &Compiled) -> CompileReport<'_> {
    CompileReport {
        ok: true,
        warnings: &out.warnings,
        frame_count: out.frame_count,
        record_count: out.record_count,
        duration_seconds: out.duration_seconds,
        error: None,
    }
}

/// MPL bone names the compiler accepts, in record order.
#[wasm_bindgen(js_name = bone_names)]
pub fn bone_names() -> Vec<String> {
    BoneId::ALL.iter().map(|b| b.name().to_string()).collect()
}

/// Version of the bone limit table compiled into this module.
#[wasm_bindgen(js_name = constraint_table_version)]
pub fn constraint_table_version() -> u32 {
    CONSTRAINT_TABLE_VERSION
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
