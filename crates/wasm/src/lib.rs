//! wasm-bindgen exports.
//!
//! This module exposes the comment stripper to JavaScript via `wasm-bindgen`. Offsets and
//! lengths crossing the boundary are UTF-16 code units, like JavaScript string indices.

use wasm_bindgen::prelude::*;

use strip_comments::{
    Dialect, ErrorReport, SUPPORTED_EXTENSIONS, StripError, StripOptions as StripOptionsInner,
    StripResult as StripResultInner, strip_comments, strip_comments_with_sourcemap,
    utf16::Utf16Offsets,
};

/// Options for `stripComments`. Every field may be omitted.
#[derive(Debug, Clone, Default, serde::Deserialize, tsify::Tsify)]
#[serde(rename_all = "camelCase", default)]
pub struct StripOptions {
    /// Used in error messages and as the sourcemap source.
    #[tsify(optional)]
    pub filename: Option<String>,
    /// Plugin names to parse with, instead of searching the default dialect list.
    #[tsify(optional)]
    pub dialect: Option<Vec<String>>,
    /// Report the failure located furthest into the source instead of the last one.
    #[tsify(optional)]
    pub report_furthest_error: Option<bool>,
}

impl StripOptions {
    fn into_inner(self) -> Result<StripOptionsInner, JsValue> {
        let dialect = match self.dialect {
            Some(names) => Some(
                Dialect::from_names(names)
                    .map_err(|e| JsValue::from(js_sys::TypeError::new(&e.to_string())))?,
            ),
            None => None,
        };
        let error_report = if self.report_furthest_error.unwrap_or(false) {
            ErrorReport::Furthest
        } else {
            ErrorReport::Last
        };
        Ok(StripOptionsInner {
            filename: self.filename,
            dialect,
            error_report,
            ..StripOptionsInner::default()
        })
    }
}

/// A removed `[start, end)` range of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, tsify::Tsify)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, tsify::Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi)]
pub struct StripResult {
    pub code: String,
    pub comment_count: usize,
    pub removed_chars: usize,
    pub removed_ranges: Vec<Range>,
}

/// Output from the wasm API when a sourcemap is requested.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, tsify::Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi)]
pub struct StripOutput {
    #[serde(flatten)]
    pub result: StripResult,
    /// Sourcemap JSON mapping `code` back to the input.
    pub sourcemap: String,
}

/// Re-express a byte-based result in UTF-16 code units of `source`.
fn to_utf16(source: &str, res: StripResultInner) -> StripResult {
    let mut offsets = Utf16Offsets::new(source);
    let removed_ranges: Vec<Range> = res
        .removed_ranges
        .iter()
        .map(|span| Range {
            start: offsets.convert(span.start),
            end: offsets.convert(span.end),
        })
        .collect();

    StripResult {
        code: res.code,
        comment_count: res.comment_count,
        removed_chars: removed_ranges.iter().map(|r| r.end - r.start).sum(),
        removed_ranges,
    }
}

fn to_js_error(err: StripError) -> JsValue {
    let js_err = js_sys::Error::new(&err.to_string());
    if matches!(err, StripError::DialectResolution { .. }) {
        js_err.set_name("DialectResolutionError");
    }
    js_err.into()
}

/// Validate the raw arguments shared by both exports.
fn prepare(code: &JsValue, options: JsValue) -> Result<(String, StripOptionsInner), JsValue> {
    console_error_panic_hook::set_once();

    let Some(code) = code.as_string() else {
        return Err(js_sys::TypeError::new("`code` must be a string").into());
    };
    let options: StripOptions = if options.is_undefined() || options.is_null() {
        StripOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from(js_sys::TypeError::new(&e.to_string())))?
    };
    Ok((code, options.into_inner()?))
}

/// Remove every comment from `code`.
///
/// Throws a `TypeError` if `code` is not a string, and an `Error` named
/// `DialectResolutionError` if no dialect can parse it.
#[wasm_bindgen(js_name = stripComments)]
pub fn strip(
    #[wasm_bindgen(unchecked_param_type = "string")] code: JsValue,
    #[wasm_bindgen(unchecked_optional_param_type = "StripOptions")] options: JsValue,
) -> Result<StripResult, JsValue> {
    let (code, options) = prepare(&code, options)?;
    let res = strip_comments(&code, &options).map_err(to_js_error)?;
    Ok(to_utf16(&code, res))
}

/// Like `stripComments`, also returning a sourcemap for the output.
#[wasm_bindgen(js_name = stripCommentsWithSourcemap)]
pub fn strip_with_sourcemap(
    #[wasm_bindgen(unchecked_param_type = "string")] code: JsValue,
    #[wasm_bindgen(unchecked_optional_param_type = "StripOptions")] options: JsValue,
) -> Result<StripOutput, JsValue> {
    let (code, options) = prepare(&code, options)?;
    let out = strip_comments_with_sourcemap(&code, &options).map_err(to_js_error)?;
    Ok(StripOutput {
        result: to_utf16(&code, out.result),
        sourcemap: out.sourcemap,
    })
}

/// File extensions (without the dot) the stripper understands.
#[wasm_bindgen(js_name = supportedExtensions)]
pub fn supported_extensions() -> Vec<String> {
    SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}
