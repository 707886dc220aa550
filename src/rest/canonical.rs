//! Canonical payloads for signing.
//!
//! The server recomputes the signature over exactly the bytes it receives,
//! so every payload must be produced deterministically:
//!
//! - GET: `key=value` pairs sorted by key, joined with `&`, nulls dropped,
//!   no URL encoding
//! - POST: the JSON body, after whole floats become integers and known fields
//!   are coerced to the type the server checks for
//! - FILE: a single-part multipart body with a fixed boundary

use std::path::Path;

use crate::error::P2pError;
use crate::params::{ParamValue, Params};
use crate::rest::endpoints::{HttpVerb, Operation};

/// Boundary token for file uploads. It must not vary, since the same bytes
/// are transmitted and signed.
pub const MULTIPART_BOUNDARY: &str = "boundary-for-file";

/// Form field and parameter name carrying the upload.
pub const UPLOAD_FIELD: &str = "upload_file";

/// Content type of GET and POST requests.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Fields the server expects as strings, at any nesting depth.
pub const STRING_COERCED: &[&str] = &[
    // identifiers
    "itemId",
    "id",
    "side",
    "currency_id",
    "tokenId",
    // ad pricing and amounts
    "priceType",
    "premium",
    "price",
    "minAmount",
    "maxAmount",
    "remark",
    "actionType",
    "quantity",
    "paymentPeriod",
    // tradingPreferenceSet
    "hasUnPostAd",
    "isKyc",
    "isEmail",
    "isMobile",
    "hasRegisterTime",
    "registerTimeThreshold",
    "orderFinishNumberDay30",
    "completeRateDay30",
    "nationalLimit",
    "hasOrderFinishNumberDay30",
    "hasCompleteRateDay30",
    "hasNationalLimit",
    // time range
    "beginTime",
    "endTime",
    // pagination cursor
    "startMessageId",
];

/// Fields the server expects as integers, at any nesting depth.
pub const INTEGER_COERCED: &[&str] = &["positionIdx"];

/// Type a field is coerced to before a POST body is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Render as a string
    ToString,
    /// Convert to an integer
    ToInteger,
}

/// Look up the coercion rule for a field name.
pub fn coercion_for(name: &str) -> Option<Coercion> {
    if STRING_COERCED.contains(&name) {
        Some(Coercion::ToString)
    } else if INTEGER_COERCED.contains(&name) {
        Some(Coercion::ToInteger)
    } else {
        None
    }
}

/// A signed request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalPayload {
    /// Sorted query string (GET)
    Query(String),
    /// JSON body (POST)
    Json(String),
    /// Multipart body (FILE)
    Multipart(Vec<u8>),
}

impl CanonicalPayload {
    /// The bytes folded into the signature.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            CanonicalPayload::Query(s) | CanonicalPayload::Json(s) => s.as_bytes(),
            CanonicalPayload::Multipart(bytes) => bytes,
        }
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Value for the `Content-Type` header.
    pub fn content_type(&self) -> String {
        match self {
            CanonicalPayload::Query(_) | CanonicalPayload::Json(_) => JSON_CONTENT_TYPE.to_string(),
            CanonicalPayload::Multipart(_) => {
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
            }
        }
    }

    /// Printable form for error reports and logs.
    pub fn describe(&self) -> String {
        match self {
            CanonicalPayload::Query(s) | CanonicalPayload::Json(s) => s.clone(),
            CanonicalPayload::Multipart(bytes) => format!("<multipart {} bytes>", bytes.len()),
        }
    }
}

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// File name sent in `Content-Disposition`
    pub filename: String,
    /// MIME type of the file
    pub content_type: String,
    /// Raw file contents
    pub data: Vec<u8>,
}

impl FilePart {
    /// Create a part, inferring the content type from the file name.
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = content_type_for(&filename).to_string();
        Self {
            filename,
            content_type,
            data,
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, P2pError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| P2pError::InvalidParameter {
                name: UPLOAD_FIELD.to_string(),
                reason: format!("'{}' does not name a file", path.display()),
            })?;
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(filename, data))
    }
}

/// MIME type for an upload, by extension. Falls back to `image/png`.
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        Some("mp4") => "video/mp4",
        _ => "image/png",
    }
}

/// Fail unless every required parameter is present.
///
/// Reports all missing names at once, in catalog order.
pub fn validate_required(operation: &Operation, params: &Params) -> Result<(), P2pError> {
    let missing: Vec<&'static str> = operation
        .required
        .iter()
        .copied()
        .filter(|name| !params.contains_key(name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(P2pError::MissingParameter {
            path: operation.path,
            missing,
        })
    }
}

/// Rewrite whole floats (`500.0`) as integers, at every depth.
pub fn normalize_numbers(params: &mut Params) {
    for (_, value) in params.iter_mut() {
        normalize_value(value);
    }
}

fn normalize_value(value: &mut ParamValue) {
    match value {
        ParamValue::Float(x) => {
            if let Some(i) = whole_float_to_i64(*x) {
                *value = ParamValue::Int(i);
            }
        }
        ParamValue::List(items) => items.iter_mut().for_each(normalize_value),
        ParamValue::Map(nested) => normalize_numbers(nested),
        _ => {}
    }
}

fn whole_float_to_i64(x: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    let in_range = x >= i64::MIN as f64 && x < i64::MAX as f64;
    (x.is_finite() && x.fract() == 0.0 && in_range).then_some(x as i64)
}

/// Apply the name-based coercion rules, recursing into nested objects.
///
/// Objects inside arrays are visited too; scalars inside arrays and null
/// values are left alone. Booleans become lowercase `"true"`/`"false"` under
/// string coercion and `1`/`0` under integer coercion.
pub fn coerce_types(params: &mut Params) -> Result<(), P2pError> {
    for (name, value) in params.iter_mut() {
        match value {
            ParamValue::Map(nested) => coerce_types(nested)?,
            ParamValue::List(items) => {
                for item in items.iter_mut() {
                    if let ParamValue::Map(nested) = item {
                        coerce_types(nested)?;
                    }
                }
            }
            ParamValue::Null => {}
            _ => match coercion_for(name) {
                Some(Coercion::ToString) => coerce_to_string(value),
                Some(Coercion::ToInteger) => coerce_to_integer(name, value)?,
                None => {}
            },
        }
    }
    Ok(())
}

fn coerce_to_string(value: &mut ParamValue) {
    if !matches!(value, ParamValue::Str(_)) {
        *value = ParamValue::Str(value.to_string());
    }
}

fn coerce_to_integer(name: &str, value: &mut ParamValue) -> Result<(), P2pError> {
    let invalid = |reason: String| P2pError::InvalidParameter {
        name: name.to_string(),
        reason,
    };

    let coerced = match value {
        ParamValue::Int(_) => return Ok(()),
        ParamValue::Bool(b) => i64::from(*b),
        ParamValue::Float(x) if x.is_finite() => x.trunc() as i64,
        ParamValue::Float(x) => return Err(invalid(format!("{x} is not a finite number"))),
        ParamValue::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("'{s}' is not an integer")))?,
        other => return Err(invalid(format!("{other} cannot be converted to an integer"))),
    };
    *value = ParamValue::Int(coerced);
    Ok(())
}

/// Sorted `key=value` query string. Null values are dropped and nothing is
/// percent-encoded, so a `#` would start a URL fragment and cut the query
/// short of what was signed. [`canonicalize`] rejects such parameters.
pub fn canonical_query(params: &Params) -> String {
    let mut pairs: Vec<(&str, &ParamValue)> =
        params.iter().filter(|(_, value)| !value.is_null()).collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Coerced JSON body, keys in insertion order.
pub fn canonical_json(params: &mut Params) -> Result<String, P2pError> {
    coerce_types(params)?;
    Ok(serde_json::to_string(params)?)
}

/// Single-part multipart body for an upload.
pub fn multipart_body(part: &FilePart) -> Vec<u8> {
    let header = format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{UPLOAD_FIELD}\"; filename=\"{}\"\r\n\
         Content-Type: {}\r\n\r\n",
        part.filename, part.content_type
    );
    let trailer = format!("\r\n--{MULTIPART_BOUNDARY}--\r\n");

    let mut body = Vec::with_capacity(header.len() + part.data.len() + trailer.len());
    body.extend_from_slice(header.as_bytes());
    body.extend_from_slice(&part.data);
    body.extend_from_slice(trailer.as_bytes());
    body
}

/// Fail if a GET parameter would be truncated at a URL fragment marker.
fn reject_fragment_markers(params: &Params) -> Result<(), P2pError> {
    for (name, value) in params.iter() {
        if name.contains('#') || value.to_string().contains('#') {
            return Err(P2pError::InvalidParameter {
                name: name.to_string(),
                reason: "'#' cannot be sent in a query string".to_string(),
            });
        }
    }
    Ok(())
}

/// Produce the canonical payload for a request.
///
/// `upload` must be supplied for [`HttpVerb::File`] operations and is
/// ignored otherwise.
pub fn canonicalize(
    verb: HttpVerb,
    mut params: Params,
    upload: Option<&FilePart>,
) -> Result<CanonicalPayload, P2pError> {
    normalize_numbers(&mut params);
    match verb {
        HttpVerb::Get => {
            reject_fragment_markers(&params)?;
            Ok(CanonicalPayload::Query(canonical_query(&params)))
        }
        HttpVerb::Post => Ok(CanonicalPayload::Json(canonical_json(&mut params)?)),
        HttpVerb::File => {
            let part = upload.ok_or_else(|| P2pError::InvalidParameter {
                name: UPLOAD_FIELD.to_string(),
                reason: "no file supplied for upload".to_string(),
            })?;
            Ok(CanonicalPayload::Multipart(multipart_body(part)))
        }
    }
}
