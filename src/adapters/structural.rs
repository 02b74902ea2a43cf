//! Values derived purely from a node's declared type and constraints
//!
//! Objects and arrays are walked by the engine; this module covers the leaf
//! kinds plus `enum`/`const`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use fake::faker::internet::en::{IPv4, IPv6, Password, SafeEmail};
use fake::faker::lorem::en::{Word, Words};
use fake::Fake;
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::{json, Value};
use tracing::debug;

use super::fake_provider::{
    domain_name, format_date, format_datetime, random_datetime, random_uuid,
};
use super::pattern;
use crate::domain::{ExclusiveBound, SchemaKind, SchemaNode};

const DEFAULT_SPAN: f64 = 1000.0;
const YEAR_SECONDS: i64 = 365 * 86_400;

/// Generate a value for `node` from its constraints alone.
pub fn generate(node: &SchemaNode, rng: &mut StdRng) -> Value {
    if let Some(value) = &node.const_value {
        return value.clone();
    }
    if let Some(values) = node.enum_values.as_ref().filter(|v| !v.is_empty()) {
        return values[rng.gen_range(0..values.len())].clone();
    }

    match node.kind() {
        SchemaKind::Null => Value::Null,
        SchemaKind::Boolean => json!(rng.gen_bool(0.5)),
        SchemaKind::Integer => integer(node, rng),
        SchemaKind::Number => number(node, rng),
        SchemaKind::String => string(node, rng),
        SchemaKind::Array => json!([]),
        SchemaKind::Object => json!({}),
        SchemaKind::Unknown => json!(Word().fake_with_rng::<String, _>(rng)),
    }
}

/// The minimal value of a kind, used for truncated circular properties.
pub fn empty_value(kind: SchemaKind) -> Value {
    match kind {
        SchemaKind::String => json!(""),
        SchemaKind::Number | SchemaKind::Integer => json!(0),
        SchemaKind::Boolean => json!(false),
        SchemaKind::Array => json!([]),
        SchemaKind::Object => json!({}),
        SchemaKind::Null | SchemaKind::Unknown => Value::Null,
    }
}

/// Fit an externally produced number to the node: integers are rounded and
/// both kinds are clamped into the declared bounds.
pub fn conform_number(value: f64, node: &SchemaNode) -> Value {
    let is_integer = node.kind() == SchemaKind::Integer;
    let (low, high) = declared_bounds(node, is_integer);

    let mut fitted = value;
    if let Some(low) = low {
        fitted = fitted.max(low);
    }
    if let Some(high) = high {
        fitted = fitted.min(high);
    }

    if is_integer {
        json!(fitted.round() as i64)
    } else {
        json!(fitted)
    }
}

// ============================================================================
// Numbers
// ============================================================================

/// Inclusive bounds after applying exclusive flags/values. Integers step by 1,
/// numbers by 0.01 (the precision they are generated at).
fn declared_bounds(node: &SchemaNode, is_integer: bool) -> (Option<f64>, Option<f64>) {
    let step = if is_integer { 1.0 } else { 0.01 };

    let mut low = node.minimum;
    match node.exclusive_minimum {
        Some(ExclusiveBound::Flag(true)) => low = low.map(|v| v + step),
        Some(ExclusiveBound::Value(v)) => low = Some(low.map_or(v + step, |l| l.max(v + step))),
        _ => {}
    }

    let mut high = node.maximum;
    match node.exclusive_maximum {
        Some(ExclusiveBound::Flag(true)) => high = high.map(|v| v - step),
        Some(ExclusiveBound::Value(v)) => high = Some(high.map_or(v - step, |h| h.min(v - step))),
        _ => {}
    }

    if is_integer {
        low = low.map(f64::ceil);
        high = high.map(f64::floor);
    }
    (low, high)
}

/// Declared bounds filled in with a default span and made non-inverted.
fn effective_bounds(node: &SchemaNode, is_integer: bool) -> (f64, f64) {
    let (low, high) = match declared_bounds(node, is_integer) {
        (Some(low), Some(high)) => (low, high),
        (Some(low), None) => (low, low.max(0.0) + DEFAULT_SPAN),
        (None, Some(high)) => (if high >= 0.0 { 0.0 } else { high - DEFAULT_SPAN }, high),
        (None, None) => (0.0, DEFAULT_SPAN),
    };
    if high < low {
        (low, low)
    } else {
        (low, high)
    }
}

fn multiple_in_range(low: f64, high: f64, step: f64, rng: &mut StdRng) -> Option<f64> {
    if step <= 0.0 || !step.is_finite() {
        return None;
    }
    let first = (low / step).ceil() as i64;
    let last = (high / step).floor() as i64;
    if first > last {
        return None;
    }
    Some(rng.gen_range(first..=last) as f64 * step)
}

fn integer(node: &SchemaNode, rng: &mut StdRng) -> Value {
    let (low, high) = effective_bounds(node, true);

    if let Some(step) = node.multiple_of {
        if let Some(value) = multiple_in_range(low, high, step, rng) {
            return json!(value.round() as i64);
        }
        debug!("No multiple of {} within [{}, {}]; ignoring multipleOf", step, low, high);
    }

    json!(rng.gen_range(low as i64..=high as i64))
}

fn number(node: &SchemaNode, rng: &mut StdRng) -> Value {
    let (low, high) = effective_bounds(node, false);

    if let Some(step) = node.multiple_of {
        if let Some(value) = multiple_in_range(low, high, step, rng) {
            return json!(round_to(value, 10));
        }
        debug!("No multiple of {} within [{}, {}]; ignoring multipleOf", step, low, high);
    }

    let raw = if low >= high {
        low
    } else if high - low < f64::MAX / 2.0 {
        rng.gen_range(low..=high)
    } else {
        // Span too wide for a uniform range; draw on the halved bounds
        2.0 * (low / 2.0 + rng.gen::<f64>() * (high / 2.0 - low / 2.0))
    };
    json!(round_to(raw, 2).clamp(low, high))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    }
}

// ============================================================================
// Strings
// ============================================================================

fn string(node: &SchemaNode, rng: &mut StdRng) -> Value {
    if let Some(value) = node.format.as_deref().and_then(|f| formatted(f, rng)) {
        return json!(value);
    }

    if let Some(source) = &node.pattern {
        match pattern::expand(source, rng) {
            Ok(value) => return json!(value),
            Err(e) => debug!("Pattern '{}' not expandable ({}); using plain text", source, e),
        }
    }

    json!(lorem_text(node.min_length, node.max_length, rng))
}

/// Value for a known string format, `None` for anything else.
fn formatted(format: &str, rng: &mut StdRng) -> Option<String> {
    let value: String = match format {
        "date" => format_date(random_datetime(rng, -5 * YEAR_SECONDS, 0)),
        "date-time" => format_datetime(random_datetime(rng, -5 * YEAR_SECONDS, 0)),
        "time" => random_datetime(rng, 0, 86_399).format("%H:%M:%S").to_string(),
        "email" => SafeEmail().fake_with_rng(rng),
        "uri" | "url" | "uri-reference" => {
            let domain = domain_name(rng);
            let path: String = Word().fake_with_rng(rng);
            format!("https://{}/{}", domain, path.to_lowercase())
        }
        "hostname" => domain_name(rng),
        "ipv4" => IPv4().fake_with_rng(rng),
        "ipv6" => IPv6().fake_with_rng(rng),
        "uuid" => random_uuid(rng),
        "byte" => STANDARD.encode(rng.gen::<[u8; 12]>()),
        "password" => Password(8..17).fake_with_rng(rng),
        _ => {
            debug!("Unknown string format '{}'", format);
            return None;
        }
    };
    Some(value)
}

/// Space-separated words stretched to `min` and cut at `max` characters.
fn lorem_text(min: Option<usize>, max: Option<usize>, rng: &mut StdRng) -> String {
    let min = min.unwrap_or(0);
    let max = max.map(|m| m.max(min));

    let words: Vec<String> = Words(1..4).fake_with_rng(rng);
    let mut text = words.join(" ");
    while text.chars().count() < min {
        let word: String = Word().fake_with_rng(rng);
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&word);
    }

    match max {
        Some(max) if text.chars().count() > max => text.chars().take(max).collect(),
        _ => text,
    }
}
