//! Inbound body parsing and field checks.

use serde_json::{Map, Value};

/// Body returned when a request is not a publishable SMS auth event.
pub const VALIDATION_ERROR: &str = "user_id not in body or not an SMS auth_type";

/// Parse an inbound body as a JSON object.
///
/// Anything that is not a JSON object (empty body, malformed JSON, arrays,
/// scalars) becomes an empty map and fails validation downstream. Malformed
/// requests are therefore indistinguishable from ones missing fields.
pub fn parse_body(bytes: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            tracing::debug!(error = %e, "Request body is not valid JSON");
            Map::new()
        }
    }
}

/// JavaScript-style truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_field<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|v| is_truthy(v))
}

/// Check that `body` is an SMS auth event and return the text to digest for
/// `user_id_sha`.
///
/// Requires truthy `user_id`, `auth_type` and `url_path`, with `auth_type` a
/// string equal to `"sms"` ignoring case. String user ids are digested as-is;
/// other values by their [`js_string`] text.
pub fn sms_user_id(body: &Map<String, Value>) -> Option<String> {
    let user_id = truthy_field(body, "user_id")?;
    let auth_type = truthy_field(body, "auth_type")?.as_str()?;
    truthy_field(body, "url_path")?;

    if auth_type.to_lowercase() != "sms" {
        return None;
    }

    Some(js_string(user_id))
}

/// Text of `value` as a JavaScript `String(value)` call would produce it:
/// `1.0` is `"1"`, arrays join their items with commas and objects are
/// `"[object Object]"`.
pub fn js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => js_number(f),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn js_number(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let abs = f.abs();
    if abs >= 1e21 || abs < 1e-6 {
        // Exponent form always carries a sign.
        let text = format!("{f:e}");
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        };
    }
    if f.fract() == 0.0 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_parse_failures_become_empty() {
        let cases: [&[u8]; 6] = [b"", b"{", b"[1,2]", b"null", b"\"text\"", b"42"];
        for raw in cases {
            assert!(parse_body(raw).is_empty());
        }
    }

    #[test]
    fn test_parse_object() {
        let body = parse_body(br#"{"user_id":"u1","extra":[1]}"#);
        assert_eq!(body.get("user_id"), Some(&json!("u1")));
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_truthiness() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
        for v in [json!(true), json!(1), json!(-0.5), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn test_accepts_sms_any_case() {
        for auth_type in ["sms", "SMS", "Sms"] {
            let body = object(json!({"user_id": "u1", "auth_type": auth_type, "url_path": "/x"}));
            assert_eq!(sms_user_id(&body).as_deref(), Some("u1"));
        }
    }

    #[test]
    fn test_rejects_missing_or_falsy_fields() {
        let cases = [
            json!({"auth_type": "sms", "url_path": "/x"}),
            json!({"user_id": "u1", "url_path": "/x"}),
            json!({"user_id": "u1", "auth_type": "sms"}),
            json!({"user_id": "", "auth_type": "sms", "url_path": "/x"}),
            json!({"user_id": "u1", "auth_type": "sms", "url_path": null}),
            json!({"user_id": "u1", "auth_type": "email", "url_path": "/x"}),
            json!({"user_id": "u1", "auth_type": 7, "url_path": "/x"}),
            json!({}),
        ];
        for case in cases {
            assert_eq!(sms_user_id(&object(case.clone())), None, "{case}");
        }
    }

    #[test]
    fn test_numeric_user_id_digests_json_text() {
        let body = object(json!({"user_id": 1234, "auth_type": "sms", "url_path": "/x"}));
        assert_eq!(sms_user_id(&body).as_deref(), Some("1234"));
    }

    #[test]
    fn test_non_string_user_id_uses_js_text() {
        let cases = [
            (json!(1.0), "1"),
            (json!(-2.5), "-2.5"),
            (json!(true), "true"),
            (json!([1, null, "a"]), "1,,a"),
            (json!([1, [2, 3]]), "1,2,3"),
            (json!({"k": 1}), "[object Object]"),
        ];
        for (user_id, expected) in cases {
            let body = object(json!({"user_id": user_id, "auth_type": "sms", "url_path": "/x"}));
            assert_eq!(sms_user_id(&body).as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_js_number_formats() {
        assert_eq!(js_string(&json!(1e21)), "1e+21");
        assert_eq!(js_string(&json!(1.5e-7)), "1.5e-7");
        assert_eq!(js_string(&json!(-0.0)), "0");
        assert_eq!(js_string(&json!(100.0)), "100");
        assert_eq!(js_string(&json!(0.1)), "0.1");
    }
}
