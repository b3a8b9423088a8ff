//! Argument checking against the JSON schemas generated for tool inputs.
//!
//! Covers the keywords `schemars` emits for plain serde structs: `type`,
//! `required`, `properties`, `additionalProperties`, `items`, `enum`,
//! `const`, `anyOf`/`oneOf`/`allOf`, `$ref` and numeric bounds. Every
//! violation is reported, not just the first.

use serde_json::{Map, Value};

/// Check `instance` against `schema`, returning one message per violation.
pub fn validate(schema: &Value, instance: &Value) -> Vec<String> {
    let mut violations = Vec::new();
    Validator { root: schema }.check(schema, instance, "", &mut violations);
    violations
}

struct Validator<'a> {
    root: &'a Value,
}

impl<'a> Validator<'a> {
    fn check(&self, schema: &'a Value, value: &Value, path: &str, out: &mut Vec<String>) {
        let schema = match schema {
            Value::Bool(true) => return,
            Value::Bool(false) => {
                out.push(format!("{}: not allowed", display(path)));
                return;
            }
            Value::Object(map) => map,
            _ => return,
        };

        if let Some(target) = schema.get("$ref").and_then(Value::as_str) {
            if let Some(resolved) = self.resolve(target) {
                self.check(resolved, value, path, out);
            }
        }

        if let Some(Value::Array(branches)) = schema.get("allOf") {
            for branch in branches {
                self.check(branch, value, path, out);
            }
        }

        for keyword in ["anyOf", "oneOf"] {
            if let Some(Value::Array(branches)) = schema.get(keyword) {
                self.check_alternatives(branches, value, path, out);
            }
        }

        if let Some(expected) = schema.get("const") {
            if expected != value {
                out.push(format!("{}: expected {expected}", display(path)));
                return;
            }
        }

        if let Some(Value::Array(allowed)) = schema.get("enum") {
            if !allowed.contains(value) {
                let allowed: Vec<String> = allowed.iter().map(Value::to_string).collect();
                out.push(format!(
                    "{}: expected one of {}",
                    display(path),
                    allowed.join(", ")
                ));
                return;
            }
        }

        if let Some(expected) = schema.get("type") {
            if !type_matches(expected, value) {
                out.push(format!(
                    "{}: expected {}, got {}",
                    display(path),
                    type_names(expected),
                    json_type(value)
                ));
                return;
            }
        }

        match value {
            Value::Object(fields) => self.check_object(schema, fields, path, out),
            Value::Array(items) => {
                if let Some(item_schema) = schema.get("items") {
                    for (i, item) in items.iter().enumerate() {
                        self.check(item_schema, item, &format!("{}[{i}]", display(path)), out);
                    }
                }
            }
            Value::Number(n) => {
                if let (Some(min), Some(v)) = (schema.get("minimum").and_then(Value::as_f64), n.as_f64()) {
                    if v < min {
                        out.push(format!("{}: must be >= {min}", display(path)));
                    }
                }
                if let (Some(max), Some(v)) = (schema.get("maximum").and_then(Value::as_f64), n.as_f64()) {
                    if v > max {
                        out.push(format!("{}: must be <= {max}", display(path)));
                    }
                }
            }
            _ => {}
        }
    }

    fn check_object(
        &self,
        schema: &'a Map<String, Value>,
        fields: &Map<String, Value>,
        path: &str,
        out: &mut Vec<String>,
    ) {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        for name in &required {
            if !fields.contains_key(*name) {
                out.push(format!("{}: required", join(path, name)));
            }
        }

        let properties = schema.get("properties").and_then(Value::as_object);
        let additional = schema.get("additionalProperties");

        for (name, field) in fields {
            let field_path = join(path, name);
            match properties.and_then(|p| p.get(name)) {
                // Explicit nulls on optional fields mean "not set".
                Some(_) if field.is_null() && !required.contains(&name.as_str()) => {}
                Some(field_schema) => self.check(field_schema, field, &field_path, out),
                None => match additional {
                    Some(Value::Bool(false)) => out.push(format!("{field_path}: unexpected field")),
                    Some(extra_schema @ Value::Object(_)) => {
                        self.check(extra_schema, field, &field_path, out)
                    }
                    _ => {}
                },
            }
        }
    }

    /// Passes if any branch passes. When only one branch is not the `null`
    /// alternative its violations are reported, as they are the useful ones.
    fn check_alternatives(&self, branches: &'a [Value], value: &Value, path: &str, out: &mut Vec<String>) {
        let mut failures = Vec::with_capacity(branches.len());
        for branch in branches {
            let mut branch_out = Vec::new();
            self.check(branch, value, path, &mut branch_out);
            if branch_out.is_empty() {
                return;
            }
            if !is_null_schema(branch) {
                failures.push(branch_out);
            }
        }

        if failures.len() == 1 {
            out.append(&mut failures[0]);
        } else {
            out.push(format!("{}: does not match any allowed shape", display(path)));
        }
    }

    fn resolve(&self, target: &str) -> Option<&'a Value> {
        let pointer = target.strip_prefix('#')?;
        self.root.pointer(pointer)
    }
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

fn type_matches(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(name) => is_type(name, value),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| is_type(name, value)),
        _ => true,
    }
}

fn is_type(name: &str, value: &Value) -> bool {
    match name {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => true,
    }
}

fn type_names(expected: &Value) -> String {
    match expected {
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .filter(|n| *n != "null")
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.as_str().unwrap_or("value").to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

fn display(path: &str) -> &str {
    if path.is_empty() { "arguments" } else { path }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "uuid": { "type": "string" },
                "name": { "type": ["string", "null"] },
                "port": { "type": "integer", "minimum": 0, "maximum": 65535 },
                "build_pack": { "$ref": "#/$defs/BuildPack" },
                "mode": {
                    "anyOf": [{ "$ref": "#/$defs/BuildPack" }, { "type": "null" }]
                },
                "variables": {
                    "type": "object",
                    "additionalProperties": { "type": "string" }
                },
                "domains": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["uuid", "build_pack"],
            "$defs": {
                "BuildPack": { "type": "string", "enum": ["nixpacks", "static"] }
            }
        })
    }

    #[test]
    fn valid_arguments_pass() {
        let args = json!({
            "uuid": "a",
            "name": null,
            "port": 3000,
            "build_pack": "static",
            "mode": "nixpacks",
            "variables": { "KEY": "v" },
            "domains": ["a.example.com"]
        });
        assert!(validate(&schema(), &args).is_empty());
    }

    #[test]
    fn reports_every_missing_field() {
        let violations = validate(&schema(), &json!({}));
        assert_eq!(violations, vec!["uuid: required", "build_pack: required"]);
    }

    #[test]
    fn reports_types_enums_and_bounds_together() {
        let args = json!({
            "uuid": 7,
            "port": 70000,
            "build_pack": "heroku",
            "mode": "heroku",
            "variables": { "KEY": 1 },
            "domains": ["ok", false]
        });
        let violations = validate(&schema(), &args);

        assert!(violations.contains(&"uuid: expected string, got number".to_string()));
        assert!(violations.contains(&"port: must be <= 65535".to_string()));
        assert!(violations.contains(&r#"build_pack: expected one of "nixpacks", "static""#.to_string()));
        assert!(violations.contains(&r#"mode: expected one of "nixpacks", "static""#.to_string()));
        assert!(violations.contains(&"variables.KEY: expected string, got number".to_string()));
        assert!(violations.contains(&"domains[1]: expected string, got boolean".to_string()));
        assert_eq!(violations.len(), 6);
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let violations = validate(&schema(), &json!("uuid"));
        assert_eq!(violations, vec!["arguments: expected object, got string"]);
    }

    #[test]
    fn closed_objects_reject_unknown_fields() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "additionalProperties": false
        });
        assert_eq!(validate(&schema, &json!({ "b": 1 })), vec!["b: unexpected field"]);
    }
}
