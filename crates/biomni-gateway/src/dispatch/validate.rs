// Argument validation against a tool descriptor
//
// Rules: every present key must be declared; every required parameter must
// be present; declared types are enforced with integer/float interchange
// only; absent optional parameters take their declared default.

use serde_json::{Number, Value};

use crate::registry::{ParamType, ParameterSpec, ToolDescriptor};

use super::error::DispatchError;
use super::handler::Arguments;

/// Validate `supplied` against `descriptor`, returning the full argument
/// mapping the handler will receive. No handler runs if this fails.
pub fn validate_arguments(
	descriptor: &ToolDescriptor,
	supplied: &Arguments,
) -> Result<Arguments, DispatchError> {
	for key in supplied.keys() {
		if descriptor.parameter(key).is_none() {
			return Err(DispatchError::UnknownParameter {
				tool: descriptor.name.clone(),
				param: key.clone(),
			});
		}
	}

	let mut validated = Arguments::new();
	for spec in &descriptor.required_parameters {
		let value = supplied
			.get(&spec.name)
			.ok_or_else(|| DispatchError::MissingParameter {
				tool: descriptor.name.clone(),
				param: spec.name.clone(),
			})?;
		validated.insert(spec.name.clone(), check_type(descriptor, spec, value)?);
	}
	for spec in &descriptor.optional_parameters {
		match supplied.get(&spec.name) {
			Some(value) => {
				validated.insert(spec.name.clone(), check_type(descriptor, spec, value)?);
			},
			None => {
				// Optional without a default stays absent
				if let Some(default) = &spec.default {
					validated.insert(spec.name.clone(), default.clone());
				}
			},
		}
	}
	Ok(validated)
}

/// Fill a declared-but-absent `data_path` parameter with the deployment's
/// data lake root. Runs before validation so tools that require the
/// parameter still work without the caller knowing the server's paths.
pub(crate) fn inject_data_path(descriptor: &ToolDescriptor, args: &mut Arguments, data_path: &str) {
	const PARAM: &str = "data_path";
	if args.contains_key(PARAM) {
		return;
	}
	if descriptor.parameter(PARAM).is_some() {
		args.insert(PARAM.to_string(), Value::String(data_path.to_string()));
	}
}

/// Check `value` against the declared type, normalizing integer-valued
/// floats to integers. No string/number coercion in either direction.
fn check_type(
	descriptor: &ToolDescriptor,
	spec: &ParameterSpec,
	value: &Value,
) -> Result<Value, DispatchError> {
	let ok = match spec.param_type {
		ParamType::String | ParamType::Path => value.is_string(),
		ParamType::Integer => is_integer(value),
		ParamType::Float => value.is_number(),
		ParamType::Boolean => value.is_boolean(),
		ParamType::List => value.is_array(),
		ParamType::Object => value.is_object(),
	};
	if !ok {
		return Err(DispatchError::TypeMismatch {
			tool: descriptor.name.clone(),
			param: spec.name.clone(),
			expected: spec.param_type.as_str(),
			actual: render_actual(value),
		});
	}
	if spec.param_type == ParamType::Integer {
		return Ok(normalize_integer(value));
	}
	Ok(value.clone())
}

fn is_integer(value: &Value) -> bool {
	match value {
		Value::Number(n) => {
			n.is_i64()
				|| n.is_u64()
				|| n.as_f64()
					.map(|f| f.is_finite() && f.fract() == 0.0)
					.unwrap_or(false)
		},
		_ => false,
	}
}

/// 3.0 becomes 3; a caller-supplied integer passes through untouched.
fn normalize_integer(value: &Value) -> Value {
	if let Value::Number(n) = value {
		if n.is_i64() || n.is_u64() {
			return value.clone();
		}
		if let Some(f) = n.as_f64() {
			return Value::Number(Number::from(f as i64));
		}
	}
	value.clone()
}

/// Short rendering of an offending value for the TypeMismatch message.
fn render_actual(value: &Value) -> String {
	match value {
		Value::Null => "null".to_string(),
		Value::Bool(b) => format!("boolean {b}"),
		Value::Number(n) => format!("number {n}"),
		Value::String(s) if s.chars().count() > 40 => {
			let head: String = s.chars().take(40).collect();
			format!("string {head:?}...")
		},
		Value::String(s) => format!("string {s:?}"),
		Value::Array(_) => "array".to_string(),
		Value::Object(_) => "object".to_string(),
	}
}
