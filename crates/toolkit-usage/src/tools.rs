//! The tool actions run behind the usage gate.

use base64::prelude::*;
use serde_json::{Map, Value};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use toolkit_usage_ledger::catalog::{
    BASE64_ENCODER, CASE_CONVERTER, HASH_GENERATOR, JSON_FORMATTER, WORD_COUNTER,
};
use toolkit_usage_ledger::ToolError;

pub fn run(tool_id: &str, variant: &str, input: &str) -> Result<String, ToolError> {
    match tool_id {
        HASH_GENERATOR => hash(variant, input),
        JSON_FORMATTER => format_json(variant, input),
        CASE_CONVERTER => convert_case(variant, input),
        WORD_COUNTER => count_words(variant, input),
        BASE64_ENCODER => base64(variant, input),
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

fn unknown_variant(tool_id: &str, variant: &str) -> ToolError {
    ToolError::UnknownVariant {
        tool_id: tool_id.to_string(),
        variant: variant.to_string(),
    }
}

fn hash(variant: &str, input: &str) -> Result<String, ToolError> {
    if input.is_empty() {
        return Err(ToolError::InvalidInput("nothing to hash".to_string()));
    }

    let bytes = input.as_bytes();
    let digest = match variant {
        "sha224" => format!("{:x}", Sha224::digest(bytes)),
        "sha256" => format!("{:x}", Sha256::digest(bytes)),
        "sha384" => format!("{:x}", Sha384::digest(bytes)),
        "sha512" => format!("{:x}", Sha512::digest(bytes)),
        _ => return Err(unknown_variant(HASH_GENERATOR, variant)),
    };
    Ok(digest)
}

fn format_json(variant: &str, input: &str) -> Result<String, ToolError> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| ToolError::InvalidInput(e.to_string()))?;

    let formatted = match variant {
        "pretty" => serde_json::to_string_pretty(&value),
        "minify" => serde_json::to_string(&value),
        "sort-keys" => serde_json::to_string_pretty(&sort_keys(value)),
        _ => return Err(unknown_variant(JSON_FORMATTER, variant)),
    };
    formatted.map_err(|e| ToolError::InvalidInput(e.to_string()))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key, sort_keys(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn convert_case(variant: &str, input: &str) -> Result<String, ToolError> {
    if input.trim().is_empty() {
        return Err(ToolError::InvalidInput("nothing to convert".to_string()));
    }

    let converted = match variant {
        "upper" => input.to_uppercase(),
        "lower" => input.to_lowercase(),
        "title" => input
            .split_whitespace()
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
        "snake" => split_words(input).join("_"),
        "kebab" => split_words(input).join("-"),
        _ => return Err(unknown_variant(CASE_CONVERTER, variant)),
    };
    Ok(converted)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Lowercase words split on punctuation, whitespace and camelCase humps.
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in input.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn count_words(variant: &str, input: &str) -> Result<String, ToolError> {
    if input.trim().is_empty() {
        return Err(ToolError::InvalidInput("nothing to count".to_string()));
    }

    let words = input.split_whitespace().count();
    match variant {
        "words" => Ok(format!("{} words", words)),
        "detailed" => {
            let characters = input.chars().count();
            let non_space = input.chars().filter(|c| !c.is_whitespace()).count();
            let lines = input.lines().count();
            Ok(format!(
                "{} words, {} characters ({} without spaces), {} lines",
                words, characters, non_space, lines
            ))
        }
        _ => Err(unknown_variant(WORD_COUNTER, variant)),
    }
}

fn base64(variant: &str, input: &str) -> Result<String, ToolError> {
    if input.is_empty() {
        return Err(ToolError::InvalidInput("nothing to encode".to_string()));
    }

    match variant {
        "encode" => Ok(BASE64_STANDARD.encode(input.as_bytes())),
        "decode" => {
            let bytes = BASE64_STANDARD
                .decode(input.trim())
                .map_err(|e| ToolError::InvalidInput(e.to_string()))?;
            String::from_utf8(bytes)
                .map_err(|_| ToolError::InvalidInput("decoded bytes are not UTF-8".to_string()))
        }
        _ => Err(unknown_variant(BASE64_ENCODER, variant)),
    }
}
