//! String helpers for hex values and endpoint URLs written to logs.

const MASK: &str = "*****";
const VISIBLE_ENDPOINT_CHARS: usize = 10;

/// Shortens a hash for log lines: first ten characters then "..".
pub fn truncate_id(id: &str) -> String {
	match id.get(..10) {
		Some(head) if id.len() > 10 => format!("{head}.."),
		_ => id.to_string(),
	}
}

/// Strips a leading "0x" or "0X" if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Hides most of an endpoint URL so API keys embedded in it stay out of logs.
///
/// Endpoints longer than ten characters keep their first ten characters;
/// anything shorter is replaced entirely.
pub fn mask_endpoint(endpoint: &str) -> String {
	if endpoint.chars().count() > VISIBLE_ENDPOINT_CHARS {
		let visible: String = endpoint.chars().take(VISIBLE_ENDPOINT_CHARS).collect();
		format!("{visible}{MASK}")
	} else {
		MASK.to_string()
	}
}
