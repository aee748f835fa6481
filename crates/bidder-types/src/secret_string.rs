//! Redacting wrapper for the bidder's private key.
//!
//! The key travels from the environment through configuration into the
//! account crate. Along the way it must never be printed, so every
//! formatting and serialization path of `SecretString` emits a placeholder
//! and the backing buffer is zeroed on drop.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

const REDACTED: &str = "<redacted>";

/// String holding secret material. Zeroed on drop, redacted when formatted.
#[derive(Clone, Default)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	/// Wraps an owned value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(Zeroizing::new(value.into()))
	}

	/// Returns the underlying secret.
	///
	/// Callers must not log or persist the returned slice.
	pub fn expose_secret(&self) -> &str {
		self.0.as_str()
	}

	/// Runs `f` with the secret in scope and returns its result.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(self.0.as_str())
	}

	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("SecretString").field(&REDACTED).finish()
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl FromStr for SecretString {
	type Err = Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::new(s))
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.0.as_str() == other.0.as_str()
	}
}

impl Eq for SecretString {}

impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(Self::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe512961708279f3c1a5b8e3a2f3e1a0";

	#[test]
	fn test_formatting_never_leaks_key() {
		let secret = SecretString::from(KEY);
		assert_eq!(format!("{secret}"), "<redacted>");
		let debug = format!("{secret:?}");
		assert!(debug.starts_with("SecretString"));
		assert!(!debug.contains(KEY));
	}

	#[test]
	fn test_serialize_redacts_and_deserialize_keeps_value() {
		let secret = SecretString::from(KEY);
		let json = serde_json::to_string(&secret).unwrap();
		assert_eq!(json, "\"<redacted>\"");

		let parsed: SecretString = serde_json::from_str(&format!("\"{KEY}\"")).unwrap();
		assert_eq!(parsed.expose_secret(), KEY);
	}

	#[test]
	fn test_is_empty_ignores_whitespace() {
		assert!(SecretString::from("   ").is_empty());
		assert!(SecretString::default().is_empty());
		assert!(!SecretString::from(KEY).is_empty());
	}

	#[test]
	fn test_with_exposed_scopes_access() {
		let secret = SecretString::from("0xabc");
		let stripped = secret.with_exposed(|s| s.trim_start_matches("0x").len());
		assert_eq!(stripped, 3);
	}
}
