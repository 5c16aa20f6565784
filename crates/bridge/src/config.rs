//! Panel bridge configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Configuration for one panel bridge.
///
/// Every field has a default, so an empty TOML document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
	/// Backend request timeout in seconds.
	#[serde(default = "default_timeout")]
	pub request_timeout_secs: u64,
	/// Backend method for Search queries.
	#[serde(default = "default_search_method")]
	pub search_method: String,
	/// Backend method for About queries.
	#[serde(default = "default_about_method")]
	pub about_method: String,
	/// Backend notification carrying one pushed search result.
	#[serde(default = "default_search_result_notification")]
	pub search_result_notification: String,
	/// How many launched searches keep receiving pushes before the oldest is retired.
	#[serde(default = "default_search_retention")]
	pub search_retention: usize,
	/// Capacity of the panel command queue.
	#[serde(default = "default_command_capacity")]
	pub command_capacity: usize,
}

fn default_timeout() -> u64 {
	30
}

fn default_search_method() -> String {
	"vscoq/search".into()
}

fn default_about_method() -> String {
	"vscoq/about".into()
}

fn default_search_result_notification() -> String {
	"vscoq/searchResult".into()
}

fn default_search_retention() -> usize {
	16
}

fn default_command_capacity() -> usize {
	256
}

impl Default for PanelConfig {
	fn default() -> Self {
		Self {
			request_timeout_secs: default_timeout(),
			search_method: default_search_method(),
			about_method: default_about_method(),
			search_result_notification: default_search_result_notification(),
			search_retention: default_search_retention(),
			command_capacity: default_command_capacity(),
		}
	}
}

impl PanelConfig {
	/// Parses a configuration from TOML text.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}

	/// Reads and parses a TOML configuration file.
	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path)?;
		Self::from_toml_str(&text)
	}

	/// Backend request timeout.
	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	/// Set request timeout.
	pub fn timeout(mut self, secs: u64) -> Self {
		self.request_timeout_secs = secs;
		self
	}

	/// Set search retention.
	pub fn retention(mut self, searches: usize) -> Self {
		self.search_retention = searches;
		self
	}
}
