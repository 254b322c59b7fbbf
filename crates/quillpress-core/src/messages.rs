//! One-time notices for the acting user
//!
//! Handlers push messages ("You have successfully updated the post.") that
//! the presentation layer shows once after a redirect.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message levels (similar to Django)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
	Debug,
	Info,
	Success,
	Warning,
	Error,
}

impl Level {
	/// Returns the string representation of the level
	///
	/// # Examples
	///
	/// ```
	/// use quillpress_core::Level;
	///
	/// assert_eq!(Level::Info.as_str(), "info");
	/// assert_eq!(Level::Success.as_str(), "success");
	/// ```
	pub fn as_str(&self) -> &'static str {
		match self {
			Level::Debug => "debug",
			Level::Info => "info",
			Level::Success => "success",
			Level::Warning => "warning",
			Level::Error => "error",
		}
	}

	/// Returns the numeric value of the level
	pub fn value(&self) -> i32 {
		match self {
			Level::Debug => 10,
			Level::Info => 20,
			Level::Success => 25,
			Level::Warning => 30,
			Level::Error => 40,
		}
	}
}

impl PartialOrd for Level {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Level {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.value().cmp(&other.value())
	}
}

/// A single notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	pub level: Level,
	pub text: String,
}

impl Message {
	pub fn new(level: Level, text: impl Into<String>) -> Self {
		Self {
			level,
			text: text.into(),
		}
	}

	pub fn info(text: impl Into<String>) -> Self {
		Self::new(Level::Info, text)
	}

	pub fn success(text: impl Into<String>) -> Self {
		Self::new(Level::Success, text)
	}

	pub fn warning(text: impl Into<String>) -> Self {
		Self::new(Level::Warning, text)
	}

	pub fn error(text: impl Into<String>) -> Self {
		Self::new(Level::Error, text)
	}
}

impl fmt::Display for Message {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] {}", self.level.as_str(), self.text)
	}
}

/// Ordered collection of pending messages for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
	items: Vec<Message>,
}

impl Messages {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, message: Message) {
		self.items.push(message);
	}

	pub fn info(&mut self, text: impl Into<String>) {
		self.add(Message::info(text));
	}

	pub fn success(&mut self, text: impl Into<String>) {
		self.add(Message::success(text));
	}

	pub fn warning(&mut self, text: impl Into<String>) {
		self.add(Message::warning(text));
	}

	pub fn error(&mut self, text: impl Into<String>) {
		self.add(Message::error(text));
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Message> {
		self.items.iter()
	}

	/// Messages at `level` or above
	pub fn at_least(&self, level: Level) -> impl Iterator<Item = &Message> {
		self.items.iter().filter(move |m| m.level >= level)
	}

	/// Removes and returns every message, as rendering does
	pub fn take(&mut self) -> Vec<Message> {
		std::mem::take(&mut self.items)
	}
}
