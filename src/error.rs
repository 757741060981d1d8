use core::any::Any;
use thiserror::Error;

/// A failure contained somewhere inside a reconciliation pass.
///
/// None of these abort the pass. They are collected into the [`Report`] returned by
/// [`DomDiffer::render`](`crate::DomDiffer::render`) and friends.
#[derive(Debug, Error)]
pub enum Error {
	#[error("live-tree operation `{operation}` failed: {message}")]
	Dom { operation: &'static str, message: String },

	#[error("`{hook}` hook panicked: {message}")]
	Hook { hook: &'static str, message: String },

	#[error("ref callback panicked: {0}")]
	RefPanicked(String),

	#[error("ref slot was already borrowed while being assigned")]
	RefBorrowed,

	#[error("duplicate sibling key {0:?}")]
	DuplicateKey(String),
}

impl Error {
	pub fn dom(operation: &'static str, message: impl Into<String>) -> Self {
		Self::Dom {
			operation,
			message: message.into(),
		}
	}
}

/// One contained per-node failure.
#[derive(Debug)]
pub struct Failure {
	/// Short description of the vnode at whose boundary the failure was contained, like `<div key="a">`.
	///
	/// With the `log-paths` feature, this is prefixed with the path from the container.
	pub vnode: String,
	pub error: Error,
}

/// Outcome of one pass.
///
/// A pass never fails as a whole, so this is the only place where contained failures surface.
#[derive(Debug, Default)]
#[must_use]
pub struct Report {
	failures: Vec<Failure>,
}

impl Report {
	pub(crate) fn new(failures: Vec<Failure>) -> Self {
		Self { failures }
	}

	/// `true` iff nothing was contained during the pass.
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}

	pub fn failures(&self) -> &[Failure] {
		&self.failures
	}

	pub fn into_failures(self) -> Vec<Failure> {
		self.failures
	}
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_owned()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"<non-string panic payload>".to_owned()
	}
}
