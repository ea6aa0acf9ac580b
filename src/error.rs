//! Patch errors.
//!
//! Only the engine's own invariant violations and platform failures are represented here.
//! Render functions, equality functions and hooks are infallible closures. If one of them panics,
//! the panic unwinds through [`Patcher::patch`](`crate::Patcher::patch`) unmodified and the live tree is left as-is.

use crate::vnode::Key;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// A vnode violates the children/text exclusivity invariant.
	#[error("malformed vnode {selector:?}: {reason}")]
	MalformedVNode { selector: Option<String>, reason: &'static str },

	/// Two siblings carry the same key.
	#[error("duplicate key {key} among the children of {parent:?}")]
	DuplicateKey { key: Key, parent: Option<String> },

	/// The platform adapter doesn't implement a primitive this patch needs.
	#[error("the platform adapter does not support `{0}`")]
	MissingCapability(&'static str),

	/// A platform primitive was called but failed.
	#[error("platform operation `{operation}` failed: {message}")]
	Platform { operation: &'static str, message: String },

	/// An old vnode was expected to be bound to a live node, but wasn't.
	#[error("vnode {0:?} is not bound to a live node")]
	NotMounted(Option<String>),
}

impl Error {
	pub fn platform(operation: &'static str, message: impl Into<String>) -> Self {
		Self::Platform { operation, message: message.into() }
	}
}
