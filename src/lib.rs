#![doc(html_root_url = "https://docs.rs/scion-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod error;
pub mod hooks;
pub mod memory;
pub mod modules;
mod patch;
pub mod platform;
mod reconcile;
pub mod thunk;
pub mod vnode;
pub mod web;

pub use error::{Error, Result};
pub use hooks::{Hooks, Module};
pub use patch::Patcher;
pub use platform::Platform;
pub use thunk::{thunk, thunk_unkeyed, thunk_with, ThunkArg, ThunkOptions};
pub use vnode::{Content, Key, VNode, VNodeData, Value};
