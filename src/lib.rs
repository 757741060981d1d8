#![doc(html_root_url = "https://docs.rs/vtree-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A virtual tree reconciler: renders [`VNode`] trees into a live [`Document`] and keeps it in sync across passes,
//! with minimal mutations.
//!
//! [`web::WebDocument`] drives the browser DOM, [`memory::MemoryDocument`] an in-memory tree that records every mutation.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod children;
mod diff;
pub mod document;
mod error;
pub mod load;
pub mod memory;
mod options;
pub mod props;
mod refs;
mod render;
pub mod vnode;
pub mod web;

pub use children::{ChildReconciler, KeyedChildren};
pub use diff::DomDiffer;
pub use document::{Document, Scalar};
pub use error::{Error, Failure, Report};
pub use options::{EventHook, Options, VNodeHook};
pub use refs::Ref;
pub use vnode::{Handler, Key, PropValue, Props, Style, StyleValue, VNode, VNodeType};

/// Text as it may appear in logs.
#[allow(clippy::non_ascii_literal)]
pub(crate) fn loggable(text: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		text
	} else {
		"…"
	}
}
