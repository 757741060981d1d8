use crate::{error::panic_message, Error};
use std::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	panic::{self, AssertUnwindSafe},
	rc::Rc,
};

/// A user-supplied handle that follows the live node of a vnode.
///
/// It receives `Some(node)` when the vnode is attached to a (different) live node and `None` when it's unmounted.
/// Refs compare by identity.
pub enum Ref<N> {
	Callback(Rc<dyn Fn(Option<&N>)>),
	Slot(Rc<RefCell<Option<N>>>),
}

impl<N> Ref<N> {
	pub fn callback(callback: impl Fn(Option<&N>) + 'static) -> Self {
		Self::Callback(Rc::new(callback))
	}

	/// A fresh slot, and the handle through which it can be read.
	#[must_use]
	pub fn slot() -> (Self, Rc<RefCell<Option<N>>>) {
		let slot = Rc::new(RefCell::new(None));
		(Self::Slot(Rc::clone(&slot)), slot)
	}

	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Callback(a), Self::Callback(b)) => Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>(),
			(Self::Slot(a), Self::Slot(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl<N: Clone> Ref<N> {
	/// Invokes or assigns the ref.
	///
	/// Panics in callbacks are caught.
	pub(crate) fn apply(&self, value: Option<&N>) -> Result<(), Error> {
		match self {
			Self::Callback(callback) => panic::catch_unwind(AssertUnwindSafe(|| callback(value))).map_err(|payload| Error::RefPanicked(panic_message(&*payload))),
			Self::Slot(slot) => {
				*slot.try_borrow_mut().map_err(|_| Error::RefBorrowed)? = value.cloned();
				Ok(())
			}
		}
	}
}

impl<N> Clone for Ref<N> {
	fn clone(&self) -> Self {
		match self {
			Self::Callback(callback) => Self::Callback(Rc::clone(callback)),
			Self::Slot(slot) => Self::Slot(Rc::clone(slot)),
		}
	}
}

impl<N> Debug for Ref<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Callback(callback) => write!(f, "Ref::Callback({:p})", Rc::as_ptr(callback).cast::<()>()),
			Self::Slot(slot) => write!(f, "Ref::Slot({:p})", Rc::as_ptr(slot)),
		}
	}
}

/// Whether a ref transition from `previous` to `next` needs to touch either of them.
pub(crate) fn changed<N>(previous: Option<&Ref<N>>, next: Option<&Ref<N>>) -> bool {
	match (previous, next) {
		(Some(previous), Some(next)) => !previous.ptr_eq(next),
		(None, None) => false,
		_ => true,
	}
}
