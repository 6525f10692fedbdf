//! Scene graph: objects and their components
//!
//! A [`TackObject`] is a named transform owning an ordered list of
//! [`TackComponent`]s. Objects are shared as [`ObjectRef`] and live in the
//! [`TackObjectManager`] until explicitly removed.

mod component;
mod manager;
mod object;

pub use component::{AsAny, Capabilities, TackComponent};
pub use manager::{TackObjectManager, HASH_LENGTH};
pub use object::{ObjectState, TackObject};

/// Shared handle to an object; compare with [`std::rc::Rc::ptr_eq`]
pub type ObjectRef = std::rc::Rc<TackObject>;
