//! The in-process node behind the `local` transport.

mod envelope;
mod node;
mod object_id;
mod object_store;
mod refs;
mod tree;

pub use node::LocalNode;
pub use object_id::ObjectId;
