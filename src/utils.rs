use std::rc::Rc;

use crate::SchemaRef;

/// The identity of a schema node: the address of its shared allocation. Structurally identical
/// nodes have different ids, one node reached through two paths has one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn of(node: &SchemaRef) -> Self {
        NodeId(Rc::as_ptr(node) as *const () as usize)
    }
}
