pub mod node;
pub mod stacks;

pub use node::{FakeNode, Node, Placement, StackRole};
pub use stacks::{NodeLocation, StackStore};
