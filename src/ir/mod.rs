pub mod node;
pub mod transforms;
pub mod visitor;
