pub mod common;
pub mod mapping;
pub mod node;
pub mod submodel;

pub use common::*;
pub use mapping::*;
pub use node::*;
pub use submodel::*;
