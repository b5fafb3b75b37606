pub mod column_mapper;
pub mod engine;
pub mod reconcile;
pub mod response_parser;
pub mod schema_tree;
pub mod serialize;
pub mod validate;

pub use column_mapper::*;
pub use engine::*;
pub use reconcile::*;
pub use response_parser::*;
pub use schema_tree::*;
pub use serialize::*;
pub use validate::*;
