/// Two-table INNER JOIN
pub mod index_join;

pub use index_join::{inner_join, IndexNestedLoopJoin};
