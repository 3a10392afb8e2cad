//! Table accessor, query builder, row mapping and form handling.

pub mod form;
pub mod rows;
mod select;
mod table;
pub use select::Select;
pub use table::{Record, Table};
