pub mod block;
pub mod cover;
pub mod heading;
pub mod image;
pub mod list_item;
pub mod page_break;
pub mod paragraph;
pub mod table;
pub mod table_solver;
