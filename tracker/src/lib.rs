pub mod backend;
pub mod ui;
