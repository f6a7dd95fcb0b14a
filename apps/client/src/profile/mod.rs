pub mod editor;
pub mod store;
