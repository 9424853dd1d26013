pub mod component;
pub mod nav;
