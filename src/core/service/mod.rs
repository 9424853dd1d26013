pub mod frontend;
pub mod spawner;
