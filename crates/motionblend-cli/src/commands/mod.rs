pub mod blend;
pub mod config;
pub mod info;
pub mod window;
