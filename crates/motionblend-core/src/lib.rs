pub mod accumulator;
pub mod blend;
pub mod cache;
pub mod config;
pub mod consts;
pub mod error;
pub mod frame;
pub mod handler;
pub mod io;
pub mod save;
pub mod shutter;
