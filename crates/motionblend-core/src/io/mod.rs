pub mod decode;
pub mod image_io;
pub mod naming;
pub mod tga;
