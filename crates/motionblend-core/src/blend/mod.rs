pub mod blender;
pub mod engine;

pub use blender::FrameBlender;
pub use engine::{BlendEngine, GroupPhase};
