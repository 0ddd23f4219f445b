pub mod camera;
pub mod cpu;
pub mod frame;
pub mod march;
pub mod normal;
pub mod params;
pub mod readback;
pub mod renderer;
mod test_harness;

pub use camera::Camera;
pub use cpu::render_frame;
pub use frame::{blend_over, FrameParams, Presentation};
pub use march::trace;
pub use normal::estimate_normal;
pub use params::{FrameUniforms, MarchUniforms, RayMarchParams};
pub use readback::FrameReadback;
pub use renderer::VolumeRenderer;
