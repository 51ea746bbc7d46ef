//! Stage executors, one per pipeline stage.

mod melody;
mod mix;
mod render;
mod texture;
mod video;
mod vocals;

pub use melody::MelodyStep;
pub use mix::MixStep;
pub use render::RenderStep;
pub use texture::TextureStep;
pub use video::VideoStep;
pub use vocals::VocalsStep;
