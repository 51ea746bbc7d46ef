//! Generation strategies and the provider chain.
//!
//! Every generation stage runs an ordered list of interchangeable
//! strategies behind one fallback contract: probe the dependency, run
//! the generator, validate the output, and advance on any failure. The
//! chains for the melody and texture stages end in a dependency-free
//! procedural strategy; the render chain deliberately does not, so a
//! missing instrument bank stays fatal.

mod chain;
mod melody;
mod render;
mod texture;
mod vocals;

pub use chain::{ChainOutcome, ProviderChain, Strategy};
pub use melody::{melody_chain, MelodyBridgeStrategy, ProgressionMidiStrategy};
pub use render::{render_chain, FluidsynthStrategy};
pub use texture::{texture_chain, LavfiPadStrategy, ProceduralPadStrategy, TextureBridgeStrategy};
pub use vocals::{vocals_chain, RoboticVoiceStrategy, TtsVocalsStrategy};
