//! Command Handlers 实现

mod audio_handlers;
mod card_handlers;
mod image_handlers;

pub use audio_handlers::*;
pub use card_handlers::*;
pub use image_handlers::*;
