//! HTTP Handlers

mod audio;
mod image;
mod ping;
mod vectorize;

pub use audio::*;
pub use image::*;
pub use ping::*;
pub use vectorize::*;
