//! 应用层 - 命令（写操作 / 外部生成调用）

mod audio_commands;
mod card_commands;
mod image_commands;

pub mod handlers;

pub use audio_commands::*;
pub use card_commands::*;
pub use image_commands::*;
