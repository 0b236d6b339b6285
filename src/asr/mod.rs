pub mod interface;
pub mod openai_whisper;

pub use interface::*;
pub use openai_whisper::*;
