pub mod assistant;
pub mod client;
pub mod decode;
pub mod executor;
pub mod prompts;
pub mod types;

pub use assistant::*;
pub use client::*;
pub use decode::{collect_text, TextStream};
pub use executor::*;
pub use types::*;
