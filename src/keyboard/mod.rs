pub mod handler;
pub mod matcher;
pub mod normalize;

pub use handler::{KeyboardHandler, DEFAULT_WINDOW_SECONDS};
pub use matcher::KeyboardMatcher;
