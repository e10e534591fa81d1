pub mod handler;
pub mod matcher;
pub mod segmenter;

pub use handler::{PointerHandler, DEFAULT_WINDOW_SECONDS};
pub use matcher::PointerMatcher;
pub use segmenter::PointerSegmenter;
