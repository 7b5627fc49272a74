mod media;

pub use media::{Media, MediaSummary, MediaType, NewMedia};
