pub mod recording;
pub mod shapes;
pub mod traits;

pub use recording::{DrawCommand, RecordingBackend};
pub use traits::DrawBackend;
