pub mod inspector;
pub mod profiler;
pub mod scene_window;
pub mod settings_window;

pub use inspector::Inspector;
pub use profiler::Profiler;
pub use scene_window::SceneWindow;
pub use settings_window::{FrameStats, SettingsWindow};
