// Download orchestration engine
//
// Pure classification and progress interpretation at the bottom,
// subprocess plumbing in the middle, the sequential batch loop on top.
// The presentation layer only ever touches run_batch, CancelFlag,
// Settings and an EventSink implementation.

pub mod batch;
pub mod cancel;
pub mod classifier;
pub mod dispatch;
pub mod errors;
pub mod models;
pub mod probe;
pub mod progress;
pub mod runner;
pub mod settings;
pub mod tools;
pub mod traits;
pub mod utils;

pub use batch::run_batch;
pub use cancel::CancelFlag;
pub use classifier::{classify, UrlCategory};
pub use dispatch::dispatch;
pub use errors::DownloadError;
pub use models::{DownloadTask, PlaylistMeta};
pub use probe::{probe_playlist, sanitize_title};
pub use progress::{ProgressEvent, ProgressState};
pub use runner::run_streaming;
pub use settings::{settings_path, Settings};
pub use traits::{EventSink, NullSink};
