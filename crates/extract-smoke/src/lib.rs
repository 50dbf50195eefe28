pub mod backend;
pub mod config;
pub mod error;
pub mod fixture;
pub mod logging;
pub mod progress;
pub mod runner;
pub mod summary;
pub mod verify;

pub use backend::{BackendClient, DocumentId, ExtractedField, ProcessResponse, UploadResponse};
pub use config::{load_config, SmokeConfig};
pub use error::{BackendError, ConfigError, Result, SmokeError};
pub use fixture::FixtureFile;
pub use progress::{ConsoleProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use runner::SmokeRunner;
pub use summary::{RunReport, Summary, PASS_THRESHOLD};
pub use verify::{CaseOutcome, CaseResult, Expectation, EXPECTATIONS};
