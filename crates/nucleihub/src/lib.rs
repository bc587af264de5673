pub mod dedup;
pub mod fetch;
pub mod outcome;
pub mod path;
pub mod pipeline;
pub mod source;
pub mod template;
pub mod updates;
pub mod validate;

pub use dedup::{DedupConfig, DedupError, DedupEvent, DedupSummary, Deduplicator, TemplateGroups};
pub use fetch::{
    ArchiveExtractor, EntryFailure, ExtractReport, FetchBackends, FetchError, FileDownloader,
    RepoCloner,
};
pub use outcome::{FetchOutcome, FetchReport, Stage};
pub use path::expand_home;
pub use pipeline::{FetchConfig, FetchSummary, Fetcher};
pub use source::{SourceDescriptor, SourceKind};
pub use template::{logical_name, numbered_name};
pub use updates::{FeedEntry, UpdateError, commit_feed_url, has_activity_on};
pub use validate::{TemplateValidator, ValidationError, Validity};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
