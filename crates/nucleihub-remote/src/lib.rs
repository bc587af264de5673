pub mod archive;
pub mod feed;
pub mod git;
pub mod http;
pub mod release;

use std::sync::Arc;

use nucleihub::FetchBackends;

pub use archive::ZipExtractor;
pub use feed::{CommitFeedClient, parse_feed};
pub use git::GitCli;
pub use http::HttpDownloader;
pub use release::{ReleaseClient, manifest_version};

const USER_AGENT: &str = concat!("nucleihub/", env!("CARGO_PKG_VERSION"));

/// Backends that talk to the network, the `git` binary and the filesystem.
pub fn default_backends() -> FetchBackends {
    FetchBackends {
        cloner: Arc::new(GitCli::new()),
        downloader: Arc::new(HttpDownloader::new()),
        extractor: Arc::new(ZipExtractor),
    }
}
