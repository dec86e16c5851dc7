//! YouTube upload client for recorded meetings.
//!
//! Uploads go out as unlisted videos through the Data API v3 resumable
//! protocol, authenticated by refresh-token exchange on every upload.

pub mod credentials;
pub mod error;
pub mod upload;

pub use credentials::YouTubeCredentials;
pub use error::{YouTubeError, YouTubeResult};
pub use upload::YouTubeUploader;
