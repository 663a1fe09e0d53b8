//! botones-media — multi-attachment jobs: video merging (ffmpeg), PDF
//! merging (lopdf), and zip archiving.
//!
//! Every job follows the same shape: validate counts and declared types
//! before anything is downloaded, materialize the inputs into a private
//! scratch directory, run the tool or library, and release the scratch
//! directory on every exit path. Results report whether the artifact fits
//! the inline attachment ceiling and where it was persisted.

pub mod archive;
pub mod artifact;
pub mod download;
pub mod error;
pub mod pdf;
pub mod scratch;
pub mod validate;
pub mod video;

pub use archive::archive_files;
pub use artifact::MergeOutcome;
pub use error::{MediaError, Result};
pub use pdf::merge_pdfs;
pub use validate::{validate_inputs, InputKind, MediaSource};
pub use video::merge_videos;
