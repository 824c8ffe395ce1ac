//! Seqforge-Common: Shared vocabulary for dataset audits.
//!
//! This crate provides the pieces every check agrees on:
//!
//! - **Sequence Model**: [`SequenceNumber`], [`ExpectedRange`] and [`ArtifactKind`]
//! - **Run Summaries**: [`runs::summarize`] and the canonical [`RunList`] rendering
//! - **Naming Conventions**: bit-exact dataset paths in [`paths`]
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use seqforge_common::{runs::summarize, ExpectedRange};
//!
//! let range = ExpectedRange::new(1, 10)?;
//! let observed = [1, 2, 3, 5, 6, 7, 8, 9, 10];
//!
//! assert!(!range.iter().all(|n| observed.contains(&n)));
//! assert_eq!(summarize(observed).to_string(), "1-3, 5-10");
//! # Ok::<(), seqforge_common::Error>(())
//! ```

pub mod error;
pub mod paths;
pub mod runs;
pub mod sequence;

pub use error::{Error, Result};
pub use runs::{Run, RunList};
pub use sequence::*;
