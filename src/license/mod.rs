//! License text classification and declared-license normalization.
//!
//! - [`classifier`] — turns raw license text into an SPDX identifier or a
//!   `(A AND B)` expression, and merges the expressions of several texts.
//! - [`markdown`] — pulls the license section out of a readme.
//! - [`extract`] — collects license, notice and readme texts from a directory source.
//! - [`spdx`] — corrects declared `package.json` licenses to SPDX spelling.
//! - [`expression`] — SPDX expression parsing for declared/derived comparison.

pub mod classifier;
pub mod expression;
pub mod extract;
pub mod markdown;
pub mod spdx;
