//! Style-tagged pretty-print documents for Coq query panels.
//!
//! The language server answers `Search` and `About` queries with pretty-print
//! command trees ([`PpCmd`]). This crate turns them into something a panel can
//! display without losing semantic grouping:
//!
//! * [`PpCmd`]: the backend's nested wire format, flattened into a [`PpModel`].
//! * [`PpModel`]: an ordered sequence of style-tagged [`Run`]s.
//! * [`render`]: pure [`PpModel`] to [`Fragment`] conversion.
//! * [`hypothesis`]: grouped `a, b : T` hypothesis lines.
//! * [`goal`]: hypotheses plus conclusion.
//!
//! Concatenating the text of every run, and of every rendered fragment,
//! always reproduces the source text exactly.

#![warn(missing_docs)]

pub mod error;
pub mod goal;
pub mod hypothesis;
pub mod model;
pub mod ppcmd;
pub mod render;

pub use error::{PpError, Result};
pub use goal::{Goal, RenderedGoal, render_goal};
pub use hypothesis::{Hypothesis, HypothesisLine, SEPARATOR, format, format_or_type_only};
pub use model::{PpModel, Run, StyleTag};
pub use ppcmd::{BlockType, PpCmd};
pub use render::{Fragment, StyleKey, render};
