//! # Pentathlon Scoring Library
//!
//! Scoring engine for a multi-round team quiz. Teams play a knockout stage,
//! the best of them a qualifier, and the two leading qualifiers a final made
//! of two numeric rounds and a buzzer round.
//!
//! Sheets such as [`knockout::KnockoutSheet`] collect operator input for a
//! single round and compute its totals. Once locked, a sheet is recorded
//! through a [`Competition`], which persists the totals to a
//! [`store::ScoreStore`] and reads them back to rank teams with
//! [`standings::Standings`] and resolve the [`final_round`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
use derive_where::derive_where;
use itertools::Itertools;
use serde::Serialize;

pub mod buzzer;
pub mod competition;
pub mod config;
pub mod constants;
pub mod error;
pub mod final_round;
pub mod id;
pub mod knockout;
pub mod marks;
pub mod points;
pub mod qualifier;
pub mod round;
pub mod scoreboard;
pub mod sheet;
pub mod standings;
pub mod store;
pub mod subject;
pub mod teams;

pub use competition::Competition;
pub use config::Config;
pub use error::{Error, Incomplete};
pub use id::{RoundId, TeamId};
pub use points::Points;
pub use round::{RoundKind, RoundScore, RoundSheet, RoundState, Stage};
pub use subject::Subject;

/// The first entries of a list along with the length of the whole list
///
/// Scoreboard displays show a bounded number of rows but still report how
/// many teams are competing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[derive_where(Default)]
pub struct TruncatedVec<T> {
    /// Length of the whole list
    exact_count: usize,
    /// Up to `limit` leading entries
    items: Vec<T>,
}

impl<T> TruncatedVec<T> {
    /// Takes up to `limit` entries from `list`
    ///
    /// # Arguments
    ///
    /// * `list` - the entries, in display order
    /// * `limit` - maximum number of entries kept
    /// * `exact_count` - length of the whole list, which may exceed `limit`
    pub fn new<I: Iterator<Item = T>>(list: I, limit: usize, exact_count: usize) -> Self {
        let items = list.take(limit).collect_vec();
        Self { exact_count, items }
    }

    /// Length of the whole list
    pub fn exact_count(&self) -> usize {
        self.exact_count
    }

    /// The kept entries
    pub fn items(&self) -> &[T] {
        &self.items
    }
}
