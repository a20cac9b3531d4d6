//! Circle marks used by the knockout and qualifier sheets

use serde::{Deserialize, Serialize};

use crate::{constants::circles::CIRCLE_COUNT, error::Error};

/// The set of circles an operator has marked as correct answers
///
/// Circles are numbered `0..CIRCLE_COUNT`. The set is stored as a bitmask,
/// so toggling the same circle twice restores the previous selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<u8>", into = "Vec<u8>")]
pub struct CircleSelection(u8);

impl CircleSelection {
    /// Flips a circle and returns whether it is now selected
    ///
    /// # Errors
    ///
    /// Returns [`Error::CircleOutOfRange`] for circles past the last one.
    pub fn toggle(&mut self, circle: u8) -> Result<bool, Error> {
        if circle >= CIRCLE_COUNT {
            return Err(Error::CircleOutOfRange(circle));
        }
        self.0 ^= 1 << circle;
        Ok(self.contains(circle))
    }

    /// Returns whether a circle is selected
    pub fn contains(self, circle: u8) -> bool {
        circle < CIRCLE_COUNT && self.0 & (1 << circle) != 0
    }

    /// Number of selected circles
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Selected circles in ascending order
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..CIRCLE_COUNT).filter(move |&circle| self.contains(circle))
    }
}

impl From<Vec<u8>> for CircleSelection {
    /// Builds a selection from circle indices, ignoring out-of-range ones
    fn from(circles: Vec<u8>) -> Self {
        Self(
            circles
                .into_iter()
                .filter(|&circle| circle < CIRCLE_COUNT)
                .fold(0, |mask, circle| mask | (1 << circle)),
        )
    }
}

impl From<CircleSelection> for Vec<u8> {
    fn from(selection: CircleSelection) -> Self {
        selection.iter().collect()
    }
}
