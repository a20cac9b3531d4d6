//! Configuration constants for the Pentathlon scoreboard
//!
//! This module contains the fixed limits and scoring constants used
//! throughout the competition, grouped by the stage they apply to.

/// Team setup constants
pub mod teams {
    /// Default number of teams taking part in a competition
    pub const DEFAULT_TEAM_COUNT: usize = 5;
    /// Maximum number of teams a single competition can hold
    pub const MAX_TEAM_COUNT: usize = 48;
    /// Default number of members on every team
    pub const DEFAULT_MEMBER_COUNT: usize = 5;
    /// Maximum number of members on a team
    pub const MAX_MEMBER_COUNT: usize = 12;
    /// Maximum length of a team or member name in characters
    pub const MAX_NAME_LENGTH: usize = 40;
}

/// Circle marking constants shared by the knockout and qualifier sheets
pub mod circles {
    /// Number of circles available per cell (indices `0..CIRCLE_COUNT`)
    pub const CIRCLE_COUNT: u8 = 5;
}

/// Knockout stage constants
pub mod knockout {
    /// Points per selected circle before credit weighting
    pub const MARK_VALUE: u32 = 1;
    /// Divisor applied to the weighted sum
    pub const NORMALIZATION: u32 = 10;
    /// Default number of teams advancing to the qualifier
    pub const DEFAULT_ADVANCING: usize = 4;
}

/// Qualifier stage constants
pub mod qualifier {
    /// Points per selected circle before credit weighting
    pub const MARK_VALUE: u32 = 2;
    /// Divisor applied to the weighted sum
    pub const NORMALIZATION: u32 = 10;
}

/// Final stage constants
pub mod finale {
    /// Number of teams contesting the final
    pub const FINALIST_COUNT: usize = 2;
    /// Number of rows on a buzzer board
    pub const BUZZER_ROWS: usize = 5;
    /// Number of cells on each buzzer board row
    pub const BUZZER_COLUMNS: usize = 5;
    /// Points awarded per correct buzz
    pub const GREEN_VALUE: i64 = 2;
    /// Points deducted per incorrect buzz
    pub const RED_PENALTY: i64 = 1;
}

/// Storage constants
pub mod store {
    /// Scale factor between stored integers and displayed points
    pub const POINTS_SCALE: i64 = 100;
    /// Largest magnitude of a single entered score, in whole points
    pub const MAX_POINTS: i64 = 1_000_000;
}
