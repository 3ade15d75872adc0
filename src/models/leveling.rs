// src/models/leveling.rs
//
// Static XP leveling table. `xp_level` on a user is always derived from the
// cumulative total through `level_for`; it is never set independently.

pub struct LevelTier {
    pub level: i32,
    /// Cumulative XP needed to hold this level. Strictly increasing,
    /// level 1 starts at 0.
    pub threshold: i64,
    pub title: &'static str,
}

pub const LEVELS: [LevelTier; 7] = [
    LevelTier { level: 1, threshold: 0, title: "Newbie" },
    LevelTier { level: 2, threshold: 100, title: "Learner" },
    LevelTier { level: 3, threshold: 300, title: "Practitioner" },
    LevelTier { level: 4, threshold: 600, title: "Specialist" },
    LevelTier { level: 5, threshold: 1000, title: "Expert" },
    LevelTier { level: 6, threshold: 1500, title: "Master" },
    LevelTier { level: 7, threshold: 2500, title: "Legend" },
];

/// Highest level whose threshold is <= the given total.
pub fn level_for(xp: i64) -> i32 {
    for tier in LEVELS.iter().rev() {
        if xp >= tier.threshold {
            return tier.level;
        }
    }
    1
}

/// XP threshold of the next level, or None at max level.
pub fn next_level_xp(current_level: i32) -> Option<i64> {
    LEVELS
        .iter()
        .find(|t| t.level == current_level + 1)
        .map(|t| t.threshold)
}

pub fn level_title(level: i32) -> &'static str {
    LEVELS
        .iter()
        .find(|t| t.level == level)
        .map(|t| t.title)
        .unwrap_or(LEVELS[0].title)
}
