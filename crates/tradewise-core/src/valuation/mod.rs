// Valuation engine: per-game scoring, position weights, team strength profiles.

pub mod points;
pub mod strength;
