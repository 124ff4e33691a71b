// Trade recommendation and valuation engine for fantasy football leagues.

pub mod league;
pub mod position;
pub mod trade;
pub mod valuation;
