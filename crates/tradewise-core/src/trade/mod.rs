// Trade engine: candidate generation, validation/scoring and interactive sessions.

pub mod candidate;
pub mod generator;
pub mod session;
pub mod validator;
