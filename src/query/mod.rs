pub mod ranker;
pub mod scorer;

pub use ranker::{Match, MatchList};
pub use scorer::{ScoreMap, SCORE_SCALE};
