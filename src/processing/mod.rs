//! Text processing and analysis module

pub mod analyzer;
pub mod ats_scorer;
pub mod lexicon;
pub mod recommendations;
pub mod similarity;
pub mod skill_gap;
pub mod text_processor;

pub use analyzer::{AnalysisEngine, AnalysisResult};
pub use ats_scorer::{AtsCategory, AtsScore, SubScore};
pub use lexicon::Lexicon;
pub use recommendations::Recommendation;
pub use similarity::MatchScore;
pub use skill_gap::{Priority, SkillGap, SkillGapReport, SkillGroup};
