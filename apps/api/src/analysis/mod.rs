//! Job-description fit analysis: the `/api/analyze-jd` handler and the
//! validator that turns raw completion text into an `AnalysisResult`.

pub mod handlers;
pub mod verdict;

pub use verdict::{parse_verdict, AnalysisResult, MalformedResponseError};
