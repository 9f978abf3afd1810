pub mod gemini;
pub mod open_er_api;

pub use gemini::GeminiInsightProvider;
pub use open_er_api::OpenErApiProvider;
