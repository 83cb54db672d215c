pub mod paper_flow;
pub mod retry;
pub mod session;

pub use paper_flow::{manual_start_number, GeneratedPaper, PaperFlow};
pub use retry::{generate_with_retry, RetryPolicy, Sleeper, TokioSleeper};
pub use session::{HistoryEntry, SessionState};
