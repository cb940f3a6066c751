pub mod error;
pub mod record;
pub mod utils;

pub use error::{
    BankscopeError, ErrorCategory, ErrorClassifier, ErrorInfo, LlmError, ParseError, Result,
    ResultExt,
};
pub use record::ClassificationRecord;
pub use utils::{TokenEstimator, estimate_tokens, truncate_chars};
