pub mod content;
pub mod loaders;
pub mod paper_config;
pub mod paper_request;
pub mod remote;

pub use content::{
    ImageData, ImageSource, ManualContent, OptionLayout, ParsedContent, BREAK_TOKEN,
    QUESTION_ITEM_CLASS,
};
pub use loaders::{load_all_paper_requests, load_paper_request};
pub use paper_config::{
    Difficulty, DifficultyLevel, DifficultyMix, GenerationConfig, Language, PaperFormat,
    QuestionQuota, QuestionType,
};
pub use paper_request::{PaperHeader, PaperRequest};
pub use remote::{GenerationRequest, ModelHandle, ModelInfo, GENERATE_CONTENT};
