//! 出卷参数
//!
//! 由界面层（这里是 TOML 请求文件）提供给核心的配置记录

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 试卷语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[serde(alias = "hindi")]
    Hindi,
    #[default]
    #[serde(alias = "english")]
    English,
    #[serde(alias = "bilingual")]
    Bilingual,
}

impl Language {
    /// 提示词中的语言说明
    pub fn prompt_phrase(self) -> &'static str {
        match self {
            Language::Hindi => "HINDI (Devanagari script)",
            Language::English => "ENGLISH",
            Language::Bilingual => "ENGLISH followed by HINDI translation",
        }
    }
}

/// 难度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyLevel {
    #[serde(alias = "easy")]
    Easy,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "hard")]
    Hard,
}

impl DifficultyLevel {
    pub fn name(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "Easy",
            DifficultyLevel::Medium => "Medium",
            DifficultyLevel::Hard => "Hard",
        }
    }

    /// 难度的定性说明
    pub fn rubric(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "direct, basic recall questions",
            DifficultyLevel::Medium => "conceptual questions that test understanding",
            DifficultyLevel::Hard => "multi-step, application-based questions",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    Mcq,
    FillInBlank,
    TrueFalse,
    Subjective,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Mcq,
        QuestionType::FillInBlank,
        QuestionType::TrueFalse,
        QuestionType::Subjective,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Mcq => "Multiple Choice Questions (MCQ)",
            QuestionType::FillInBlank => "Fill in the Blanks",
            QuestionType::TrueFalse => "True / False",
            QuestionType::Subjective => "Subjective (short/long answer)",
        }
    }
}

/// 各题型的题目数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionQuota {
    pub mcq: u32,
    pub fill_blank: u32,
    pub true_false: u32,
    pub subjective: u32,
}

impl QuestionQuota {
    pub fn get(&self, question_type: QuestionType) -> u32 {
        match question_type {
            QuestionType::Mcq => self.mcq,
            QuestionType::FillInBlank => self.fill_blank,
            QuestionType::TrueFalse => self.true_false,
            QuestionType::Subjective => self.subjective,
        }
    }

    /// 请求的题目总数（饱和相加，超大数量不会回绕成 0）
    pub fn total(&self) -> u32 {
        QuestionType::ALL
            .iter()
            .fold(0u32, |acc, t| acc.saturating_add(self.get(*t)))
    }
}

/// 各题型的难度组合（多选）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyMix {
    pub mcq: Vec<DifficultyLevel>,
    pub fill_blank: Vec<DifficultyLevel>,
    pub true_false: Vec<DifficultyLevel>,
    pub subjective: Vec<DifficultyLevel>,
}

impl DifficultyMix {
    pub fn get(&self, question_type: QuestionType) -> &[DifficultyLevel] {
        match question_type {
            QuestionType::Mcq => &self.mcq,
            QuestionType::FillInBlank => &self.fill_blank,
            QuestionType::TrueFalse => &self.true_false,
            QuestionType::Subjective => &self.subjective,
        }
    }

    /// 某题型的难度描述，未选择时为 "Mixed"
    pub fn describe(&self, question_type: QuestionType) -> String {
        let levels = self.get(question_type);
        if levels.is_empty() {
            "Mixed".to_string()
        } else {
            levels
                .iter()
                .map(|l| l.name())
                .collect::<Vec<_>>()
                .join(" + ")
        }
    }
}

/// 难度设置：全局单一难度，或按题型的难度组合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Difficulty {
    Global { level: DifficultyLevel },
    PerType(DifficultyMix),
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Global {
            level: DifficultyLevel::Medium,
        }
    }
}

/// 试卷格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum PaperFormat {
    /// 辅导班双栏
    CoachingTwoColumn,
    /// CBSE 模式
    CbsePattern,
    /// 邦考试委员会模式（双语分节标题）
    StateBoardPattern,
    /// 标准自定义
    #[default]
    StandardCustom,
}

static FORMAT_LABELS: phf::Map<&'static str, PaperFormat> = phf_map! {
    "coaching" => PaperFormat::CoachingTwoColumn,
    "coaching (two column)" => PaperFormat::CoachingTwoColumn,
    "coaching two column" => PaperFormat::CoachingTwoColumn,
    "cbse" => PaperFormat::CbsePattern,
    "cbse pattern" => PaperFormat::CbsePattern,
    "state board" => PaperFormat::StateBoardPattern,
    "state_board" => PaperFormat::StateBoardPattern,
    "bihar board" => PaperFormat::StateBoardPattern,
    "bihar board pattern" => PaperFormat::StateBoardPattern,
    "standard" => PaperFormat::StandardCustom,
    "standard custom" => PaperFormat::StandardCustom,
};

impl PaperFormat {
    /// 按界面标签查找格式（忽略大小写）
    pub fn from_label(label: &str) -> Option<Self> {
        FORMAT_LABELS
            .get(label.trim().to_lowercase().as_str())
            .copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            PaperFormat::CoachingTwoColumn => "Coaching (Two Column)",
            PaperFormat::CbsePattern => "CBSE Pattern",
            PaperFormat::StateBoardPattern => "Bihar Board Pattern",
            PaperFormat::StandardCustom => "Standard Custom",
        }
    }

    /// 用于文件名的短名
    pub fn slug(self) -> &'static str {
        match self {
            PaperFormat::CoachingTwoColumn => "Coaching",
            PaperFormat::CbsePattern => "CBSE",
            PaperFormat::StateBoardPattern => "StateBoard",
            PaperFormat::StandardCustom => "Standard",
        }
    }

    pub fn is_two_column(self) -> bool {
        matches!(self, PaperFormat::CoachingTwoColumn)
    }
}

impl TryFrom<String> for PaperFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PaperFormat::from_label(&value).ok_or_else(|| format!("未知的试卷格式: {}", value))
    }
}

impl From<PaperFormat> for String {
    fn from(format: PaperFormat) -> Self {
        format.label().to_string()
    }
}

impl fmt::Display for PaperFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 一次"生成"动作的出卷参数
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub exam_name: String,
    pub subject: String,
    pub topic: String,
    pub language: Language,
    pub difficulty: Difficulty,
    pub quantities: QuestionQuota,
    pub format: PaperFormat,
}

impl GenerationConfig {
    pub fn total_questions(&self) -> u32 {
        self.quantities.total()
    }
}
