//! 提示词构建 - 业务能力层
//!
//! 纯函数：根据出卷参数构建发给远端模型的完整请求文本，
//! 包括模型必须遵守的输出格式约定

use crate::models::{
    Difficulty, DifficultyLevel, GenerationConfig, PaperFormat, QuestionType, BREAK_TOKEN,
    QUESTION_ITEM_CLASS,
};

/// 考试/科目/章节都为空时的默认科目
const DEFAULT_SUBJECT: &str = "General Knowledge";

/// 出题范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// 严格限定在某科目的某章节
    Topic {
        exam: String,
        subject: String,
        topic: String,
    },
    /// 某科目的全书试卷
    FullSyllabus { exam: String, subject: String },
    /// 覆盖该考试所有标准科目的模拟卷
    MockTest { exam: String },
    /// 没有考试名称的通用试卷
    Generic {
        subject: String,
        topic: Option<String>,
    },
}

/// 解析出题范围
pub fn resolve_scope(config: &GenerationConfig) -> Scope {
    let exam = config.exam_name.trim();
    let subject = config.subject.trim();
    let topic = config.topic.trim();

    match (exam.is_empty(), subject.is_empty(), topic.is_empty()) {
        (false, false, false) => Scope::Topic {
            exam: exam.to_string(),
            subject: subject.to_string(),
            topic: topic.to_string(),
        },
        (false, false, true) => Scope::FullSyllabus {
            exam: exam.to_string(),
            subject: subject.to_string(),
        },
        (false, true, _) => Scope::MockTest {
            exam: exam.to_string(),
        },
        (true, _, _) => Scope::Generic {
            subject: if subject.is_empty() {
                DEFAULT_SUBJECT.to_string()
            } else {
                subject.to_string()
            },
            topic: (!topic.is_empty()).then(|| topic.to_string()),
        },
    }
}

impl Scope {
    fn instruction(&self) -> String {
        match self {
            Scope::Topic {
                exam,
                subject,
                topic,
            } => format!(
                "Create a question paper for the exam '{}', subject '{}'. \
                 Restrict ALL questions strictly to the topic '{}'; do not include questions from any other chapter.",
                exam, subject, topic
            ),
            Scope::FullSyllabus { exam, subject } => format!(
                "Create a FULL SYLLABUS question paper for the exam '{}', subject '{}', \
                 covering all the major chapters of the syllabus in a balanced way.",
                exam, subject
            ),
            Scope::MockTest { exam } => format!(
                "Create a FULL MOCK TEST for the exam '{}', spanning all the standard subjects of that exam.",
                exam
            ),
            Scope::Generic { subject, topic } => match topic {
                Some(topic) => format!(
                    "Create a general question paper on '{}', topic '{}'.",
                    subject, topic
                ),
                None => format!("Create a general question paper on '{}'.", subject),
            },
        }
    }
}

/// 构建生成请求
pub fn build_prompt(config: &GenerationConfig) -> String {
    let total = config.total_questions();
    let mut sections = vec![
        "You are an expert question-paper setter for Indian school boards and competitive exams."
            .to_string(),
        resolve_scope(config).instruction(),
        format!("Language: {}.", config.language.prompt_phrase()),
        quantity_section(config),
        difficulty_section(config),
    ];

    if let Some(hint) = format_hint(config.format) {
        sections.push(hint.to_string());
    }

    sections.push(output_contract(total));

    sections.join("\n\n")
}

/// 看图出题的请求
pub fn build_diagram_prompt(config: &GenerationConfig) -> String {
    let total = config.total_questions().max(1);
    let subject = if config.subject.trim().is_empty() {
        DEFAULT_SUBJECT
    } else {
        config.subject.trim()
    };

    [
        format!(
            "Study the attached diagram carefully and create {} question(s) for '{}' that can only be answered by reading the diagram.",
            total, subject
        ),
        format!("Language: {}.", config.language.prompt_phrase()),
        difficulty_section(config),
        output_contract(total),
    ]
    .join("\n\n")
}

fn quantity_section(config: &GenerationConfig) -> String {
    let mut lines = vec!["Generate EXACTLY the following number of questions (no more, no less):".to_string()];
    for question_type in QuestionType::ALL {
        let count = config.quantities.get(question_type);
        if count > 0 {
            lines.push(format!("- {}: {}", question_type.label(), count));
        }
    }
    lines.push(format!("Total questions: {}", config.total_questions()));
    lines.join("\n")
}

fn difficulty_section(config: &GenerationConfig) -> String {
    match &config.difficulty {
        Difficulty::Global { level } => {
            format!("Difficulty: {} ({}).", level.name(), level.rubric())
        }
        Difficulty::PerType(mix) => {
            let mut lines = vec!["Difficulty mix per question type:".to_string()];
            for question_type in QuestionType::ALL {
                if config.quantities.get(question_type) > 0 {
                    lines.push(format!(
                        "- {}: {}",
                        question_type.label(),
                        mix.describe(question_type)
                    ));
                }
            }
            let legend = [DifficultyLevel::Easy, DifficultyLevel::Medium, DifficultyLevel::Hard]
                .iter()
                .map(|l| format!("{} = {}", l.name(), l.rubric()))
                .collect::<Vec<_>>()
                .join("; ");
            lines.push(format!("Levels: {}.", legend));
            lines.join("\n")
        }
    }
}

fn format_hint(format: PaperFormat) -> Option<&'static str> {
    match format {
        PaperFormat::CoachingTwoColumn => Some(
            "Style: coaching-institute test paper. Keep stems short and crisp so they fit a two-column layout; \
             put MCQ options compactly as (A) (B) (C) (D).",
        ),
        PaperFormat::CbsePattern => Some(
            "Style: follow the CBSE board pattern. Group questions into sections \
             (Section A: objective, Section B: short answer, Section C: long answer) and show marks for each question in brackets.",
        ),
        PaperFormat::StateBoardPattern => Some(
            "Style: follow the Bihar Board pattern with bilingual section headers, \
             e.g. 'Section A / खण्ड - अ (Objective Questions / वस्तुनिष्ठ प्रश्न)' and 'Section B / खण्ड - ब (Subjective Questions / विषयनिष्ठ प्रश्न)'.",
        ),
        PaperFormat::StandardCustom => None,
    }
}

fn output_contract(total: u32) -> String {
    let mut rules = vec![
        "STRICT OUTPUT FORMAT:".to_string(),
        "- Use HTML <b>...</b> for bold text. NEVER use markdown bold (**text**) and never use # headings.".to_string(),
        "- Do NOT use LaTeX or $...$ math notation anywhere.".to_string(),
        "- Write subscripts with <sub>...</sub> tags, e.g. H<sub>2</sub>O, C<sub>6</sub>H<sub>12</sub>O<sub>6</sub>.".to_string(),
        format!(
            "- Wrap EVERY question in <div class='{}'>...</div>, e.g. <div class='{}'><b>Q1. Question text?</b><br>(A) ...<br>(B) ...<br>(C) ...<br>(D) ...</div>",
            QUESTION_ITEM_CLASS, QUESTION_ITEM_CLASS
        ),
        "- Number the questions continuously as Q1., Q2., Q3. ...".to_string(),
    ];

    if total > 0 {
        rules.push(format!(
            "- After the last question write {} on its own line, followed by the Answer Key (e.g. 1-A, 2-C, ...). Do not write {} anywhere else.",
            BREAK_TOKEN, BREAK_TOKEN
        ));
    }

    rules.join("\n")
}
