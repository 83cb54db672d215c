use async_trait::async_trait;
use paper_banao::error::{AppError, ConfigError, DiscoveryError, FileError, GenerationError};
use paper_banao::models::{
    Difficulty, DifficultyLevel, GenerationRequest, ImageData, Language, ManualContent,
    ModelHandle, ModelInfo, PaperFormat, PaperRequest, QuestionQuota,
};
use paper_banao::workflow::{PaperFlow, RetryPolicy, Sleeper};
use paper_banao::{App, Config, GenerationBackend};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

/// 内存中的假后端：固定的模型列表 + 按顺序返回的生成结果
struct FakeBackend {
    models: Result<Vec<ModelInfo>, String>,
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Arc<Calls>,
}

#[derive(Default)]
struct Calls {
    list: AtomicUsize,
    generate: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_had_image: Mutex<bool>,
}

impl FakeBackend {
    fn new(models: Vec<ModelInfo>, responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            models: Ok(models),
            responses: Mutex::new(responses.into()),
            calls: Arc::new(Calls::default()),
        }
    }

    fn failing_discovery() -> Self {
        Self {
            models: Err("HTTP 403: API key not valid".to_string()),
            responses: Mutex::new(VecDeque::new()),
            calls: Arc::new(Calls::default()),
        }
    }

    fn calls(&self) -> Arc<Calls> {
        self.calls.clone()
    }
}

#[async_trait]
impl GenerationBackend for FakeBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, GenerationError> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        match &self.models {
            Ok(models) => Ok(models.clone()),
            Err(message) => Err(GenerationError::request_failed("<discovery>", message.clone())),
        }
    }

    async fn generate(
        &self,
        _model: &ModelHandle,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        self.calls.generate.fetch_add(1, Ordering::SeqCst);
        *self.calls.last_prompt.lock().unwrap() = Some(request.prompt.clone());
        *self.calls.last_had_image.lock().unwrap() = request.image.is_some();
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::request_failed("fake", "no scripted response")))
    }
}

/// 只记录等待时长，不真正等待
#[derive(Clone, Default)]
struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

fn account_models() -> Vec<ModelInfo> {
    vec![
        ModelInfo::new("models/text-embedding-004", &["embedContent"]),
        ModelInfo::new("models/gemini-1.5-pro", &["generateContent"]),
        ModelInfo::new("models/gemini-1.5-flash", &["generateContent", "countTokens"]),
    ]
}

fn science_request(mcq: u32) -> PaperRequest {
    let mut request = PaperRequest::default();
    request.generation.exam_name = "Class 10 Board".to_string();
    request.generation.subject = "Science".to_string();
    request.generation.topic = "Light".to_string();
    request.generation.quantities = QuestionQuota {
        mcq,
        ..Default::default()
    };
    request
}

fn flow_with(backend: FakeBackend, sleeper: RecordingSleeper) -> PaperFlow {
    PaperFlow::new(Box::new(backend), RetryPolicy::default()).with_sleeper(Box::new(sleeper))
}

const TWO_QUESTIONS: &str = "<div class='question-item'><b>Q1. ?</b></div><div class='question-item'><b>Q2. ?</b></div>[[BREAK]]1-A 2-B";

#[tokio::test]
async fn test_generate_paper_end_to_end() {
    let backend = FakeBackend::new(account_models(), vec![Ok(TWO_QUESTIONS.to_string())]);
    let calls = backend.calls();
    let flow = flow_with(backend, RecordingSleeper::default());

    let mut request = science_request(2);
    request.generation.language = Language::English;
    request.generation.difficulty = Difficulty::Global {
        level: DifficultyLevel::Easy,
    };
    request.generation.format = PaperFormat::from_label("Standard Custom").unwrap();

    let paper = assert_ok!(flow.run(&request).await);

    assert_eq!(paper.model, Some(ModelHandle::new("models/gemini-1.5-flash")));
    assert_eq!(paper.file_name, "Science_Class_10_Board_Standard.html");
    assert_eq!(calls.generate.load(Ordering::SeqCst), 1);

    let prompt = calls.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("Light"));
    assert!(prompt.contains("[[BREAK]]"));
    assert!(prompt.contains("Difficulty: Easy"));
    assert!(prompt.contains("ENGLISH"));

    let html = &paper.html;
    let q1 = html.find("<b>Q1. ?</b>").unwrap();
    let q2 = html.find("<b>Q2. ?</b>").unwrap();
    let answer_key = html.find("Answer Key").unwrap();
    let answers = html.find("1-A 2-B").unwrap();
    assert!(q1 < q2 && q2 < answer_key && answer_key < answers);
    assert!(!html.contains("[[BREAK]]"));
}

#[tokio::test]
async fn test_nothing_to_generate_makes_no_calls() {
    let backend = FakeBackend::new(account_models(), vec![]);
    let calls = backend.calls();
    let flow = flow_with(backend, RecordingSleeper::default());

    let err = assert_err!(flow.run(&science_request(0)).await);

    assert!(matches!(err, AppError::Config(ConfigError::NothingToGenerate)));
    assert_eq!(calls.list.load(Ordering::SeqCst), 0);
    assert_eq!(calls.generate.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_manual_only_paper_skips_network() {
    let backend = FakeBackend::new(account_models(), vec![]);
    let calls = backend.calls();
    let flow = flow_with(backend, RecordingSleeper::default());

    let mut request = science_request(0);
    request.manual = ManualContent {
        text: "What is light?\nA) wave\nB) particle\n\nDefine focus.".to_string(),
        ..Default::default()
    };

    let paper = assert_ok!(flow.run(&request).await);

    assert_eq!(calls.list.load(Ordering::SeqCst), 0);
    assert_eq!(calls.generate.load(Ordering::SeqCst), 0);
    assert!(paper.model.is_none());
    assert_eq!(paper.manual_count, 2);
    assert!(paper.html.contains("<b>Q1. What is light?</b>"));
    assert!(paper.html.contains("<b>Q2. Define focus.</b>"));
    assert!(!paper.html.contains("Answer Key"));
}

#[tokio::test]
async fn test_manual_questions_continue_after_ai_blocks() {
    let backend = FakeBackend::new(account_models(), vec![Ok(TWO_QUESTIONS.to_string())]);
    let flow = flow_with(backend, RecordingSleeper::default());

    // 请求 5 道，模型只返回 2 道：手动题目从 Q3 开始
    let mut request = science_request(5);
    request.manual.text = "Q1. Extra question".to_string();

    let paper = assert_ok!(flow.run(&request).await);

    assert!(paper.html.contains("<b>Q3. Extra question</b>"));
    let ai = paper.html.find("<b>Q2. ?</b>").unwrap();
    let manual = paper.html.find("<b>Q3. Extra question</b>").unwrap();
    let answer_key = paper.html.find("Answer Key").unwrap();
    assert!(ai < manual && manual < answer_key);
}

#[tokio::test]
async fn test_rate_limit_retries_are_bounded() {
    let backend = FakeBackend::new(
        account_models(),
        vec![
            Err(GenerationError::rate_limited("m", "HTTP 429")),
            Err(GenerationError::rate_limited("m", "HTTP 429")),
            Err(GenerationError::rate_limited("m", "HTTP 429")),
            Ok(TWO_QUESTIONS.to_string()),
        ],
    );
    let calls = backend.calls();
    let sleeper = RecordingSleeper::default();
    let flow = flow_with(backend, sleeper.clone());

    let err = assert_err!(flow.run(&science_request(2)).await);

    assert!(matches!(
        err,
        AppError::Generation(GenerationError::RetriesExhausted { attempts: 3, .. })
    ));
    assert_eq!(calls.generate.load(Ordering::SeqCst), 3);
    assert_eq!(
        *sleeper.delays.lock().unwrap(),
        vec![Duration::from_secs(5), Duration::from_secs(5)]
    );
}

#[tokio::test]
async fn test_recovers_after_single_rate_limit() {
    let backend = FakeBackend::new(
        account_models(),
        vec![
            Err(GenerationError::rate_limited("m", "RESOURCE_EXHAUSTED")),
            Ok(TWO_QUESTIONS.to_string()),
        ],
    );
    let calls = backend.calls();
    let flow = flow_with(backend, RecordingSleeper::default());

    let paper = assert_ok!(flow.run(&science_request(2)).await);

    assert_eq!(calls.generate.load(Ordering::SeqCst), 2);
    assert!(paper.parsed.has_answers());
}

#[tokio::test]
async fn test_other_errors_are_not_retried() {
    let backend = FakeBackend::new(
        account_models(),
        vec![Err(GenerationError::request_failed("m", "HTTP 400: bad request"))],
    );
    let calls = backend.calls();
    let sleeper = RecordingSleeper::default();
    let flow = flow_with(backend, sleeper.clone());

    let err = assert_err!(flow.run(&science_request(2)).await);

    assert!(matches!(
        err,
        AppError::Generation(GenerationError::RequestFailed { .. })
    ));
    assert_eq!(calls.generate.load(Ordering::SeqCst), 1);
    assert!(sleeper.delays.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_discovery_failure_means_no_model() {
    let backend = FakeBackend::failing_discovery();
    let calls = backend.calls();
    let flow = flow_with(backend, RecordingSleeper::default());

    let err = assert_err!(flow.run(&science_request(2)).await);

    assert!(matches!(
        err,
        AppError::Discovery(DiscoveryError::NoModelAvailable)
    ));
    assert_eq!(calls.generate.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_generation_capable_model() {
    let backend = FakeBackend::new(
        vec![ModelInfo::new("models/text-embedding-004", &["embedContent"])],
        vec![],
    );
    let flow = flow_with(backend, RecordingSleeper::default());

    let err = assert_err!(flow.run(&science_request(1)).await);
    assert!(matches!(
        err,
        AppError::Discovery(DiscoveryError::NoModelAvailable)
    ));
}

#[tokio::test]
async fn test_diagram_sends_image() {
    let backend = FakeBackend::new(
        account_models(),
        vec![Ok("<div class='question-item'><b>Q1. Identify the lens.</b></div>[[BREAK]]1-convex".to_string())],
    );
    let calls = backend.calls();
    let flow = flow_with(backend, RecordingSleeper::default());

    let image = ImageData {
        mime_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    };
    let parsed = assert_ok!(
        flow.generate_from_diagram(&image, &science_request(0).generation)
            .await
    );

    assert!(*calls.last_had_image.lock().unwrap());
    assert_eq!(parsed.question_block_count(), 1);
    assert_eq!(parsed.answers_html.trim(), "1-convex");
}

#[test]
fn test_missing_credential_before_network() {
    let config = Config::default();
    let err = PaperFlow::from_config(&config).err().unwrap();
    assert!(matches!(err, ConfigError::MissingCredential));
}

#[tokio::test]
async fn test_app_writes_papers_and_records_history() {
    let requests = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    std::fs::write(
        requests.path().join("light.toml"),
        r#"
[header]
institute_name = "Patna Success Classes"

[generation]
exam_name = "Class 10 Board"
subject = "Science"
topic = "Light"
format = "Coaching"

[generation.quantities]
mcq = 2
"#,
    )
    .unwrap();
    std::fs::write(requests.path().join("broken.toml"), "this is = = not toml").unwrap();

    let backend = FakeBackend::new(account_models(), vec![Ok(TWO_QUESTIONS.to_string())]);
    let config = Config {
        output_folder: output.path().to_string_lossy().to_string(),
        ..Default::default()
    };
    let mut app = App::with_flow(config, flow_with(backend, RecordingSleeper::default()));

    let stats = assert_ok!(app.run(Some(requests.path())).await);

    assert_eq!(stats.total, 1);
    assert_eq!(stats.success, 1);
    assert_eq!(stats.failed, 0);

    let written = output.path().join("Science_Class_10_Board_Coaching.html");
    let html = std::fs::read_to_string(&written).unwrap();
    assert!(html.contains("layout-two-column"));
    assert!(html.contains("Patna Success Classes"));

    let latest = app.session().latest().unwrap();
    assert_eq!(latest.file_name, "Science_Class_10_Board_Coaching.html");
    assert_eq!(app.session().history().len(), 1);
}

#[tokio::test]
async fn test_app_counts_failures() {
    let output = tempfile::tempdir().unwrap();
    let request_file = output.path().join("empty.toml");
    std::fs::write(&request_file, "[generation]\nsubject = \"Maths\"\n").unwrap();

    let backend = FakeBackend::new(account_models(), vec![]);
    let config = Config {
        output_folder: output.path().join("out").to_string_lossy().to_string(),
        ..Default::default()
    };
    let mut app = App::with_flow(config, flow_with(backend, RecordingSleeper::default()));

    let stats = assert_ok!(app.run(Some(Path::new(&request_file))).await);

    assert_eq!(stats.total, 1);
    assert_eq!(stats.failed, 1);
    assert!(app.session().history().is_empty());
}

#[tokio::test]
async fn test_output_write_failure_is_file_error() {
    let dir = tempfile::tempdir().unwrap();
    // 输出目录位置上已经是一个普通文件
    let blocker = dir.path().join("output");
    std::fs::write(&blocker, "not a folder").unwrap();

    let backend = FakeBackend::new(account_models(), vec![]);
    let config = Config {
        output_folder: blocker.to_string_lossy().to_string(),
        ..Default::default()
    };
    let mut app = App::with_flow(config, flow_with(backend, RecordingSleeper::default()));

    let mut request = science_request(0);
    request.manual.text = "Define focus.".to_string();

    let err = assert_err!(app.generate_one(&request).await);
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::File(FileError::WriteFailed { .. }))
    ));
    assert!(app.session().history().is_empty());
}
