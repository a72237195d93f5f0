use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgileError {
    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid repository '{0}': expected owner/name")]
    InvalidRepoSlug(String),

    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("github api error ({status}) for {url}: {body}")]
    GitHubApi {
        status: u16,
        url: String,
        body: String,
    },

    #[error("text generation error: {0}")]
    TextGeneration(String),

    #[error("no subjects to analyze: {0}")]
    NoSubjects(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, AgileError>;
