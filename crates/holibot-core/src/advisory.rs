//! Maps known remote failures to user-facing advisories.
//!
//! Two failures are common enough to deserve a friendly message: the
//! knowledge base's Aurora cluster waking from auto-pause
//! (`dependencyFailedException`) and model throttling
//! (`throttlingException`). Recovery is always manual; nothing retries.

use serde::Serialize;

use crate::agents::AgentError;

const DEPENDENCY_FAILED: &str = "dependencyFailedException";
const THROTTLING: &str = "throttlingException";

const DEPENDENCY_FAILED_MESSAGE: &str = "【エラー】ナレッジベースのAurora DBがスリープしていたようです。しばらく待ってから、ブラウザをリロードして再度お試しください🙏";
const THROTTLING_MESSAGE: &str = "【エラー】Bedrockのモデル負荷が高いようです。1分後にブラウザをリロードして再度お試しください🙏（改善しない場合は、モデルを変更するか[サービスクォータの引き上げ申請](https://aws.amazon.com/jp/blogs/news/generative-ai-amazon-bedrock-handling-quota-problems/)を実施ください）";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AdvisoryKind {
    /// Knowledge-base database was asleep.
    DependencyFailed,
    /// Model capacity exhausted.
    Throttled,
}

/// A fixed message shown instead of a raw error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: &'static str,
}

impl Advisory {
    pub fn new(kind: AdvisoryKind) -> Self {
        let message = match kind {
            AdvisoryKind::DependencyFailed => DEPENDENCY_FAILED_MESSAGE,
            AdvisoryKind::Throttled => THROTTLING_MESSAGE,
        };
        Self { kind, message }
    }
}

/// Classify an agent error.
///
/// Returns the advisory for a recognized failure, or hands the original
/// error back unchanged so the caller can propagate it. Only `Client` and
/// `EventStream` errors are ever recognized.
pub fn classify(err: AgentError) -> Result<Advisory, AgentError> {
    let text = match &err {
        AgentError::Client(_) | AgentError::EventStream(_) => err.message().to_ascii_lowercase(),
        _ => return Err(err),
    };

    if text.contains(&DEPENDENCY_FAILED.to_ascii_lowercase()) {
        Ok(Advisory::new(AdvisoryKind::DependencyFailed))
    } else if text.contains(&THROTTLING.to_ascii_lowercase()) {
        Ok(Advisory::new(AdvisoryKind::Throttled))
    } else {
        Err(err)
    }
}
