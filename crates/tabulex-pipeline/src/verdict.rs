//! Verdict inference: table + source text → boolean decision + rationale.

use std::sync::Arc;

use tabulex_core::Verdict;
use tabulex_llm::{ChatModel, Message, complete_with_retry};
use tabulex_store::PromptTemplate;
use tracing::info;

use crate::error::PipelineError;
use crate::{MAX_TOKENS, TEMPERATURE};

/// 國民法官法 §6(1): the five grounds for ruling out citizen participation.
pub const STATUTE_TEXT: &str = "\
應行國民參與審判之案件，有下列情形之一者，法院得依職權或當事人、辯護人、輔佐人之聲請，\
於聽取當事人、辯護人、輔佐人之意見後，裁定不行國民參與審判：
一、有事實足認行國民參與審判有難期公正之虞。
二、對於國民法官、備位國民法官本人或其配偶、八親等內血親、五親等內姻親或家長、家屬之生命、身體、自由、名譽、財產有致生危害之虞。
三、案件情節繁雜或需高度專業知識，非經長久時日顯難完成審判。
四、被告就被訴事實為有罪之陳述，經審判長告知被告通常審判程序之旨，且依案件情節，認不行國民參與審判為適當。
五、其他有事實足認行國民參與審判顯不適當。";

pub const DEFAULT_QUERY: &str = "本案是否仍行國民法官審判？";

pub struct VerdictEngine {
    model: Arc<dyn ChatModel>,
    template: PromptTemplate,
    retries: u32,
}

impl VerdictEngine {
    pub fn new(model: Arc<dyn ChatModel>, template: PromptTemplate, retries: u32) -> Self {
        Self {
            model,
            template,
            retries,
        }
    }

    /// One LLM call embedding the query, statute block, source text, and the
    /// raw extracted table; the reply's first token decides the verdict.
    pub async fn infer(
        &self,
        query: &str,
        statute_text: &str,
        core_text: &str,
        raw_table_markdown: &str,
    ) -> Result<Verdict, PipelineError> {
        let prompt = self.template.render(&[
            ("table", raw_table_markdown.trim()),
            ("query", query),
            ("core", core_text),
            ("statute", statute_text),
        ]);

        let completion = complete_with_retry(
            self.model.as_ref(),
            &[Message::user(prompt)],
            TEMPERATURE,
            MAX_TOKENS,
            self.retries,
        )
        .await?;

        let verdict = parse_reply(&completion.content)?;
        info!(decision = verdict.decision, "verdict inferred");
        Ok(verdict)
    }
}

/// Parse the verdict reply: first whitespace-delimited token decides
/// (case-insensitive, true iff it starts with `T`); the remainder, with
/// leading whitespace stripped, is the rationale.
pub fn parse_reply(reply: &str) -> Result<Verdict, PipelineError> {
    let reply = reply.trim();
    let Some(first) = reply.split_whitespace().next() else {
        return Err(PipelineError::EmptyReply);
    };

    Ok(Verdict {
        decision: first.to_uppercase().starts_with('T'),
        rationale: reply[first.len()..].trim_start().to_string(),
    })
}
