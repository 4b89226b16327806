//! CLI argument surface and the single/batch entry points.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use tabulex_core::FactorRegistry;
use tabulex_llm::{AnthropicModel, ChatModel, GeminiModel, OpenAiModel, anthropic, gemini, openai};
use tabulex_pipeline::{BatchOrchestrator, CaseOutcome, Document};
use tabulex_store::{PromptTemplate, TableStore};
use tracing::info;

use crate::batch;

#[derive(Parser)]
#[command(
    name = "tabulex",
    about = "Extract a boolean factor table from a ruling and infer whether citizen-judge trial proceeds"
)]
struct Args {
    /// Ruling text file (.txt/.md) or batch CSV (.csv)
    input_file: PathBuf,

    /// LLM backend
    #[arg(long, value_enum, default_value_t = Backend::Claude)]
    llm: Backend,

    /// Model name; defaults to the backend's default model
    #[arg(long)]
    model: Option<String>,

    /// Directory for persisted table artifacts
    #[arg(long, default_value = "table_kb")]
    table_dir: PathBuf,

    /// Directory holding the prompt templates
    #[arg(long, default_value = "prompts")]
    prompts_dir: PathBuf,

    /// Output CSV path (batch mode); defaults to <stem>_with_verdict.csv
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Gemini,
    Openai,
    Claude,
}

fn build_model(backend: Backend, model: Option<String>) -> anyhow::Result<Arc<dyn ChatModel>> {
    Ok(match backend {
        Backend::Gemini => Arc::new(GeminiModel::from_env(
            model.unwrap_or_else(|| gemini::DEFAULT_MODEL.into()),
        )?),
        Backend::Openai => Arc::new(OpenAiModel::from_env(
            model.unwrap_or_else(|| openai::DEFAULT_MODEL.into()),
        )?),
        Backend::Claude => Arc::new(AnthropicModel::from_env(
            model.unwrap_or_else(|| anthropic::DEFAULT_MODEL.into()),
        )?),
    })
}

pub async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let model = build_model(args.llm, args.model.clone())?;
    info!(model = model.model_name(), "backend ready");

    let store = TableStore::new(&args.table_dir)?;
    let table_template = PromptTemplate::load(
        args.prompts_dir.join("construct_boolean_table.txt"),
        &["core"],
    )?;
    let verdict_template = PromptTemplate::load(
        args.prompts_dir.join("util_boolean.txt"),
        &["table", "query", "core", "statute"],
    )?;
    let orchestrator = BatchOrchestrator::new(model, store, table_template, verdict_template);

    let extension = args
        .input_file
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "md" => run_single(&orchestrator, &args).await,
        "csv" => run_batch(&orchestrator, &args).await,
        other => bail!("input_file must be .txt/.md or .csv, got '.{other}'"),
    }
}

async fn run_single(orchestrator: &BatchOrchestrator, args: &Args) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.input_file)
        .with_context(|| format!("reading {}", args.input_file.display()))?;
    let title = args
        .input_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("case-0")
        .to_string();

    let doc = Document {
        id: "0".into(),
        title,
        text,
    };
    let mut registry = FactorRegistry::new();
    let result = orchestrator.run_one(&doc, &mut registry).await?;

    println!("===== 抽取布林表 =====");
    for (name, value) in &result.record.bool_columns {
        println!("{name}: {value}");
    }
    for (name, value) in &result.record.extra_columns {
        println!("{name}: {} ({})", value.render(), value.kind());
    }
    println!("===== 最終判斷 =====");
    println!("Verdict: {}", result.verdict.decision);
    println!("Reason: {}", result.verdict.rationale);
    Ok(())
}

async fn run_batch(orchestrator: &BatchOrchestrator, args: &Args) -> anyhow::Result<()> {
    let source = batch::read_csv(&args.input_file)?;
    let documents = batch::documents_from_batch(&source)?;
    info!(rows = documents.len(), "batch loaded");

    let mut registry = FactorRegistry::new();
    let outcomes = orchestrator
        .run_with_registry(&documents, &mut registry)
        .await;

    let mut done = 0usize;
    for outcome in &outcomes {
        match outcome {
            CaseOutcome::Done(result) => {
                done += 1;
                println!("[{}] {} → {}", result.id, result.title, result.verdict.decision);
            }
            CaseOutcome::Skipped { id, title } => {
                eprintln!("[{id}] {title}: reasoning 空白，跳過");
            }
            CaseOutcome::Failed {
                id,
                title,
                state,
                error,
            } => {
                eprintln!("[{id}] {title}: failed at {state:?}: {error}");
            }
        }
    }

    let out_batch = batch::assemble_output(&source, &outcomes, &registry)?;
    let out_path = args.output.clone().unwrap_or_else(|| {
        let stem = args
            .input_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("batch");
        args.input_file
            .with_file_name(format!("{stem}_with_verdict.csv"))
    });
    batch::write_csv(&out_path, &out_batch)?;

    println!(
        "done: {done}/{} rows succeeded, output written to {}",
        documents.len(),
        out_path.display()
    );
    Ok(())
}
