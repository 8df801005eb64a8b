use anyhow::{Context, Result, bail};
use std::time::Duration;

use cinewire::{
    agent::AgentConfig,
    config::Config,
    generate::OrchestratorSession,
    llm,
    pipeline::Pipeline,
    rating::VerdictTable,
    store::{ContentStore, MemoryContentStore, PgContentStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let mut agent_path = None;
    let mut dry_run = false;
    for arg in &mut args {
        match arg.as_str() {
            "--dry-run" => dry_run = true,
            path => agent_path = Some(path.to_string()),
        }
    }
    let Some(agent_path) = agent_path else {
        bail!("usage: cinewire [--dry-run] <agent-config.json>");
    };

    let config = Config::from_env()?;

    let raw = std::fs::read_to_string(&agent_path)
        .with_context(|| format!("failed to read agent config {agent_path}"))?;
    let agent: AgentConfig =
        serde_json::from_str(&raw).context("failed to parse agent config")?;

    let verdicts = match config.verdict_table_path() {
        Some(path) => VerdictTable::from_json_file(path)
            .with_context(|| format!("failed to load verdict table {path}"))?,
        None => VerdictTable::default(),
    };

    let client = llm::build_client(config.llm_model(), &config.provider_credentials())?;
    let session = OrchestratorSession::new(client, agent.word_count);

    // `--dry-run` keeps everything in memory: full pipeline, no writes
    // that outlive the process.
    let store: Box<dyn ContentStore> = if dry_run {
        Box::new(MemoryContentStore::new())
    } else {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(config.database_url())
            .await
            .context("failed to connect to content store")?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Box::new(PgContentStore::new(pool))
    };

    let pipeline = Pipeline::new(store.as_ref(), &session)
        .with_verdict_table(verdicts)
        .with_item_delay(Duration::from_secs(config.item_delay_secs()));

    let report = pipeline.run(&agent).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
