use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use export_view_core::session::source_hash;
use export_view_core::{diagnostics, seed, DecodeWorker, SelfPolicy, Session, ViewerConfig};

mod document;

const DECODE_TIMEOUT: Duration = Duration::from_secs(120);
const DEMO_MESSAGES_PER_DAY: usize = 40;

#[derive(Debug, Parser)]
#[command(name = "export-view", about = "Render a chat export into paginated HTML")]
struct Cli {
    /// Exported chat history (JSON)
    #[arg(required_unless_present = "demo")]
    input: Option<PathBuf>,

    /// Render a generated export with this many messages
    #[arg(long, conflicts_with = "input")]
    demo: Option<usize>,

    /// Zero-based page written to stdout
    #[arg(long, default_value_t = 0)]
    page: usize,

    /// Write every page as page-NNN.html into this directory
    #[arg(long, conflicts_with = "json")]
    out_dir: Option<PathBuf>,

    /// Print the rendered page as JSON blocks instead of a document
    #[arg(long)]
    json: bool,

    /// participant_id or display_name
    #[arg(long, value_parser = parse_policy)]
    policy: Option<SelfPolicy>,

    #[arg(long)]
    page_size: Option<usize>,
}

fn parse_policy(raw: &str) -> Result<SelfPolicy, String> {
    SelfPolicy::parse(raw).ok_or_else(|| format!("unknown policy: {}", raw))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ViewerConfig::from_env();
    if let Some(policy) = cli.policy {
        config.self_policy = policy;
    }
    if let Some(size) = cli.page_size {
        config.page_capacity = size;
    }
    let log_dir = config.log_dir.clone();
    let result = run(&cli, config);
    if let Err(ref err) = result {
        diagnostics::maybe_log(log_dir.as_deref(), "app_error", &format!("{:#}", err));
    }
    result
}

fn run(cli: &Cli, config: ViewerConfig) -> Result<()> {
    let bytes = match (&cli.input, cli.demo) {
        (_, Some(count)) => seed::demo_export(count, DEMO_MESSAGES_PER_DAY)
            .to_string()
            .into_bytes(),
        (Some(path), None) => fs::read(path).with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("no input given"),
    };

    let mut session = Session::new(config)?;
    let worker = DecodeWorker::new(session.config().log_dir.clone());
    let hash = source_hash(&bytes);
    let response = worker
        .submit(bytes)
        .wait_timeout(DECODE_TIMEOUT)
        .context("decode was superseded")?;
    session
        .apply_decoded(hash, response)
        .context("failed to load chat export")?;

    if let Some(dir) = &cli.out_dir {
        return write_all_pages(&mut session, dir);
    }

    session.go_to_page(cli.page)?;
    let page = session.render_current_page()?;
    let output = if cli.json {
        serde_json::to_string_pretty(&page)?
    } else {
        document::render_document(&page, session.config())
    };
    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn write_all_pages(session: &mut Session, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let total = session.pagination().map(|p| p.total_pages).unwrap_or(1);
    for page_no in 0..total {
        session.go_to_page(page_no)?;
        let page = session.render_current_page()?;
        let path = dir.join(document::page_file_name(page_no));
        fs::write(&path, document::render_document(&page, session.config()))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    eprintln!("wrote {} page(s) to {}", total, dir.display());
    Ok(())
}
