//! `testgen`: generate tests for a source file through the generation service.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use testgen_client::prelude::*;
use testgen_client::{DEFAULT_ARTIFACT_FILE_NAME, init_observability};
use tokio::io::AsyncReadExt as _;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "testgen")]
#[command(about = "Generate unit tests for source code using a remote generation service")]
struct Cli {
    /// Base URL of the generation service (overrides TESTGEN_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit source code and wait for the generated tests
    Generate {
        /// Source file to generate tests for; `-` or nothing reads stdin
        file: Option<PathBuf>,
        /// Generation strategy
        #[arg(short, long, value_enum, default_value_t = ModeArg::Automatic)]
        mode: ModeArg,
        /// Where to save the generated tests (file or directory)
        #[arg(short, long, default_value = DEFAULT_ARTIFACT_FILE_NAME)]
        output: PathBuf,
        /// Print the generated tests without saving them
        #[arg(long)]
        no_save: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Long-running task with streamed logs
    Automatic,
    /// One-shot model-assisted generation
    Assisted,
}

impl From<ModeArg> for GenerationMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Automatic => GenerationMode::Automatic,
            ModeArg::Assisted => GenerationMode::Assisted,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    config::init();
    init_observability("warn");
    let cli = Cli::parse();

    let mut client_config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        client_config = client_config.base_url(base_url);
    }

    match cli.command {
        Commands::Generate {
            file,
            mode,
            output,
            no_save,
        } => {
            let source = read_source(file).await?;
            let mode = GenerationMode::from(mode);
            info!(base_url = %client_config.base_url, %mode, bytes = source.len(), "starting generation");
            let backend = HttpBackend::new(client_config)?;
            let saved = generate(
                TestGenerator::new(Arc::new(backend)),
                GenerationRequest::new(source, mode),
                (!no_save).then_some(output),
            )
            .await?;
            if let Some(path) = saved {
                eprintln!("Saved generated tests to {}", path.display());
            }
        }
    }
    Ok(())
}

async fn read_source(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut source = String::new();
            tokio::io::stdin()
                .read_to_string(&mut source)
                .await
                .context("failed to read source from stdin")?;
            Ok(source)
        }
    }
}

async fn generate(
    mut generator: TestGenerator,
    request: GenerationRequest,
    output: Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    let streaming = request.mode.is_streaming();
    if let Err(err) = generator.submit(request).await {
        error!(error = %err, "generation launch failed");
        return Err(anyhow::Error::new(err).context("error starting generation task"));
    }

    let mut printed = 0;
    if streaming {
        println!("--- generation logs ---");
        loop {
            printed = print_new_logs(&generator, printed);
            if generator.next_step().await.is_none() {
                break;
            }
        }
        print_new_logs(&generator, printed);
    }

    let Some(session) = generator.session() else {
        anyhow::bail!("no generation session was started");
    };
    let Some(artifact) = session.artifact() else {
        error!(session_id = %session.id(), logs = session.logs().len(), "generation finished without an artifact");
        anyhow::bail!("generation finished without producing tests");
    };
    info!(session_id = %session.id(), logs = session.logs().len(), bytes = artifact.len(), "generation finished");
    println!("--- generated tests ---");
    println!("{artifact}");

    match output {
        Some(target) => Ok(Some(save_artifact(artifact, &target)?)),
        None => Ok(None),
    }
}

fn print_new_logs(generator: &TestGenerator, already_printed: usize) -> usize {
    let logs = generator.session().map(SessionState::logs).unwrap_or_default();
    for line in logs.iter().skip(already_printed) {
        println!("{line}");
    }
    logs.len()
}
