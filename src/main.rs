use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use console::style;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use tubescript::innertube::parse_video_id;
use tubescript::output::{self, OutputFormat};
use tubescript::{ClientConfig, TranscriptClient};

#[derive(Parser, Debug, Clone)]
#[command(name = "tubescript")]
#[command(version)]
#[command(about = "Print YouTube transcripts or list their caption tracks", long_about = None)]
struct Args {
    /// YouTube URL or video ID (not required if using --batch-file)
    #[arg(required_unless_present = "batch_file")]
    video: Option<String>,

    /// Language code of the transcript to print (e.g. "en"). Without it, tracks are listed
    #[arg(conflicts_with = "batch_file")]
    language: Option<String>,

    /// Language code used with --batch-file (default: first track)
    #[arg(short, long = "lang", conflicts_with = "language")]
    lang: Option<String>,

    /// Print the first available transcript instead of listing tracks
    #[arg(long, conflicts_with = "language")]
    first: bool,

    /// Output format for transcripts
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the transcript to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output directory for transcripts (used with --batch-file)
    #[arg(short = 'O', long, default_value = ".")]
    output_dir: PathBuf,

    /// Batch file containing URLs or IDs (one per line)
    #[arg(short, long)]
    batch_file: Option<PathBuf>,

    /// Number of concurrent fetches in batch mode
    #[arg(short, long, default_value = "3")]
    jobs: usize,

    /// InnerTube client version to announce
    #[arg(long)]
    client_version: Option<String>,

    /// Interface language sent to the player API
    #[arg(long, default_value = "en")]
    hl: String,

    /// Region sent to the player API
    #[arg(long, default_value = "US")]
    gl: String,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Be quiet (minimal output)
    #[arg(short, long)]
    quiet: bool,

    /// Log pipeline steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig {
            hl: self.hl.clone(),
            gl: self.gl.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            ..ClientConfig::default()
        };
        if let Some(version) = &self.client_version {
            config.client_version = version.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "tubescript=debug" } else { "tubescript=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let client = TranscriptClient::new(args.client_config())?;

    if let Some(batch_file) = &args.batch_file {
        return run_batch(Arc::new(client), batch_file, &args).await;
    }

    let input = args
        .video
        .as_deref()
        .ok_or_else(|| anyhow!("No video given"))?;
    let video_id = parse_video_id(input)?;

    let language = args.language.as_deref().or(args.lang.as_deref());
    if language.is_none() && !args.first {
        let spinner = spinner("Looking up caption tracks...", args.quiet);
        let tracks = client.list_transcripts(&video_id).await;
        spinner.finish_and_clear();

        output::print_tracks(&tracks?);
        return Ok(());
    }

    let spinner = spinner("Fetching transcript...", args.quiet);
    let transcript = client.get_transcript(&video_id, language).await;
    spinner.finish_and_clear();
    let transcript = transcript?;

    let rendered = output::render(&transcript, args.format)?;
    match &args.output {
        Some(path) => {
            write_file(path, &rendered)?;
            if !args.quiet {
                println!(
                    "{} Saved {} transcript: {}",
                    style("[tubescript]").cyan().bold(),
                    transcript.track.language_code,
                    style(path.display()).yellow()
                );
            }
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

async fn run_batch(client: Arc<TranscriptClient>, batch_file: &Path, args: &Args) -> Result<()> {
    let content = std::fs::read_to_string(batch_file)
        .map_err(|e| anyhow!("Cannot read {}: {}", batch_file.display(), e))?;

    let inputs: Vec<String> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.to_string())
        .collect();

    if inputs.is_empty() {
        bail!("No URLs found in batch file");
    }

    let total = inputs.len();
    let jobs = args.jobs.clamp(1, 10);

    if !args.quiet {
        println!(
            "{} Processing {} videos with {} concurrent jobs",
            style("[tubescript]").cyan().bold(),
            style(total).yellow(),
            style(jobs).yellow()
        );
    }

    std::fs::create_dir_all(&args.output_dir)
        .map_err(|e| anyhow!("Cannot create {}: {}", args.output_dir.display(), e))?;

    let completed = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    stream::iter(inputs.into_iter().enumerate())
        .map(|(idx, input)| {
            let client = Arc::clone(&client);
            let completed = Arc::clone(&completed);
            let failed = Arc::clone(&failed);

            async move {
                match fetch_one(&client, &input, args).await {
                    Ok(path) => {
                        completed.fetch_add(1, Ordering::SeqCst);
                        if !args.quiet {
                            println!(
                                "{} [{}] Saved: {}",
                                style("[tubescript]").cyan().bold(),
                                idx + 1,
                                style(path.display()).yellow()
                            );
                        }
                    }
                    Err(e) => {
                        failed.fetch_add(1, Ordering::SeqCst);
                        tracing::warn!(input = %input, error = %e, "batch item failed");
                        if !args.quiet {
                            eprintln!("{} [{}] {}: {}", style("[tubescript]").red().bold(), idx + 1, input, e);
                        }
                    }
                }
            }
        })
        .buffer_unordered(jobs)
        .collect::<Vec<()>>()
        .await;

    let success = completed.load(Ordering::SeqCst);
    let failures = failed.load(Ordering::SeqCst);

    if !args.quiet {
        println!();
        println!(
            "{} Batch complete: {} succeeded, {} failed",
            style("[tubescript]").cyan().bold(),
            style(success).green(),
            if failures > 0 { style(failures).red() } else { style(failures).dim() }
        );
    }

    if failures > 0 && success == 0 {
        bail!("All transcripts failed");
    }
    Ok(())
}

async fn fetch_one(client: &TranscriptClient, input: &str, args: &Args) -> Result<PathBuf> {
    let video_id = parse_video_id(input)?;
    let transcript = client.get_transcript(&video_id, args.lang.as_deref()).await?;

    let filename = format!(
        "{}.{}.{}",
        video_id,
        transcript.track.language_code,
        args.format.extension()
    );
    let path = args.output_dir.join(filename);
    write_file(&path, &output::render(&transcript, args.format)?)?;
    Ok(path)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| anyhow!("Cannot write {}: {}", path.display(), e))
}

fn spinner(message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
