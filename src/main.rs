use anyhow::{Context, Result};
use burnsub::fonts::{filter_families, list_font_families};
use burnsub::media::preflight;
use burnsub::{print_summary, run_pipeline, BurnsubError, Collaborators, Config, PipelineConfig};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "burnsub")]
#[command(version, about = "Download a video and burn translated subtitles into it")]
#[command(long_about = "Download a video, transcribe its speech with Whisper, translate the \
subtitles with Argos Translate, resync them with ffsubsync and burn a styled track into the \
video with FFmpeg.")]
struct Cli {
    /// Video URL to download
    url: Option<String>,

    /// List installed font families, optionally only those containing FILTER
    #[arg(long, value_name = "FILTER", num_args = 0..=1, default_missing_value = "")]
    list_fonts: Option<String>,

    /// Disable progress spinners
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn list_fonts(filter: &str) -> Result<()> {
    let families = list_font_families().context("Failed to list installed fonts")?;
    let matches = filter_families(&families, filter);

    if matches.is_empty() {
        info!("No installed fonts match '{}'", filter);
    }
    for family in matches {
        println!("{}", family);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    if let Some(filter) = cli.list_fonts.as_deref() {
        return list_fonts(filter);
    }

    let url = cli.url.ok_or_else(|| {
        BurnsubError::Usage("Please provide a video URL as an argument".to_string())
    })?;

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    preflight().context("Required tool missing")?;

    info!("URL:          {}", url);
    info!("Input dir:    {}", config.input_dir.display());
    info!("Output dir:   {}", config.output_dir.display());
    info!("Font:         {}", config.font_name);
    info!("Whisper:      {}", config.whisper_model);

    let pipeline_config = PipelineConfig {
        show_progress: !cli.no_progress,
        ..PipelineConfig::default()
    };
    let mut collaborators = Collaborators::from_config(&config);

    let result = run_pipeline(&url, &config, &mut collaborators, &pipeline_config).await?;
    print_summary(&result);

    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BurnsubError>())
        .map(BurnsubError::exit_code)
        .unwrap_or(1)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_url() {
        let cli = Cli::parse_from(["burnsub", "https://youtu.be/abc"]);
        assert_eq!(cli.url.as_deref(), Some("https://youtu.be/abc"));
        assert!(cli.list_fonts.is_none());
        assert!(!cli.no_progress);
    }

    #[test]
    fn test_cli_list_fonts() {
        let cli = Cli::parse_from(["burnsub", "--list-fonts"]);
        assert_eq!(cli.list_fonts.as_deref(), Some(""));
        assert!(cli.url.is_none());

        let cli = Cli::parse_from(["burnsub", "--list-fonts=thai"]);
        assert_eq!(cli.list_fonts.as_deref(), Some("thai"));
    }

    #[test]
    fn test_exit_code_from_chain() {
        let usage: anyhow::Error = BurnsubError::Usage("missing url".to_string()).into();
        assert_eq!(exit_code(&usage), 2);

        let config = anyhow::Error::from(BurnsubError::Config("bad".to_string()))
            .context("Configuration validation failed");
        assert_eq!(exit_code(&config), 2);

        let verification = anyhow::Error::from(BurnsubError::Verification("out.mp4".into()));
        assert_eq!(exit_code(&verification), 1);

        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
