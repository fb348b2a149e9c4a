use crate::config::{ArtifactPaths, Config};
use crate::error::{BurnsubError, Result};
use crate::fonts::{is_font_available, list_font_families};
use crate::media::{FfmpegBurner, SubtitleRenderer, VideoSource, YtDlp};
use crate::resync::{Ffsubsync, Resynchronizer};
use crate::subtitle::ass::compile_file;
use crate::subtitle::{build_track_pair, SkippedBlock, StyleSpec, StyledTrack, TrackPair};
use crate::transcribe::{Segment, Transcriber, WhisperCli};
use crate::translate::{ArgosRegistry, LanguagePair, TranslatorAdapter, TranslatorState};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Options for a pipeline run that do not come from [`Config`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Show progress spinners.
    pub show_progress: bool,
    /// Warn before rendering if the configured font is not installed.
    pub check_font: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            check_font: true,
        }
    }
}

/// The external steps of a run. Each one can be swapped for a test double.
pub struct Collaborators {
    pub source: Box<dyn VideoSource>,
    pub transcriber: Box<dyn Transcriber>,
    pub translator: TranslatorAdapter,
    pub resync: Box<dyn Resynchronizer>,
    pub renderer: Box<dyn SubtitleRenderer>,
}

impl Collaborators {
    /// The command-line tools: yt-dlp, whisper, Argos Translate, ffsubsync and FFmpeg.
    pub fn from_config(config: &Config) -> Self {
        let pair = LanguagePair::en_th();
        let registry = ArgosRegistry::new().with_index_url(config.package_index_url.clone());

        Self {
            source: Box::new(YtDlp::new()),
            transcriber: Box::new(whisper_for(config, &pair)),
            translator: TranslatorAdapter::new(Box::new(registry), pair),
            resync: Box::new(Ffsubsync::new()),
            renderer: Box::new(FfmpegBurner::new()),
        }
    }
}

/// Whisper transcribes in the translation's source language instead of guessing it.
fn whisper_for(config: &Config, pair: &LanguagePair) -> WhisperCli {
    WhisperCli::new(config.whisper_model).with_language(pair.from.clone())
}

/// Statistics from a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub total_time: Duration,
    pub acquisition_time: Duration,
    pub transcription_time: Duration,
    pub translation_time: Duration,
    pub resync_time: Duration,
    pub render_time: Duration,
    /// Segments whose translation fell back to the original text.
    pub translation_failures: usize,
}

/// Result of a successful pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    pub artifacts: ArtifactPaths,
    pub segments: Vec<Segment>,
    pub tracks: TrackPair,
    pub styled: StyledTrack,
    pub translation_state: TranslatorState,
    /// Blocks of the resynced track that could not be read.
    pub skipped_blocks: Vec<SkippedBlock>,
    pub stats: PipelineStats,
}

fn spinner(multi_progress: Option<&MultiProgress>, message: &'static str) -> Option<ProgressBar> {
    multi_progress.map(|mp| {
        let pb = mp.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    })
}

fn finish(pb: Option<ProgressBar>, message: String) {
    if let Some(pb) = pb {
        pb.finish_with_message(message);
    }
}

fn warn_if_font_missing(font_name: &str) {
    match list_font_families() {
        Ok(families) if !is_font_available(&families, font_name) => {
            warn!(
                "Font '{}' not found among installed fonts; the renderer will substitute another",
                font_name
            );
        }
        Ok(_) => debug!("Font '{}' is installed", font_name),
        Err(e) => debug!("Could not list installed fonts: {}", e),
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Turn a media locator into a video with translated, burned-in subtitles.
///
/// Stages run strictly in order:
/// 1. Download the video
/// 2. Transcribe the speech
/// 3. Translate each segment and write both SRT tracks
/// 4. Resync the translated track against the audio
/// 5. Compile the styled track
/// 6. Burn it into the video and check the output exists
///
/// The first failing stage aborts the run. Translation failures never do.
pub async fn run_pipeline(
    locator: &str,
    config: &Config,
    collaborators: &mut Collaborators,
    pipeline_config: &PipelineConfig,
) -> Result<PipelineResult> {
    let start_time = Instant::now();

    let locator = locator.trim();
    if locator.is_empty() {
        return Err(BurnsubError::Usage(
            "Please provide a video URL as an argument".to_string(),
        ));
    }
    config.validate()?;

    ensure_dir(&config.input_dir)?;
    ensure_dir(&config.output_dir)?;
    let artifacts = config.artifacts();
    let mut stats = PipelineStats::default();

    if pipeline_config.check_font {
        warn_if_font_missing(&config.font_name);
    }

    let multi_progress = if pipeline_config.show_progress {
        Some(MultiProgress::new())
    } else {
        None
    };

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 1: Acquisition
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 1/6: Downloading {} with {}", locator, collaborators.source.name());
    let stage_start = Instant::now();
    let pb = spinner(multi_progress.as_ref(), "Downloading video...");

    collaborators.source.fetch(locator, &artifacts.video).await?;

    stats.acquisition_time = stage_start.elapsed();
    finish(pb, format!("✓ Video downloaded ({:.1}s)", stats.acquisition_time.as_secs_f64()));

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 2: Transcription
    // ═══════════════════════════════════════════════════════════════════════
    info!(
        "Stage 2/6: Transcribing with {}",
        collaborators.transcriber.name()
    );
    let stage_start = Instant::now();
    let pb = spinner(multi_progress.as_ref(), "Transcribing audio...");

    let segments = collaborators.transcriber.transcribe(&artifacts.video).await?;

    stats.transcription_time = stage_start.elapsed();
    finish(pb, format!("✓ Transcribed {} segments", segments.len()));
    info!(
        "Transcription complete: {} segments in {:.2}s",
        segments.len(),
        stats.transcription_time.as_secs_f64()
    );

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 3: Translation and SRT tracks
    // ═══════════════════════════════════════════════════════════════════════
    info!(
        "Stage 3/6: Translating {} segments ({})",
        segments.len(),
        collaborators.translator.pair()
    );
    let stage_start = Instant::now();
    let pb = multi_progress.as_ref().map(|mp| {
        let pb = mp.add(ProgressBar::new(segments.len() as u64));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    });

    let tracks = build_track_pair(&segments, &mut collaborators.translator, pb.as_ref()).await?;
    tracks.write(&artifacts.original_track, &artifacts.translated_track)?;

    stats.translation_time = stage_start.elapsed();
    stats.translation_failures = collaborators.translator.failures();
    let translation_state = collaborators.translator.state();
    finish(pb, format!("✓ Wrote {} subtitle entries", tracks.translated.len()));

    if translation_state == TranslatorState::Unavailable {
        warn!("Translation unavailable; the translated track contains the original text");
    } else if stats.translation_failures > 0 {
        warn!(
            "{} segment(s) kept their original text after translation failures",
            stats.translation_failures
        );
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 4: Resync
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 4/6: Syncing subtitle timing with {}", collaborators.resync.name());
    let stage_start = Instant::now();
    let pb = spinner(multi_progress.as_ref(), "Syncing subtitle timing...");

    collaborators
        .resync
        .resync(&artifacts.video, &artifacts.translated_track, &artifacts.synced_track)
        .await?;

    stats.resync_time = stage_start.elapsed();
    finish(pb, "✓ Subtitle timing synced".to_string());

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 5: Styled track
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 5/6: Generating styled subtitle track");
    let (styled, skipped_blocks) = compile_file(
        &artifacts.synced_track,
        &artifacts.styled_track,
        StyleSpec::with_font(config.font_name.as_str()),
    )?;

    if !skipped_blocks.is_empty() {
        warn!(
            "{} block(s) of {} could not be read and were left out",
            skipped_blocks.len(),
            artifacts.synced_track.display()
        );
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 6: Render and verify
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 6/6: Embedding subtitles with {}", collaborators.renderer.name());
    let stage_start = Instant::now();
    let pb = spinner(multi_progress.as_ref(), "Embedding subtitles into video...");

    collaborators
        .renderer
        .render(&artifacts.video, &artifacts.styled_track, &artifacts.output_video)
        .await?;

    stats.render_time = stage_start.elapsed();

    if !artifacts.output_video.exists() {
        finish(pb, "✗ Output video not created".to_string());
        return Err(BurnsubError::Verification(artifacts.output_video.clone()));
    }
    finish(pb, "✓ Subtitles embedded".to_string());

    stats.total_time = start_time.elapsed();
    info!("Done: {}", artifacts.output_video.display());

    Ok(PipelineResult {
        artifacts,
        segments,
        tracks,
        styled,
        translation_state,
        skipped_blocks,
        stats,
    })
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    println!();
    println!("{}", style("═══════════════════════════════════════════════════════════════").cyan());
    println!("{}", style("                    Subtitled Video Complete                    ").cyan());
    println!("{}", style("═══════════════════════════════════════════════════════════════").cyan());
    println!();
    println!("  Output:       {}", style(result.artifacts.output_video.display()).green());
    println!("  Styled track: {}", result.artifacts.styled_track.display());
    println!("  Segments:     {}", result.segments.len());
    println!("  Dialogues:    {}", result.styled.dialogues.len());
    println!("  Translation:  {}", result.translation_state);
    println!();
    println!("  Timing:");
    println!("    Download:    {:.2}s", result.stats.acquisition_time.as_secs_f64());
    println!("    Transcribe:  {:.2}s", result.stats.transcription_time.as_secs_f64());
    println!("    Translate:   {:.2}s", result.stats.translation_time.as_secs_f64());
    println!("    Sync:        {:.2}s", result.stats.resync_time.as_secs_f64());
    println!("    Render:      {:.2}s", result.stats.render_time.as_secs_f64());
    println!("    Total:       {:.2}s", result.stats.total_time.as_secs_f64());
    if result.stats.translation_failures > 0 {
        println!();
        println!(
            "  {} {} segment(s) were left untranslated",
            style("!").yellow(),
            result.stats.translation_failures
        );
    }
    if !result.skipped_blocks.is_empty() {
        println!(
            "  {} {} unreadable block(s) were dropped from the styled track",
            style("!").yellow(),
            result.skipped_blocks.len()
        );
    }
    println!();
    println!("{}", style("═══════════════════════════════════════════════════════════════").cyan());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert!(config.show_progress);
        assert!(config.check_font);
    }

    #[test]
    fn test_collaborators_from_config() {
        let collaborators = Collaborators::from_config(&Config::default());
        assert_eq!(collaborators.source.name(), "yt-dlp");
        assert_eq!(collaborators.transcriber.name(), "whisper");
        assert_eq!(collaborators.resync.name(), "ffsubsync");
        assert_eq!(collaborators.renderer.name(), "ffmpeg");
        assert_eq!(collaborators.translator.state(), TranslatorState::Uninitialized);
        assert_eq!(collaborators.translator.pair(), &LanguagePair::en_th());
    }

    #[test]
    fn test_whisper_uses_source_language() {
        let whisper = whisper_for(&Config::default(), &LanguagePair::en_th());
        assert_eq!(whisper.language(), Some("en"));
    }

    #[tokio::test]
    async fn test_empty_locator_is_usage_error() {
        let mut collaborators = Collaborators::from_config(&Config::default());
        let result = run_pipeline(
            "   ",
            &Config::default(),
            &mut collaborators,
            &PipelineConfig::default(),
        )
        .await;
        match result {
            Err(e) => assert_eq!(e.exit_code(), 2),
            Ok(_) => panic!("Expected usage error"),
        }
    }
}
