//! Layout Translator CLI - staged, layout-preserving PDF translation.
//!
//! Stages can run one at a time (`extract`, `translate`, `export`) with the
//! layout JSON as the hand-off format, or all at once with `run`.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use layout_translator_core::{
    export_layout, AppConfig, ExportMode, Lang, LayoutBlock, LayoutDocument, LayoutExtractor,
    LayoutTranslator, PdfDocument, SkipFn, TextColor, TranslatorConfig,
};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeOption {
    Flowing,
    Positioned,
    Background,
}

impl From<ModeOption> for ExportMode {
    fn from(opt: ModeOption) -> Self {
        match opt {
            ModeOption::Flowing => Self::Flowing,
            ModeOption::Positioned => Self::Positioned,
            ModeOption::Background => Self::Background,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "layout-translate")]
#[command(author, version, about = "Translate PDF documents while keeping their layout", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Translation service connection
#[derive(Args, Debug, Default)]
struct ServiceArgs {
    /// LibreTranslate base URL (falls back to EXPO_PUBLIC_LT_URL)
    #[arg(long, env = "LT_URL")]
    lt_url: Option<String>,

    /// LibreTranslate API key (falls back to EXPO_PUBLIC_LT_API_KEY)
    #[arg(long, env = "LT_API_KEY", hide_env_values = true)]
    lt_api_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    lt_timeout: Option<u64>,
}

/// Output rendering
#[derive(Args, Debug)]
struct RenderArgs {
    /// Rendering variant
    #[arg(long, value_enum)]
    mode: Option<ModeOption>,

    /// Translated text color: black, dark-red, blue or dark-green
    #[arg(long, value_parser = parse_color)]
    color: Option<TextColor>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the text layout of a PDF into a JSON file
    Extract {
        /// Input PDF file
        input: PathBuf,
        /// Output layout JSON
        output: PathBuf,
    },

    /// Translate every pending block of a layout JSON
    Translate {
        /// Input layout JSON
        layout: PathBuf,
        /// Source language code
        source: String,
        /// Target language code
        target: String,
        /// Output layout JSON
        output: PathBuf,
        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Render a layout JSON to PDF
    Export {
        /// Input layout JSON
        layout: PathBuf,
        /// Output PDF file
        output: PathBuf,
        /// Original PDF, required by the background mode
        #[arg(long)]
        original: Option<PathBuf>,
        /// Hide a block from the output, as PAGE:BLOCK (0-based, repeatable)
        #[arg(long = "skip-block", value_parser = parse_block_ref)]
        skip_blocks: Vec<(usize, usize)>,
        #[command(flatten)]
        render: RenderArgs,
    },

    /// Extract, translate and export in one go
    Run {
        /// Input PDF file
        input: PathBuf,
        /// Output PDF file (default: input-<target>.pdf)
        output: Option<PathBuf>,
        /// Source language code
        #[arg(short = 's', long)]
        source: Option<String>,
        /// Target language code
        #[arg(short = 't', long)]
        target: Option<String>,
        /// Translate only the first N pages (0 = all)
        #[arg(long)]
        max_pages: Option<usize>,
        #[command(flatten)]
        render: RenderArgs,
        #[command(flatten)]
        service: ServiceArgs,
    },
}

/// Parse `PAGE:BLOCK`.
fn parse_block_ref(value: &str) -> Result<(usize, usize), String> {
    let (page, block) = value
        .split_once(':')
        .ok_or_else(|| format!("expected PAGE:BLOCK, got '{value}'"))?;
    let page = page.trim().parse().map_err(|e| format!("invalid page '{page}': {e}"))?;
    let block = block.trim().parse().map_err(|e| format!("invalid block '{block}': {e}"))?;
    Ok((page, block))
}

fn parse_color(value: &str) -> Result<TextColor, String> {
    TextColor::from_name(value).ok_or_else(|| format!("unknown color '{value}'"))
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path).context("Failed to load config file"),
        None => Ok(AppConfig::load()),
    }
}

/// Flags and `LT_*` variables win over the config file, which wins over
/// the `EXPO_PUBLIC_*` fallbacks.
fn apply_service(config: &mut AppConfig, service: ServiceArgs) {
    let file = std::mem::take(&mut config.translator);
    let timeout_secs = service.lt_timeout.unwrap_or(file.timeout_secs);

    let mut translator = TranslatorConfig::new(service.lt_url, service.lt_api_key)
        .or(file)
        .or(TranslatorConfig::from_env());
    translator.timeout_secs = timeout_secs;
    config.translator = translator;
}

fn apply_render(config: &mut AppConfig, render: &RenderArgs) {
    if let Some(mode) = render.mode {
        config.export.mode = mode.into();
    }
    if let Some(color) = render.color {
        config.export.text_color = color;
    }
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} blocks ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

fn default_output(input: &Path, target: &Lang) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    input.with_file_name(format!("{stem}-{target}.pdf"))
}

fn load_pdf(path: &Path) -> Result<PdfDocument> {
    info!("Loading PDF: {}", path.display());
    PdfDocument::from_file(path).context(format!("Failed to load PDF: {}", path.display()))
}

async fn translate_with_progress(
    pipeline: &LayoutTranslator,
    layout: &mut LayoutDocument,
) -> Result<()> {
    info!("Translating with {}", pipeline.translator_info().name);
    let pb = progress_bar();
    let progress = |done: usize, total: usize| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    };

    let report = pipeline
        .translate(layout, Some(&progress))
        .await
        .context("Translation failed")?;

    pb.finish_with_message("Translation complete");
    info!(
        "{} blocks translated with {} requests",
        report.blocks_translated, report.requests
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let mut config = load_config(cli.config.as_deref())?;

    let written = match cli.command {
        Command::Extract { input, output } => {
            let doc = load_pdf(&input)?;
            let layout = LayoutExtractor::new(&doc).extract().context("Extraction failed")?;
            layout
                .save(&output)
                .context(format!("Failed to write layout: {}", output.display()))?;
            output
        }

        Command::Translate { layout: layout_path, source, target, output, service } => {
            config.source_lang = Lang::new(source);
            config.target_lang = Lang::new(target);
            apply_service(&mut config, service);

            let pipeline = LayoutTranslator::new(config).context("Failed to initialize translator")?;
            let mut layout = LayoutDocument::load(&layout_path)?;
            translate_with_progress(&pipeline, &mut layout).await?;
            layout
                .save(&output)
                .context(format!("Failed to write layout: {}", output.display()))?;
            output
        }

        Command::Export { layout: layout_path, output, original, skip_blocks, render } => {
            apply_render(&mut config, &render);
            let layout = LayoutDocument::load(&layout_path)?;

            let original = match (&original, config.export.mode.needs_original()) {
                (Some(path), true) => Some(load_pdf(path)?),
                (None, true) => bail!("--original is required for the background mode"),
                (_, false) => None,
            };

            let skip = |page: usize, block: usize, _: &LayoutBlock| skip_blocks.contains(&(page, block));
            let skip: SkipFn<'_> = &skip;
            let pdf = export_layout(
                &layout,
                original.as_ref(),
                &config,
                (!skip_blocks.is_empty()).then_some(skip),
            )
            .context("Export failed")?;

            std::fs::write(&output, pdf)
                .context(format!("Failed to write output: {}", output.display()))?;
            output
        }

        Command::Run { input, output, source, target, max_pages, render, service } => {
            if let Some(source) = source {
                config.source_lang = Lang::new(source);
            }
            if let Some(target) = target {
                config.target_lang = Lang::new(target);
            }
            if max_pages.is_some() {
                config.max_pages = max_pages;
            }
            apply_render(&mut config, &render);
            apply_service(&mut config, service);

            let output = output.unwrap_or_else(|| default_output(&input, &config.target_lang));
            let pipeline = LayoutTranslator::new(config).context("Failed to initialize translator")?;
            let doc = load_pdf(&input)?;

            let mut layout = pipeline.extract(&doc).context("Extraction failed")?;
            layout.truncate_pages(pipeline.config().max_pages);
            translate_with_progress(&pipeline, &mut layout).await?;
            let pdf = pipeline.export(&layout, Some(&doc)).context("Export failed")?;

            std::fs::write(&output, pdf)
                .context(format!("Failed to write output: {}", output.display()))?;
            output
        }
    };

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!("Saved: {}", written.display());
    }

    Ok(())
}
