mod logger;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logger::CliLogger;
use pdf_answer_key::{AnswerKeyGenerator, GenerationOptions, GenerationRequest};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "anskey", about = "Answer-key PDF generator", version)]
struct Cli {
    /// More log output (repeat for debug/trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watermark a question paper and append its answer key
    Generate(GenerateArgs),

    /// Print the direct-download form of a Google Drive share link
    DriveUrl {
        url: String,
    },

    /// Write the default configuration as JSON
    InitConfig {
        path: PathBuf,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Question paper PDF
    #[arg(short, long)]
    paper: PathBuf,

    /// Answer key CSV (columns Key1, Key2, ...)
    #[arg(short, long)]
    answers: PathBuf,

    /// Background image (PNG/JPEG); the configured default is downloaded otherwise
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Solutions text, one `number | answer | explanation` per line
    #[arg(short, long)]
    solutions: Option<PathBuf>,

    /// Output PDF file
    #[arg(short, long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Directory for `<paper>_WITH_KEY.pdf` (default: next to the paper)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watermark text
    #[arg(long)]
    watermark: Option<String>,

    /// Telegram link on generated pages
    #[arg(long)]
    telegram: Option<String>,

    /// Instagram link on generated pages
    #[arg(long)]
    instagram: Option<String>,

    /// Where the downloaded font is cached
    #[arg(long)]
    font_cache: Option<PathBuf>,

    /// Local TrueType font for generated text (skips the download)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Leave out the detailed-solutions pages
    #[arg(long)]
    no_solutions: bool,

    /// Show statistics only, don't generate PDF
    #[arg(long)]
    stats_only: bool,
}

impl GenerateArgs {
    /// Config file (or defaults) with command-line overrides applied
    async fn options(&self) -> Result<GenerationOptions> {
        let mut options = match &self.config {
            Some(path) => GenerationOptions::load(path)
                .await
                .with_context(|| format!("loading config {}", path.display()))?,
            None => GenerationOptions::default(),
        };

        if let Some(text) = &self.watermark {
            options.watermark_text = text.clone();
        }
        if let Some(link) = &self.telegram {
            options.telegram_link = link.clone();
        }
        if let Some(link) = &self.instagram {
            options.instagram_link = link.clone();
        }
        if let Some(path) = &self.font_cache {
            options.font_cache_path = path.clone();
        }
        if self.no_solutions {
            options.include_solutions = false;
        }

        Ok(options)
    }

    async fn request(&self) -> Result<GenerationRequest> {
        let mut request = GenerationRequest::from_paths(&self.paper, &self.answers).await?;

        if let Some(path) = &self.background {
            let bytes = pdf_answer_key::io::read_input(path, "background image").await?;
            request = request.with_background(bytes);
        }
        if let Some(path) = &self.solutions {
            let text = pdf_answer_key::io::read_text_input(path, "solutions text").await?;
            request = request.with_solutions(text);
        }

        Ok(request)
    }

    fn output_path(&self, file_name: &str) -> PathBuf {
        if let Some(path) = &self.output {
            return path.clone();
        }
        let dir = match &self.output_dir {
            Some(dir) => dir.as_path(),
            None => self.paper.parent().unwrap_or(Path::new("")),
        };
        dir.join(file_name)
    }
}

async fn generate(args: GenerateArgs) -> Result<()> {
    let options = args.options().await?;
    let request = args.request().await?;

    let mut generator = AnswerKeyGenerator::new(options);
    if let Some(font) = &args.font {
        generator = generator.with_font_file(font);
    }

    if args.stats_only {
        let stats = generator.statistics(&request).await?;
        println!("Answer Key Statistics:");
        println!("  Source pages: {}", stats.source_pages);
        println!("  Questions: {}", stats.total_questions);
        println!("  Grid columns: {}", stats.grid_columns);
        println!("  Solution entries: {}", stats.solution_entries);
        println!("  Solution pages: {}", stats.solution_pages);
        println!("  Generated pages: {}", stats.generated_pages);
        println!("  Output pages: {}", stats.output_pages);
        return Ok(());
    }

    let output = generator.generate(&request).await?;
    let path = args.output_path(&output.file_name);
    let pages = output.statistics.output_pages;
    output
        .save(&path)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Generated {} pages → {}", pages, path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    CliLogger::new(CliLogger::level_for(cli.verbose, cli.quiet))
        .init()
        .context("installing logger")?;

    match cli.command {
        Commands::Generate(args) => generate(args).await?,

        Commands::DriveUrl { url } => {
            println!("{}", pdf_answer_key::drive_download_url(&url));
        }

        Commands::InitConfig { path } => {
            GenerationOptions::default().save(&path).await?;
            println!("Wrote default configuration → {}", path.display());
        }
    }

    Ok(())
}
