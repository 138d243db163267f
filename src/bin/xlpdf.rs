//! Command-line front end: convert workbooks, inspect them, or render
//! pre-built drawing elements.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xlpdf::render::pages_from_json;
use xlpdf::{DrawingSurface, PdfSurface, RenderDispatcher, RenderOptions};

#[derive(Parser)]
#[command(name = "xlpdf", about = "Render XLSX sheets to PDF pages", version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a workbook to PDF, one sheet per page
    Convert {
        /// Input XLSX file
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Dump the parsed workbook as JSON
    Inspect {
        /// Input XLSX file
        input: PathBuf,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render pages of JSON drawing elements to PDF
    Render {
        /// JSON file holding `[[element, ...], ...]`
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Args)]
struct PageArgs {
    /// Font to embed, as `FAMILY=PATH` or `PATH` (family taken from the file name).
    /// The first font is the default.
    #[arg(short, long = "font", value_name = "[FAMILY=]PATH")]
    fonts: Vec<String>,

    /// JSON file with render options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Inset between cell edges and text
    #[arg(long)]
    padding: Option<f64>,

    /// Characters kept per cell (0 keeps all)
    #[arg(long)]
    max_content_length: Option<usize>,
}

impl PageArgs {
    fn options(&self) -> Result<RenderOptions> {
        let mut options = match &self.config {
            Some(path) => RenderOptions::from_json_file(path)
                .with_context(|| format!("reading options from {}", path.display()))?,
            None => RenderOptions::default(),
        };
        if let Some(padding) = self.padding {
            options.padding = padding;
        }
        if let Some(max) = self.max_content_length {
            options.max_content_length = Some(max);
        }
        Ok(options)
    }

    fn surface(&self, options: &RenderOptions) -> Result<PdfSurface> {
        let mut surface = PdfSurface::new(options.page_width, options.page_height);
        for spec in &self.fonts {
            let (family, path) = split_font_arg(spec);
            surface
                .register_font_file(&family, path)
                .with_context(|| format!("loading font {spec}"))?;
        }
        Ok(surface)
    }
}

/// Split `FAMILY=PATH`; a bare path names the family after its file stem.
fn split_font_arg(spec: &str) -> (String, &Path) {
    if let Some((family, path)) = spec.split_once('=') {
        return (family.to_string(), Path::new(path));
    }
    let path = Path::new(spec);
    let family = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (family, path)
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn convert(input: &Path, output: &Path, page: &PageArgs) -> Result<()> {
    let workbook = xlpdf::parser::parse_file(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let options = page.options()?;
    let mut surface = page.surface(&options)?;
    let pages = xlpdf::convert_workbook(&workbook, &mut surface, &options)
        .with_context(|| format!("converting {}", input.display()))?;
    surface
        .save(output)
        .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(pages, output = %output.display(), "done");
    Ok(())
}

fn inspect(input: &Path, output: Option<&Path>) -> Result<()> {
    let workbook = xlpdf::parser::parse_file(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let json = serde_json::to_string_pretty(&workbook)?;
    match output {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn render(input: &Path, output: &Path, page: &PageArgs) -> Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let pages = pages_from_json(&json).context("decoding drawing elements")?;
    let options = page.options()?;
    let mut surface = page.surface(&options)?;
    let dispatcher = RenderDispatcher::new();
    for elements in &pages {
        surface.new_page()?;
        dispatcher.draw_all(&mut surface, elements)?;
    }
    surface
        .save(output)
        .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(pages = pages.len(), output = %output.display(), "done");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Convert {
            input,
            output,
            page,
        } => convert(input, output, page),
        Commands::Inspect { input, output } => inspect(input, output.as_deref()),
        Commands::Render {
            input,
            output,
            page,
        } => render(input, output, page),
    }
}
