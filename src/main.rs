//! fb2pager - FB2 book paginator

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use fb2pager::{
    BuildOptions, Document, LoadOptions, MonospaceOracle, NestedTitles, PageDimensions,
    PaginationConfig, PaginationStrategy, load_document_from_path, rtf,
};

#[derive(Parser)]
#[command(name = "fb2pager")]
#[command(version, about = "Paginate FB2 books into RTF pages", long_about = None)]
#[command(after_help = "EXAMPLES:
    fb2pager book.fb2                 List chapters and their page ranges
    fb2pager -i book.fb2              Show book metadata
    fb2pager book.fb2 --page 12       Print page 12 as RTF
    fb2pager book.fb2 --page 12 -p    Print page 12 as plain text
    fb2pager book.fb2 --json          Print the page map as JSON")]
struct Cli {
    /// Input file (FB2)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 860)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 580)]
    height: u32,

    /// Fraction of the viewport height a page may fill
    #[arg(long, default_value_t = 0.8)]
    fill: f32,

    /// Advance width of one character for the built-in layout estimate
    #[arg(long, default_value_t = 10.0)]
    char_width: f32,

    /// Line height for the built-in layout estimate
    #[arg(long, default_value_t = 20.0)]
    line_height: f32,

    /// Grow pages one character at a time instead of bisecting
    #[arg(long)]
    linear: bool,

    /// Fail when a chapter cannot be laid out instead of keeping it whole
    #[arg(long)]
    strict: bool,

    /// Style titles of nested sections as headings
    #[arg(long)]
    nested_headings: bool,

    /// Show book metadata
    #[arg(short, long)]
    info: bool,

    /// Print one page by its global number (1-based)
    #[arg(long, value_name = "N")]
    page: Option<i64>,

    /// Print pages as plain text instead of RTF
    #[arg(short, long)]
    plain: bool,

    /// Print the page map as JSON
    #[arg(long, conflicts_with = "page")]
    json: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log pagination details
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        let strategy = if self.linear {
            PaginationStrategy::Linear
        } else {
            PaginationStrategy::Bisect
        };
        let nested_titles = if self.nested_headings {
            NestedTitles::Heading
        } else {
            NestedTitles::Inline
        };
        LoadOptions::new()
            .with_dimensions(PageDimensions::new(self.width, self.height))
            .with_build(BuildOptions::new().with_nested_titles(nested_titles))
            .with_pagination(
                PaginationConfig::new()
                    .with_fill_threshold(self.fill)
                    .with_strategy(strategy)
                    .with_strict_layout(self.strict),
            )
    }

    fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Error
        } else if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let oracle = MonospaceOracle::new(cli.char_width, cli.line_height);
    let doc = load_document_from_path(&cli.input, &cli.load_options(), &oracle)
        .map_err(|e| e.to_string())?;

    if cli.info {
        show_info(cli, &doc);
    }
    if let Some(n) = cli.page {
        show_page(cli, &doc, n)?;
    } else if cli.json {
        let map = PageMap::new(&doc);
        let json = serde_json::to_string_pretty(&map).map_err(|e| e.to_string())?;
        println!("{json}");
    } else if !cli.info {
        show_chapters(&doc);
    }
    Ok(())
}

fn show_info(cli: &Cli, doc: &Document) {
    let meta = doc.metadata();
    println!("File: {}", cli.input.display());
    if !meta.title.is_empty() {
        println!("Title: {}", meta.title);
    }
    if !meta.authors.is_empty() {
        println!("Authors: {}", meta.authors.join(", "));
    }
    if !meta.language.is_empty() {
        println!("Language: {}", meta.language);
    }
    if !meta.genres.is_empty() {
        println!("Genres: {}", meta.genres.join(", "));
    }
    let dims = doc.dimensions();
    println!("Chapters: {}", doc.chapters().len());
    println!("Pages: {} at {}x{}", doc.total_pages(), dims.width, dims.height);
}

fn show_chapters(doc: &Document) {
    let index = doc.page_index();
    for (i, chapter) in doc.chapters().iter().enumerate() {
        let first = index.resolve(i, 0);
        let last = first + chapter.page_count().saturating_sub(1);
        let note = if chapter.layout_error().is_some() {
            " (unpaginated)"
        } else {
            ""
        };
        println!("{:>4}  pp. {first}-{last}  {}{note}", i + 1, chapter.title());
    }
}

fn show_page(cli: &Cli, doc: &Document, n: i64) -> Result<(), String> {
    let index = doc.page_index();
    let location = index.locate(n);
    let markup = doc
        .page(location)
        .ok_or_else(|| format!("page {n} does not exist"))?;

    if !cli.quiet {
        eprintln!(
            "page {} / {} (chapter {}, page {})",
            index.resolve(location.chapter, location.page),
            index.total_pages(),
            location.chapter + 1,
            location.page + 1
        );
    }
    if cli.plain {
        println!("{}", rtf::plain_text(markup));
    } else {
        println!("{markup}");
    }
    Ok(())
}

#[derive(Serialize)]
struct PageMap<'a> {
    title: &'a str,
    width: u32,
    height: u32,
    total_pages: usize,
    chapters: Vec<ChapterEntry<'a>>,
}

#[derive(Serialize)]
struct ChapterEntry<'a> {
    title: &'a str,
    first_page: usize,
    pages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout_error: Option<String>,
}

impl<'a> PageMap<'a> {
    fn new(doc: &'a Document) -> Self {
        let index = doc.page_index();
        let dims = doc.dimensions();
        Self {
            title: &doc.metadata().title,
            width: dims.width,
            height: dims.height,
            total_pages: index.total_pages(),
            chapters: doc
                .chapters()
                .iter()
                .enumerate()
                .map(|(i, chapter)| ChapterEntry {
                    title: chapter.title(),
                    first_page: index.resolve(i, 0),
                    pages: chapter.page_count(),
                    layout_error: chapter.layout_error().map(ToString::to_string),
                })
                .collect(),
        }
    }
}
