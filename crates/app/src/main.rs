use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fmt, fs};

use clap::Parser;
use qbank_core::FilterCriteria;
use qbank_core::model::{QuestionDraft, SubjectId};
use services::config::DEFAULT_SEARCH_DEBOUNCE;
use services::{BrowserConfig, Clock, PreferencesService, QuestionBrowser};
use storage::catalog_source::FileCatalogSource;
use storage::repository::Storage;

mod cli;
mod logging;
mod render;

use cli::{BrowseArgs, Cli, Command, ExportArgs};

#[derive(Debug)]
enum ArgsError {
    InvalidDbUrl { raw: String },
    UnknownQuestion { id: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::UnknownQuestion { id } => write!(f, "no question with id {id}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn browse_criteria(args: &BrowseArgs) -> FilterCriteria {
    FilterCriteria {
        subject: args.subject.as_deref().map(SubjectId::new),
        marks: args.marks,
        difficulty: args.difficulty,
        question_type: args.question_type,
        status: args.status,
    }
}

fn write_export(
    browser: &QuestionBrowser,
    args: &ExportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = browser.export(args.format)?;
    match &args.output {
        None => println!("{rendered}"),
        Some(path) => {
            let path = if path.is_dir() {
                path.join(args.format.file_name())
            } else {
                path.clone()
            };
            fs::write(&path, rendered)?;
            println!("Exported to {}", path.display());
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(logging::level_from_flags(cli.verbose, cli.quiet));

    // Open + migrate SQLite in the binary glue so core/services stay pure.
    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url).await?;

    if let Command::Theme { theme, toggle } = &cli.command {
        let preferences = PreferencesService::new(Arc::clone(&storage.progress));
        let theme = match theme {
            Some(theme) => preferences.save_theme(*theme).await?,
            None if *toggle => preferences.toggle_theme().await?,
            None => preferences.load_theme().await?,
        };
        println!("{theme}");
        return Ok(());
    }

    let config = BrowserConfig::new(cli.page_size, DEFAULT_SEARCH_DEBOUNCE)?;
    let source = FileCatalogSource::new(&cli.data_dir);
    let startup = QuestionBrowser::open(
        &source,
        Arc::clone(&storage.progress),
        config,
        Clock::default_clock(),
    )
    .await;
    for err in &startup.load_errors {
        eprintln!("warning: {err}");
    }
    let mut browser = startup.browser;

    match cli.command {
        Command::Browse(args) => {
            browser.set_filter(browse_criteria(&args));
            if let Some(text) = &args.search {
                browser.set_search(text);
            }
            if args.page != 1 && !browser.go_to_page(args.page) {
                eprintln!("warning: page {} is out of range", args.page);
            }
            print!("{}", render::page(&browser, &browser.filtered_page()));
        }
        Command::Search { text } => {
            let hits = browser.search_preview(&text);
            if hits.is_empty() {
                println!("No matches for \"{}\".", text.trim());
            }
            for question in hits {
                println!("{}", render::question_line(&browser, question));
            }
        }
        Command::Bookmark { id } => {
            if browser.catalog().find_question(&id).is_none() {
                return Err(ArgsError::UnknownQuestion { id }.into());
            }
            let bookmarked = browser.toggle_bookmark(&id).await;
            println!(
                "{id}: {}",
                if bookmarked { "bookmarked" } else { "bookmark removed" }
            );
        }
        Command::Studied { id } => {
            if browser.catalog().find_question(&id).is_none() {
                return Err(ArgsError::UnknownQuestion { id }.into());
            }
            let studied = browser.toggle_studied(&id).await;
            println!(
                "{id}: {}",
                if studied { "marked as studied" } else { "marked as not studied" }
            );
        }
        Command::Bookmarks => {
            let bookmarked = browser.bookmarked_questions();
            if bookmarked.is_empty() {
                println!("No bookmarks yet.");
            }
            for question in bookmarked {
                println!("{}", render::question_line(&browser, question));
            }
        }
        Command::Progress => print!("{}", render::progress(&browser.progress_summary())),
        Command::Stats => print!("{}", render::stats(browser.catalog(), &browser.stats())),
        Command::Semesters => print!("{}", render::semesters(browser.catalog())),
        Command::Subjects => print!(
            "{}",
            render::subjects(browser.catalog(), &browser.progress_summary())
        ),
        Command::Copy { id } => {
            let text = browser
                .clipboard_text(&id)
                .ok_or(ArgsError::UnknownQuestion { id })?;
            println!("{text}");
        }
        Command::Export(args) => write_export(&browser, &args)?,
        Command::Add(args) => {
            let id = browser.add_question(QuestionDraft {
                subject: SubjectId::new(args.subject),
                marks: args.marks,
                difficulty: args.difficulty,
                question_type: args.question_type,
                text: args.text,
            })?;
            if let Some(question) = browser.catalog().find_question(id.as_str()) {
                println!("{}", render::question_line(&browser, question));
            }
            println!("(added for this session only; the data files are unchanged)");
        }
        Command::Theme { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
