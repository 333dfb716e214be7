//! Command-line definitions for the question bank.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use qbank_core::StatusFilter;
use qbank_core::model::{Difficulty, Marks, QuestionType, Theme};
use services::ExportFormat;

#[derive(Parser)]
#[command(
    name = "qbank",
    version,
    about = "Browse, filter and track study progress over a static question bank"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding semesters.json, subjects.json and questions/.
    #[arg(
        long = "data-dir",
        env = "QBANK_DATA_DIR",
        default_value = "data",
        global = true
    )]
    pub data_dir: PathBuf,

    /// Progress database (`sqlite://` URL or a file path).
    #[arg(
        long = "db",
        env = "QBANK_DB_URL",
        default_value = "sqlite://qbank.sqlite3",
        global = true
    )]
    pub db_url: String,

    /// Questions per page.
    #[arg(
        long = "page-size",
        env = "QBANK_PAGE_SIZE",
        default_value_t = 20,
        global = true
    )]
    pub page_size: usize,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List one page of questions matching the filters.
    Browse(BrowseArgs),

    /// Show the top matches for a search over every question.
    Search {
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Toggle the bookmark on a question.
    Bookmark {
        #[arg(value_name = "QUESTION_ID")]
        id: String,
    },

    /// Toggle the studied mark on a question.
    Studied {
        #[arg(value_name = "QUESTION_ID")]
        id: String,
    },

    /// List bookmarked questions.
    Bookmarks,

    /// Show studied progress overall and per subject.
    Progress,

    /// Show question counts per marks bucket and subject.
    Stats,

    /// Show the semester roadmap.
    Semesters,

    /// List subjects with question counts and studied progress.
    Subjects,

    /// Print a question as plain text for pasting elsewhere.
    Copy {
        #[arg(value_name = "QUESTION_ID")]
        id: String,
    },

    /// Export questions or progress.
    Export(ExportArgs),

    /// Add a question for this session.
    Add(AddArgs),

    /// Show, set or toggle the colour theme.
    Theme {
        #[arg(value_name = "THEME")]
        theme: Option<Theme>,

        /// Switch between light and dark.
        #[arg(long, conflicts_with = "theme")]
        toggle: bool,
    },
}

#[derive(Args, Default)]
pub struct BrowseArgs {
    #[arg(long)]
    pub subject: Option<String>,

    /// Mark weight (5, 10 or 15).
    #[arg(long)]
    pub marks: Option<u8>,

    #[arg(long)]
    pub difficulty: Option<Difficulty>,

    #[arg(long = "type", value_name = "TYPE")]
    pub question_type: Option<QuestionType>,

    /// studied, not-studied or bookmarked.
    #[arg(long)]
    pub status: Option<StatusFilter>,

    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Args)]
pub struct ExportArgs {
    /// json, csv or progress.
    #[arg(long, default_value = "json")]
    pub format: ExportFormat,

    /// Write to this file instead of stdout. A directory gets the default file name.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub subject: String,

    #[arg(long)]
    pub marks: Marks,

    #[arg(long, default_value = "medium")]
    pub difficulty: Difficulty,

    #[arg(long = "type", value_name = "TYPE", default_value = "definition")]
    pub question_type: QuestionType,

    #[arg(long)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_browse_filters() {
        let cli = Cli::try_parse_from([
            "qbank",
            "browse",
            "--subject",
            "const_law",
            "--marks",
            "15",
            "--status",
            "not-studied",
            "--page",
            "2",
        ])
        .unwrap();
        let Command::Browse(args) = cli.command else {
            panic!("expected browse");
        };
        assert_eq!(args.subject.as_deref(), Some("const_law"));
        assert_eq!(args.marks, Some(15));
        assert_eq!(args.status, Some(StatusFilter::NotStudied));
        assert_eq!(args.page, 2);
    }

    #[test]
    fn theme_toggle_conflicts_with_explicit_theme() {
        let cli = Cli::try_parse_from(["qbank", "theme", "--toggle"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Theme {
                theme: None,
                toggle: true
            }
        ));
        assert!(Cli::try_parse_from(["qbank", "theme", "dark", "--toggle"]).is_err());
    }

    #[test]
    fn parses_roadmap_commands() {
        let cli = Cli::try_parse_from(["qbank", "semesters"]).unwrap();
        assert!(matches!(cli.command, Command::Semesters));
        let cli = Cli::try_parse_from(["qbank", "subjects"]).unwrap();
        assert!(matches!(cli.command, Command::Subjects));
    }

    #[test]
    fn rejects_unknown_export_format() {
        assert!(Cli::try_parse_from(["qbank", "export", "--format", "xml"]).is_err());
    }
}
