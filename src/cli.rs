//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use encyclopedia::entry::HideReason;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "encyclopedia",
    about = "Build and incrementally enrich HTML encyclopedias of terms."
)]
pub struct Encyclopedia {
    #[structopt(
        long = "config",
        parse(from_os_str),
        global = true,
        help = "JSON settings file"
    )]
    pub config: Option<PathBuf>,
    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt)]
/// Holds every command that is callable by the `encyclopedia` command.
pub enum Command {
    #[structopt(about = "Create an encyclopedia from a wordlist, dictionary or encyclopedia")]
    Create(Create),
    #[structopt(about = "Report per-feature completion and breakdowns")]
    Status(Status),
    #[structopt(about = "Show the next unprocessed entry")]
    Next(Next),
    #[structopt(about = "Apply a feature to the next batch of entries")]
    Process(Process),
    #[structopt(about = "Hide an entry")]
    Hide(Hide),
    #[structopt(about = "Unhide a hidden entry")]
    Unhide(Unhide),
    #[structopt(about = "Select disambiguation options of an entry")]
    Select(Select),
}

#[derive(Debug, StructOpt)]
pub struct Create {
    #[structopt(parse(from_os_str), help = "wordlist (.txt), dictionary or encyclopedia HTML")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "destination encyclopedia HTML")]
    pub dst: PathBuf,
    #[structopt(long = "title", help = "document title")]
    pub title: Option<String>,
    #[structopt(
        long = "lookup",
        help = "look up entries without Wikipedia page before merging"
    )]
    pub lookup: bool,
}

#[derive(Debug, StructOpt)]
pub struct Status {
    #[structopt(parse(from_os_str), help = "encyclopedia HTML")]
    pub file: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct Next {
    #[structopt(parse(from_os_str), help = "encyclopedia HTML")]
    pub file: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct Process {
    #[structopt(parse(from_os_str), help = "encyclopedia HTML")]
    pub file: PathBuf,
    #[structopt(long = "feature", short = "f", help = "feature to apply (wikipedia, images)")]
    pub feature: String,
    #[structopt(
        long = "batch-size",
        short = "n",
        help = "entries per batch (settings default if absent)"
    )]
    pub batch_size: Option<usize>,
    #[structopt(
        long = "no-resume",
        help = "also reprocess entries that already have the feature"
    )]
    pub no_resume: bool,
}

#[derive(Debug, StructOpt)]
pub struct Hide {
    #[structopt(parse(from_os_str), help = "encyclopedia HTML")]
    pub file: PathBuf,
    #[structopt(long = "entry", help = "entry id")]
    pub entry: String,
    #[structopt(
        long = "reason",
        default_value = "user_selected",
        help = "missing_wikipedia, general_term, false_wikipedia or user_selected"
    )]
    pub reason: HideReason,
}

#[derive(Debug, StructOpt)]
pub struct Unhide {
    #[structopt(parse(from_os_str), help = "encyclopedia HTML")]
    pub file: PathBuf,
    #[structopt(long = "entry", help = "entry id")]
    pub entry: String,
}

#[derive(Debug, StructOpt)]
pub struct Select {
    #[structopt(parse(from_os_str), help = "encyclopedia HTML")]
    pub file: PathBuf,
    #[structopt(long = "entry", help = "entry id")]
    pub entry: String,
    #[structopt(long = "url", help = "selected option URL, repeatable")]
    pub urls: Vec<String>,
}
