//! # Encyclopedia
//!
//! Builds an HTML encyclopedia from a wordlist or dictionary, merging terms that
//! share a Wikidata id, and enriches it incrementally in small batches.
//!
//! ## Getting started
//!
//! ```sh
//! encyclopedia create terms.txt climate.html --title "Climate" --lookup
//! encyclopedia process climate.html --feature wikipedia --batch-size 10
//! encyclopedia process climate.html --feature images
//! encyclopedia status climate.html
//! ```
//!
//! The HTML file is both the output and the state of the next run. Only one
//! process may write a given file at a time.
use std::path::Path;

use encyclopedia::config::Settings;
use encyclopedia::error::Error;
use encyclopedia::io;
use encyclopedia::lookup::WikipediaClient;
use encyclopedia::pipeline::{Create, Pipeline};
use encyclopedia::state::{self, FeatureRegistry};
use structopt::StructOpt;

#[macro_use]
extern crate log;

mod cli;

/// Load `path`, apply `f` and save it back.
fn edit<F>(path: &Path, f: F) -> Result<(), Error>
where
    F: FnOnce(&mut encyclopedia::entry::Encyclopedia) -> Result<(), Error>,
{
    let mut enc = io::load(path)?;
    f(&mut enc)?;
    io::save(&enc, path)
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Encyclopedia::from_args();
    debug!("cli args\n{:#?}", opt);
    let settings = Settings::load(opt.config.as_deref())?;

    match opt.command {
        cli::Command::Create(c) => {
            let client = if c.lookup {
                Some(WikipediaClient::new(&settings)?)
            } else {
                None
            };
            let mut p = Create::new(c.src, c.dst, &settings).with_title(c.title);
            if let Some(client) = &client {
                p = p.with_lookup(client);
            }
            let stats = p.run()?;
            print!("{}", stats);
        }

        cli::Command::Status(s) => {
            let enc = io::load(&s.file)?;
            let mut features: Vec<&str> =
                enc.metadata.feature_counts.keys().map(String::as_str).collect();
            features.extend([state::IMAGES, state::WIKIPEDIA]);
            features.sort_unstable();
            features.dedup();

            println!("{} (version {})", enc.metadata.title, enc.metadata.global_version);
            for feature in features {
                println!("{}", state::progress(&enc, feature));
            }
            print!("{}", enc.statistics());
            if let Some(session) = &enc.metadata.last_session {
                println!(
                    "Last session: {} ({} processed)",
                    session.timestamp, session.entries_processed
                );
            }
        }

        cli::Command::Next(n) => {
            let enc = io::load(&n.file)?;
            match state::next_unprocessed(&enc) {
                Some(entry) => println!("{}\t{}", entry.id, entry.term),
                None => println!("All entries processed"),
            }
        }

        cli::Command::Process(p) => {
            let registry = FeatureRegistry::standard(&settings)?;
            let batch_size = p.batch_size.unwrap_or(settings.batch_size);
            let report =
                state::run_batch(&p.file, &registry, &p.feature, batch_size, !p.no_resume)?;
            println!("{}", report);
        }

        cli::Command::Hide(h) => edit(&h.file, |enc| state::hide(enc, &h.entry, h.reason))?,

        cli::Command::Unhide(u) => edit(&u.file, |enc| state::unhide(enc, &u.entry))?,

        cli::Command::Select(s) => edit(&s.file, |enc| {
            state::select_disambiguation(enc, &s.entry, &s.urls)
        })?,
    };
    Ok(())
}
