//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured store and report its schema version and row totals.
//! - Exit non-zero with a one-line error when the store cannot be used.

use reelbase_core::db::migrations::current_version;
use reelbase_core::{
    core_version, init_from_config, DbConfig, Filters, LogConfig, MovieFilter, RecordRepository,
    Repositories, UserFilter,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("reelbase: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_from_config(&LogConfig::from_env())?;

    let config = DbConfig::from_env()?;
    let repos = Repositories::open(&config)?;

    let schema_version = {
        let conn = repos.movies.pool().get()?;
        current_version(&conn)?
    };

    // Page size 1 is enough: totals come from the windowed count.
    let (_, movies) = repos.movies.list(
        &MovieFilter::default(),
        &Filters::new(reelbase_core::model::movie::MOVIE_SORT_SAFELIST).with_page(1, 1),
    )?;
    let (_, users) = repos.users.list(
        &UserFilter::default(),
        &Filters::new(reelbase_core::model::user::USER_SORT_SAFELIST).with_page(1, 1),
    )?;

    println!("reelbase_core version={}", core_version());
    println!("schema_version={schema_version}");
    println!("movies={}", movies.total_records);
    println!("users={}", users.total_records);
    Ok(())
}
