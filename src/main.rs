use std::process;

use errata::{
    application::{build::build_site, error::AppError},
    config,
    infra::telemetry,
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    info!(
        target = "errata::build",
        entries = %settings.build.entries.display(),
        template = %settings.build.template.display(),
        cache_dir = %settings.build.cache_dir.display(),
        "Converting error entries to HTML"
    );

    let report = build_site(&settings.build)?;

    info!(
        target = "errata::build",
        entries = report.entries,
        cache_hits = report.stats.hits,
        cache_misses = report.stats.misses,
        elapsed_ms = report.elapsed.as_millis() as u64,
        output = %report.output.display(),
        "Done"
    );

    Ok(())
}
