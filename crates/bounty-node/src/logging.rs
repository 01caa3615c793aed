use crate::config::LoggingConfig;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. `cli_verbose` (`-v`, `-vv`) beats the
/// configured level; `RUST_LOG` beats both.
pub fn init_logging(config: &LoggingConfig, cli_verbose: u8) -> anyhow::Result<()> {
    let log_level = match cli_verbose {
        0 => config.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let mut filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("bounty={}", log_level)),
    );
    for (module, level) in &config.module_filters {
        filter = filter.add_directive(format!("{}={}", module, level).parse()?);
    }

    let subscriber = tracing_subscriber::registry().with(filter);
    let file = config.file_output.as_deref().map(open_log_file).transpose()?;

    match config.format.as_str() {
        "json" => {
            let json_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_line_number(true)
                .with_file(true);

            match file {
                Some(file) => {
                    let file_layer = fmt::layer().json().with_writer(file).with_ansi(false);
                    subscriber.with(json_layer).with(file_layer).try_init()?;
                }
                None => subscriber.with(json_layer).try_init()?,
            }
        }
        "compact" => {
            let compact_layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_line_number(false)
                .with_file(false);

            match file {
                Some(file) => {
                    let file_layer = fmt::layer().compact().with_writer(file).with_ansi(false);
                    subscriber.with(compact_layer).with(file_layer).try_init()?;
                }
                None => subscriber.with(compact_layer).try_init()?,
            }
        }
        _ => {
            // Source locations only help at debug and below
            let show_location = matches!(log_level, "debug" | "trace");
            let pretty_layer = fmt::layer()
                .with_target(show_location)
                .with_line_number(show_location)
                .with_file(show_location);

            match file {
                Some(file) => {
                    let file_layer = fmt::layer().with_writer(file).with_ansi(false);
                    subscriber.with(pretty_layer).with(file_layer).try_init()?;
                }
                None => subscriber.with(pretty_layer).try_init()?,
            }
        }
    }

    Ok(())
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Log an orchestrator state transition
#[macro_export]
macro_rules! log_state_change {
    ($old:expr, $new:expr, $($field:tt)*) => {
        tracing::info!(
            old_state = ?$old,
            new_state = ?$new,
            $($field)*
        )
    };
}
