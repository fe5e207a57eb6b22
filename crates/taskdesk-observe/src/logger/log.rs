use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, filter::Directive, fmt, fmt::time::OffsetTime, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

/// HTTP stack targets capped at `warn` unless the filter names them.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "h2", "tower", "mio"];

pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = mk_filter(&cfg.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    match cfg.format {
        LoggerFormat::Text => init_with(
            registry.with(
                fmt::layer()
                    .with_ansi(cfg.use_color)
                    .with_target(cfg.with_targets)
                    .with_timer(mk_timer()),
            ),
        ),
        LoggerFormat::Json => init_with(
            registry.with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(cfg.with_targets)
                    .with_timer(mk_timer()),
            ),
        ),
        LoggerFormat::Journald => init_with(registry.with(journald_layer()?)),
    }
}

fn mk_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    let invalid = || LoggerError::InvalidLogLevel(level.to_string());
    let mut filter = EnvFilter::try_new(level).map_err(|_| invalid())?;

    for target in QUIET_TARGETS.iter().filter(|t| !names_target(level, t)) {
        let directive: Directive = format!("{target}=warn").parse().map_err(|_| invalid())?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

fn names_target(level: &str, target: &str) -> bool {
    level.split(',').any(|directive| {
        let name = directive.split(['=', '[']).next().unwrap_or_default().trim();
        name == target || name.starts_with(&format!("{target}::"))
    })
}

fn mk_timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

fn init_with<S>(subscriber: S) -> Result<(), LoggerError>
where
    S: Subscriber + Send + Sync + 'static,
{
    if tracing::dispatcher::has_been_set() {
        return Err(LoggerError::AlreadyInitialized);
    }
    subscriber
        .try_init()
        .map_err(|e| LoggerError::InitializationFailed(e.to_string()))
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald_layer() -> Result<tracing_journald::Layer, LoggerError> {
    tracing_journald::layer()
        .map(|layer| layer.with_syslog_identifier("taskdesk".to_string()))
        .map_err(|e| LoggerError::InitializationFailed(format!("journald: {e}")))
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald_layer() -> Result<tracing_subscriber::layer::Identity, LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}
