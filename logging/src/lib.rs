use core::fmt::{Display, Formatter, Result as FmtResult};
use std::io::{self, IsTerminal as _};

use anyhow::Result;
use chrono::{Local, SecondsFormat};
use tracing::Span;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::Writer, time::FormatTime},
    prelude::*,
    reload::{self, Handle},
    EnvFilter, Registry,
};

const LOG_ENV_VARIABLE: &str = "ORACLE_LOG";

const WORKSPACE_CRATES: &[&str] = &[
    "ejector",
    "helper_functions",
    "logging",
    "oracle_consensus",
    "reward_prediction",
    "types",
];

/// Handle passed explicitly to every component that logs.
///
/// Messages logged through the `*_in!` macros are prefixed with the component name and recorded
/// inside the component's span, so concurrent daemons embedding several modules can be told apart.
#[derive(Clone, Debug)]
pub struct Logger {
    component: &'static str,
    span: Span,
}

impl Display for Logger {
    fn fmt(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str(self.component)
    }
}

impl Logger {
    #[must_use]
    pub fn new(component: &'static str) -> Self {
        let span = tracing::info_span!("oracle_module", module = component);
        Self { component, span }
    }

    #[must_use]
    pub const fn component(&self) -> &'static str {
        self.component
    }

    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }

    #[must_use]
    pub fn child(&self, component: &'static str) -> Self {
        let span = self
            .span
            .in_scope(|| tracing::info_span!("oracle_module", module = component));

        Self { component, span }
    }
}

#[macro_export]
macro_rules! info_in {
    ($logger:expr, $($arg:tt)*) => {
        $logger.span().in_scope(|| ::tracing::info!("[{}] {}", $logger, format_args!($($arg)*)))
    };
}

#[macro_export]
macro_rules! debug_in {
    ($logger:expr, $($arg:tt)*) => {
        $logger.span().in_scope(|| ::tracing::debug!("[{}] {}", $logger, format_args!($($arg)*)))
    };
}

#[macro_export]
macro_rules! warn_in {
    ($logger:expr, $($arg:tt)*) => {
        $logger.span().in_scope(|| ::tracing::warn!("[{}] {}", $logger, format_args!($($arg)*)))
    };
}

#[macro_export]
macro_rules! error_in {
    ($logger:expr, $($arg:tt)*) => {
        $logger.span().in_scope(|| ::tracing::error!("[{}] {}", $logger, format_args!($($arg)*)))
    };
}

#[derive(Clone, Debug)]
pub struct TracingHandle {
    log_handle: Handle<EnvFilter, Registry>,
}

impl TracingHandle {
    pub fn modify_log<F>(&self, f: F) -> Result<(), reload::Error>
    where
        F: FnOnce(&mut EnvFilter),
    {
        self.log_handle.modify(f)
    }
}

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        write!(
            w,
            "[{}]",
            Local::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

pub fn default_filter(module_path: &str) -> Result<EnvFilter> {
    let mut filter = EnvFilter::default().add_directive(LevelFilter::OFF.into());

    for crate_name in WORKSPACE_CRATES {
        filter = filter.add_directive(format!("{crate_name}=info").parse()?);
    }

    filter = filter.add_directive(format!("{module_path}=info").parse()?);

    if let Ok(env_filter) = EnvFilter::try_from_env(LOG_ENV_VARIABLE) {
        for directive in env_filter.to_string().split(',') {
            filter = filter.add_directive(directive.parse()?);
        }
    }

    Ok(filter)
}

pub fn initialize_tracing_logger(
    module_path: &str,
    always_write_style: bool,
) -> Result<TracingHandle> {
    let (filter_layer, log_handle) = reload::Layer::new(default_filter(module_path)?);
    let enable_ansi = always_write_style || io::stdout().is_terminal();

    let stdout_layer = fmt::layer::<Registry>()
        .compact()
        .with_thread_ids(false)
        .with_target(true)
        .with_file(false)
        .with_line_number(true)
        .with_timer(LocalTimer)
        .with_ansi(enable_ansi);

    tracing_subscriber::registry()
        .with(stdout_layer.with_filter(filter_layer))
        .try_init()?;

    let handle = TracingHandle { log_handle };

    let logger = Logger::new("logging");
    debug_in!(logger, "tracing started");

    Ok(handle)
}
