use std::time::{Duration, Instant};

use log::LevelFilter;
use tracing::Level;

/// Logging configuration for executed statements.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct LogSettings {
    /// Log level for statements.
    pub statements_level: LevelFilter,
    /// Log level for slow statements.
    pub slow_statements_level: LevelFilter,
    /// Threshold for slow statements.
    pub slow_statements_duration: Duration,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            statements_level: LevelFilter::Debug,
            slow_statements_level: LevelFilter::Warn,
            slow_statements_duration: Duration::from_secs(1),
        }
    }
}

impl LogSettings {
    pub fn log_statements(&mut self, level: LevelFilter) {
        self.statements_level = level;
    }

    pub fn log_slow_statements(&mut self, level: LevelFilter, duration: Duration) {
        self.slow_statements_level = level;
        self.slow_statements_duration = duration;
    }

    /// Returns `true` if any logging level is enabled.
    pub fn is_enabled(&self) -> bool {
        self.statements_level != LevelFilter::Off || self.slow_statements_level != LevelFilter::Off
    }
}

// `tracing::event!` needs the level as a constant, so each level gets its own arm.
macro_rules! emit_at {
    ($filter:expr, $($field:tt)+) => {
        match $filter {
            LevelFilter::Off => {}
            LevelFilter::Error => tracing::event!(target: "query", Level::ERROR, $($field)+),
            LevelFilter::Warn => tracing::event!(target: "query", Level::WARN, $($field)+),
            LevelFilter::Info => tracing::event!(target: "query", Level::INFO, $($field)+),
            LevelFilter::Debug => tracing::event!(target: "query", Level::DEBUG, $($field)+),
            LevelFilter::Trace => tracing::event!(target: "query", Level::TRACE, $($field)+),
        }
    };
}

fn tracing_enabled(filter: LevelFilter) -> bool {
    match filter {
        LevelFilter::Off => false,
        LevelFilter::Error => tracing::enabled!(target: "query", Level::ERROR),
        LevelFilter::Warn => tracing::enabled!(target: "query", Level::WARN),
        LevelFilter::Info => tracing::enabled!(target: "query", Level::INFO),
        LevelFilter::Debug => tracing::enabled!(target: "query", Level::DEBUG),
        LevelFilter::Trace => tracing::enabled!(target: "query", Level::TRACE),
    }
}

/// Collects statistics for one statement execution and logs them when dropped.
#[derive(Debug)]
pub(crate) struct QueryLogger {
    sql: String,
    rows_returned: u64,
    rows_affected: u64,
    start: Instant,
    settings: LogSettings,
}

impl QueryLogger {
    /// Returns `None` when the settings disable logging altogether.
    pub(crate) fn start(sql: &str, settings: &LogSettings) -> Option<Self> {
        settings.is_enabled().then(|| Self {
            sql: sql.to_owned(),
            rows_returned: 0,
            rows_affected: 0,
            start: Instant::now(),
            settings: settings.clone(),
        })
    }

    pub(crate) fn inc_rows_returned(&mut self) {
        self.rows_returned += 1;
    }

    pub(crate) fn inc_rows_affected(&mut self, n: u64) {
        self.rows_affected += n;
    }

    fn finish(&self) {
        let elapsed = self.start.elapsed();
        let filter = if elapsed >= self.settings.slow_statements_duration {
            self.settings.slow_statements_level
        } else {
            self.settings.statements_level
        };

        let Some(log_level) = filter.to_level() else {
            return;
        };

        // The level may be enabled from either the log or the tracing side.
        if !log::log_enabled!(target: "query", log_level) && !tracing_enabled(filter) {
            return;
        }

        let (summary, sql) = log_payload(&self.sql);
        let rows_affected = self.rows_affected;
        let rows_returned = self.rows_returned;

        emit_at!(
            filter,
            summary = summary.as_str(),
            db.statement = sql.as_str(),
            rows_affected,
            rows_returned,
            ?elapsed
        );
    }
}

impl Drop for QueryLogger {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Short summary of a statement (its first four words) plus the full text
/// pretty-printed when the summary had to cut it short.
fn log_payload(sql: &str) -> (String, String) {
    let mut summary = sql.split_whitespace().take(4).collect::<Vec<_>>().join(" ");
    if summary == sql {
        return (summary, String::new());
    }

    summary.push_str(" …");
    let formatted = sqlformat::format(
        sql,
        &sqlformat::QueryParams::None,
        &sqlformat::FormatOptions::default(),
    );
    (summary, format!("\n\n{formatted}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_statement_is_its_own_summary() {
        let (summary, sql) = log_payload("SELECT 1");
        assert_eq!(summary, "SELECT 1");
        assert!(sql.is_empty());
    }

    #[test]
    fn long_statement_is_truncated_and_formatted() {
        let (summary, sql) = log_payload("SELECT a, b FROM t WHERE a = 1");
        assert_eq!(summary, "SELECT a, b FROM …");
        assert!(sql.contains("WHERE"));
    }

    #[test]
    fn disabled_settings_produce_no_logger() {
        let mut settings = LogSettings::default();
        settings.log_statements(LevelFilter::Off);
        settings.log_slow_statements(LevelFilter::Off, Duration::from_secs(1));
        assert!(!settings.is_enabled());
        assert!(QueryLogger::start("SELECT 1", &settings).is_none());
        assert!(QueryLogger::start("SELECT 1", &LogSettings::default()).is_some());
    }
}
