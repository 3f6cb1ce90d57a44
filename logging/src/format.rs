//! Single-line event formatter
//!
//! `2026-01-02T03:04:05.678Z  INFO request:db: dal::entity_dal: Inserted entities count=3`

use chrono::{SecondsFormat, Utc};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone, Copy)]
pub struct GokuFormat {
    display_time: bool,
    display_target: bool,
    display_spans: bool,
}

impl Default for GokuFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl GokuFormat {
    pub fn new() -> Self {
        Self {
            display_time: true,
            display_target: true,
            display_spans: true,
        }
    }

    pub fn with_time(mut self, display_time: bool) -> Self {
        self.display_time = display_time;
        self
    }

    pub fn with_target(mut self, display_target: bool) -> Self {
        self.display_target = display_target;
        self
    }

    pub fn with_spans(mut self, display_spans: bool) -> Self {
        self.display_spans = display_spans;
        self
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

const RESET: &str = "\x1b[0m";

impl<S, N> FormatEvent<S, N> for GokuFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        if self.display_time {
            write!(writer, "{} ", Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))?;
        }

        let level = metadata.level();
        if writer.has_ansi_escapes() {
            write!(writer, "{}{:>5}{} ", level_color(level), level.as_str(), RESET)?;
        } else {
            write!(writer, "{:>5} ", level.as_str())?;
        }

        if self.display_spans {
            if let Some(scope) = ctx.event_scope() {
                let mut any = false;
                for span in scope.from_root() {
                    write!(writer, "{}:", span.name())?;
                    any = true;
                }
                if any {
                    writer.write_char(' ')?;
                }
            }
        }

        if self.display_target {
            write!(writer, "{}: ", metadata.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
