use std::{
    fmt::Write as _,
    io::{self, Write},
};

use nu_ansi_term::Color::{self, Blue, Magenta, Red, Yellow};
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    registry::LookupSpan,
};

use crate::{cli::Args, utils::Colored};

/// Collects the `message` field of an event, ignoring structured fields.
#[derive(Default)]
struct Message(String);

impl Visit for Message {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0.push_str(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.0, "{value:?}");
        }
    }
}

/// Tag printed before non-INFO lines.
fn level_tag(level: Level) -> Option<(Color, &'static str)> {
    match level {
        Level::TRACE => Some((Magenta, "[TRACE]")),
        Level::DEBUG => Some((Blue, "[DEBUG]")),
        Level::INFO => None,
        Level::WARN => Some((Yellow, "[WARN]")),
        Level::ERROR => Some((Red, "[ERROR]")),
    }
}

/// Human output: INFO lines bare, everything else tagged with its level.
/// Structured fields only show up in `--json` mode.
struct PlainFormatter;

impl<S, N> FormatEvent<S, N> for PlainFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        if let Some((color, tag)) = level_tag(*event.metadata().level()) {
            write!(writer, "{} ", Colored(color, tag))?;
        }

        let mut message = Message::default();
        event.record(&mut message);
        writeln!(writer, "{}", message.0)
    }
}

/// INFO goes to stdout, every other level to stderr.
struct SplitWriter;

impl<'a> MakeWriter<'a> for SplitWriter {
    type Writer = Box<dyn Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        Box::new(io::stdout())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        if *meta.level() == Level::INFO {
            Box::new(io::stdout())
        } else {
            Box::new(io::stderr())
        }
    }
}

fn filter_level(args: &Args) -> Level {
    if args.quiet {
        Level::ERROR
    } else if args.verbose >= 2 {
        Level::TRACE
    } else if args.verbose == 1 {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

pub fn setup_logging(args: &Args) {
    let filter_level = filter_level(args);

    let builder = fmt::Subscriber::builder()
        .with_env_filter(format!("osc_cli={filter_level},osc_api={filter_level}"))
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(SplitWriter)
        .compact()
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(PlainFormatter).finish())
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("A global tracing subscriber is already installed");
    }
}
