use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields, FormattedFields},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Name of the span that carries the `[i/N]` account label.
pub const ACCOUNT_SPAN: &str = "account";

/// Crates whose debug lines reach the console.
const BOT_TARGETS: [&str; 2] = ["core_logic", "zerog_project"];

pub fn setup_logger() -> Option<WorkerGuard> {
    std::fs::create_dir_all("logs").ok();

    let file_appender = tracing_appender::rolling::hourly("logs", "app");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let mut file_filter = tracing_subscriber::filter::Targets::new().with_default(Level::WARN);
    let mut console_filter = tracing_subscriber::filter::Targets::new().with_default(Level::WARN);
    for target in BOT_TARGETS {
        file_filter = file_filter.with_target(target, Level::INFO);
        console_filter = console_filter.with_target(target, Level::DEBUG);
    }

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    // Caller must keep the guard alive or buffered file lines are lost
    Some(guard)
}

/// Console line category. `Success` is an INFO event carrying `kind = "success"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Success,
    Error,
    Warning,
    Debug,
    Info,
}

impl LogKind {
    pub fn from_event(level: &Level, kind: Option<&str>) -> Self {
        if *level == Level::ERROR {
            LogKind::Error
        } else if *level == Level::WARN {
            LogKind::Warning
        } else if *level > Level::INFO {
            LogKind::Debug
        } else if kind == Some("success") {
            LogKind::Success
        } else {
            LogKind::Info
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            LogKind::Success => "✔",
            LogKind::Error => "✘",
            LogKind::Warning => "⚠",
            LogKind::Debug => "➤",
            LogKind::Info => "ℹ",
        }
    }

    fn colors(&self) -> (Color, Color) {
        match self {
            LogKind::Success => (Color::Green, Color::LightGreen),
            LogKind::Error => (Color::Red, Color::LightRed),
            LogKind::Warning => (Color::Yellow, Color::LightYellow),
            LogKind::Debug => (Color::Blue, Color::LightBlue),
            LogKind::Info => (Color::Cyan, Color::LightCyan),
        }
    }
}

/// Renders one console line: `[time] [i/N] <glyph> message`.
pub fn render_line(
    timestamp: &str,
    account: Option<&str>,
    kind: LogKind,
    message: &str,
    ansi: bool,
) -> String {
    if !ansi {
        return match account {
            Some(label) => format!("[{}] [{}] {} {}", timestamp, label, kind.glyph(), message),
            None => format!("[{}] {} {}", timestamp, kind.glyph(), message),
        };
    }

    let (glyph_color, text_color) = kind.colors();
    let time = Style::new().dimmed().paint(format!("[{}]", timestamp));
    let glyph = glyph_color.paint(kind.glyph());
    let text = text_color.paint(message);

    match account {
        Some(label) => {
            let prefix = Color::DarkGray.paint(format!("[{}]", label));
            format!("{} {} {} {}", time, prefix, glyph, text)
        }
        None => format!("{} {} {}", time, glyph, text),
    }
}

// --- Formatters ---

#[derive(Default)]
struct MessageVisitor {
    message: String,
    kind: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            "kind" => self.kind = Some(format!("{:?}", value).trim_matches('"').to_string()),
            _ => {}
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "kind" => self.kind = Some(value.to_string()),
            _ => {}
        }
    }
}

/// Value of a rendered `label=...` field, with or without ANSI styling
/// around the field name.
fn label_value(raw: &str) -> &str {
    match raw.split_once('=') {
        Some((_, value)) => value.strip_prefix("\u{1b}[0m").unwrap_or(value),
        None => raw,
    }
}

/// Finds the `label` of the innermost enclosing account span.
fn account_label<S, N>(ctx: &FmtContext<'_, S, N>) -> Option<String>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let scope = ctx.event_scope()?;
    let mut label = None;
    for span in scope.from_root() {
        if span.name() != ACCOUNT_SPAN {
            continue;
        }
        let extensions = span.extensions();
        if let Some(fields) = extensions.get::<FormattedFields<N>>() {
            label = Some(label_value(fields.fields.as_str()).to_string());
        }
    }
    label
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
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
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let kind = LogKind::from_event(event.metadata().level(), visitor.kind.as_deref());
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let label = account_label(ctx);

        let line = render_line(
            &timestamp,
            label.as_deref(),
            kind,
            &visitor.message,
            writer.has_ansi_escapes(),
        );
        writeln!(writer, "{}", line)
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
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
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();

        write!(writer, "{} [{}] ", timestamp, level)?;
        if let Some(label) = account_label(ctx) {
            write!(writer, "[{}] ", label)?;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        writeln!(writer, "{}", visitor.message)
    }
}
