// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Forwarding of tracing events to the host console.
//
// Extension events are prefixed `[EpicExt]`. Events on the `eos` target are
// native SDK log lines that already carry their own `[EOS][...]` prefix and
// are passed through unchanged.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use eosbridge_core::types::ConsoleLevel;

/// Prefix for lines logged by the extension itself.
pub const EXTENSION_PREFIX: &str = "[EpicExt] ";

/// Target used when re-emitting native SDK log lines.
pub const SDK_TARGET: &str = "eos";

/// Where console lines end up (the host's developer console).
pub trait ConsoleSink: Send + Sync + 'static {
    fn log(&self, level: ConsoleLevel, line: &str);
}

/// Console severity for a tracing level.
pub fn console_level(level: &Level) -> ConsoleLevel {
    if *level == Level::ERROR {
        ConsoleLevel::Error
    } else if *level == Level::WARN {
        ConsoleLevel::Warning
    } else {
        ConsoleLevel::Normal
    }
}

/// `tracing_subscriber` layer writing every event to a [`ConsoleSink`].
pub struct HostConsoleLayer<C> {
    sink: C,
}

impl<C: ConsoleSink> HostConsoleLayer<C> {
    pub fn new(sink: C) -> Self {
        Self { sink }
    }
}

impl<S, C> Layer<S> for HostConsoleLayer<C>
where
    S: Subscriber,
    C: ConsoleSink,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let line = if metadata.target() == SDK_TARGET {
            visitor.message
        } else {
            format!("{EXTENSION_PREFIX}{}{}", visitor.message, visitor.fields)
        };
        self.sink.log(console_level(metadata.level()), &line);
    }
}

/// Collects the message and renders other fields as ` key=value`.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
