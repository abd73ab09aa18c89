// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `lucent` compositing manager.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use lucent_core::config::CompositorConfig;
use lucent_core::error::Error;
use lucent_core::trace::{
    ErrorEvent, PaintBeginEvent, PaintSummary, TraceSink, Tracer, WindowPaintEvent,
};
use lucent_debug::pretty::PrettyPrintSink;
use lucent_debug::recorder::RecorderSink;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "lucent", version, about = "Compositing manager for X11")]
struct Args {
    /// X display to manage; defaults to `$DISPLAY`.
    #[arg(short, long)]
    display: Option<String>,
    /// Wait for the server after every request.
    #[arg(short = 'S', long)]
    synchronize: bool,
    /// Paint straight to the screen, blacking out each damaged area first.
    #[arg(long)]
    monitor_repaint: bool,
    /// Print paint passes and protocol errors to stderr.
    #[arg(long)]
    trace: bool,
    /// Write a Chrome trace of all paint passes to this file on exit.
    #[arg(long, value_name = "PATH")]
    chrome_trace: Option<PathBuf>,
    /// Log filter, e.g. `lucent_core=debug`.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

/// Forwards events to whichever sinks were requested.
#[derive(Debug, Default)]
struct Sinks {
    pretty: Option<PrettyPrintSink>,
    recorder: Option<RecorderSink>,
}

impl Sinks {
    fn from_args(args: &Args) -> Self {
        Self {
            pretty: args.trace.then(PrettyPrintSink::stderr),
            recorder: args.chrome_trace.is_some().then(RecorderSink::new),
        }
    }

    fn is_empty(&self) -> bool {
        self.pretty.is_none() && self.recorder.is_none()
    }

    fn each(&mut self, mut f: impl FnMut(&mut dyn TraceSink)) {
        if let Some(sink) = &mut self.pretty {
            f(sink);
        }
        if let Some(sink) = &mut self.recorder {
            f(sink);
        }
    }
}

impl TraceSink for Sinks {
    fn on_paint_begin(&mut self, e: &PaintBeginEvent) {
        self.each(|s| s.on_paint_begin(e));
    }

    fn on_window_painted(&mut self, e: &WindowPaintEvent) {
        self.each(|s| s.on_window_painted(e));
    }

    fn on_paint_end(&mut self, s: &PaintSummary) {
        self.each(|sink| sink.on_paint_end(s));
    }

    fn on_error(&mut self, e: &ErrorEvent) {
        self.each(|s| s.on_error(e));
    }
}

fn init_logging(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(f) => EnvFilter::try_new(f).with_context(|| format!("invalid log filter {f:?}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn write_chrome_trace(path: &Path, recorder: &RecorderSink) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    lucent_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "chrome trace written");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref())?;

    let mut display = lucent_backend_x11::connect(args.display.as_deref())
        .context("failed to prepare the display for compositing")?;
    display.service.set_synchronous(args.synchronize);

    let config = CompositorConfig {
        monitor_repaint: args.monitor_repaint,
        ..CompositorConfig::default()
    };
    let mut compositor =
        lucent_backend_x11::start(display, config).context("failed to start compositing")?;

    let mut sinks = Sinks::from_args(&args);
    let outcome = if sinks.is_empty() {
        lucent_backend_x11::run(&mut compositor, &mut Tracer::none())
    } else {
        lucent_backend_x11::run(&mut compositor, &mut Tracer::new(&mut sinks))
    };

    if let (Some(path), Some(recorder)) = (&args.chrome_trace, &sinks.recorder) {
        write_chrome_trace(path, recorder)?;
    }

    match outcome {
        Ok(()) => Ok(()),
        Err(e @ Error::AnotherCompositor { .. }) => {
            error!(%e, "giving up");
            Err(e).context("the display is already composited")
        }
        Err(e) => Err(e).context("compositing stopped"),
    }
}
