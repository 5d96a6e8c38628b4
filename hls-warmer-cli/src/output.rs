use std::fmt::Write as _;
use std::time::Duration;

#[cfg(feature = "colored-output")]
use colored::*;
use hls_warmer_engine::{TickReport, WarmEvent, WarmSummary};

use crate::cli::OutputFormat;
use crate::error::Result;

pub struct OutputManager {
    colored: bool,
    debug: bool,
}

impl OutputManager {
    pub fn new(colored: bool, debug: bool) -> Self {
        Self { colored, debug }
    }

    pub fn format_summary(&self, summary: &WarmSummary, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_summary_pretty(summary)),
            OutputFormat::Json => Ok(serde_json::to_string(&summary_json(summary))?),
        }
    }

    fn format_summary_pretty(&self, summary: &WarmSummary) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "\n{}", self.colorize("RESULTS", &Color::Green, true));
        let _ = writeln!(out, "{}", "=".repeat(42));
        let _ = writeln!(out, "Playlist URL: {}", summary.playlist_url);
        let _ = writeln!(out, "Total Files: {}", summary.total_segments);
        let _ = writeln!(out, "Cache Hit: {}", summary.cache_hits);
        let _ = writeln!(out, "Cache Miss: {}", summary.cache_misses());
        let _ = writeln!(out, "Error Count: {}", summary.error_count());
        let _ = writeln!(out, "Total Duration: {}", format_duration(summary.duration));
        let _ = writeln!(out, "Cache Ratio: {:.2}%", summary.cache_ratio());

        if !summary.errors.is_empty() {
            let _ = writeln!(out, "\n{}", self.colorize("ERRORS:", &Color::Red, true));
            for (i, error) in summary.errors.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", i + 1, error);
            }
        }

        let _ = writeln!(out, "\n{}", self.colorize("DETAILS:", &Color::Cyan, true));
        for (i, outcome) in summary.outcomes.iter().enumerate() {
            match &outcome.error {
                Some(error) => {
                    let _ = writeln!(
                        out,
                        "{}. {} - {}: {}",
                        i + 1,
                        self.colorize("ERROR", &Color::Red, false),
                        outcome.url,
                        error
                    );
                }
                None => {
                    let status = if outcome.hit {
                        self.colorize("HIT", &Color::Green, false)
                    } else {
                        self.colorize("MISS", &Color::Yellow, false)
                    };
                    let _ = writeln!(
                        out,
                        "{}. {} ({}) - {} [{}]",
                        i + 1,
                        status,
                        outcome.status,
                        outcome.url,
                        format_duration(outcome.duration)
                    );
                }
            }
        }

        out
    }

    /// One or more lines describing a daemon event, or `None` when the event
    /// is only reported in debug mode.
    pub fn format_event(&self, event: &WarmEvent) -> Option<String> {
        let line = match event {
            WarmEvent::DaemonStarted { streams, interval } => format!(
                "Starting daemon mode with {streams} playlist(s)\nCheck interval: {}",
                humantime::format_duration(*interval)
            ),
            WarmEvent::TickSkipped { .. } if !self.debug => return None,
            WarmEvent::TickSkipped { stream } => {
                format!("Stream {stream} already warming, skipping this tick")
            }
            WarmEvent::PlaylistFailed { stream, error } => format!(
                "{} parsing playlist {stream}: {error}",
                self.colorize("Error", &Color::Red, true)
            ),
            WarmEvent::NoNewSegments { stream } => format!("No new segments found for {stream}"),
            WarmEvent::TickCompleted(report) => self.format_tick(report),
            WarmEvent::DaemonStopped => self.colorize("Daemon mode stopped", &Color::Yellow, true),
        };
        Some(line)
    }

    fn format_tick(&self, report: &TickReport) -> String {
        let mut out = format!(
            "Stream {}: {} new segments, {} hits, {} errors",
            self.colorize(&report.stream, &Color::Blue, false),
            report.new_segments,
            self.colorize(&report.hits.to_string(), &Color::Green, false),
            report.errors
        );

        if !report.error_details.is_empty() {
            out.push_str("\nError details:");
            for (i, detail) in report.error_details.iter().enumerate() {
                let _ = write!(out, "\n  {}. {}", i + 1, detail);
            }
        }

        out
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Red => text.red(),
                    Color::Blue => text.blue(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (color, bold, self.colored);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Red,
    Blue,
    Cyan,
}

fn summary_json(summary: &WarmSummary) -> serde_json::Value {
    let outcomes: Vec<_> = summary
        .outcomes
        .iter()
        .map(|o| {
            serde_json::json!({
                "url": o.url,
                "hit": o.is_hit(),
                "status": o.status,
                "duration_ms": o.duration.as_millis() as u64,
                "error": o.error,
            })
        })
        .collect();

    serde_json::json!({
        "playlist_url": summary.playlist_url,
        "total_segments": summary.total_segments,
        "cache_hits": summary.cache_hits,
        "cache_misses": summary.cache_misses(),
        "error_count": summary.error_count(),
        "errors": summary.errors,
        "duration_ms": summary.duration.as_millis() as u64,
        "cache_ratio": summary.cache_ratio(),
        "outcomes": outcomes,
    })
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
