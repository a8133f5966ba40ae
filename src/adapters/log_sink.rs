//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one record per [`LoopEvent`] to the
//! `log` facade (which `main` routes to stderr through `env_logger`).
//! Records are either pipe-delimited text lines or single-line JSON
//! objects, per [`LogFormat`].

use log::Level;
use serde_json::json;

use crate::app::events::{CycleOutcome, LoopEvent, StopReason};
use crate::app::ports::EventSink;
use crate::app::snapshot::SensorSnapshot;
use crate::config::LogFormat;

/// Adapter that logs every [`LoopEvent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink {
    format: LogFormat,
}

impl LogEventSink {
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }

    /// Level and rendered line for `event`, without logging it.
    pub fn render(&self, event: &LoopEvent) -> (Level, String) {
        let level = level_of(event);
        let line = match self.format {
            LogFormat::Text => render_text(event),
            LogFormat::Json => render_json(event).to_string(),
        };
        (level, line)
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LoopEvent) {
        let (level, line) = self.render(event);
        log::log!(level, "{}", line);
    }
}

fn level_of(event: &LoopEvent) -> Level {
    match event {
        LoopEvent::Started { .. } => Level::Info,
        LoopEvent::StartupFailed(_) => Level::Error,
        LoopEvent::Cycle(record) => match &record.outcome {
            CycleOutcome::Actuated { report, .. } if report.all_applied() => Level::Info,
            _ => Level::Warn,
        },
        LoopEvent::Stopped { reason, .. } if reason.is_fatal() => Level::Error,
        LoopEvent::Stopped { .. } => Level::Info,
    }
}

// ── Text ──────────────────────────────────────────────────────

fn fmt_snapshot(s: &SensorSnapshot) -> String {
    format!(
        "T={:.1}\u{00b0}C RH={:.1}% WL={:.1}% N={:.1} P={:.1} K={:.1}",
        s.temperature_c, s.humidity_pct, s.water_level_pct, s.nitrogen, s.phosphorus, s.potassium,
    )
}

fn reason_name(reason: &StopReason) -> &'static str {
    match reason {
        StopReason::Cancelled => "cancelled",
        StopReason::CycleLimit => "cycle_limit",
        StopReason::Fatal(_) => "fatal",
    }
}

fn render_text(event: &LoopEvent) -> String {
    match event {
        LoopEvent::Started {
            model_version,
            interval_ms,
        } => format!("START | model={} | interval={}ms", model_version, interval_ms),
        LoopEvent::StartupFailed(msg) => format!("START | failed: {}", msg),
        LoopEvent::Cycle(record) => match &record.outcome {
            CycleOutcome::Actuated {
                snapshot,
                intent,
                report,
            } => {
                let mut line = format!(
                    "CYCLE | #{} | {} | {}",
                    record.cycle,
                    fmt_snapshot(snapshot),
                    intent
                );
                for fault in report.faults() {
                    line.push_str(&format!(" | {}", fault));
                }
                line
            }
            CycleOutcome::InvalidSnapshot(e) => format!(
                "CYCLE | #{} | invalid snapshot ({}) | actuation skipped",
                record.cycle, e
            ),
            CycleOutcome::DecisionFailed { snapshot, error } => format!(
                "CYCLE | #{} | {} | decision failed ({}) | actuation skipped",
                record.cycle,
                fmt_snapshot(snapshot),
                error
            ),
        },
        LoopEvent::Stopped { reason, stats } => {
            let detail = match reason {
                StopReason::Fatal(msg) => format!(" ({})", msg),
                _ => String::new(),
            };
            format!(
                "STOP | reason={}{} | cycles={} actuated={} invalid={} decision_failures={} actuator_failures={}",
                reason_name(reason),
                detail,
                stats.cycles,
                stats.actuated,
                stats.invalid_snapshots,
                stats.decision_failures,
                stats.actuator_failures,
            )
        }
    }
}

// ── JSON ──────────────────────────────────────────────────────

fn render_json(event: &LoopEvent) -> serde_json::Value {
    match event {
        LoopEvent::Started {
            model_version,
            interval_ms,
        } => json!({
            "event": "started",
            "model_version": model_version,
            "interval_ms": interval_ms,
        }),
        LoopEvent::StartupFailed(msg) => json!({
            "event": "startup_failed",
            "error": msg,
        }),
        LoopEvent::Cycle(record) => match &record.outcome {
            CycleOutcome::Actuated {
                snapshot,
                intent,
                report,
            } => json!({
                "event": "cycle",
                "cycle": record.cycle,
                "status": "actuated",
                "snapshot": snapshot,
                "intent": intent,
                "report": report,
            }),
            CycleOutcome::InvalidSnapshot(e) => json!({
                "event": "cycle",
                "cycle": record.cycle,
                "status": "invalid_snapshot",
                "missing": e.missing.as_slice(),
            }),
            CycleOutcome::DecisionFailed { snapshot, error } => json!({
                "event": "cycle",
                "cycle": record.cycle,
                "status": "decision_failed",
                "snapshot": snapshot,
                "error": error.to_string(),
            }),
        },
        LoopEvent::Stopped { reason, stats } => {
            let error = match reason {
                StopReason::Fatal(msg) => Some(msg.as_str()),
                _ => None,
            };
            json!({
                "event": "stopped",
                "reason": reason_name(reason),
                "error": error,
                "stats": stats,
            })
        }
    }
}
