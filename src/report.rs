//! Report formatting for one-shot probe runs.
//!
//! Pure functions: (records, OutputFormat) → String.
//! No I/O, no side effects.

use crate::error::ProviderError;
use crate::provider::ProbeOutput;
use crate::types::{OutputFormat, Probe, ProbeRecord, RecordStatus};

/// Turn a provider result into a report record.
pub fn record(probe: Probe, result: &Result<ProbeOutput, ProviderError>) -> ProbeRecord {
    let (status, output, error) = match result {
        Ok(ProbeOutput::Report(text)) => (RecordStatus::Ok, Some(text.trim().to_string()), None),
        Ok(ProbeOutput::PreconditionNotMet) => (
            RecordStatus::PreconditionNotMet,
            None,
            Some("booted OS is too old; Big Sur or later is required".to_string()),
        ),
        Err(e) => (RecordStatus::Failed, None, Some(e.to_string())),
    };

    ProbeRecord {
        probe: probe.to_string(),
        label: probe.label().to_string(),
        status,
        output,
        error,
    }
}

/// Format records for output.
pub fn format_records(records: &[ProbeRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(records),
        OutputFormat::Json => format_json(records),
    }
}

// ============================================================================
// HUMAN FORMAT
// ============================================================================

fn format_human(records: &[ProbeRecord]) -> String {
    let width = records.iter().map(|r| r.label.len()).max().unwrap_or(0);
    let mut out = String::new();

    for r in records {
        let value = match (&r.output, &r.error) {
            (Some(output), _) => output.clone(),
            (None, Some(error)) => format!("unavailable ({})", error),
            (None, None) => "unavailable".to_string(),
        };

        let mut lines = value.lines();
        let first = lines.next().unwrap_or("");
        out.push_str(&format!("{:<width$}  {}\n", r.label, first, width = width));
        for line in lines {
            out.push_str(&format!("{:<width$}  {}\n", "", line, width = width));
        }
    }

    out
}

// ============================================================================
// JSON FORMAT
// ============================================================================

fn format_json(records: &[ProbeRecord]) -> String {
    // Records hold only strings and enums; serialization cannot fail.
    serde_json::to_string_pretty(records).unwrap_or_else(|e| {
        format!("{{\"error\": \"serialization failed: {}\"}}", e)
    })
}

// ============================================================================
// TESTS
// ============================================================================
