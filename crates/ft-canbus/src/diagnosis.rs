//! DTC analysis: severity ranking, affected systems, recommended action,
//! and maintenance suggestions.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use ft_protocol::{
    DiagnosedCode, DiagnosisReport, DtcCategory, DtcSeverity, MaintenanceSuggestion,
    ServiceAction, SuggestionType,
};

use crate::dtc_db;

// SAE J2012: system letter, then four hex digits.
static RE_DTC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[PCBU][0-9A-F]{4}$").expect("DTC pattern is valid"));

/// Severity assigned to codes missing from the static table.
pub const UNKNOWN_CODE_SEVERITY: DtcSeverity = DtcSeverity::Medium;

/// Check a normalized code against the `[PCBU][0-9A-F]{4}` layout.
pub fn is_well_formed(code: &str) -> bool {
    RE_DTC.is_match(code)
}

/// Analyze a set of trouble codes into a structured diagnosis.
///
/// Codes are trimmed and uppercased. Unknown codes are never errors: their
/// system is decoded from the code structure and they rank as medium.
pub fn analyze<S: AsRef<str>>(codes: &[S]) -> DiagnosisReport {
    if codes.is_empty() {
        return DiagnosisReport::no_faults();
    }

    let analyzed: Vec<DiagnosedCode> = codes.iter().map(|c| diagnose(c.as_ref())).collect();

    let max_severity = analyzed.iter().map(|c| c.severity).max();
    let affected_systems: BTreeSet<String> = analyzed.iter().map(|c| c.system.clone()).collect();
    let overall_action = max_severity
        .map(ServiceAction::for_severity)
        .unwrap_or(ServiceAction::NoFaults);
    let safe_to_drive = max_severity.is_none_or(|s| s < DtcSeverity::Critical);
    let mil_recommended = max_severity.is_some_and(|s| s >= DtcSeverity::High);

    tracing::debug!(
        total = analyzed.len(),
        max_severity = ?max_severity,
        safe_to_drive,
        "DTC analysis complete"
    );

    DiagnosisReport {
        total_codes: codes.len(),
        max_severity,
        overall_action,
        safe_to_drive,
        mil_recommended,
        codes: analyzed,
        affected_systems,
    }
}

/// Maintenance suggestions derived from [`analyze`].
///
/// Codes whose system has no maintenance mapping produce no suggestion.
/// ABS and steering faults are always escalated to critical priority.
pub fn maintenance_suggestions<S: AsRef<str>>(codes: &[S]) -> Vec<MaintenanceSuggestion> {
    analyze(codes)
        .codes
        .into_iter()
        .filter_map(|c| {
            let (kind, prefix, cost, priority) = match c.system.as_str() {
                "ignition" | "fuel" => (
                    SuggestionType::EngineDiagnostic,
                    "Engine diagnostic needed",
                    "$100-300",
                    c.severity,
                ),
                "transmission" => (
                    SuggestionType::TransmissionService,
                    "Transmission inspection",
                    "$150-500",
                    c.severity,
                ),
                "emissions" => (
                    SuggestionType::EmissionsService,
                    "Emissions system service",
                    "$100-400",
                    c.severity,
                ),
                "abs" | "steering" => (
                    SuggestionType::SafetyInspection,
                    "Safety-critical repair",
                    "$200-800",
                    DtcSeverity::Critical,
                ),
                _ => return None,
            };
            Some(MaintenanceSuggestion {
                kind,
                priority,
                description: format!("{prefix}: {}", c.description),
                code: c.code,
                estimated_cost: cost.to_string(),
            })
        })
        .collect()
}

fn diagnose(raw: &str) -> DiagnosedCode {
    let code = raw.trim().to_uppercase();
    let category = DtcCategory::parse(&code);
    let well_formed = is_well_formed(&code);

    match dtc_db::lookup(&code) {
        Some(entry) => DiagnosedCode {
            description: entry.description.to_string(),
            severity: entry.severity,
            system: entry.system.to_string(),
            category,
            action: ServiceAction::for_severity(entry.severity),
            known: true,
            well_formed,
            code,
        },
        None => {
            tracing::debug!(code = %code, well_formed, "DTC not in table, decoding structurally");
            let system = category.map(|c| c.as_str()).unwrap_or("unknown");
            let subsystem = match category {
                Some(DtcCategory::Powertrain) => powertrain_subsystem(&code),
                _ => None,
            };
            DiagnosedCode {
                description: format!("Unknown {system} code (manufacturer-specific)"),
                severity: UNKNOWN_CODE_SEVERITY,
                system: subsystem.unwrap_or(system).to_string(),
                category,
                action: ServiceAction::for_severity(UNKNOWN_CODE_SEVERITY),
                known: false,
                well_formed,
                code,
            }
        }
    }
}

/// Coarse powertrain subsystem from the third character (`P0[3]01`).
fn powertrain_subsystem(code: &str) -> Option<&'static str> {
    match code.chars().nth(2)? {
        '0' | '1' | '2' => Some("fuel_and_air"),
        '3' => Some("ignition"),
        '4' => Some("emissions"),
        '5' => Some("speed_idle"),
        '6' => Some("computer"),
        '7' | '8' => Some("transmission"),
        _ => None,
    }
}
