use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// DTC category based on first character of code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DtcCategory {
    /// P: Powertrain (engine, transmission).
    Powertrain,
    /// C: Chassis (ABS, steering).
    Chassis,
    /// B: Body (airbags, AC, lighting).
    Body,
    /// U: Network/Communication (CAN bus errors).
    Network,
}

impl DtcCategory {
    /// Parse DTC category from the first character of a code.
    ///
    /// Returns `None` for anything outside the SAE J2012 `P`/`C`/`B`/`U` set.
    pub fn parse(code: &str) -> Option<Self> {
        match code.chars().next() {
            Some('P' | 'p') => Some(Self::Powertrain),
            Some('C' | 'c') => Some(Self::Chassis),
            Some('B' | 'b') => Some(Self::Body),
            Some('U' | 'u') => Some(Self::Network),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Powertrain => "powertrain",
            Self::Chassis => "chassis",
            Self::Body => "body",
            Self::Network => "network",
        }
    }
}

/// Severity classification of a DTC.
///
/// Totally ordered through [`DtcSeverity::rank`]: low < medium < high < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DtcSeverity {
    /// Minor issue, next routine service.
    Low,
    /// Service within a couple of weeks.
    Medium,
    /// Service as soon as possible.
    High,
    /// Stop the vehicle.
    Critical,
}

impl DtcSeverity {
    /// Explicit integer rank backing the total order.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl PartialOrd for DtcSeverity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DtcSeverity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for DtcSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended course of action for a severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAction {
    /// Empty code list.
    NoFaults,
    RoutineService,
    ServiceSoon,
    ServiceAsap,
    StopImmediately,
}

impl ServiceAction {
    /// Action tier for a given severity.
    pub fn for_severity(severity: DtcSeverity) -> Self {
        match severity {
            DtcSeverity::Low => Self::RoutineService,
            DtcSeverity::Medium => Self::ServiceSoon,
            DtcSeverity::High => Self::ServiceAsap,
            DtcSeverity::Critical => Self::StopImmediately,
        }
    }

    /// Operator-facing wording.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NoFaults => "No faults detected. Vehicle systems normal.",
            Self::RoutineService => "Minor issue. Schedule during next routine service.",
            Self::ServiceSoon => "Service recommended within 1-2 weeks. Monitor closely.",
            Self::ServiceAsap => "Schedule service ASAP. Avoid long trips until repaired.",
            Self::StopImmediately => {
                "STOP VEHICLE IMMEDIATELY. Do not drive. Tow to nearest service center."
            }
        }
    }
}

impl std::fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// One analyzed trouble code inside a [`DiagnosisReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosedCode {
    /// Normalized (trimmed, uppercased) code.
    pub code: String,
    pub description: String,
    pub severity: DtcSeverity,
    /// Affected vehicle system (e.g. "ignition", "abs", "network").
    pub system: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DtcCategory>,
    pub action: ServiceAction,
    /// Whether the code was found in the static DTC table.
    pub known: bool,
    /// Whether the code matches `[PCBU][0-9A-F]{4}`.
    pub well_formed: bool,
}

/// Structured result of analyzing a set of trouble codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub total_codes: usize,
    /// Highest severity among all codes; `None` when there are no codes.
    pub max_severity: Option<DtcSeverity>,
    pub overall_action: ServiceAction,
    /// False once any code is critical.
    pub safe_to_drive: bool,
    /// Whether the MIL (check engine light) would be expected on.
    pub mil_recommended: bool,
    pub codes: Vec<DiagnosedCode>,
    pub affected_systems: BTreeSet<String>,
}

impl DiagnosisReport {
    /// Report for an empty code list.
    pub fn no_faults() -> Self {
        Self {
            total_codes: 0,
            max_severity: None,
            overall_action: ServiceAction::NoFaults,
            safe_to_drive: true,
            mil_recommended: false,
            codes: Vec::new(),
            affected_systems: BTreeSet::new(),
        }
    }
}

/// Kind of maintenance work a trouble code calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    EngineDiagnostic,
    TransmissionService,
    EmissionsService,
    SafetyInspection,
}

/// A maintenance suggestion derived from a diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub priority: DtcSeverity,
    pub code: String,
    pub description: String,
    /// Rough cost range, e.g. "$100-300".
    pub estimated_cost: String,
}
