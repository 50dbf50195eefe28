//! Expected extraction values and the checks run against them.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::backend::ExtractedField;
use crate::error::{Result, SmokeError};

/// A field the backend must extract, with the text its value must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expectation {
    pub field: &'static str,
    pub expected_text: &'static str,
    pub description: &'static str,
}

pub const EXPECTATIONS: &[Expectation] = &[
    Expectation {
        field: "primary_site",
        expected_text: "Right upper lobe of lung",
        description: "Anatomical location should be exact",
    },
    Expectation {
        field: "histology",
        expected_text: "Invasive ductal adenocarcinoma, grade 2",
        description: "Histology should include exact grade information",
    },
    Expectation {
        field: "clinical_t",
        expected_text: "T2",
        description: "TNM staging should be exact codes",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    Pass,
    Mismatch,
    Missing,
}

impl CaseOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, CaseOutcome::Pass)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseResult {
    pub expectation: Expectation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted: Option<ExtractedField>,
    pub outcome: CaseOutcome,
}

/// Case-insensitive containment, with no other normalization.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn check_case(
    expectation: &Expectation,
    fields: &BTreeMap<String, Value>,
) -> Result<CaseResult> {
    let Some(raw) = fields.get(expectation.field) else {
        return Ok(CaseResult {
            expectation: *expectation,
            extracted: None,
            outcome: CaseOutcome::Missing,
        });
    };

    let extracted =
        ExtractedField::from_value(raw).map_err(|e| SmokeError::MalformedField {
            field: expectation.field.to_string(),
            source: e,
        })?;

    let outcome = if contains_ignore_case(&extracted.value, expectation.expected_text) {
        CaseOutcome::Pass
    } else {
        CaseOutcome::Mismatch
    };

    Ok(CaseResult {
        expectation: *expectation,
        extracted: Some(extracted),
        outcome,
    })
}

/// Runs every entry of [`EXPECTATIONS`] in order.
pub fn verify_fields(fields: &BTreeMap<String, Value>) -> Result<Vec<CaseResult>> {
    EXPECTATIONS
        .iter()
        .map(|expectation| check_case(expectation, fields))
        .collect()
}
