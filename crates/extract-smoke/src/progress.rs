use std::io::Write;
use std::sync::Mutex;

use crate::backend::DocumentId;
use crate::summary::Summary;
use crate::verify::{CaseOutcome, CaseResult};

const RULE_WIDTH: usize = 60;
const BANNER_WIDTH: usize = 80;
const SNIPPET_PREVIEW_CHARS: usize = 100;

/// Steps of a run that announce themselves before doing work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Uploading,
    Processing,
    Analyzing,
}

impl RunPhase {
    pub fn number(&self) -> usize {
        match self {
            RunPhase::Uploading => 1,
            RunPhase::Processing => 2,
            RunPhase::Analyzing => 3,
        }
    }
}

/// Events emitted by the runner.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    BackendHealthy,
    /// `/health` answered, but not with 200.
    BackendUnhealthy {
        status: u16,
    },
    /// `/health` could not be reached at all.
    BackendUnreachable {
        base_url: String,
        error: String,
    },
    RunStarted,
    Phase {
        phase: RunPhase,
        message: String,
    },
    Uploaded {
        document_id: DocumentId,
    },
    Processed,
    CasesStarted {
        total: usize,
    },
    CaseChecked {
        index: usize,
        result: CaseResult,
    },
    Finished {
        summary: Summary,
    },
    Failed {
        error: String,
        body: Option<String>,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Writes the human-readable report to any writer, usually stdout.
pub struct ConsoleProgress<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleProgress<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn render(out: &mut W, event: &ProgressEvent) -> std::io::Result<()> {
        match event {
            ProgressEvent::BackendHealthy => writeln!(out, "[OK] Backend service is running"),
            ProgressEvent::BackendUnhealthy { status } => writeln!(
                out,
                "[FAIL] Backend service not responding correctly (HTTP {})",
                status
            ),
            ProgressEvent::BackendUnreachable { base_url, error } => {
                writeln!(out, "[FAIL] Backend service not accessible: {}", error)?;
                writeln!(
                    out,
                    "Make sure the extraction backend is running and reachable at {}",
                    base_url
                )?;
                writeln!(
                    out,
                    "Start the backend with: cd Oncology-reporter-API && python3 enhanced_minimal_server.py"
                )
            }
            ProgressEvent::RunStarted => {
                writeln!(out, "\n{}", "=".repeat(BANNER_WIDTH))?;
                writeln!(out, "Testing Enhanced Source Extraction System")?;
                writeln!(out, "{}", "=".repeat(RULE_WIDTH))
            }
            ProgressEvent::Phase { phase, message } => {
                if phase.number() > 1 {
                    writeln!(out)?;
                }
                writeln!(out, "{}. {}", phase.number(), message)
            }
            ProgressEvent::Uploaded { document_id } => {
                writeln!(out, "[OK] Document uploaded successfully: {}", document_id)
            }
            ProgressEvent::Processed => writeln!(out, "[OK] Document processed successfully"),
            ProgressEvent::CasesStarted { total } => {
                writeln!(out, "\nTesting {} extraction cases:", total)?;
                writeln!(out, "{}", "-".repeat(RULE_WIDTH))
            }
            ProgressEvent::CaseChecked { index, result } => render_case(out, *index, result),
            ProgressEvent::Finished { summary } => {
                writeln!(out, "\nRESULTS SUMMARY:")?;
                writeln!(
                    out,
                    "Successful extractions: {}/{}",
                    summary.success_count, summary.total
                )?;
                writeln!(out, "Success rate: {:.1}%", summary.percent())?;
                if summary.passed() {
                    writeln!(out, "OVERALL: PASS - Enhanced extraction system working well!")
                } else {
                    writeln!(out, "OVERALL: NEEDS IMPROVEMENT - Success rate below 80%")
                }
            }
            ProgressEvent::Failed { error, body } => match body {
                Some(body) => {
                    writeln!(out, "[FAIL] {}", error)?;
                    writeln!(out, "{}", body)
                }
                None => writeln!(out, "[FAIL] Test failed with error: {}", error),
            },
        }
    }
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(SNIPPET_PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn render_case<W: Write>(out: &mut W, index: usize, result: &CaseResult) -> std::io::Result<()> {
    let expectation = &result.expectation;
    writeln!(out, "\n{}. {}", index, expectation.field.to_uppercase())?;
    writeln!(out, "   Description: {}", expectation.description)?;
    writeln!(out, "   Expected: '{}'", expectation.expected_text)?;

    if let Some(field) = &result.extracted {
        writeln!(out, "   Extracted: '{}'", field.value)?;
        writeln!(out, "   Source: '{}...'", preview(&field.source_snippet))?;
        writeln!(out, "   Confidence: {:.2}", field.confidence)?;
        writeln!(out, "   Type: {}", field.extraction_type)?;
    }

    match result.outcome {
        CaseOutcome::Pass => writeln!(out, "   PASS - Correct value extracted"),
        CaseOutcome::Mismatch => writeln!(out, "   FAIL - Incorrect value extracted"),
        CaseOutcome::Missing => writeln!(out, "   FAIL - Field not found in extraction results"),
    }
}

impl<W: Write + Send> ProgressReporter for ConsoleProgress<W> {
    fn report(&self, event: ProgressEvent) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = Self::render(&mut *out, &event).and_then(|()| out.flush()) {
            log::warn!("Failed to write progress output: {}", e);
        }
    }
}

/// Closing banner. The roadmap block is only printed for a passing run.
pub fn write_final_results<W: Write>(out: &mut W, passed: bool) -> std::io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(BANNER_WIDTH))?;
    writeln!(out, "FINAL RESULTS:")?;
    writeln!(
        out,
        "Backend Enhanced Extraction: {}",
        if passed { "PASS" } else { "FAIL" }
    )?;

    if passed {
        writeln!(out, "\nENHANCED SOURCE EXTRACTION SYSTEM IS WORKING!")?;
        writeln!(out, "\nRoadmap Progress:")?;
        writeln!(out, "[done] Phase 1: Enhanced PDF text extraction pipeline")?;
        writeln!(out, "[done] Phase 2: Exact text matching system integration")?;
        writeln!(out, "[done] Phase 3: Claude API integration redesign")?;
        writeln!(out, "[done] Phase 4: Frontend enhancement (completed)")?;
        writeln!(out, "[todo] Phase 5: Database migration & optimization")?;
        writeln!(out, "[todo] Phase 6: Testing & medical validation")?;
        writeln!(out, "[todo] Phase 7: Performance & monitoring")?;
    } else {
        writeln!(out, "\nTESTS FAILED - Review implementation")?;
        writeln!(out, "Check the detailed output above for specific issues")?;
    }

    out.flush()
}
