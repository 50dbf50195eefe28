use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::backend::{BackendClient, DocumentId};
use crate::config::SmokeConfig;
use crate::error::{BackendError, Result, SmokeError};
use crate::fixture::FixtureFile;
use crate::progress::{ProgressEvent, ProgressReporter, RunPhase};
use crate::summary::{RunReport, Summary};
use crate::verify::{self, CaseResult};

/// What a run accumulated before it finished or failed.
#[derive(Default)]
struct RunState {
    document_id: Option<DocumentId>,
    cases: Vec<CaseResult>,
}

pub struct SmokeRunner {
    config: SmokeConfig,
    client: BackendClient,
}

impl SmokeRunner {
    pub fn new(config: SmokeConfig) -> Result<Self> {
        let client = BackendClient::new(&config)?;
        Ok(Self { config, client })
    }

    /// Health check. A failure here means the run must not start.
    pub async fn preflight(&self, progress: &dyn ProgressReporter) -> Result<()> {
        match self
            .client
            .health()
            .instrument(info_span!("health_check", backend = %self.config.base_url()))
            .await
        {
            Ok(()) => {
                info!("Backend at {} is healthy", self.config.base_url());
                progress.report(ProgressEvent::BackendHealthy);
                Ok(())
            }
            Err(e) => {
                warn!("Backend health check failed: {}", e);
                let event = match &e {
                    BackendError::Unhealthy { status } => {
                        ProgressEvent::BackendUnhealthy { status: *status }
                    }
                    _ => ProgressEvent::BackendUnreachable {
                        base_url: self.config.base_url().to_string(),
                        error: e.to_string(),
                    },
                };
                progress.report(event);
                Err(SmokeError::BackendUnavailable(e))
            }
        }
    }

    /// Upload, process and verify. Never returns an error: every failure is
    /// recorded in the report and fails the run.
    pub async fn run(&self, progress: &dyn ProgressReporter) -> RunReport {
        let started_at = Utc::now();
        progress.report(ProgressEvent::RunStarted);

        let mut state = RunState::default();
        let outcome = self
            .execute(progress, &mut state)
            .instrument(info_span!("smoke_run", backend = %self.config.base_url()))
            .await;

        let (summary, error) = match outcome {
            Ok(summary) => (Some(summary), None),
            Err(e) => {
                warn!("Run failed: {}", e);
                let body = match &e {
                    SmokeError::Backend(backend) => backend.body().map(str::to_string),
                    _ => None,
                };
                let error = match &e {
                    SmokeError::Backend(backend) if body.is_some() => backend.to_string(),
                    _ => e.to_string(),
                };
                progress.report(ProgressEvent::Failed {
                    error: error.clone(),
                    body,
                });
                (None, Some(error))
            }
        };

        let passed = error.is_none() && summary.is_some_and(|s| s.passed());

        RunReport {
            backend_url: self.config.base_url().to_string(),
            started_at,
            finished_at: Utc::now(),
            document_id: state.document_id,
            cases: state.cases,
            summary,
            error,
            passed,
        }
    }

    async fn execute(
        &self,
        progress: &dyn ProgressReporter,
        state: &mut RunState,
    ) -> Result<Summary> {
        let patient_id = self.config.patient_id;

        // Removed when this function returns, on any path.
        let fixture = FixtureFile::create(&self.config.fixture_dir)?;

        // Step 1: Upload
        progress.report(ProgressEvent::Phase {
            phase: RunPhase::Uploading,
            message: "Uploading test document...".to_string(),
        });
        let uploaded = self
            .client
            .upload(fixture.path(), patient_id)
            .instrument(info_span!("upload"))
            .await?;
        state.document_id = Some(uploaded.document_id.clone());
        progress.report(ProgressEvent::Uploaded {
            document_id: uploaded.document_id.clone(),
        });

        // Step 2: Process
        progress.report(ProgressEvent::Phase {
            phase: RunPhase::Processing,
            message: "Processing document with enhanced extraction...".to_string(),
        });
        let processed = self
            .client
            .process(&uploaded.document_id, patient_id)
            .instrument(info_span!("process", document_id = %uploaded.document_id))
            .await?;
        progress.report(ProgressEvent::Processed);
        debug!("Backend returned {} fields", processed.fields.len());

        // Step 3: Verify
        info_span!("verify").in_scope(|| Self::verify_step(progress, &processed.fields, state))
    }

    fn verify_step(
        progress: &dyn ProgressReporter,
        fields: &BTreeMap<String, Value>,
        state: &mut RunState,
    ) -> Result<Summary> {
        progress.report(ProgressEvent::Phase {
            phase: RunPhase::Analyzing,
            message: "Analyzing extraction results...".to_string(),
        });
        progress.report(ProgressEvent::CasesStarted {
            total: verify::EXPECTATIONS.len(),
        });

        for (i, expectation) in verify::EXPECTATIONS.iter().enumerate() {
            let result = verify::check_case(expectation, fields)?;
            debug!(field = expectation.field, outcome = ?result.outcome, "Checked case");
            state.cases.push(result.clone());
            progress.report(ProgressEvent::CaseChecked {
                index: i + 1,
                result,
            });
        }

        let summary = Summary::from_results(&state.cases);
        info!(
            "{}/{} extraction checks passed",
            summary.success_count, summary.total
        );
        progress.report(ProgressEvent::Finished { summary });

        Ok(summary)
    }
}
