//! Synthetic pathology report used as upload input.
//!
//! The report is written to disk for the duration of a run and removed when
//! the [`FixtureFile`] guard is dropped, on every exit path.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Result, SmokeError};

/// File name sent in the multipart `file` part.
pub const FIXTURE_FILENAME: &str = "test_medical_report.txt";

pub const FIXTURE_CONTENT_TYPE: &str = "text/plain";

pub const MEDICAL_REPORT: &str = "
    PATIENT DEMOGRAPHICS:
    Name: John Doe
    Date of Birth: 1975-03-15
    Gender: Male
    Medical Record Number: MRN001234
    
    PATHOLOGY REPORT:
    Primary Site: Right upper lobe of lung
    Histologic Type: Invasive ductal adenocarcinoma, grade 2
    ICD-O-3 Morphology Code: 8140/3
    ICD-O-3 Site Code: C34.1
    Tumor Size: 4.2 cm in greatest dimension
    
    STAGING INFORMATION:
    Clinical Staging: Stage IIA (T2N0M0) with tumor measuring 4.2 cm
    TNM Classification:
    - Clinical T: T2
    - Clinical N: N0  
    - Clinical M: M0
    AJCC Stage: Stage IIA
    
    TREATMENT SUMMARY:
    Surgery Performed: Right upper lobectomy performed on 2024-01-15
    Chemotherapy: Adjuvant chemotherapy with carboplatin and paclitaxel
    Radiation Therapy: Not indicated for this stage
    ";

/// The report on disk. Removed on drop.
#[derive(Debug)]
pub struct FixtureFile {
    path: PathBuf,
}

impl FixtureFile {
    /// Writes [`MEDICAL_REPORT`] to `dir/test_medical_report.txt`, replacing
    /// any leftover from an earlier run.
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(FIXTURE_FILENAME);
        std::fs::write(&path, MEDICAL_REPORT).map_err(|e| SmokeError::Fixture {
            path: path.clone(),
            source: e,
        })?;
        debug!("Wrote fixture to {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FixtureFile {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed fixture {}", self.path.display()),
            Err(e) => warn!("Failed to remove fixture {}: {}", self.path.display(), e),
        }
    }
}
