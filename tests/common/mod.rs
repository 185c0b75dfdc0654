use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use corpus_dedup::Config;

pub struct TestEnvironment {
    _temp_dir: TempDir, // Prefixed with _ to indicate it's kept for Drop cleanup
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let input_dir = temp_dir.path().join("corpus");
        let output_dir = temp_dir.path().join("organized");
        fs::create_dir_all(&input_dir)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            input_dir,
            output_dir,
        })
    }

    pub fn write_doc(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.input_dir.join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_doc_bytes(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.input_dir.join(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Default parameters with the given verification threshold.
    pub fn config(&self, threshold: f32) -> Config {
        Config {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            num_perm: 100,
            num_bands: 50,
            shingle_k: 5,
            similarity_threshold: threshold,
            max_preview_lines: None,
            seed: 42,
            debug: false,
        }
    }
}

pub fn read_csv_report(output_dir: &Path) -> Result<String> {
    Ok(fs::read_to_string(output_dir.join("similarity_report.csv"))?)
}

/// Sorted entry names directly under `dir` (empty if the dir is missing).
pub fn entry_names(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

// Fixture prose. Long enough that a single appended sentence leaves the
// shingle sets overwhelmingly overlapping.
pub const BASE_ARTICLE: &str = "The harbor town woke slowly under a thin layer \
of morning fog. Fishing boats rocked against their moorings while gulls \
circled the fish market, waiting for the first crates to be carried ashore. \
Along the seawall, the baker propped open his door and the smell of warm \
bread drifted across the cobblestones toward the customs house. By eight the \
ferry had sounded its horn twice, and the commuters gathered at the landing \
with newspapers folded under their arms. A municipal crew repainted the \
railings near the lighthouse, pausing whenever a delivery truck squeezed \
past on the narrow quay. In the afternoon the wind shifted to the southwest, \
pushing the fog offshore and leaving the rooftops bright and wet. Children \
raced bicycles along the promenade, dodging rope coils and lobster traps \
stacked outside the chandlery. Toward evening the fleet returned, engines \
low, decks heavy, and the auctioneer's bell rang from the market hall until \
the last catch was weighed and the lights along the breakwater came on one \
by one.";

pub const EXTRA_SENTENCE: &str = " A late squall rattled the shutters of the \
harbormaster's office just before midnight.";

pub const SECOND_EXTRA_SENTENCE: &str = " Two trawlers stayed out past dawn \
chasing a mackerel run reported by the northern buoy.";

pub const OTHER_ARTICLE: &str = "Quarterly maintenance of the observatory \
telescope begins with recalibrating the mount encoders and flushing the \
coolant lines that serve the camera cryostat. Technicians verify the mirror \
support actuators one cell at a time, logging hysteresis values against the \
commissioning baseline. Software upgrades are staged on the secondary \
control computer and exercised against simulated pointing runs before being \
promoted to the live system. Dome drive belts, shutter limit switches, and \
the weather mast anemometer each get their own checklist, signed and dated \
by the shift engineer. Only after the interlock chain passes a full test is \
the instrument released for the next observing semester.";

pub const THIRD_ARTICLE: &str = "The municipal archive finished digitizing \
its earliest property ledgers this spring, a project that took the staff \
through four hundred bound volumes and a basement of loose survey plats. \
Each page was photographed on a cradle scanner, color balanced against a \
reference card, and tagged with the parcel numbers a volunteer team \
transcribed from the margins. Researchers can now trace a single lot from \
the original land grant through every subsequent subdivision without \
handling the brittle originals, and the reading room has replaced its \
microfilm queue with a bank of terminals that search the ledger text \
directly.";
