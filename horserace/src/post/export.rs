use crate::post::race_result::{RaceResult, ResultsLog, Standing};
use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// ExportDocument is the serialized form of a championship: all round results, the standings
/// sorted by points and the export timestamp (RFC 3339, UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub round_results: Vec<RaceResult>,
    pub overall_standings: Vec<Standing>,
    pub exported_at: String,
}

impl ExportDocument {
    pub fn from_results(results: &ResultsLog) -> ExportDocument {
        ExportDocument {
            round_results: results.get_round_results().to_vec(),
            overall_standings: results.sorted_standings(),
            exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// to_json returns the document as pretty-printed JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize results to JSON!")
    }
}

/// write_json writes the results and standings as pretty-printed JSON to the given path.
pub fn write_json(results: &ResultsLog, filepath: &Path) -> anyhow::Result<()> {
    let content = ExportDocument::from_results(results).to_json()?;

    let mut fh = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(filepath)
        .context(format!("Failed to open export file {}!", filepath.display()))?;
    fh.write_all(content.as_bytes())
        .context(format!("Failed to write export file {}!", filepath.display()))?;
    fh.flush()?;

    log::info!("Exported results to {}", filepath.display());
    Ok(())
}

/// write_csv writes one row per round result to the given path.
pub fn write_csv(results: &ResultsLog, filepath: &Path) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_path(filepath)
        .context(format!("Failed to open export file {}!", filepath.display()))?;

    for result in results.get_round_results().iter() {
        csv_writer
            .serialize(result)
            .context(format!("Failed to write export file {}!", filepath.display()))?;
    }
    csv_writer.flush()?;

    log::info!("Exported results to {}", filepath.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::horse::{Horse, Stable};

    fn results() -> ResultsLog {
        let stable = Stable::new(
            ["0", "1"]
                .iter()
                .map(|id| Horse {
                    id: id.to_string(),
                    name: format!("Horse {}", id),
                    color: "#FF4444".to_owned(),
                    condition: 70,
                })
                .collect(),
        );
        let round_results = [("1", 1, 10), ("0", 2, 8)]
            .iter()
            .map(|&(horse_id, position, points)| RaceResult {
                round_number: 1,
                horse_id: horse_id.to_owned(),
                position,
                completion_time: 41_250.5,
                final_speed: 31.2,
                points,
            })
            .collect::<Vec<_>>();

        let mut log = ResultsLog::default();
        log.record_round_results(&round_results, &stable);
        log
    }

    #[test]
    fn test_json_document() {
        let json = ExportDocument::from_results(&results()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["roundResults"].as_array().unwrap().len(), 2);
        assert_eq!(value["roundResults"][0]["horseId"], "1");
        assert_eq!(value["overallStandings"][0]["horseId"], "1");
        assert_eq!(value["overallStandings"][0]["totalPoints"], 10);
        assert!(chrono::DateTime::parse_from_rfc3339(value["exportedAt"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_write_json_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("results.json");
        let csv_path = dir.path().join("results.csv");

        write_json(&results(), &json_path).unwrap();
        write_csv(&results(), &csv_path).unwrap();

        let doc: ExportDocument =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(doc.round_results.len(), 2);

        let csv_content = std::fs::read_to_string(&csv_path).unwrap();
        let mut lines = csv_content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "roundNumber,horseId,position,completionTime,finalSpeed,points"
        );
        assert_eq!(lines.count(), 2);
    }
}
