// Player valuation import.
//
// Reads a CSV with one row per player: Sleeper identifier, name, position and
// weekly trade value. Rows that cannot be used are skipped with a warning; a
// failed read is an error.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::warn;
use winwin_core::position::Position;
use winwin_core::valuation::PlayerValue;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ValuesError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

/// Extra columns (ranks, tiers, age) are ignored by the header-keyed reader.
#[derive(Debug, Deserialize)]
struct RawValueRow {
    #[serde(alias = "id")]
    sleeper_id: String,
    #[serde(alias = "name")]
    player: String,
    position: String,
    value: f64,
    #[serde(default)]
    team: Option<String>,
}

// ---------------------------------------------------------------------------
// Row checks shared with the remote sources
// ---------------------------------------------------------------------------

/// Build a `PlayerValue` from loosely-typed source fields, or explain why the
/// record is unusable.
pub(crate) fn checked_value(
    id: &str,
    name: &str,
    position: &str,
    value: f64,
    nfl_team: Option<&str>,
) -> Result<PlayerValue, String> {
    let id = id.trim();
    let name = name.trim();
    if id.is_empty() {
        return Err(format!("'{name}' has no player id"));
    }
    if name.is_empty() {
        return Err(format!("player {id} has no name"));
    }
    let Some(pos) = Position::from_str_pos(position) else {
        return Err(format!("'{name}' has unsupported position '{}'", position.trim()));
    };
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("'{name}' has unusable value {value}"));
    }

    let mut player = PlayerValue::new(id, name, pos, value);
    player.nfl_team = nfl_team
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    Ok(player)
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

fn load_values_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerValue>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut values = Vec::new();
    for result in reader.deserialize::<RawValueRow>() {
        match result {
            Ok(raw) => match checked_value(
                &raw.sleeper_id,
                &raw.player,
                &raw.position,
                raw.value,
                raw.team.as_deref(),
            ) {
                Ok(player) => values.push(player),
                Err(reason) => warn!("skipping value row: {}", reason),
            },
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => {
                warn!("skipping malformed value row: {}", e);
            }
        }
    }
    Ok(values)
}

/// Load player values from a CSV file. An input with no usable rows is an
/// error.
pub fn load_values(path: &Path) -> Result<Vec<PlayerValue>, ValuesError> {
    let file = std::fs::File::open(path).map_err(|e| ValuesError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let values = load_values_from_reader(file).map_err(|e| ValuesError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;

    if values.is_empty() {
        return Err(ValuesError::Validation(format!(
            "{} produced zero valid rows",
            path.display()
        )));
    }
    Ok(values)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Well-formed input --

    #[test]
    fn reads_rows_in_file_order() {
        let csv_data = "\
sleeper_id,player,position,value,team
4046,Patrick Mahomes,QB,6200,KC
9509,Bijan Robinson,RB,8800,ATL";

        let values = load_values_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].id, "4046");
        assert_eq!(values[0].position, Position::Quarterback);
        assert_eq!(values[0].nfl_team.as_deref(), Some("KC"));
        assert_eq!(values[1].name, "Bijan Robinson");
        assert_eq!(values[1].value, 8800.0);
    }

    #[test]
    fn short_column_aliases_accepted() {
        let csv_data = "\
id,name,position,value
6794,Justin Jefferson,wr,9100";

        let values = load_values_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].position, Position::WideReceiver);
        assert_eq!(values[0].nfl_team, None);
    }

    #[test]
    fn extra_columns_ignored() {
        let csv_data = "\
sleeper_id,player,position,value,overall_rank,tier
4881,Lamar Jackson,QB,7000,12,2";

        let values = load_values_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].name, "Lamar Jackson");
    }

    #[test]
    fn fields_are_trimmed() {
        let csv_data = "\
sleeper_id,player,position,value
 4034 ,  Christian McCaffrey , RB ,8000";

        let values = load_values_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(values[0].id, "4034");
        assert_eq!(values[0].name, "Christian McCaffrey");
    }

    // -- Skipped rows --

    #[test]
    fn unsupported_positions_skipped() {
        let csv_data = "\
sleeper_id,player,position,value
1,Kicker Guy,K,300
2,Defense,DEF,400
3,Tight End,TE,2500";

        let values = load_values_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].position, Position::TightEnd);
    }

    #[test]
    fn non_positive_and_non_finite_values_skipped() {
        let csv_data = "\
sleeper_id,player,position,value
1,Zero,QB,0
2,Negative,RB,-5
3,Nan,WR,NaN
4,Inf,WR,inf
5,Good,WR,10";

        let values = load_values_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].name, "Good");
    }

    #[test]
    fn malformed_and_blank_rows_skipped() {
        let csv_data = "\
sleeper_id,player,position,value
1,Bad Value,QB,lots
,No Id,RB,100
2,,RB,100
3,Valid,RB,100";

        let values = load_values_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].id, "3");
    }

    // -- Read failures --

    /// Yields `data`, then fails every later read.
    struct BrokenReader {
        data: &'static [u8],
        done: bool,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.done {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            self.done = self.data.is_empty();
            Ok(n)
        }
    }

    #[test]
    fn read_failure_mid_file_is_an_error() {
        let reader = BrokenReader {
            data: b"sleeper_id,player,position,value\n1,Valid,RB,100\n2,Cut",
            done: false,
        };
        let err = load_values_from_reader(reader).unwrap_err();
        assert!(err.is_io_error());
    }

    // -- Path loader --

    #[test]
    fn missing_file_is_io_error() {
        let err = load_values(Path::new("/nonexistent/values.csv")).unwrap_err();
        assert!(matches!(err, ValuesError::Io { .. }));
    }

    #[test]
    fn header_only_file_is_validation_error() {
        let dir = std::env::temp_dir().join("winwin_values_header_only");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("values.csv");
        std::fs::write(&path, "sleeper_id,player,position,value\n").unwrap();

        let err = load_values(&path).unwrap_err();
        assert!(matches!(err, ValuesError::Validation(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
