//! Flat CSV instance tables

use super::{InstanceRecord, ParsedConfig};
use crate::config::ConfigError;
use crate::foundation::math::{Pose, Rotator, Vec3};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Write};

/// Column order used for reading and writing instance tables
pub const CSV_HEADER: [&str; 10] = [
    "asset_path", "x", "y", "z", "pitch", "yaw", "roll", "scale_x", "scale_y", "scale_z",
];

/// A coerced CSV cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Text that parsed as a float
    Float(f64),
    /// Text without a decimal point that parsed as an integer
    Int(i64),
    /// Anything else, kept verbatim
    Text(String),
}

impl CellValue {
    /// Coerce raw cell text: float if it has a `.`, else int, else text
    ///
    /// Exponent forms such as `1e-7` (as written by the exporter) are floats.
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        let number = if text.contains('.') {
            text.parse().ok().map(Self::Float)
        } else {
            text.parse()
                .ok()
                .map(Self::Int)
                .or_else(|| text.parse().ok().filter(|v: &f64| v.is_finite()).map(Self::Float))
        };
        number.unwrap_or_else(|| Self::Text(text.to_string()))
    }

    /// Numeric value, if the cell is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            Self::Text(_) => None,
        }
    }

    /// Whether the cell is empty text
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

struct Row<'a> {
    entry: String,
    cells: HashMap<&'a str, CellValue>,
}

impl Row<'_> {
    fn text(&self, column: &str) -> Option<String> {
        self.cells
            .get(column)
            .filter(|cell| !cell.is_blank())
            .map(ToString::to_string)
    }

    fn number(&self, column: &str, default: f64) -> Result<f64, ConfigError> {
        match self.cells.get(column) {
            None => Ok(default),
            Some(cell) if cell.is_blank() => Ok(default),
            Some(cell) => cell.as_f64().filter(|v| v.is_finite()).ok_or_else(|| ConfigError::InvalidField {
                entry: self.entry.clone(),
                field: column.to_string(),
                reason: format!("expected a number, got '{cell}'"),
            }),
        }
    }

    fn instance(&self) -> Result<InstanceRecord, ConfigError> {
        let asset_reference = self
            .text("asset_path")
            .or_else(|| self.text("asset_reference"))
            .ok_or_else(|| ConfigError::MissingRequiredField {
                entry: self.entry.clone(),
                field: "asset_path".to_string(),
            })?;

        let position = Vec3::new(self.number("x", 0.0)?, self.number("y", 0.0)?, self.number("z", 0.0)?);
        let rotation = Rotator {
            pitch: self.number("pitch", 0.0)?,
            yaw: self.number("yaw", 0.0)?,
            roll: self.number("roll", 0.0)?,
        };
        let scale = Vec3::new(
            self.number("scale_x", 1.0)?,
            self.number("scale_y", 1.0)?,
            self.number("scale_z", 1.0)?,
        );

        Ok(InstanceRecord {
            asset_reference,
            pose: Pose::from_position(position).with_rotation(rotation).with_scale(scale),
        })
    }
}

pub(super) fn parse<R: Read>(reader: R) -> Result<ParsedConfig, ConfigError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| ConfigError::Parse(e.to_string()))?
        .clone();

    let mut parsed = ParsedConfig::default();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| ConfigError::Parse(e.to_string()))?;
        let line = record.position().map_or(index as u64 + 2, csv::Position::line);

        let row = Row {
            entry: format!("row {line}"),
            cells: headers.iter().zip(record.iter()).map(|(h, v)| (h, CellValue::parse(v))).collect(),
        };

        match row.instance() {
            Ok(instance) => parsed.instances.push(instance),
            Err(error) => parsed.skip(error),
        }
    }

    Ok(parsed)
}

#[derive(Serialize)]
struct CsvRow<'a> {
    asset_path: &'a str,
    x: f64,
    y: f64,
    z: f64,
    pitch: f64,
    yaw: f64,
    roll: f64,
    scale_x: f64,
    scale_y: f64,
    scale_z: f64,
}

/// Write instances as a CSV table with [`CSV_HEADER`] columns
///
/// Returns the number of rows written.
pub fn write_instances<'a, W, I>(writer: W, instances: I) -> Result<usize, ConfigError>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, &'a Pose)>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut written = 0;

    for (asset_path, pose) in instances {
        csv_writer
            .serialize(CsvRow {
                asset_path,
                x: pose.position.x,
                y: pose.position.y,
                z: pose.position.z,
                pitch: pose.rotation.pitch,
                yaw: pose.rotation.yaw,
                roll: pose.rotation.roll,
                scale_x: pose.scale.x,
                scale_y: pose.scale.y,
                scale_z: pose.scale.z,
            })
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        written += 1;
    }

    if written == 0 {
        csv_writer
            .write_record(CSV_HEADER)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
    }

    csv_writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ConfigLoader;
    use approx::assert_relative_eq;

    #[test]
    fn test_cell_coercion() {
        assert_eq!(CellValue::parse("12.5"), CellValue::Float(12.5));
        assert_eq!(CellValue::parse(" 42 "), CellValue::Int(42));
        assert_eq!(CellValue::parse("-7"), CellValue::Int(-7));
        assert_eq!(CellValue::parse("1.2.3"), CellValue::Text("1.2.3".to_string()));
        assert_eq!(CellValue::parse("/Game/SM_Crate"), CellValue::Text("/Game/SM_Crate".to_string()));
        assert_eq!(CellValue::parse("1e5"), CellValue::Float(1e5));
        assert_eq!(CellValue::parse("nan"), CellValue::Text("nan".to_string()));
    }

    #[test]
    fn test_csv_rows_with_defaults() {
        let csv = "asset_path,x,y,z,yaw\n/Game/SM_Crate,100,200.5,0,90\n/Game/SM_Barrel,1,2,3,\n";
        let parsed = ConfigLoader::new().load_csv(csv.as_bytes()).unwrap();

        assert_eq!(parsed.instances.len(), 2);
        let crate_row = &parsed.instances[0];
        assert_eq!(crate_row.asset_reference, "/Game/SM_Crate");
        assert_eq!(crate_row.pose.position, Vec3::new(100.0, 200.5, 0.0));
        assert_eq!(crate_row.pose.rotation.yaw, 90.0);
        assert_eq!(crate_row.pose.scale, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(parsed.instances[1].pose.rotation.yaw, 0.0);
    }

    #[test]
    fn test_rows_without_asset_are_skipped() {
        let csv = "asset_path,x,y,z\n,1,2,3\n/Game/SM_Lamp,4,5,6\n";
        let parsed = ConfigLoader::new().load_csv(csv.as_bytes()).unwrap();

        assert_eq!(parsed.instances.len(), 1);
        assert!(matches!(
            &parsed.skipped[..],
            [ConfigError::MissingRequiredField { entry, .. }] if entry == "row 2"
        ));
    }

    #[test]
    fn test_text_in_numeric_column_is_skipped() {
        let csv = "asset_path,x\n/Game/SM_Lamp,left\n";
        let parsed = ConfigLoader::new().load_csv(csv.as_bytes()).unwrap();

        assert!(parsed.instances.is_empty());
        assert!(matches!(&parsed.skipped[0], ConfigError::InvalidField { field, .. } if field == "x"));
    }

    #[test]
    fn test_write_then_read() {
        let poses = [
            Pose::from_position(Vec3::new(1.25, -3.5, 10.0)).with_rotation(Rotator::new(5.0, 10.0, 270.5)),
            Pose::from_position(Vec3::new(0.0, 0.0, 0.0)).with_uniform_scale(1.75),
        ];
        let mut buffer = Vec::new();
        let written = write_instances(&mut buffer, [("/Game/A", &poses[0]), ("/Game/B", &poses[1])]).unwrap();
        let parsed = ConfigLoader::new().load_csv(buffer.as_slice()).unwrap();

        assert_eq!(written, 2);
        assert_eq!(parsed.instances.len(), 2);
        for (record, pose) in parsed.instances.iter().zip(&poses) {
            assert_relative_eq!(record.pose.position, pose.position);
            assert_relative_eq!(record.pose.rotation.pitch, pose.rotation.pitch);
            assert_relative_eq!(record.pose.rotation.yaw, pose.rotation.yaw);
            assert_relative_eq!(record.pose.rotation.roll, pose.rotation.roll);
            assert_relative_eq!(record.pose.scale, pose.scale);
        }
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let mut buffer = Vec::new();
        write_instances(&mut buffer, std::iter::empty::<(&str, &Pose)>()).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap().trim_end(), CSV_HEADER.join(","));
    }
}
