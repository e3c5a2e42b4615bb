//! Typed model-input record: one blood panel, reduced to the model's features.

use serde::{Deserialize, Serialize};
use crate::error::{HemoscanError, Result};
use crate::schema::{EXPECTED_COLUMNS, FEATURE_COUNT};
use crate::table::{CellValue, Table};

/// One row of model input. Field order is the positional feature order.
/// Missing measurements are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPanel {
    pub sex: f64,        // Пол
    pub wbc: f64,        // leukocytes
    pub ne_abs: f64,     // NE#
    pub ly_abs: f64,     // LY#
    pub mo_abs: f64,     // MO#
    pub eo_abs: f64,     // EO#
    pub ba_abs: f64,     // BA#
    pub rbc: f64,
    pub hgb: f64,
    pub hct: f64,
    pub mcv: f64,
    pub mch: f64,
    pub mchc: f64,
    pub rdw: f64,
    pub plt: f64,
    pub mpv: f64,
    pub pct: f64,
    pub ne_pct: f64,     // NE%
    pub ly_pct: f64,     // LY%
    pub mo_pct: f64,     // MO%
    pub eo_pct: f64,     // EO%
    pub ba_pct: f64,     // BA%
}

impl BloodPanel {
    pub fn from_features(f: [f64; FEATURE_COUNT]) -> Self {
        Self {
            sex: f[0], wbc: f[1], ne_abs: f[2], ly_abs: f[3], mo_abs: f[4],
            eo_abs: f[5], ba_abs: f[6], rbc: f[7], hgb: f[8], hct: f[9],
            mcv: f[10], mch: f[11], mchc: f[12], rdw: f[13], plt: f[14],
            mpv: f[15], pct: f[16], ne_pct: f[17], ly_pct: f[18],
            mo_pct: f[19], eo_pct: f[20], ba_pct: f[21],
        }
    }

    pub fn to_features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.sex, self.wbc, self.ne_abs, self.ly_abs, self.mo_abs,
            self.eo_abs, self.ba_abs, self.rbc, self.hgb, self.hct,
            self.mcv, self.mch, self.mchc, self.rdw, self.plt,
            self.mpv, self.pct, self.ne_pct, self.ly_pct,
            self.mo_pct, self.eo_pct, self.ba_pct,
        ]
    }

    /// Select the schema columns from every row of `table`, in schema order.
    ///
    /// Column order in the upload does not matter and extra columns are
    /// ignored. Row order is preserved. Fails on the first cell that is not
    /// numeric; the reported row is the row number in the uploaded file.
    pub fn project(table: &Table) -> Result<Vec<BloodPanel>> {
        let mut indices = [0usize; FEATURE_COUNT];
        for (slot, name) in indices.iter_mut().zip(EXPECTED_COLUMNS.iter()) {
            *slot = table
                .column_index(name)
                .ok_or_else(|| HemoscanError::ColumnNotFound(name.to_string()))?;
        }

        let empty = CellValue::Empty;
        table
            .rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let mut features = [0.0f64; FEATURE_COUNT];
                for (pos, &col) in indices.iter().enumerate() {
                    let cell = row.get(col).unwrap_or(&empty);
                    features[pos] = cell.as_f64().ok_or_else(|| HemoscanError::InvalidNumber {
                        column: EXPECTED_COLUMNS[pos].to_string(),
                        row: table.source_row(row_idx),
                        value: cell.to_string(),
                    })?;
                }
                Ok(BloodPanel::from_features(features))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::IDENTIFIER_COLUMN;

    fn shuffled_table() -> Table {
        // Reverse schema order, identifier and an unrelated column in between.
        let mut columns: Vec<String> = vec!["Комментарий".into(), IDENTIFIER_COLUMN.into()];
        columns.extend(EXPECTED_COLUMNS.iter().rev().map(|c| c.to_string()));
        let mut t = Table::new(columns);
        for r in 0..2 {
            let mut row: Vec<CellValue> = vec!["ignored".into(), CellValue::Int(r)];
            // Value encodes schema position so reordering is observable.
            row.extend((0..FEATURE_COUNT).rev().map(|p| CellValue::Float(p as f64 + r as f64 * 100.0)));
            t.push_row(row);
        }
        t
    }

    #[test]
    fn test_project_reorders_into_schema_order() {
        let panels = BloodPanel::project(&shuffled_table()).unwrap();
        assert_eq!(panels.len(), 2);
        let expected: Vec<f64> = (0..FEATURE_COUNT).map(|p| p as f64).collect();
        assert_eq!(panels[0].to_features().to_vec(), expected);
        assert_eq!(panels[1].sex, 100.0);
        assert_eq!(panels[1].ba_pct, 121.0);
    }

    #[test]
    fn test_project_rejects_non_numeric() {
        let mut t = shuffled_table();
        let idx = t.column_index("HGB").unwrap();
        t.rows[1][idx] = "high".into();
        let err = BloodPanel::project(&t).unwrap_err();
        match err {
            HemoscanError::InvalidNumber { column, row, value } => {
                assert_eq!(column, "HGB");
                assert_eq!(row, 3);
                assert_eq!(value, "high");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_project_reports_source_row() {
        let mut t = Table::new(EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect());
        t.push_row_at(4, vec![CellValue::Float(1.0); FEATURE_COUNT]);
        let mut row = vec![CellValue::Float(1.0); FEATURE_COUNT];
        row[14] = "1,234".into(); // PLT with a thousands separator
        t.push_row_at(9, row);
        match BloodPanel::project(&t).unwrap_err() {
            HemoscanError::InvalidNumber { column, row, value } => {
                assert_eq!(column, "PLT");
                assert_eq!(row, 9);
                assert_eq!(value, "1,234");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_project_missing_column() {
        let t = Table::new(vec!["Пол".into()]);
        assert!(matches!(
            BloodPanel::project(&t),
            Err(HemoscanError::ColumnNotFound(c)) if c == "WBC"
        ));
    }

    #[test]
    fn test_features_round_trip_field_order() {
        let mut f = [0.0; FEATURE_COUNT];
        f[8] = 135.0;
        let panel = BloodPanel::from_features(f);
        assert_eq!(panel.hgb, 135.0);
        assert_eq!(panel.to_features(), f);
    }
}
