//! Fixed column schema of an uploaded blood panel.
//!
//! Header names are matched byte-for-byte against the uploaded spreadsheet,
//! so nothing here may be normalised or translated.

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 22;

/// Model feature columns, in the positional order the classifier was trained on.
pub const EXPECTED_COLUMNS: [&str; FEATURE_COUNT] = [
    "Пол", "WBC", "NE#", "LY#", "MO#", "EO#", "BA#",
    "RBC", "HGB", "HCT", "MCV", "MCH", "MCHC", "RDW",
    "PLT", "MPV", "PCT", "NE%", "LY%", "MO%", "EO%", "BA%",
];

/// Per-row case identifier, carried through to the results untouched.
pub const IDENTIFIER_COLUMN: &str = "ID истории болезни";

/// Column labels the classifier sees: `"0"`, `"1"`, … `"21"`.
pub fn positional_labels() -> Vec<String> {
    (0..FEATURE_COUNT).map(|i| i.to_string()).collect()
}

/// Expected columns absent from `columns`, in schema order.
pub fn missing_columns<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    EXPECTED_COLUMNS
        .iter()
        .filter(|expected| !columns.iter().any(|c| c.as_ref() == **expected))
        .map(|expected| expected.to_string())
        .collect()
}

/// Render names the way the upload error has always listed them: `['WBC', 'HGB']`.
pub fn format_column_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    format!("[{}]", quoted.join(", "))
}
