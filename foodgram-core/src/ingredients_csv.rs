//! Ingredient catalogue import from CSV.
//!
//! Expected layout is a header row naming `name` and `measurement_unit`
//! (column order is free, extra columns are ignored) followed by one
//! ingredient per record. Fields may be double-quoted; `""` inside quotes is a
//! literal quote, and a quoted field may run over several lines.

use crate::error::CsvError;
use crate::validation::{MAX_INGREDIENT_NAME, MAX_MEASUREMENT_UNIT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientRecord {
    pub name: String,
    pub measurement_unit: String,
}

pub fn parse_ingredients(content: &str) -> Result<Vec<IngredientRecord>, CsvError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut rows = split_records(content)?.into_iter();

    let (_, header) = rows.next().ok_or(CsvError::Empty)?;
    let column = |wanted: &'static str| {
        header
            .iter()
            .position(|h| h.trim() == wanted)
            .ok_or(CsvError::MissingColumn(wanted))
    };
    let name_col = column("name")?;
    let unit_col = column("measurement_unit")?;

    let mut records = Vec::new();
    for (line_no, fields) in rows {
        let field = |col: usize| {
            fields
                .get(col)
                .map(|f| f.trim().to_string())
                .ok_or_else(|| CsvError::Malformed {
                    line: line_no,
                    message: format!("expected at least {} fields, got {}", col + 1, fields.len()),
                })
        };

        let name = field(name_col)?;
        let measurement_unit = field(unit_col)?;
        if name.is_empty() {
            return Err(CsvError::Malformed {
                line: line_no,
                message: "empty ingredient name".to_string(),
            });
        }
        if name.chars().count() > MAX_INGREDIENT_NAME
            || measurement_unit.chars().count() > MAX_MEASUREMENT_UNIT
        {
            return Err(CsvError::Malformed {
                line: line_no,
                message: format!("value too long for {:?}", name),
            });
        }

        records.push(IngredientRecord {
            name,
            measurement_unit,
        });
    }

    Ok(records)
}

/// Split the file into records, each tagged with the line it starts on.
/// Blank lines are dropped.
fn split_records(content: &str) -> Result<Vec<(usize, Vec<String>)>, CsvError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            ('"', true) => in_quotes = false,
            ('"', false) if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            ('\r', _) if chars.peek() == Some(&'\n') => {}
            ('\n', true) => {
                line += 1;
                current.push('\n');
            }
            ('\n', false) => {
                fields.push(std::mem::take(&mut current));
                push_record(&mut records, start, std::mem::take(&mut fields));
                line += 1;
                start = line;
            }
            (',', false) => fields.push(std::mem::take(&mut current)),
            (c, _) => current.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::Malformed {
            line: start,
            message: "unterminated quoted field".to_string(),
        });
    }
    fields.push(current);
    push_record(&mut records, start, fields);
    Ok(records)
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, fields: Vec<String>) {
    let blank = fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        records.push((line, fields));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let records = parse_ingredients("name,measurement_unit\nflour,g\negg,pcs\n").unwrap();
        assert_eq!(
            records,
            vec![
                IngredientRecord {
                    name: "flour".to_string(),
                    measurement_unit: "g".to_string()
                },
                IngredientRecord {
                    name: "egg".to_string(),
                    measurement_unit: "pcs".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_quoted_and_reordered() {
        let csv = "\u{feff}measurement_unit,name\r\n\"g\",\"salt, sea\"\r\n\r\ntbsp,\"say \"\"cheese\"\"\"\r\n";
        let records = parse_ingredients(csv).unwrap();
        assert_eq!(records[0].name, "salt, sea");
        assert_eq!(records[0].measurement_unit, "g");
        assert_eq!(records[1].name, "say \"cheese\"");
    }

    #[test]
    fn test_missing_column() {
        assert_eq!(
            parse_ingredients("name,unit\nflour,g"),
            Err(CsvError::MissingColumn("measurement_unit"))
        );
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(parse_ingredients("\n\n"), Err(CsvError::Empty));
    }

    #[test]
    fn test_short_row_reports_line() {
        let err = parse_ingredients("name,measurement_unit\nflour,g\nsugar\n").unwrap_err();
        assert!(matches!(err, CsvError::Malformed { line: 3, .. }));
    }

    #[test]
    fn test_quoted_field_spans_lines() {
        let csv = "name,measurement_unit\n\"salt\nsea\",g\r\npepper,g\nsugar\n";
        let err = parse_ingredients(csv).unwrap_err();
        // sugar is short a column and starts on line 5
        assert!(matches!(err, CsvError::Malformed { line: 5, .. }));

        let records = parse_ingredients("name,measurement_unit\n\"salt\nsea\",g\npepper,g\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "salt\nsea");
        assert_eq!(records[0].measurement_unit, "g");
        assert_eq!(records[1].name, "pepper");
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_ingredients("name,measurement_unit\n\"flour,g\n").unwrap_err();
        assert!(matches!(err, CsvError::Malformed { line: 2, .. }));
    }
}
