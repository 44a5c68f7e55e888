// Plain-text numeric tables as input to the hex renderer

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Line {line}: invalid value {token:?}")]
    InvalidValue { line: usize, token: String },
}

pub type Result<T> = std::result::Result<T, TableError>;

lazy_static::lazy_static! {
    static ref SEPARATORS: regex::Regex = regex::Regex::new(r"[\s,;]+").unwrap();
}

/// Parse one value: decimal, or hex with a `0x` prefix
fn parse_value(token: &str) -> Option<u64> {
    match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}

/// Parse a table with one row per line and values separated by whitespace,
/// commas or semicolons. Blank lines and `#` comments are skipped.
pub fn parse_table(text: &str) -> Result<Vec<Vec<u64>>> {
    let mut rows = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let row = SEPARATORS
            .split(line)
            .filter(|t| !t.is_empty())
            .map(|token| {
                parse_value(token).ok_or_else(|| TableError::InvalidValue {
                    line: idx + 1,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<u64>>>()?;
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        let text = "1 2 3\n# comment\n\n0xFF, 10;11\n";
        assert_eq!(
            parse_table(text).unwrap(),
            vec![vec![1, 2, 3], vec![255, 10, 11]]
        );
    }

    #[test]
    fn test_ragged_rows_allowed() {
        assert_eq!(parse_table("1\n2 3").unwrap(), vec![vec![1], vec![2, 3]]);
    }

    #[test]
    fn test_invalid_value() {
        assert_eq!(
            parse_table("1 2\n3 x4").unwrap_err(),
            TableError::InvalidValue {
                line: 2,
                token: "x4".to_string()
            }
        );
        assert!(parse_table("-1").is_err());
    }
}
