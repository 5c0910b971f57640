//! Delimited rating file parser.
//!
//! Accepts the MovieLens `ratings.csv` layout: `user,item,rating[,timestamp]`,
//! one rating per line. A non-numeric first row is treated as a header.
//! Blank lines and lines starting with `#` are ignored. A file may use tabs
//! or semicolons instead of commas; the delimiter is picked from the first
//! data line.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

use crate::data::{ItemId, Rating, RatingSample, UserId};
use crate::error::{CfError, Result};

const DELIMITERS: [u8; 3] = [b',', b'\t', b';'];

/// Parser for delimited rating files
#[derive(Debug)]
pub struct RatingsParser;

impl RatingsParser {
    /// Parse a rating file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CfError::Io`] if the file cannot be read, otherwise as
    /// [`RatingsParser::parse`].
    pub fn parse_file(path: &Path) -> Result<Vec<RatingSample>> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Parse rating file content. `path` is only used for error context.
    ///
    /// # Errors
    ///
    /// Returns [`CfError::ParseError`] for a row with fewer than three fields,
    /// a non-integer ID or a non-finite rating, and [`CfError::MissingData`]
    /// if the content holds no ratings at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use usercf::data::RatingsParser;
    ///
    /// let content = "userId,movieId,rating,timestamp\n1,31,2.5,1260759144\n1,1029,3.0,1260759179\n";
    /// let samples = RatingsParser::parse(content, Path::new("ratings.csv")).unwrap();
    ///
    /// assert_eq!(samples.len(), 2);
    /// assert_eq!(samples[1].item, 1029);
    /// ```
    pub fn parse(content: &str, path: &Path) -> Result<Vec<RatingSample>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .comment(Some(b'#'))
            .delimiter(sniff_delimiter(content))
            .from_reader(content.as_bytes());

        let mut samples = Vec::new();
        let mut seen_row = false;

        for result in reader.records() {
            let record = result.map_err(|e| CfError::ParseError {
                file: path.to_path_buf(),
                line: e.position().map(|p| p.line() as usize),
                cause: format!("failed to read row: {e}"),
            })?;
            if record.iter().all(str::is_empty) {
                continue;
            }

            let first_row = !seen_row;
            seen_row = true;
            if first_row && record.get(0).map_or(true, |f| f.parse::<UserId>().is_err()) {
                // header
                continue;
            }

            samples.push(parse_record(&record, path)?);
        }

        if samples.is_empty() {
            return Err(CfError::MissingData(format!(
                "no ratings found in {}",
                path.display()
            )));
        }

        Ok(samples)
    }
}

/// Most frequent delimiter on the first non-comment line, comma on a tie.
fn sniff_delimiter(content: &str) -> u8 {
    let first = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .unwrap_or_default();

    let count = |d: u8| first.bytes().filter(|&b| b == d).count();
    DELIMITERS
        .into_iter()
        .fold(b',', |best, d| if count(d) > count(best) { d } else { best })
}

fn parse_record(record: &StringRecord, path: &Path) -> Result<RatingSample> {
    let err = |cause: String| CfError::ParseError {
        file: path.to_path_buf(),
        line: record.position().map(|p| p.line() as usize),
        cause,
    };

    if record.len() < 3 {
        return Err(err(format!(
            "expected at least 3 fields (user, item, rating), found {}",
            record.len()
        )));
    }

    let user: UserId = record[0]
        .parse()
        .map_err(|_| err(format!("invalid user id: {}", &record[0])))?;
    let item: ItemId = record[1]
        .parse()
        .map_err(|_| err(format!("invalid item id: {}", &record[1])))?;
    let rating: Rating = record[2]
        .parse()
        .map_err(|_| err(format!("invalid rating: {}", &record[2])))?;
    if !rating.is_finite() {
        return Err(err(format!("rating is not finite: {}", &record[2])));
    }

    Ok(RatingSample { user, item, rating })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Vec<RatingSample>> {
        RatingsParser::parse(content, Path::new("test.csv"))
    }

    #[test]
    fn test_parse_without_header() {
        let samples = parse("0,1,5\n0,2,3\n1,1,4.5\n").expect("valid content");
        assert_eq!(
            samples,
            vec![
                RatingSample::new(0, 1, 5.0),
                RatingSample::new(0, 2, 3.0),
                RatingSample::new(1, 1, 4.5),
            ]
        );
    }

    #[test]
    fn test_parse_header_timestamp_and_comments() {
        let content = "\
# exported ratings
userId,movieId,rating,timestamp

7,31,2.5,1260759144
7,1029,3.0,1260759179
";
        let samples = parse(content).expect("valid content");
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], RatingSample::new(7, 31, 2.5));
    }

    #[test]
    fn test_parse_semicolon_delimited_with_spaces() {
        let samples = parse("user;item;rating\n 2 ; 5 ; 3.5 \n").expect("valid content");
        assert_eq!(samples, vec![RatingSample::new(2, 5, 3.5)]);
    }

    #[test]
    fn test_comment_lines_keep_line_numbers() {
        let err = parse("# ratings\n0,1,4\n0,x,4\n").unwrap_err();
        match err {
            CfError::ParseError { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("1,2,3\n"), b',');
        assert_eq!(sniff_delimiter("# a;b\n1\t2\t3\n"), b'\t');
        assert_eq!(sniff_delimiter("1;2;3,5\n"), b';');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_parse_tab_delimited() {
        let samples = parse("3\t4\t1.5\n").expect("valid content");
        assert_eq!(samples, vec![RatingSample::new(3, 4, 1.5)]);
    }

    #[test]
    fn test_header_only_after_first_row() {
        let err = parse("1,2,3\nuser,item,rating\n").unwrap_err();
        match err {
            CfError::ParseError { line, cause, .. } => {
                assert_eq!(line, Some(2));
                assert!(cause.contains("invalid user id"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_too_few_fields() {
        let err = parse("1,2\n").unwrap_err();
        assert!(err.to_string().contains("test.csv:1"));
        assert!(err.to_string().contains("at least 3 fields"));
    }

    #[test]
    fn test_bad_rating() {
        let err = parse("1,2,great\n").unwrap_err();
        assert!(err.to_string().contains("invalid rating: great"));
    }

    #[test]
    fn test_nan_rating_rejected() {
        let err = parse("1,2,NaN\n").unwrap_err();
        assert!(err.to_string().contains("not finite"));
    }

    #[test]
    fn test_negative_id_rejected() {
        let err = parse("1,2,3\n-1,2,3\n").unwrap_err();
        assert!(err.to_string().contains("invalid user id: -1"));
    }

    #[test]
    fn test_empty_content_is_missing_data() {
        let err = parse("userId,movieId,rating\n\n").unwrap_err();
        assert!(matches!(err, CfError::MissingData(_)));
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ratings.csv");
        std::fs::write(&path, "0,1,4\n").expect("write");

        let samples = RatingsParser::parse_file(&path).expect("load");
        assert_eq!(samples, vec![RatingSample::new(0, 1, 4.0)]);
    }

    #[test]
    fn test_parse_missing_file() {
        let err = RatingsParser::parse_file(Path::new("/nonexistent/ratings.csv")).unwrap_err();
        assert!(matches!(err, CfError::Io(_)));
    }
}
