//! Function summary header parsing
//!
//! A summary header looks like
//! `pkg.Func STEXT size=120 args=0x10 locals=0x8 funcid=0x0 align=0x0`.
//! Only the leading name and the `size=` field are read; anything else on
//! the line is ignored so that new fields do not break parsing.

use thiserror::Error;

/// Name and size extracted from a summary header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    /// Symbol name (text up to the first space)
    pub name: &'a str,
    /// Value of the `size=` field
    pub size: u64,
}

/// Why a header carrying the keyword could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// No `size=` field on the line
    #[error("missing size= field")]
    MissingSize,
    /// The `size=` value is not a non-negative integer
    #[error("invalid size value '{0}'")]
    InvalidSize(String),
}

/// True if `line` contains `keyword` as a space-delimited word after the name
pub fn has_keyword(line: &str, keyword: &str) -> bool {
    line.split(' ').skip(1).any(|field| field == keyword)
}

/// Extract the function name and text size from a summary header
///
/// # Examples
///
/// ```
/// use compilecmp::scanner::header::parse_header;
///
/// let header = parse_header("bytes.Equal STEXT nosplit size=42 args=0x30").unwrap();
/// assert_eq!(header.name, "bytes.Equal");
/// assert_eq!(header.size, 42);
/// ```
pub fn parse_header(line: &str) -> Result<Header<'_>, HeaderError> {
    let name = line.split(' ').next().unwrap_or(line);

    let raw = line
        .split(' ')
        .skip(1)
        .find_map(|field| field.strip_prefix("size="))
        .ok_or(HeaderError::MissingSize)?;

    let size = raw
        .parse::<u64>()
        .map_err(|_| HeaderError::InvalidSize(raw.to_string()))?;

    Ok(Header { name, size })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_reads_name_and_size() {
        let header =
            parse_header("runtime.mallocgc STEXT size=2950 args=0x20 locals=0xb8 funcid=0x0")
                .unwrap();
        assert_eq!(header.name, "runtime.mallocgc");
        assert_eq!(header.size, 2950);
    }

    #[test]
    fn test_parse_header_tolerates_unknown_fields() {
        let header = parse_header("p.f STEXT dupok abi=internal size=7 newfield=yes").unwrap();
        assert_eq!(header.size, 7);
    }

    #[test]
    fn test_parse_header_size_at_end_of_line() {
        let header = parse_header("p.g STEXT size=15").unwrap();
        assert_eq!(header.name, "p.g");
        assert_eq!(header.size, 15);
    }

    #[test]
    fn test_parse_header_missing_size_is_error() {
        assert_eq!(
            parse_header("p.f STEXT args=0x0"),
            Err(HeaderError::MissingSize)
        );
    }

    #[test]
    fn test_parse_header_invalid_size_is_error() {
        assert_eq!(
            parse_header("p.f STEXT size=0x1f args=0x0"),
            Err(HeaderError::InvalidSize("0x1f".to_string()))
        );
        assert_eq!(
            parse_header("p.f STEXT size=-3"),
            Err(HeaderError::InvalidSize("-3".to_string()))
        );
    }

    #[test]
    fn test_has_keyword_matches_whole_field_only() {
        assert!(has_keyword("p.f STEXT size=1", "STEXT"));
        assert!(!has_keyword("p.f SRODATA size=1", "STEXT"));
        assert!(!has_keyword("p.STEXTish SRODATA size=1", "STEXT"));
        assert!(!has_keyword("STEXT", "STEXT"));
    }

    #[test]
    fn test_header_error_display() {
        assert_eq!(HeaderError::MissingSize.to_string(), "missing size= field");
        assert_eq!(
            HeaderError::InvalidSize("x".to_string()).to_string(),
            "invalid size value 'x'"
        );
    }
}
