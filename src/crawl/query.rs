//! Search query encoding.
//!
//! The search endpoint expects percent-encoded hashtags combined with a
//! logical OR: `#a OR #b` is sent as `%23a%20OR%20%23b`.

use crate::error::AppError;

/// Percent-encoded `#`.
const HASH: &str = "%23";
/// Percent-encoded ` OR `.
const OR: &str = "%20OR%20";

/// Builds one OR-combined search query from a candidate's hashtags.
///
/// Hashtags are given without the leading `#`. Order is preserved.
///
/// # Errors
///
/// Returns [`AppError::EmptyQuery`] if `hashtags` is empty.
///
/// # Example
///
/// ```
/// use tagaffinity::crawl::build_query;
///
/// let query = build_query(&["Trump2016", "Trump"]).unwrap();
/// assert_eq!(query, "%23Trump2016%20OR%20%23Trump");
/// ```
pub fn build_query<S: AsRef<str>>(hashtags: &[S]) -> Result<String, AppError> {
    let (last, rest) = hashtags.split_last().ok_or(AppError::EmptyQuery)?;

    let mut query = String::new();
    for tag in rest {
        query.push_str(HASH);
        query.push_str(tag.as_ref());
        query.push_str(OR);
    }
    query.push_str(HASH);
    query.push_str(last.as_ref());
    Ok(query)
}

/// Splits an encoded query back into its hashtags.
///
/// Terms without the encoded `#` marker are kept verbatim.
pub fn parse_query(query: &str) -> Vec<String> {
    query
        .split(OR)
        .filter(|term| !term.is_empty())
        .map(|term| term.strip_prefix(HASH).unwrap_or(term).to_string())
        .collect()
}
