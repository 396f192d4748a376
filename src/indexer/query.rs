//! KAT search URL construction
//!
//! KAT takes most of its search terms as `name:value` tokens in the path of
//! `usearch/`, e.g.
//! `http://kat.ph/usearch/%22james%20may%22%20season:1%20episode:1/?rss=1&field=size&order=desc`.
//! Only feed format and sorting stay in the query string.

use tracing::warn;
use url::form_urlencoded;

use super::SearchRequest;

/// Search endpoint, relative to the site root
pub const SEARCH_PATH: &str = "usearch/";

/// Encoded space between path tokens
const TOKEN_SEPARATOR: &str = "%20";

/// Feed format and ordering sent with every search
pub const BASE_PARAMS: &[(&str, &str)] = &[("rss", "1"), ("field", "size"), ("order", "desc")];

/// Build the search URL for a request
pub fn build_search_url(base_url: &str, request: &SearchRequest) -> String {
    build_search_url_with(base_url, request, &[])
}

/// Build the search URL, merging extra query parameters into [`BASE_PARAMS`].
///
/// Extra parameters replace a base parameter with the same key and are
/// otherwise appended in order. Show name, season and episode always go into
/// the path; an air date is dropped with a warning since KAT can't search by
/// date.
pub fn build_search_url_with(
    base_url: &str,
    request: &SearchRequest,
    extra_params: &[(&str, &str)],
) -> String {
    let mut url = format!("{}/{}", base_url.trim_end_matches('/'), SEARCH_PATH);

    let show_name = request.show_name();
    if !show_name.is_empty() {
        url.push_str(&urlencoding::encode(&format!("\"{}\"", show_name)));
        url.push_str(TOKEN_SEPARATOR);
    }

    if let Some(season) = request.season() {
        url.push_str(&format!("season:{}{}", season, TOKEN_SEPARATOR));
    }

    if let Some(episode) = request.episode() {
        url.push_str(&format!("episode:{}{}", episode, TOKEN_SEPARATOR));
    }

    if let Some(date) = request.air_date() {
        warn!(
            date = %date,
            "Sorry, air by date not supported by KAT. Removing: {}",
            date
        );
    }

    if let Some(trimmed_len) = url.strip_suffix(TOKEN_SEPARATOR).map(str::len) {
        url.truncate(trimmed_len);
    }

    url.push_str("/?");
    url.push_str(&encode_params(extra_params));
    url
}

fn encode_params(extra_params: &[(&str, &str)]) -> String {
    let mut params: Vec<(&str, &str)> = BASE_PARAMS.to_vec();

    for &(key, value) in extra_params {
        match params.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => params.push((key, value)),
        }
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}
