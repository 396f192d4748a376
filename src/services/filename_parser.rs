//! Filename parser for torrent files served by indexers
//!
//! Parses names like:
//! - "James.Mays.Things.You.Need.To.Know.S02E06.[kat.ph].torrent"
//! - "Some.Show.S01E01.HDTV.XviD-GRP.6666685.TPB.torrent"

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static TORRENT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*?)\.?(\[.*\]|\d+\.TPB)\.torrent$").unwrap());

/// Extract the release name from a downloaded torrent filename.
///
/// Strips the trailing site tag (`[kat.ph]`) or numeric `.TPB` suffix along
/// with the `.torrent` extension. Returns `None` when the filename doesn't
/// follow either convention.
pub fn extract_name_from_filename(filename: &str) -> Option<String> {
    debug!(
        pattern = TORRENT_NAME_RE.as_str(),
        filename, "Comparing torrent filename"
    );

    TORRENT_NAME_RE
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
