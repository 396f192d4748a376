//! RSS feed parsing for KAT search and cache responses
//!
//! A response is parsed into a small typed tree first ([FeedDocument]), then
//! each [ItemNode] is turned into a [FeedItem] by [extract_title_and_url].
//! Items missing a title or a download link are logged and dropped.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;
use tracing::{debug, error};

use super::FeedItem;

const INCOMPLETE_ITEM_MESSAGE: &str =
    "The XML returned from the KAT RSS feed is incomplete, this result is unusable";

/// Feed parsing failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The document as a whole could not be parsed
    #[error("malformed feed: {0}")]
    Malformed(String),

    /// An item lacks a title or a download link
    #[error("{}", INCOMPLETE_ITEM_MESSAGE)]
    IncompleteItem,
}

/// One `<item>` element of a feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemNode {
    title: Option<String>,
    enclosure_url: Option<String>,
}

impl ItemNode {
    /// Text of the item's first `<title>` element
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// `url` attribute of the item's first `<enclosure>` element, unescaped
    pub fn enclosure_url(&self) -> Option<&str> {
        self.enclosure_url.as_deref()
    }
}

/// Parsed feed document: its items in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDocument {
    items: Vec<ItemNode>,
}

impl FeedDocument {
    pub fn items(&self) -> &[ItemNode] {
        &self.items
    }

    /// Parse a raw (already content-decoded) response body
    pub fn parse(data: &[u8]) -> Result<Self, FeedError> {
        let xml = std::str::from_utf8(data)
            .map_err(|e| FeedError::Malformed(format!("invalid UTF-8: {}", e)))?;

        let mut reader = Reader::from_str(xml);

        let mut items: Vec<ItemNode> = Vec::new();
        // Indices into `items` of the <item> elements currently open
        let mut open_items: Vec<(usize, usize)> = Vec::new();
        // Open <title> being captured: (item index, element depth, text so far)
        let mut title_capture: Option<(usize, usize, String)> = None;
        let mut depth = 0usize;
        let mut seen_root = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    seen_root = true;

                    match e.local_name().as_ref() {
                        b"item" => {
                            items.push(ItemNode::default());
                            open_items.push((items.len() - 1, depth));
                        }
                        b"title" if title_capture.is_none() => {
                            if let Some(&(idx, _)) = open_items.last() {
                                if items[idx].title.is_none() {
                                    title_capture = Some((idx, depth, String::new()));
                                }
                            }
                        }
                        b"enclosure" => record_enclosure(e, &open_items, &mut items)?,
                        _ => {}
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    seen_root = true;

                    match e.local_name().as_ref() {
                        b"item" => items.push(ItemNode::default()),
                        b"title" => {
                            if let Some(&(idx, _)) = open_items.last() {
                                items[idx].title.get_or_insert_with(String::new);
                            }
                        }
                        b"enclosure" => record_enclosure(e, &open_items, &mut items)?,
                        _ => {}
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if let Some((_, _, ref mut text)) = title_capture {
                        let unescaped = e
                            .unescape()
                            .map_err(|e| FeedError::Malformed(e.to_string()))?;
                        text.push_str(&unescaped);
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some((_, _, ref mut text)) = title_capture {
                        text.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::End(_)) => {
                    if depth == 0 {
                        return Err(FeedError::Malformed("unexpected closing tag".to_string()));
                    }

                    if let Some((idx, title_depth, _)) = title_capture {
                        if title_depth == depth {
                            if let Some((_, _, text)) = title_capture.take() {
                                items[idx].title = Some(text.trim().to_string());
                            }
                        }
                    }
                    if open_items.last().is_some_and(|&(_, d)| d == depth) {
                        open_items.pop();
                    }

                    depth -= 1;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(FeedError::Malformed(format!(
                        "XML error at position {}: {}",
                        reader.error_position(),
                        e
                    )));
                }
                _ => {}
            }
        }

        if !seen_root {
            return Err(FeedError::Malformed("document has no root element".to_string()));
        }
        if depth != 0 {
            return Err(FeedError::Malformed(format!(
                "document ended with {} unclosed element(s)",
                depth
            )));
        }

        Ok(Self { items })
    }
}

fn record_enclosure(
    e: &BytesStart<'_>,
    open_items: &[(usize, usize)],
    items: &mut [ItemNode],
) -> Result<(), FeedError> {
    let Some(&(idx, _)) = open_items.last() else {
        return Ok(());
    };
    if items[idx].enclosure_url.is_some() {
        return Ok(());
    }

    let mut url = String::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| FeedError::Malformed(e.to_string()))?;
        if attr.key.as_ref() == b"url" {
            url = attr
                .unescape_value()
                .map_err(|e| FeedError::Malformed(e.to_string()))?
                .into_owned();
            break;
        }
    }

    items[idx].enclosure_url = Some(url);
    Ok(())
}

/// Title and download link of an item.
///
/// Any `&amp;` left in the link after attribute unescaping is replaced with
/// `&`. Fails unless both values are present and non-empty.
pub fn extract_title_and_url(item: &ItemNode) -> Result<(String, String), FeedError> {
    let title = item.title().filter(|t| !t.is_empty());
    let url = item.enclosure_url().filter(|u| !u.is_empty());

    match (title, url) {
        (Some(title), Some(url)) => Ok((title.to_string(), url.replace("&amp;", "&"))),
        _ => Err(FeedError::IncompleteItem),
    }
}

/// Turn a parsed document into feed items, skipping incomplete ones
pub fn extract_items(document: &FeedDocument, raw: &[u8]) -> Vec<FeedItem> {
    document
        .items()
        .iter()
        .filter_map(|node| match extract_title_and_url(node) {
            Ok((title, url)) => Some(FeedItem::new(title, url)),
            Err(e) => {
                error!("{}", e);
                debug!(payload = %String::from_utf8_lossy(raw), "Raw feed document");
                None
            }
        })
        .collect()
}

/// Parse a raw feed body into items.
///
/// A malformed document is logged and yields no items.
pub fn parse_feed(data: &[u8]) -> Vec<FeedItem> {
    match FeedDocument::parse(data) {
        Ok(document) => extract_items(&document, data),
        Err(e) => {
            error!(error = %e, "Error trying to load KAT RSS feed");
            debug!(payload = %String::from_utf8_lossy(data), "Raw feed document");
            Vec::new()
        }
    }
}
