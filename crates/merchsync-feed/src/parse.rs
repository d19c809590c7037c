//! Google Merchant RSS parsing: `<item>` elements into [`FlatItem`]s.
//!
//! The feed is RSS 2.0 with `g:`-namespaced children. Only direct children
//! of `<item>` become fields — nested structures (e.g. the children of
//! `g:shipping`) are skipped so an inner `g:price` cannot shadow the
//! item-level one. Repeated children accumulate in occurrence order.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::FeedError;
use crate::types::FlatItem;

/// Parses feed XML into one [`FlatItem`] per `<item>`.
///
/// # Errors
///
/// Returns [`FeedError::Xml`] on malformed XML and [`FeedError::EmptyFeed`]
/// when the document contains no `<item>` elements — a feed with nothing to
/// import is a run-fatal condition, not an empty success.
pub fn parse_feed(xml: &str) -> Result<Vec<FlatItem>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items: Vec<FlatItem> = Vec::new();
    let mut current: Option<FlatItem> = None;
    // Element nesting depth relative to <item>: 1 = direct child.
    let mut depth = 0usize;
    let mut field_name = String::new();
    let mut field_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if current.is_none() {
                    if name == "item" {
                        current = Some(FlatItem::new());
                        depth = 0;
                    }
                } else {
                    depth += 1;
                    if depth == 1 {
                        field_name = name;
                        field_text.clear();
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if current.is_some() {
                    if depth == 0 {
                        if name == "item" {
                            if let Some(finished) = current.take() {
                                items.push(finished);
                            }
                        }
                    } else {
                        if depth == 1 && !field_name.is_empty() {
                            if let Some(item) = current.as_mut() {
                                item.insert(std::mem::take(&mut field_name), field_text.clone());
                            }
                        }
                        depth -= 1;
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if current.is_some() && depth == 1 {
                    field_text.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::CData(e)) => {
                if current.is_some() && depth == 1 {
                    field_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FeedError::Xml(e)),
            _ => {}
        }
    }

    if items.is_empty() {
        return Err(FeedError::EmptyFeed);
    }
    Ok(items)
}
