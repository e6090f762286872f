use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rc_core::{EssayCandidate, Error, Result};

#[derive(Clone, Copy, PartialEq)]
enum Field {
    None,
    Title,
    Link,
}

fn feed_error(e: impl std::fmt::Display) -> Error {
    Error::Feed(format!("Malformed feed: {}", e))
}

/// `href` of an Atom `<link>` that points at the entry itself.
fn atom_href(e: &BytesStart) -> Result<Option<String>> {
    if let Some(rel) = e.try_get_attribute("rel").map_err(feed_error)? {
        let rel = rel.unescape_value().map_err(feed_error)?;
        if rel != "alternate" {
            return Ok(None);
        }
    }
    match e.try_get_attribute("href").map_err(feed_error)? {
        Some(href) => Ok(Some(href.unescape_value().map_err(feed_error)?.into_owned())),
        None => Ok(None),
    }
}

/// Parse an RSS 2.0 or Atom document into candidates, keeping feed order.
/// Entries without a link are skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<EssayCandidate>> {
    let mut reader = Reader::from_str(xml);
    let mut candidates = Vec::new();
    let mut in_item = false;
    let mut field = Field::None;
    let mut title = String::new();
    let mut link = String::new();
    let mut saw_root = false;

    loop {
        match reader.read_event().map_err(feed_error)? {
            Event::Start(e) => {
                saw_root = true;
                match e.name().as_ref() {
                    b"item" | b"entry" => {
                        in_item = true;
                        title.clear();
                        link.clear();
                    }
                    b"title" if in_item => field = Field::Title,
                    b"link" if in_item => {
                        // Atom links carry the URL in an attribute even when not self-closing
                        if let Some(href) = atom_href(&e)? {
                            if link.is_empty() {
                                link = href;
                            }
                        } else {
                            field = Field::Link;
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                saw_root = true;
                if in_item && e.name().as_ref() == b"link" && link.is_empty() {
                    if let Some(href) = atom_href(&e)? {
                        link = href;
                    }
                }
            }
            Event::Text(e) if field != Field::None => {
                let text = e.unescape().map_err(feed_error)?;
                match field {
                    Field::Title => title.push_str(&text),
                    Field::Link => link.push_str(&text),
                    Field::None => {}
                }
            }
            Event::CData(e) if field != Field::None => {
                let text = String::from_utf8_lossy(&e);
                match field {
                    Field::Title => title.push_str(&text),
                    Field::Link => link.push_str(&text),
                    Field::None => {}
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"item" | b"entry" => {
                    in_item = false;
                    field = Field::None;
                    let link = link.trim();
                    if !link.is_empty() {
                        candidates.push(EssayCandidate::new(link, title.trim()));
                    }
                }
                b"title" | b"link" => field = Field::None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(Error::Feed("Feed document is empty".to_string()));
    }
    Ok(candidates)
}
