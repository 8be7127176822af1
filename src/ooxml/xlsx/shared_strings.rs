//! Shared strings table for Excel files.
//!
//! Excel uses a shared strings table to store each distinct string once; cells of
//! type `s` hold an index into it. Entries can be plain (`<si><t>..</t></si>`) or
//! rich text made of several runs (`<si><r><t>..</t></r>..</si>`). Runs are
//! concatenated in document order and their formatting is dropped. Phonetic
//! guides (`<rPh>`) are not part of the text.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::parsers::{push_cdata, push_entity, push_text};
use crate::ooxml::error::{OoxmlError, Result};

// Upper bound for the capacity hint taken from the `uniqueCount` attribute
const MAX_CAPACITY_HINT: usize = 65_536;

/// Accumulates the text of a string item (`<si>` or `<is>`) across its runs.
#[derive(Debug, Default)]
pub(crate) struct RunText {
    text: String,
    in_t: bool,
    phonetic_depth: u32,
}

impl RunText {
    /// Track an opening tag inside the string item.
    pub(crate) fn start(&mut self, local_name: &[u8]) {
        match local_name {
            b"t" if self.phonetic_depth == 0 => self.in_t = true,
            b"rPh" => self.phonetic_depth += 1,
            _ => {},
        }
    }

    /// Track a closing tag inside the string item.
    pub(crate) fn end(&mut self, local_name: &[u8]) {
        match local_name {
            b"t" => self.in_t = false,
            b"rPh" => self.phonetic_depth = self.phonetic_depth.saturating_sub(1),
            _ => {},
        }
    }

    /// Whether text events currently belong to the string.
    #[inline]
    pub(crate) fn collecting(&self) -> bool {
        self.in_t
    }

    /// Buffer receiving the string's text.
    #[inline]
    pub(crate) fn buffer(&mut self) -> &mut String {
        &mut self.text
    }

    /// Take the accumulated text and reset for the next item.
    pub(crate) fn take(&mut self) -> String {
        self.in_t = false;
        self.phonetic_depth = 0;
        std::mem::take(&mut self.text)
    }
}

/// Shared strings table, in index order.
#[derive(Debug, Default, Clone)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Create a new empty shared strings table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse shared strings from the content of the shared strings part.
    ///
    /// `part` names the part in error messages.
    pub fn parse(xml: &[u8], part: &str) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();

        let mut strings = Vec::new();
        let mut item: Option<RunText> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.local_name();
                    match name.as_ref() {
                        b"sst" => {
                            for attr in e.attributes() {
                                let attr = attr.map_err(|err| OoxmlError::xml(part, err))?;
                                if attr.key.as_ref() == b"uniqueCount"
                                    && let Ok(count) = atoi_simd::parse::<usize, false, false>(&attr.value)
                                {
                                    strings.reserve(count.min(MAX_CAPACITY_HINT));
                                }
                            }
                        },
                        b"si" => item = Some(RunText::default()),
                        other => {
                            if let Some(run) = item.as_mut() {
                                run.start(other);
                            }
                        },
                    }
                },
                Ok(Event::End(ref e)) => {
                    let name = e.local_name();
                    if name.as_ref() == b"si" {
                        if let Some(mut run) = item.take() {
                            strings.push(run.take());
                        }
                    } else if let Some(run) = item.as_mut() {
                        run.end(name.as_ref());
                    }
                },
                Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"si" {
                        strings.push(String::new());
                    }
                },
                Ok(Event::Text(ref t)) => {
                    if let Some(run) = item.as_mut().filter(|run| run.collecting()) {
                        push_text(run.buffer(), t, part)?;
                    }
                },
                Ok(Event::GeneralRef(ref r)) => {
                    if let Some(run) = item.as_mut().filter(|run| run.collecting()) {
                        push_entity(run.buffer(), r, part)?;
                    }
                },
                Ok(Event::CData(ref c)) => {
                    if let Some(run) = item.as_mut().filter(|run| run.collecting()) {
                        push_cdata(run.buffer(), c, part)?;
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::xml(part, e)),
                _ => {},
            }
            buf.clear();
        }

        Ok(Self { strings })
    }

    /// Get a string by its index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    /// Resolve a cell's shared string index.
    ///
    /// An index past the end of the table means the file is corrupt.
    pub fn resolve(&self, index: usize, cell: &str) -> Result<&str> {
        self.get(index).ok_or_else(|| OoxmlError::CorruptReference {
            cell: cell.to_string(),
            index,
            len: self.strings.len(),
        })
    }

    /// Get the number of strings in the table.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl From<Vec<String>> for SharedStrings {
    fn from(strings: Vec<String>) -> Self {
        Self { strings }
    }
}
