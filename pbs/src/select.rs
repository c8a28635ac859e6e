// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Chunk selection expressions: `2:ncpus=4:mem=2gb+1:ncpus=1:host="n1"`.

Values may be quoted with `'` or `"` to protect `:` and `+`; the quotes
are kept as part of the value.

*/

use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt;

use scalar::{is_identifier, AttrType, CombineFailure, DecodeFailure};
use value::BatchOp;


/// One `+`-separated chunk: a count and the resources each unit needs.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SelectChunk {
    count: u32,
    resources: Vec<(String, String)>,
}

impl SelectChunk {
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The chunk's `(name, value)` resource requests, in the order given.
    pub fn resources(&self) -> &[(String, String)] {
        &self.resources
    }

    fn parse(raw: &str, text: &str) -> Result<SelectChunk, DecodeFailure> {
        let parts = split_unquoted(raw, text, ':')?;
        let mut rest = &parts[..];
        let mut count = 1;

        if let Some(first) = parts.first() {
            if !first.is_empty() && first.bytes().all(|b| b.is_ascii_digit()) {
                count = match first.parse::<u32>() {
                    Ok(n) if n > 0 => n,
                    _ => return Err(DecodeFailure::invalid(format!("bad chunk count \"{}\" in \"{}\"", first, raw))),
                };
                rest = &parts[1..];
            }
        }

        let mut resources: Vec<(String, String)> = Vec::new();
        resources.try_reserve_exact(rest.len())?;

        for item in rest {
            let (name, value) = match item.find('=') {
                Some(i) => (&item[..i], &item[i + 1..]),
                None => return Err(DecodeFailure::invalid(format!("expected name=value, got \"{}\" in \"{}\"", item, raw))),
            };

            if !is_identifier(name) || value.is_empty() {
                return Err(DecodeFailure::invalid(format!("bad resource request \"{}\" in \"{}\"", item, raw)));
            }

            if !is_quoted(value) && value.contains(&['=', '"', '\''][..]) {
                return Err(DecodeFailure::invalid(format!("bad resource value \"{}\" in \"{}\"", value, raw)));
            }

            if resources.iter().any(|&(ref n, _)| n == name) {
                return Err(DecodeFailure::invalid(format!("resource \"{}\" requested twice in one chunk of \"{}\"", name, raw)));
            }

            resources.push((name.to_owned(), value.to_owned()));
        }

        Ok(SelectChunk { count, resources })
    }
}

impl fmt::Display for SelectChunk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.resources.is_empty() {
            return write!(f, "{}", self.count);
        }

        if self.count != 1 {
            write!(f, "{}:", self.count)?;
        }

        write!(f, "{}", self.resources.iter().map(|&(ref n, ref v)| format!("{}={}", n, v)).format(":"))
    }
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2 &&
        ((value.starts_with('"') && value.ends_with('"')) ||
         (value.starts_with('\'') && value.ends_with('\'')))
}

/// Split `text` on `sep`, ignoring separators inside quotes.
fn split_unquoted<'a>(raw: &str, text: &'a str, sep: char) -> Result<Vec<&'a str>, DecodeFailure> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut quote = None;

    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {},
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == sep => {
                fields.push(&text[start..i]);
                start = i + c.len_utf8();
            },
            None => {},
        }
    }

    if quote.is_some() {
        return Err(DecodeFailure::invalid(format!("unterminated quote in \"{}\"", raw)));
    }

    fields.push(&text[start..]);
    Ok(fields)
}


/// A parsed selection expression.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct SelectSpec {
    chunks: Vec<SelectChunk>,
}

impl SelectSpec {
    pub fn chunks(&self) -> &[SelectChunk] {
        &self.chunks
    }

    /// The total number of units requested across all chunks.
    pub fn total_count(&self) -> u64 {
        self.chunks.iter().map(|c| c.count as u64).sum()
    }
}

impl AttrType for SelectSpec {
    fn decode_attr(_resource: Option<&str>, raw: &str) -> Result<SelectSpec, DecodeFailure> {
        let texts = split_unquoted(raw, raw, '+')?;
        let mut chunks = Vec::new();
        chunks.try_reserve_exact(texts.len())?;

        for text in texts {
            if text.is_empty() {
                return Err(DecodeFailure::invalid(format!("empty chunk in \"{}\"", raw)));
            }

            chunks.push(SelectChunk::parse(raw, text)?);
        }

        Ok(SelectSpec { chunks })
    }

    fn encode_attr(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.chunks.iter().format("+"))
    }

    /// Selections are replaced wholesale; they have no arithmetic.
    fn combine_attr(&mut self, source: &SelectSpec, op: BatchOp) -> Result<(), CombineFailure> {
        match op {
            BatchOp::Assign => {
                self.chunks = source.chunks.clone();
                Ok(())
            },
            _ => Err(CombineFailure::Unsupported),
        }
    }

    fn compare_attr(&self, other: &SelectSpec) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else {
            None
        }
    }
}

impl fmt::Display for SelectSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.encode_attr(f)
    }
}
