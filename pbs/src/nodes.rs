// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License.

/*! Node specifications.

A node list is a `+`-separated list of chunks such as `2:ppn=4+hostA:bigmem`.
Each chunk starts with either a count of anonymous nodes or a host name,
followed by `:`-separated properties.

*/

use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt;

use scalar::{containment, is_host_name, is_identifier, AttrType, CombineFailure, DecodeFailure};
use value::BatchOp;


/// What a chunk asks for: some number of nodes, or one named host.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum NodeHead {
    Count(u32),
    Host(String),
}

/// A node property, `name` or `name=value`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NodeProp {
    pub name: String,
    pub value: Option<String>,
}

/// One `+`-separated element of a node list.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NodeChunk {
    head: NodeHead,
    props: Vec<NodeProp>,
}

impl NodeChunk {
    pub fn head(&self) -> &NodeHead {
        &self.head
    }

    pub fn props(&self) -> &[NodeProp] {
        &self.props
    }

    fn parse(raw: &str, text: &str) -> Result<NodeChunk, DecodeFailure> {
        let mut parts = text.split(':');
        let first = parts.next().unwrap_or("");

        let head = if !first.is_empty() && first.bytes().all(|b| b.is_ascii_digit()) {
            match first.parse::<u32>() {
                Ok(n) if n > 0 => NodeHead::Count(n),
                _ => return Err(DecodeFailure::invalid(format!("bad node count \"{}\" in \"{}\"", first, raw))),
            }
        } else if is_host_name(first) {
            NodeHead::Host(first.to_owned())
        } else {
            return Err(DecodeFailure::invalid(format!("bad node specification \"{}\" in \"{}\"", text, raw)));
        };

        let mut props = Vec::new();

        for p in parts {
            let (name, value) = match p.find('=') {
                Some(i) => (&p[..i], Some(&p[i + 1..])),
                None => (p, None),
            };

            let value_ok = match value {
                Some(v) => !v.is_empty() && !v.contains('='),
                None => true,
            };

            if !is_identifier(name) || !value_ok {
                return Err(DecodeFailure::invalid(format!("bad node property \"{}\" in \"{}\"", p, raw)));
            }

            props.push(NodeProp { name: name.to_owned(), value: value.map(|v| v.to_owned()) });
        }

        Ok(NodeChunk { head, props })
    }
}

impl fmt::Display for NodeChunk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.head {
            NodeHead::Count(n) => write!(f, "{}", n)?,
            NodeHead::Host(ref h) => f.write_str(h)?,
        }

        for p in &self.props {
            match p.value {
                Some(ref v) => write!(f, ":{}={}", p.name, v)?,
                None => write!(f, ":{}", p.name)?,
            }
        }

        Ok(())
    }
}


/// A node list.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct NodeList {
    chunks: Vec<NodeChunk>,
}

impl NodeList {
    pub fn chunks(&self) -> &[NodeChunk] {
        &self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The total number of nodes requested, counting each host as one.
    pub fn node_count(&self) -> u64 {
        self.chunks.iter()
            .map(|c| match c.head {
                NodeHead::Count(n) => n as u64,
                NodeHead::Host(_) => 1,
            })
            .sum()
    }

    fn contains_all(&self, other: &NodeList) -> bool {
        other.chunks.iter().all(|c| self.chunks.contains(c))
    }
}

impl AttrType for NodeList {
    fn decode_attr(_resource: Option<&str>, raw: &str) -> Result<NodeList, DecodeFailure> {
        let mut chunks = Vec::new();
        chunks.try_reserve_exact(raw.split('+').count())?;

        for text in raw.split('+') {
            chunks.push(NodeChunk::parse(raw, text)?);
        }

        Ok(NodeList { chunks })
    }

    fn encode_attr(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.chunks.iter().format("+"))
    }

    /// Increment adds chunks that are not already present; decrement
    /// removes the chunks named in `source`.
    fn combine_attr(&mut self, source: &NodeList, op: BatchOp) -> Result<(), CombineFailure> {
        match op {
            BatchOp::Assign => self.chunks = source.chunks.clone(),

            BatchOp::Increment => {
                for c in &source.chunks {
                    if !self.chunks.contains(c) {
                        self.chunks.push(c.clone());
                    }
                }
            },

            BatchOp::Decrement => self.chunks.retain(|c| !source.chunks.contains(c)),

            _ => return Err(CombineFailure::Unsupported),
        }

        Ok(())
    }

    fn compare_attr(&self, other: &NodeList) -> Option<Ordering> {
        containment(other.contains_all(self), self.contains_all(other))
    }
}

impl fmt::Display for NodeList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.encode_attr(f)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(s: &str) -> NodeList {
        NodeList::decode_attr(None, s).unwrap()
    }

    #[test]
    fn parse_chunks() {
        let n = nodes("2:ppn=4+hostA:bigmem");
        assert_eq!(n.chunks().len(), 2);
        assert_eq!(n.chunks()[0].head(), &NodeHead::Count(2));
        assert_eq!(n.chunks()[0].props()[0], NodeProp { name: "ppn".to_owned(), value: Some("4".to_owned()) });
        assert_eq!(n.chunks()[1].head(), &NodeHead::Host("hostA".to_owned()));
        assert_eq!(n.chunks()[1].props()[0].value, None);
        assert_eq!(n.node_count(), 3);
    }

    #[test]
    fn reject_malformed() {
        for bad in &["+", "2+", "0:ppn=1", "2:ppn=", "2:=4", "2:ppn=4=5", "-host", "a::b"] {
            assert!(NodeList::decode_attr(None, bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn canonical_text_is_stable() {
        let text = "3:ppn=2:gpu+node7";
        assert_eq!(nodes(text).to_string(), text);
    }

    #[test]
    fn increment_and_decrement() {
        let mut n = nodes("hostA+hostB");
        n.combine_attr(&nodes("hostB+hostC"), BatchOp::Increment).unwrap();
        assert_eq!(n.to_string(), "hostA+hostB+hostC");
        n.combine_attr(&nodes("hostA"), BatchOp::Decrement).unwrap();
        assert_eq!(n.to_string(), "hostB+hostC");
    }

    #[test]
    fn compare_is_containment() {
        let ab = nodes("hostA+hostB");
        assert_eq!(nodes("hostA").compare_attr(&ab), Some(Ordering::Less));
        assert_eq!(ab.compare_attr(&nodes("hostB+hostA")), Some(Ordering::Equal));
        assert_eq!(ab.compare_attr(&nodes("hostA")), Some(Ordering::Greater));
        assert_eq!(ab.compare_attr(&nodes("hostC")), None);
    }
}
