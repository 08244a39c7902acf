//! Record cells

use crate::graph::{
    EdgeBinding, Node, NodeId, Path, PathBinding, Relationship, RelpId, VertexBinding,
};
use crate::types::{EdgeUid, VertexId};
use crate::{Error, Result};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Text rendered for null cells
pub const NULL_TEXT: &str = "__null__";

/// Entry discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Slot never written
    Unknown,
    /// Scalar, list or map value
    Constant,
    /// Live pattern-node binding
    Node,
    /// Live fixed-length relationship binding
    Relationship,
    /// Live variable-length relationship binding
    VarLenRelp,
    /// Column header
    Header,
    /// Frozen node
    NodeSnapshot,
    /// Frozen relationship
    RelpSnapshot,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "UNKNOWN",
            Self::Constant => "CONSTANT",
            Self::Node => "NODE",
            Self::Relationship => "RELATIONSHIP",
            Self::VarLenRelp => "VAR_LEN_RELP",
            Self::Header => "HEADER",
            Self::NodeSnapshot => "NODE_SNAPSHOT",
            Self::RelpSnapshot => "RELP_SNAPSHOT",
        };
        f.write_str(name)
    }
}

/// Non-owning view of a pattern node's binding
#[derive(Debug, Clone)]
pub struct NodeRef {
    /// Pattern node
    pub node: NodeId,
    binding: VertexBinding,
}

impl NodeRef {
    /// Reference the binding of `node`
    pub fn new(node: &Node) -> Self {
        Self {
            node: node.id(),
            binding: node.binding().clone(),
        }
    }

    /// Currently bound vertex, negative when unbound
    pub fn vid(&self) -> VertexId {
        self.binding.get()
    }
}

/// Non-owning view of a fixed-length relationship's binding
#[derive(Debug, Clone)]
pub struct RelpRef {
    /// Pattern relationship
    pub relationship: RelpId,
    binding: EdgeBinding,
}

impl RelpRef {
    /// Reference the binding of `relationship`
    pub fn new(relationship: &Relationship) -> Self {
        Self {
            relationship: relationship.id(),
            binding: relationship.binding().clone(),
        }
    }

    /// Currently bound edge
    pub fn uid(&self) -> Option<EdgeUid> {
        self.binding.get()
    }
}

/// Non-owning view of a variable-length relationship's path
#[derive(Debug, Clone)]
pub struct PathRef {
    /// Pattern relationship
    pub relationship: RelpId,
    binding: PathBinding,
}

impl PathRef {
    /// Reference the path of `relationship`
    pub fn new(relationship: &Relationship) -> Self {
        Self {
            relationship: relationship.id(),
            binding: relationship.path().clone(),
        }
    }

    /// Copy of the currently bound path
    pub fn path(&self) -> Path {
        self.binding.snapshot()
    }

    fn is_empty(&self) -> bool {
        self.binding.borrow().is_empty()
    }
}

/// One cell of a [`Record`](super::Record)
#[derive(Debug, Clone, Default)]
pub enum Entry {
    /// Slot never written
    #[default]
    Unknown,
    /// Scalar, list or map value
    Constant(Value),
    /// Live pattern-node binding
    Node(NodeRef),
    /// Live fixed-length relationship binding
    Relationship(RelpRef),
    /// Live variable-length relationship binding
    VarLenRelp(PathRef),
    /// Column header
    Header(String),
    /// Frozen `V[vid]`
    NodeSnapshot(String),
    /// Frozen `E[src,dst,lid,eid]`
    RelpSnapshot(String),
}

impl Entry {
    /// Entry referencing a pattern node
    pub fn node(node: &Node) -> Self {
        Self::Node(NodeRef::new(node))
    }

    /// Entry referencing a pattern relationship. Variable-length
    /// relationships produce a [`Entry::VarLenRelp`].
    pub fn relationship(relationship: &Relationship) -> Self {
        if relationship.var_len() {
            Self::VarLenRelp(PathRef::new(relationship))
        } else {
            Self::Relationship(RelpRef::new(relationship))
        }
    }

    /// Discriminant
    pub fn entry_type(&self) -> EntryType {
        match self {
            Self::Unknown => EntryType::Unknown,
            Self::Constant(_) => EntryType::Constant,
            Self::Node(_) => EntryType::Node,
            Self::Relationship(_) => EntryType::Relationship,
            Self::VarLenRelp(_) => EntryType::VarLenRelp,
            Self::Header(_) => EntryType::Header,
            Self::NodeSnapshot(_) => EntryType::NodeSnapshot,
            Self::RelpSnapshot(_) => EntryType::RelpSnapshot,
        }
    }

    /// True only for a null constant
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Constant(Value::Null))
    }

    /// True if the entry compares equal to null: a null constant or an
    /// unbound node / relationship / path.
    pub fn equal_null(&self) -> bool {
        match self {
            Self::Constant(v) => v.is_null(),
            Self::Node(n) => n.vid() < 0,
            Self::Relationship(r) => r.uid().is_none(),
            Self::VarLenRelp(p) => p.is_empty(),
            _ => false,
        }
    }

    /// Constant payload
    pub fn constant(&self) -> Option<&Value> {
        match self {
            Self::Constant(v) => Some(v),
            _ => None,
        }
    }

    /// Bound vertex of a node entry
    pub fn vid(&self) -> Option<VertexId> {
        match self {
            Self::Node(n) if n.vid() >= 0 => Some(n.vid()),
            _ => None,
        }
    }

    /// Bound edge of a relationship entry
    pub fn uid(&self) -> Option<EdgeUid> {
        match self {
            Self::Relationship(r) => r.uid(),
            _ => None,
        }
    }

    /// Freeze a live node or relationship into its string form so it
    /// outlives the binding. Paths cannot be frozen yet.
    pub fn snapshot(&mut self) -> Result<()> {
        let frozen = match &*self {
            Self::Node(_) => Self::NodeSnapshot(self.to_string()),
            Self::Relationship(_) => Self::RelpSnapshot(self.to_string()),
            Self::VarLenRelp(_) => {
                return Err(Error::not_supported("snapshot of variable-length relationship"));
            }
            _ => return Ok(()),
        };
        *self = frozen;
        Ok(())
    }

    /// JSON rendering used by result output
    pub fn to_json(&self) -> Value {
        match self {
            Self::Unknown => Value::Null,
            Self::Constant(v) => v.clone(),
            Self::Node(_) | Self::Relationship(_) => {
                if self.equal_null() {
                    Value::Null
                } else {
                    Value::String(self.to_string())
                }
            }
            Self::VarLenRelp(p) => Value::Array(
                p.path()
                    .edges()
                    .iter()
                    .map(|uid| Value::String(format!("E[{}]", uid)))
                    .collect(),
            ),
            Self::Header(s) | Self::NodeSnapshot(s) | Self::RelpSnapshot(s) => {
                Value::String(s.clone())
            }
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        if self.equal_null() && other.equal_null() {
            return true;
        }
        match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a.vid() == b.vid(),
            (Self::Relationship(a), Self::Relationship(b)) => {
                a.uid().is_some() && a.uid() == b.uid()
            }
            (Self::VarLenRelp(a), Self::VarLenRelp(b)) => a.path() == b.path(),
            (Self::Header(a), Self::Header(b))
            | (Self::NodeSnapshot(a), Self::NodeSnapshot(b))
            | (Self::RelpSnapshot(a), Self::RelpSnapshot(b)) => a == b,
            _ => false,
        }
    }
}

/// Ordering is defined between constants only
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => compare_values(a, b),
            _ => None,
        }
    }
}

pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(i), Some(j)) => Some(i.cmp(&j)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(Value::Null) => f.write_str(NULL_TEXT),
            Self::Constant(Value::String(s)) => f.write_str(s),
            Self::Constant(v) => write!(f, "{}", v),
            Self::Node(n) => {
                if n.vid() < 0 {
                    f.write_str(NULL_TEXT)
                } else {
                    write!(f, "V[{}]", n.vid())
                }
            }
            Self::Relationship(r) => match r.uid() {
                Some(uid) => write!(f, "E[{}]", uid),
                None => f.write_str(NULL_TEXT),
            },
            Self::VarLenRelp(p) => write!(f, "{}", p.path()),
            Self::NodeSnapshot(s) | Self::RelpSnapshot(s) => f.write_str(s),
            Self::Unknown | Self::Header(_) => f.write_str(NULL_TEXT),
        }
    }
}
