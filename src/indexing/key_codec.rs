//! Permuted physical-index keys.
//!
//! Every triple is stored under three rotations of (s, p, o), each prefixed by
//! its context: `context^f1^f2^f3^`. The context part is empty for the
//! context-free (conjunctive) row. A key always ends with the separator so a
//! prefix `a^b^` never matches `a^bc^`.

use crate::core::{IdTriple, TermId, SEPARATOR};
use crate::error::{QuadStoreError, Result};

/// Canonical position order for each rotation: field `i` of a key holds
/// canonical position `ROTATION_ORDER[rotation][i]` (0 = s, 1 = p, 2 = o).
pub const ROTATION_ORDER: [[usize; 3]; 3] = [[0, 1, 2], [1, 2, 0], [2, 0, 1]];

/// One of the three physical orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rotation {
    Spo = 0,
    Pos = 1,
    Osp = 2,
}

impl Rotation {
    pub const ALL: [Rotation; 3] = [Rotation::Spo, Rotation::Pos, Rotation::Osp];

    pub const fn from_start(start: usize) -> Rotation {
        match start % 3 {
            0 => Rotation::Spo,
            1 => Rotation::Pos,
            _ => Rotation::Osp,
        }
    }

    pub const fn order(self) -> [usize; 3] {
        ROTATION_ORDER[self as usize]
    }

    /// Name of the table holding this rotation, e.g. `c^p^o^s^`.
    pub const fn table_name(self) -> &'static str {
        match self {
            Rotation::Spo => "c^s^p^o^",
            Rotation::Pos => "c^p^o^s^",
            Rotation::Osp => "c^o^s^p^",
        }
    }
}

/// Encode a quad under `rotation`. `None` context addresses the context-free row.
pub fn encode_key(rotation: Rotation, context: Option<TermId>, triple: &IdTriple) -> String {
    let fields = triple.positions();
    let mut key = String::with_capacity(32);
    if let Some(context) = context {
        key.push_str(&context.to_string());
    }
    key.push(SEPARATOR);
    for position in rotation.order() {
        key.push_str(&fields[position].to_string());
        key.push(SEPARATOR);
    }
    key
}

/// Decode a key written by [`encode_key`] under the same rotation.
pub fn decode_key(rotation: Rotation, key: &str) -> Result<(Option<TermId>, IdTriple)> {
    let parts: Vec<&str> = key.split(SEPARATOR).collect();
    if parts.len() != 5 || !parts[4].is_empty() {
        return Err(QuadStoreError::corrupted(
            rotation.table_name(),
            format!("malformed key '{}'", key),
        ));
    }

    let context = if parts[0].is_empty() { None } else { Some(parse_id(rotation, key, parts[0])?) };

    let mut fields = [TermId(0); 3];
    for (slot, position) in rotation.order().into_iter().enumerate() {
        fields[position] = parse_id(rotation, key, parts[slot + 1])?;
    }
    Ok((context, IdTriple::from_positions(fields)))
}

fn parse_id(rotation: Rotation, key: &str, part: &str) -> Result<TermId> {
    TermId::parse(part).ok_or_else(|| {
        QuadStoreError::corrupted(
            rotation.table_name(),
            format!("key '{}' holds non-numeric id '{}'", key, part),
        )
    })
}
