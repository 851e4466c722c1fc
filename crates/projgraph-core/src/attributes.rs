//! Attribute bags and their merge semantics.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The sentinel value that, when merged in, deletes the key instead of setting it.
pub const TOMBSTONE: &str = "~";

/// An unordered string-to-string attribute bag attached to every entity.
pub type Attributes = HashMap<String, String>;

/// Merge `incoming` into `existing`, honouring the tombstone sentinel.
///
/// For every key in `incoming`: if the value is [`TOMBSTONE`], the key is removed
/// from `existing`; otherwise `existing[key]` is overwritten. Keys absent from
/// `incoming` are left untouched. This is right-biased and neither commutative
/// nor associative in general.
pub fn merge_attributes(mut existing: Attributes, incoming: &Attributes) -> Attributes {
    for (k, v) in incoming {
        if v == TOMBSTONE {
            existing.remove(k);
        } else {
            existing.insert(k.clone(), v.clone());
        }
    }
    existing
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttrMap(pub Attributes);
