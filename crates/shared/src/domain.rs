use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(TodoId);

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One todo entry as stored and as sent over the wire.
///
/// `created_at` is unix seconds and travels as `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRecord {
    pub id: TodoId,
    pub content: String,
    pub completed: bool,
    pub created_at: i64,
}

/// Number of records that are not completed.
pub fn remaining_count<'a>(records: impl IntoIterator<Item = &'a TodoRecord>) -> usize {
    records.into_iter().filter(|record| !record.completed).count()
}

/// Moves the element at `from` to `to`, shifting everything in between by one.
///
/// Out-of-range indices leave the slice untouched and return `false`.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}
