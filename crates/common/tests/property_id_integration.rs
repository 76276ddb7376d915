use async_trait::async_trait;
use common::error::PersistenceError;
use common::property_id::{
    trailing_counter, IdentifierLookup, PropertyId, PropertyPrefix, SequentialIdAllocator,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// Identifier store that keeps taken IDs in memory
#[derive(Default)]
struct MemoryLookup {
    taken: Mutex<BTreeSet<String>>,
}

impl MemoryLookup {
    fn with_ids(ids: &[&str]) -> Self {
        Self {
            taken: Mutex::new(ids.iter().map(|id| id.to_string()).collect()),
        }
    }

    fn take(&self, id: &PropertyId) -> bool {
        self.taken.lock().unwrap().insert(id.to_string())
    }
}

#[async_trait]
impl IdentifierLookup for MemoryLookup {
    async fn highest_with_prefix(
        &self,
        prefix: &PropertyPrefix,
    ) -> Result<Option<String>, PersistenceError> {
        let taken = self.taken.lock().unwrap();
        Ok(taken
            .iter()
            .filter_map(|id| {
                let digits = id.strip_prefix(prefix.as_str())?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                Some((trailing_counter(id)?, id.clone()))
            })
            .max_by_key(|(counter, _)| *counter)
            .map(|(_, id)| id))
    }

    async fn exists(&self, property_id: &str) -> Result<bool, PersistenceError> {
        Ok(self.taken.lock().unwrap().contains(property_id))
    }
}

fn prefix(p: &str) -> PropertyPrefix {
    PropertyPrefix::new(p).unwrap()
}

#[tokio::test]
async fn test_allocate_then_persist_sequence() {
    let lookup = Arc::new(MemoryLookup::default());
    let allocator = SequentialIdAllocator::new(lookup.clone());
    let plots = prefix("RA-COMREPL");

    let mut issued = Vec::new();
    for _ in 0..3 {
        let id = allocator.allocate(&plots).await;
        assert!(lookup.take(&id));
        issued.push(id.to_string());
    }

    assert_eq!(issued, ["RA-COMREPL0001", "RA-COMREPL0002", "RA-COMREPL0003"]);
}

#[tokio::test]
async fn test_prefixes_count_independently() {
    let lookup = Arc::new(MemoryLookup::with_ids(&[
        "RA-COMREPL0041",
        "RA-RESREAP0007",
        "RA-RESREAP-OLD9999",
    ]));
    let allocator = SequentialIdAllocator::new(lookup);

    assert_eq!(
        allocator.allocate(&prefix("RA-COMREPL")).await.as_str(),
        "RA-COMREPL0042"
    );
    assert_eq!(
        allocator.allocate(&prefix("RA-RESREAP")).await.as_str(),
        "RA-RESREAP0008"
    );
    assert_eq!(
        allocator.allocate(&prefix("RA-RESPGMN")).await.as_str(),
        "RA-RESPGMN0001"
    );
}

#[tokio::test]
async fn test_counter_grows_past_four_digits() {
    let lookup = Arc::new(MemoryLookup::with_ids(&["P9999", "P0500"]));
    let allocator = SequentialIdAllocator::new(lookup);

    let id = allocator.allocate(&prefix("P")).await;
    assert_eq!(id.as_str(), "P10000");
    assert_eq!(trailing_counter(id.as_str()), Some(10000));
}
