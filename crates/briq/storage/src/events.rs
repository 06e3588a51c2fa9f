//! Hash linking for the event log.
//!
//! Every record hashes its own canonical JSON together with the previous
//! record's hash, so rewriting any past event breaks every later link.

use uuid::Uuid;

use crate::model::{EventAppend, EventRecord};
use crate::{StorageError, StorageResult};

pub(crate) fn seal_event(
    event: EventAppend,
    previous_hash: Option<String>,
    sequence: u64,
) -> StorageResult<EventRecord> {
    let hash = compute_event_hash(&event, previous_hash.as_deref(), sequence)?;
    Ok(EventRecord {
        event_id: format!("evt-{}", Uuid::new_v4()),
        sequence,
        timestamp: event.timestamp,
        emitter: event.emitter,
        event: event.event,
        previous_hash,
        hash,
    })
}

fn compute_event_hash(
    event: &EventAppend,
    previous_hash: Option<&str>,
    sequence: u64,
) -> StorageResult<String> {
    let serializable = serde_json::json!({
        "previous_hash": previous_hash,
        "sequence": sequence,
        "timestamp": event.timestamp,
        "emitter": event.emitter,
        "event": event.event,
    });
    let serialized = serde_json::to_vec(&serializable)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(blake3::hash(&serialized).to_hex().to_string())
}

/// Re-derive the hash chain of an oldest-first event slice starting at
/// sequence 1.
pub fn verify_event_chain(records: &[EventRecord]) -> StorageResult<()> {
    let mut previous: Option<&str> = None;
    for (index, record) in records.iter().enumerate() {
        let expected_seq = index as u64 + 1;
        if record.sequence != expected_seq {
            return Err(StorageError::IntegrityViolation {
                sequence: record.sequence,
                reason: format!("expected sequence {}", expected_seq),
            });
        }

        if record.previous_hash.as_deref() != previous {
            return Err(StorageError::IntegrityViolation {
                sequence: record.sequence,
                reason: "previous hash link mismatch".into(),
            });
        }

        let append = EventAppend {
            timestamp: record.timestamp,
            emitter: record.emitter,
            event: record.event.clone(),
        };
        let recomputed = compute_event_hash(&append, previous, record.sequence)?;
        if recomputed != record.hash {
            return Err(StorageError::IntegrityViolation {
                sequence: record.sequence,
                reason: "event hash mismatch".into(),
            });
        }

        previous = Some(record.hash.as_str());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LedgerEvent;
    use briq_types::{Address, ItemId, Material};
    use chrono::Utc;

    fn minted(item: u128) -> EventAppend {
        EventAppend {
            timestamp: Utc::now(),
            emitter: Address(0x1),
            event: LedgerEvent::Minted {
                owner: Address(0x11),
                item: ItemId(item),
                material: Material(1),
            },
        }
    }

    fn chain(len: u128) -> Vec<EventRecord> {
        let mut records: Vec<EventRecord> = Vec::new();
        for item in 0..len {
            let previous = records.last().map(|r| r.hash.clone());
            let sequence = records.len() as u64 + 1;
            records.push(seal_event(minted(item), previous, sequence).unwrap());
        }
        records
    }

    #[test]
    fn sealed_chain_verifies() {
        let records = chain(4);
        assert_eq!(records[0].previous_hash, None);
        assert_eq!(records[3].previous_hash.as_ref(), Some(&records[2].hash));
        verify_event_chain(&records).unwrap();
    }

    #[test]
    fn tampered_payload_is_detected() {
        let mut records = chain(3);
        records[1].event = LedgerEvent::Minted {
            owner: Address(0x99),
            item: ItemId(1),
            material: Material(1),
        };
        let err = verify_event_chain(&records).unwrap_err();
        assert!(matches!(err, StorageError::IntegrityViolation { sequence: 2, .. }));
    }

    #[test]
    fn dropped_record_is_detected() {
        let mut records = chain(3);
        records.remove(1);
        assert!(verify_event_chain(&records).is_err());
    }
}
