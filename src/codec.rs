// src/codec.rs
use crate::{Dealer, LedgerError};

/// Canonical JSON bytes for a dealer record.
///
/// The payload is hashed into the ledger's state commitment, and peers
/// written in other languages must produce identical bytes for identical
/// records. serde_json emits struct fields in declaration order and
/// `Dealer` declares its fields in the agreed canonical order, so the
/// output is deterministic without any post-sort.
pub fn encode(dealer: &Dealer) -> Result<Vec<u8>, LedgerError> {
    serde_json::to_vec(dealer).map_err(|e| LedgerError::Encode(e.to_string()))
}

/// Inverse of [`encode`]. Input key order is irrelevant and unknown keys
/// are ignored; some writers on the network add a `docType` discriminator
/// that others do not.
pub fn decode(key: &str, bytes: &[u8]) -> Result<Dealer, LedgerError> {
    serde_json::from_slice(bytes).map_err(|e| LedgerError::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dealer_1203() -> Dealer {
        Dealer::new(1203, "+91 456787", "0120", 300, "SUCCESS", 500, "ONLINE", "NO")
    }

    #[test]
    fn round_trip() {
        let dealer = dealer_1203();
        let bytes = encode(&dealer).unwrap();
        assert_eq!(decode("1203", &bytes).unwrap(), dealer);
    }

    #[test]
    fn canonical_byte_output() {
        // Byte-for-byte contract with the other implementations on the
        // network. If this test breaks, state hashes diverge.
        let bytes = encode(&dealer_1203()).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"BALANCE":300,"DEALERID":1203,"ID":"0120","MSISDN":"+91 456787","REMARKS":"NO","Status":"SUCCESS","TRANSAM":500,"TRANS":"ONLINE"}"#
        );
    }

    #[test]
    fn decode_accepts_reordered_keys_and_doc_type() {
        let input = r#"{"docType":"dealer","DEALERID":1203,"MSISDN":"+91 456787","ID":"0120","BALANCE":300,"Status":"SUCCESS","TRANSAM":500,"TRANS":"ONLINE","REMARKS":"NO"}"#;
        assert_eq!(decode("1203", input.as_bytes()).unwrap(), dealer_1203());
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let mut bytes = encode(&dealer_1203()).unwrap();
        bytes.truncate(bytes.len() - 10);
        let err = decode("1203", &bytes).unwrap_err();
        assert!(matches!(err, LedgerError::Decode { key, .. } if key == "1203"));
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let err = decode("7", br#"{"DEALERID":7}"#).unwrap_err();
        assert!(matches!(err, LedgerError::Decode { .. }));
    }
}
