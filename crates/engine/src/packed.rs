use sqlsight_helpers::Status;

/// The concrete stand-in for this engine's cross-boundary wire payload: a
/// status code plus length-implied `serde_json`-encoded bytes. A real FFI
/// boundary would standardize on the envelope shape, not this encoding.
#[derive(Debug, Clone)]
pub struct PackedBytes {
    pub status: Status,
    pub bytes: Vec<u8>,
}

impl PackedBytes {
    pub fn ok<T: serde::Serialize>(value: &T) -> Self {
        Self::pack(Status::Ok, value)
    }

    pub fn pack<T: serde::Serialize>(status: Status, value: &T) -> Self {
        let bytes = serde_json::to_vec(value).unwrap_or_default();
        Self { status, bytes }
    }

    /// A status-only envelope with no payload, for operations whose
    /// result is the status itself.
    pub fn status(status: Status) -> Self {
        Self { status, bytes: Vec::new() }
    }

    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_slice(&self.bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_packs_a_serializable_value() {
        let packed = PackedBytes::ok(&vec![1u32, 2, 3]);
        assert!(packed.status.is_ok());
        let decoded: Vec<u32> = packed.decode().unwrap();
        assert_eq!(decoded, vec![1, 2, 3]);
    }

    #[test]
    fn status_envelope_carries_no_payload() {
        let packed = PackedBytes::status(Status::ParserInputNotScanned);
        assert_eq!(packed.status, Status::ParserInputNotScanned);
        assert!(packed.bytes.is_empty());
    }
}
