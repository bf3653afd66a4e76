//! `EventDecoder`: log + signature lookup to `DecodedEvent`.

use crate::codec;
use rayon::prelude::*;
use txlens_core::{
    DecodeError, DecodedEvent, DecodedParam, EventSignatureDef, Log, MatchedEvent,
    SignatureLookup,
};

/// Decoder for EVM logs.
/// Stateless; all signature knowledge comes from the lookup passed in.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventDecoder;

impl EventDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode one log.
    ///
    /// Never fails: logs that cannot be matched or decoded come back as
    /// [`DecodedEvent::Unmatched`] carrying the raw topics and data.
    pub fn decode_event(&self, log: &Log, lookup: &dyn SignatureLookup) -> DecodedEvent {
        let Some(topic0) = log.topics.first() else {
            tracing::debug!(address = %log.address, "log has no topics");
            return DecodedEvent::unmatched(log);
        };
        let Some(def) = lookup.lookup(topic0) else {
            tracing::debug!(address = %log.address, topic = %topic0, "no signature registered");
            return DecodedEvent::unmatched(log);
        };
        match self.decode_matched(log, &def) {
            Ok(event) => DecodedEvent::Matched(event),
            Err(e) => {
                tracing::debug!(
                    address = %log.address,
                    signature = %def.canonical_signature,
                    error = %e,
                    "falling back to raw log"
                );
                DecodedEvent::unmatched(log)
            }
        }
    }

    /// Decode a log against a known definition. Errors mean the log does
    /// not fit the definition at all; single bad fields are kept inline.
    pub fn decode_matched(
        &self,
        log: &Log,
        def: &EventSignatureDef,
    ) -> Result<MatchedEvent, DecodeError> {
        // indexed → topics[1..], extra topics ignored
        let mut topics = log.topics.iter().skip(1);
        let mut indexed = Vec::new();
        for param in def.indexed_params() {
            let topic = topics.next().ok_or_else(|| DecodeError::MissingTopic {
                name: param.name.clone(),
            })?;
            let ty = param.ty.to_string();
            let decoded = if param.ty.is_hashed_when_indexed() {
                DecodedParam::hash_only(&param.name, ty, topic)
            } else {
                match codec::decode_word(&param.ty, topic.as_slice(), 0) {
                    Ok((value, _)) => DecodedParam::ok(&param.name, ty, value),
                    Err(e) => DecodedParam::failed(&param.name, ty, e.to_string()),
                }
            };
            indexed.push(decoded);
        }

        // non-indexed → data, as one tuple body
        let data_params: Vec<_> = def.data_params().cloned().collect();
        let results = codec::decode_params(&data_params, &log.data);
        let failed = results.iter().filter(|r| r.is_err()).count();
        if !data_params.is_empty() && failed == data_params.len() {
            return Err(DecodeError::AllFieldsFailed { count: failed });
        }
        let mut data = data_params
            .iter()
            .zip(results)
            .map(|(param, result)| match result {
                Ok(value) => DecodedParam::ok(&param.name, param.ty.to_string(), value),
                Err(e) => DecodedParam::failed(&param.name, param.ty.to_string(), e.to_string()),
            });

        // back to declaration order
        let mut indexed = indexed.into_iter();
        let parameters = def
            .parameters
            .iter()
            .filter_map(|p| if p.indexed { indexed.next() } else { data.next() })
            .collect();

        Ok(MatchedEvent {
            name: def.name.clone(),
            address: log.address.clone(),
            signature: def.canonical_signature.clone(),
            parameters,
        })
    }

    /// Decode many logs in parallel. Output order matches input order.
    pub fn decode_batch(&self, logs: &[Log], lookup: &dyn SignatureLookup) -> Vec<DecodedEvent> {
        logs.par_iter()
            .map(|log| self.decode_event(log, lookup))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, B256, U256};
    use std::collections::HashMap;
    use std::sync::Arc;
    use txlens_core::Value;

    #[derive(Default)]
    struct Sigs(HashMap<B256, Arc<EventSignatureDef>>);

    impl Sigs {
        fn with(mut self, sig: &str) -> Self {
            let def = EventSignatureDef::parse(sig).unwrap();
            self.0.insert(def.topic_hash, Arc::new(def));
            self
        }
    }

    impl SignatureLookup for Sigs {
        fn lookup(&self, topic_hash: &B256) -> Option<Arc<EventSignatureDef>> {
            self.0.get(topic_hash).cloned()
        }
    }

    fn word(n: u64) -> Vec<u8> {
        let mut w = vec![0u8; 32];
        w[24..].copy_from_slice(&n.to_be_bytes());
        w
    }

    fn addr_topic(a: Address) -> B256 {
        B256::left_padding_from(a.as_slice())
    }

    fn transfer_sigs() -> Sigs {
        Sigs::default().with("event Transfer(address indexed from, address indexed to, uint256 value)")
    }

    fn transfer_log() -> Log {
        let def = EventSignatureDef::parse("Transfer(address,address,uint256)").unwrap();
        Log {
            address: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".into(),
            topics: vec![
                def.topic_hash,
                addr_topic(Address::repeat_byte(0x11)),
                addr_topic(Address::repeat_byte(0x22)),
            ],
            data: Bytes::from(word(1_000)),
        }
    }

    #[test]
    fn erc20_transfer() {
        let ev = EventDecoder::new().decode_event(&transfer_log(), &transfer_sigs());
        let m = ev.as_matched().expect("matched");
        assert_eq!(m.name, "Transfer");
        assert_eq!(m.signature, "Transfer(address,address,uint256)");
        let names: Vec<_> = m.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["from", "to", "value"]);
        assert_eq!(
            m.param("from").unwrap().value,
            Some(Value::Address(Address::repeat_byte(0x11)))
        );
        assert_eq!(
            m.param("value").unwrap().value,
            Some(Value::Uint(U256::from(1_000u32)))
        );
        assert!(!m.has_errors());
    }

    #[test]
    fn unknown_and_empty_topics_fall_back() {
        let dec = EventDecoder::new();
        let mut log = transfer_log();
        log.topics[0] = B256::repeat_byte(0x99);
        let ev = dec.decode_event(&log, &transfer_sigs());
        assert!(!ev.is_matched());
        assert_eq!(ev.name(), format!("0x{}", "99".repeat(32)));

        log.topics.clear();
        assert_eq!(dec.decode_event(&log, &transfer_sigs()).name(), "Unknown");
    }

    #[test]
    fn indexed_dynamic_is_hash_only() {
        let sigs = Sigs::default()
            .with("event Message(address indexed sender, string indexed text, uint256[] indexed ids)");
        let def = EventSignatureDef::parse("Message(address,string,uint256[])").unwrap();
        let hashed = txlens_core::keccak256("hello");
        let log = Log {
            address: "0x01".into(),
            topics: vec![def.topic_hash, addr_topic(Address::ZERO), hashed, B256::repeat_byte(7)],
            data: Bytes::new(),
        };
        let ev = EventDecoder::new().decode_event(&log, &sigs);
        let m = ev.as_matched().unwrap();
        let text = m.param("text").unwrap();
        assert!(text.is_hash_only);
        assert_eq!(text.value, Some(Value::FixedBytes(hashed.to_vec())));
        assert!(m.param("ids").unwrap().is_hash_only);
        assert!(!m.param("sender").unwrap().is_hash_only);
    }

    #[test]
    fn missing_indexed_topic_falls_back() {
        let mut log = transfer_log();
        log.topics.truncate(2);
        assert!(!EventDecoder::new().decode_event(&log, &transfer_sigs()).is_matched());
    }

    #[test]
    fn extra_topics_ignored() {
        let mut log = transfer_log();
        log.topics.push(B256::repeat_byte(1));
        assert!(EventDecoder::new().decode_event(&log, &transfer_sigs()).is_matched());
    }

    #[test]
    fn partial_data_failure_keeps_event() {
        let sigs = Sigs::default().with("event Note(uint256 id, string memo)");
        let def = EventSignatureDef::parse("Note(uint256,string)").unwrap();
        let mut data = word(5);
        data.extend(word(0x4000));
        let log = Log {
            address: "0x01".into(),
            topics: vec![def.topic_hash],
            data: Bytes::from(data),
        };
        let ev = EventDecoder::new().decode_event(&log, &sigs);
        let m = ev.as_matched().unwrap();
        assert_eq!(m.param("id").unwrap().value, Some(Value::Uint(U256::from(5u8))));
        let memo = m.param("memo").unwrap();
        assert!(memo.value.is_none());
        assert!(memo.error.as_deref().unwrap().contains("memo"));
    }

    #[test]
    fn all_data_failing_falls_back() {
        let mut log = transfer_log();
        log.data = Bytes::new();
        assert!(!EventDecoder::new().decode_event(&log, &transfer_sigs()).is_matched());
    }

    #[test]
    fn batch_preserves_order() {
        let mut logs = Vec::new();
        for i in 0..64u8 {
            let mut log = transfer_log();
            if i % 3 == 0 {
                log.topics[0] = B256::repeat_byte(i);
            }
            log.address = format!("0x{i:02x}");
            logs.push(log);
        }
        let out = EventDecoder::new().decode_batch(&logs, &transfer_sigs());
        assert_eq!(out.len(), logs.len());
        for (i, ev) in out.iter().enumerate() {
            let address = match ev {
                DecodedEvent::Matched(m) => &m.address,
                DecodedEvent::Unmatched(r) => &r.address,
            };
            assert_eq!(address, &format!("0x{i:02x}"));
            assert_eq!(ev.is_matched(), i % 3 != 0);
        }
    }
}
