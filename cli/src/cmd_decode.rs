//! `txlens decode-events` and `txlens decode-log`: decode logs offline
//! against the seed signatures plus any supplied ABI.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value as Json;
use std::io::Read;
use std::path::Path;
use txlens_core::{validate, AbiItem, DecodedEvent, Log};
use txlens_receipt::ReceiptParser;

use crate::cmd_abi;

/// `{ "events": [{ address, topics, data }], "abi": [...] }`
#[derive(Debug, Deserialize)]
struct DecodeEventsRequest {
    events: Vec<Log>,
    #[serde(default)]
    abi: Option<Json>,
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read request from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("read request file '{input}'"))
    }
}

/// Decode a request body. `extra_abi` comes from `--abi` and is applied
/// after the request's own ABI, so its events win on a topic collision.
fn decode_request(text: &str, extra_abi: Vec<AbiItem>) -> Result<Vec<DecodedEvent>> {
    let request: DecodeEventsRequest =
        serde_json::from_str(text).context("parse decode-events request")?;
    for (i, log) in request.events.iter().enumerate() {
        validate::address(&log.address).with_context(|| format!("events[{i}].address"))?;
    }

    let mut abi = match &request.abi {
        Some(json) => cmd_abi::items_from_json(json).context("request abi")?,
        None => Vec::new(),
    };
    abi.extend(extra_abi);
    tracing::debug!(events = request.events.len(), abi_items = abi.len(), "decoding request");

    Ok(ReceiptParser::default().parse_events(&request.events, Some(&abi)))
}

pub fn decode_events(input: &str, abi_path: Option<&Path>) -> Result<()> {
    let text = read_input(input)?;
    let extra = cmd_abi::load_optional(abi_path)?;
    crate::print_json(&decode_request(&text, extra)?)
}

fn build_log(topics: &[String], data: &str, address: &str) -> Result<Log> {
    let address = validate::address(address)?;
    let topics = topics
        .iter()
        .enumerate()
        .map(|(i, t)| validate::topic(&format!("topics[{i}]"), t))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Log {
        address: address.to_checksum(None),
        topics,
        data: validate::hex_data("data", data)?,
    })
}

pub fn decode_log(
    topics: &[String],
    data: &str,
    address: &str,
    abi_path: Option<&Path>,
) -> Result<()> {
    let log = build_log(topics, data, address)?;
    let abi = cmd_abi::load_optional(abi_path)?;
    let decoded = ReceiptParser::default().parse_events(std::slice::from_ref(&log), Some(&abi));
    match decoded.into_iter().next() {
        Some(event) => crate::print_json(&event),
        None => Ok(()),
    }
}
