//! `txlens abi`, `txlens topic`, `txlens selector`, plus ABI file loading
//! shared by the other commands.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value as Json;
use std::path::Path;
use txlens_core::{
    abi::split_items, canonicalize, fingerprint, to_hex, AbiItem, AbiParam, ValidationError,
};

/// Read an ABI from disk. Accepts a bare JSON ABI array or a compiler
/// artifact carrying it under `"abi"`.
pub fn load(path: &Path) -> Result<Vec<AbiItem>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read ABI file '{}'", path.display()))?;
    let json: Json = serde_json::from_str(&text)
        .with_context(|| format!("parse ABI file '{}'", path.display()))?;
    items_from_json(&json).with_context(|| format!("ABI file '{}'", path.display()))
}

pub fn load_optional(path: Option<&Path>) -> Result<Vec<AbiItem>> {
    path.map(load).transpose().map(Option::unwrap_or_default)
}

pub fn items_from_json(json: &Json) -> Result<Vec<AbiItem>, ValidationError> {
    let array = match json {
        Json::Array(_) => json,
        Json::Object(obj) => match obj.get("abi") {
            Some(abi @ Json::Array(_)) => abi,
            _ => return Err(not_an_abi()),
        },
        _ => return Err(not_an_abi()),
    };
    Ok(AbiItem::parse_lenient(array))
}

fn not_an_abi() -> ValidationError {
    ValidationError::InvalidAbi("expected a JSON array or an object with an \"abi\" array".into())
}

// ─── abi ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionSummary {
    name: String,
    signature: String,
    selector: String,
    kind: &'static str,
    inputs: Vec<AbiParam>,
    outputs: Vec<AbiParam>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventSummary {
    name: String,
    signature: String,
    topic: String,
    anonymous: bool,
    inputs: Vec<AbiParam>,
}

#[derive(Debug, Serialize)]
struct AbiSummary {
    functions: Vec<FunctionSummary>,
    events: Vec<EventSummary>,
}

fn summarize(items: &[AbiItem]) -> AbiSummary {
    let (functions, events) = split_items(items);
    AbiSummary {
        functions: functions
            .into_iter()
            .map(|f| FunctionSummary {
                name: f.name.clone(),
                signature: f.signature(),
                selector: to_hex(f.selector()),
                kind: if f.is_read() { "read" } else { "write" },
                inputs: f.inputs.clone(),
                outputs: f.outputs.clone(),
            })
            .collect(),
        events: events
            .into_iter()
            .map(|e| EventSummary {
                name: e.name.clone(),
                signature: e.signature(),
                topic: to_hex(e.topic_hash()),
                anonymous: e.anonymous,
                inputs: e.inputs.clone(),
            })
            .collect(),
    }
}

pub fn run(path: &Path) -> Result<()> {
    let items = load(path)?;
    crate::print_json(&summarize(&items))
}

// ─── topic / selector ─────────────────────────────────────────────────────────

pub fn topic(signature: &str) -> Result<String> {
    let canonical = canonicalize(signature)?;
    tracing::debug!(%canonical, "hashing event signature");
    Ok(to_hex(fingerprint::topic_hash(&canonical)))
}

pub fn selector(signature: &str) -> Result<String> {
    let canonical = canonicalize(signature)?;
    tracing::debug!(%canonical, "hashing function signature");
    Ok(to_hex(fingerprint::selector(&canonical)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn erc20_abi() -> Json {
        json!([
            {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
             "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
             "outputs": [{"name": "", "type": "bool"}]},
            {"type": "function", "name": "balanceOf", "stateMutability": "view",
             "inputs": [{"name": "owner", "type": "address"}],
             "outputs": [{"name": "", "type": "uint256"}]},
            {"type": "event", "name": "Transfer", "anonymous": false,
             "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}]},
            {"type": "fallback"}
        ])
    }

    #[test]
    fn artifact_and_bare_array() {
        let bare = items_from_json(&erc20_abi()).unwrap();
        let artifact = items_from_json(&json!({"contractName": "Token", "abi": erc20_abi()})).unwrap();
        assert_eq!(bare, artifact);
        assert_eq!(bare.len(), 4);
        assert!(matches!(
            items_from_json(&json!({"bytecode": "0x"})),
            Err(ValidationError::InvalidAbi(_))
        ));
        assert!(items_from_json(&json!("nope")).is_err());
    }

    #[test]
    fn summary_sorted_and_classified() {
        let items = items_from_json(&erc20_abi()).unwrap();
        let summary = summarize(&items);
        let names: Vec<_> = summary.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["balanceOf", "transfer"]);
        assert_eq!(summary.functions[0].kind, "read");
        assert_eq!(summary.functions[1].kind, "write");
        assert_eq!(summary.functions[1].selector, "0xa9059cbb");
        assert_eq!(
            summary.events[0].topic,
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn topic_and_selector_accept_declarations() {
        assert_eq!(
            topic("event Transfer(address indexed from, address indexed to, uint256 value)").unwrap(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(selector("transfer(address,uint256)").unwrap(), "0xa9059cbb");
        assert_eq!(
            selector("function balanceOf(address owner) external view returns (uint256)").unwrap(),
            "0x70a08231"
        );
        assert!(topic("Transfer").is_err());
    }

    #[test]
    fn missing_abi_file_names_the_path() {
        let err = load(Path::new("/nonexistent/abi.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/abi.json"));
        assert!(load_optional(None).unwrap().is_empty());
    }
}
