//! `txlens encode-call` and `txlens call`.

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::path::Path;
use txlens_core::{to_hex, validate, AbiItem, DecodedParam, FunctionDef, Network};
use txlens_evm::{decode_output, encode_call, find_function};
use txlens_rpc::RpcClient;

use crate::cmd_abi;
use crate::config::AppConfig;

/// Resolve `name` against the ABI, preferring the overload whose arity
/// matches the supplied arguments.
fn resolve<'a>(items: &'a [AbiItem], name: &str, argc: usize) -> Result<&'a FunctionDef> {
    find_function(items, name, Some(argc))
        .or_else(|| find_function(items, name, None))
        .ok_or_else(|| anyhow!("function '{name}' not found in ABI"))
}

fn calldata<'a>(
    items: &'a [AbiItem],
    name: &str,
    args: &[String],
) -> Result<(&'a FunctionDef, Vec<u8>)> {
    let func = resolve(items, name, args.len())?;
    let data = encode_call(func, args).with_context(|| format!("encode {}", func.signature()))?;
    Ok((func, data))
}

pub fn encode(abi_path: &Path, function: &str, args: &[String]) -> Result<()> {
    let items = cmd_abi::load(abi_path)?;
    let (_, data) = calldata(&items, function, args)?;
    println!("{}", to_hex(data));
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CallOutput<'a> {
    function: &'a str,
    signature: String,
    network: Network,
    outputs: Vec<DecodedParam>,
}

pub async fn call(
    config: &AppConfig,
    address: &str,
    abi_path: &Path,
    function: &str,
    args: &[String],
    network: Network,
) -> Result<()> {
    let to = validate::address(address)?;
    let items = cmd_abi::load(abi_path)?;
    let (func, data) = calldata(&items, function, args)?;
    if !func.is_read() {
        bail!(
            "'{}' is not a view or pure function; use encode-call and send a transaction instead",
            func.signature()
        );
    }

    let rpc = RpcClient::from_config(&config.rpc)?;
    let returned = rpc.call(&to, &data, network).await?;
    if returned.is_empty() && !func.outputs.is_empty() {
        let code = rpc.get_code(&to, network).await?;
        if code.is_empty() {
            bail!("no contract deployed at {} on {network}", to_hex(to));
        }
        bail!("{} returned no data", func.signature());
    }

    crate::print_json(&CallOutput {
        function: &func.name,
        signature: func.signature(),
        network,
        outputs: decode_output(func, &returned),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn abi() -> Vec<AbiItem> {
        cmd_abi::items_from_json(&json!([
            {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
             "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
             "outputs": [{"name": "", "type": "bool"}]},
            {"type": "function", "name": "safeTransferFrom", "stateMutability": "nonpayable",
             "inputs": [{"name": "from", "type": "address"}, {"name": "to", "type": "address"},
                        {"name": "id", "type": "uint256"}],
             "outputs": []},
            {"type": "function", "name": "safeTransferFrom", "stateMutability": "nonpayable",
             "inputs": [{"name": "from", "type": "address"}, {"name": "to", "type": "address"},
                        {"name": "id", "type": "uint256"}, {"name": "data", "type": "bytes"}],
             "outputs": []}
        ]))
        .unwrap()
    }

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn transfer_calldata() {
        let items = abi();
        let (_, data) = calldata(
            &items,
            "transfer",
            &args(&["0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045", "1000"]),
        )
        .unwrap();
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(data[4 + 63], 0xe8);
    }

    #[test]
    fn overload_picked_by_arity() {
        let items = abi();
        let a = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        let three = resolve(&items, "safeTransferFrom", 3).unwrap();
        let four = resolve(&items, "safeTransferFrom", 4).unwrap();
        assert_eq!(three.inputs.len(), 3);
        assert_eq!(four.inputs.len(), 4);
        let (_, data) = calldata(&items, "safeTransferFrom", &args(&[a, a, "7", "0xbeef"])).unwrap();
        assert_eq!(&data[..4], &four.selector());
    }

    #[test]
    fn argument_errors_name_the_input() {
        let items = abi();
        let err = calldata(&items, "transfer", &args(&["0x1234", "1"])).unwrap_err();
        assert!(format!("{err:#}").contains("to"));
        let err = calldata(&items, "transfer", &args(&["1"])).unwrap_err();
        assert!(format!("{err:#}").contains("length mismatch"));
        assert!(calldata(&items, "approve", &[]).is_err());
    }
}
