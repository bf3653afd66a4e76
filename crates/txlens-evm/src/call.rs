//! Function calldata encoding and return-data decoding.
//!
//! - calldata = `selector(signature) ++ encode(inputs)`
//! - return data = ABI-encoded `outputs` tuple, no selector

use crate::codec;
use crate::input::parse_input;
use txlens_core::{AbiItem, AbiType, DecodeError, DecodedParam, FunctionDef, Value};

/// Find a function by name. When an ABI overloads the name, `arity` picks
/// the overload with that many inputs.
pub fn find_function<'a>(
    items: &'a [AbiItem],
    name: &str,
    arity: Option<usize>,
) -> Option<&'a FunctionDef> {
    items
        .iter()
        .filter_map(AbiItem::as_function)
        .filter(|f| f.name == name)
        .find(|f| arity.map_or(true, |n| f.inputs.len() == n))
}

/// Encode a call from typed values.
pub fn encode_call_values(func: &FunctionDef, args: &[Value]) -> Result<Vec<u8>, DecodeError> {
    if args.len() != func.inputs.len() {
        return Err(DecodeError::LengthMismatch {
            expected: func.inputs.len(),
            got: args.len(),
        });
    }
    let types: Vec<AbiType> = func.inputs.iter().map(|p| p.ty.clone()).collect();
    let mut out = func.selector().to_vec();
    out.extend(codec::encode_params(&types, args)?);
    Ok(out)
}

/// Encode a call from text arguments, one per input, parsed with the
/// input's type.
pub fn encode_call<S: AsRef<str>>(func: &FunctionDef, args: &[S]) -> Result<Vec<u8>, DecodeError> {
    if args.len() != func.inputs.len() {
        return Err(DecodeError::LengthMismatch {
            expected: func.inputs.len(),
            got: args.len(),
        });
    }
    let values = func
        .inputs
        .iter()
        .zip(args)
        .enumerate()
        .map(|(i, (param, arg))| {
            parse_input(&param.ty, arg.as_ref()).map_err(|e| DecodeError::InvalidArgument {
                name: param_name(&param.name, "arg", i),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    encode_call_values(func, &values)
}

/// Decode return data of a call to `func`, one entry per output.
pub fn decode_output(func: &FunctionDef, data: &[u8]) -> Vec<DecodedParam> {
    codec::decode_params(&func.outputs, data)
        .into_iter()
        .zip(&func.outputs)
        .enumerate()
        .map(|(i, (result, param))| {
            let name = param_name(&param.name, "output", i);
            match result {
                Ok(value) => DecodedParam::ok(name, param.ty.to_string(), value),
                Err(e) => DecodedParam::failed(name, param.ty.to_string(), e.source.to_string()),
            }
        })
        .collect()
}

fn param_name(name: &str, prefix: &str, index: usize) -> String {
    if name.is_empty() {
        format!("{prefix}{index}")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn erc20_abi() -> Vec<AbiItem> {
        AbiItem::parse_lenient(&serde_json::json!([
            {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
             "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
             "outputs": [{"name": "", "type": "bool"}]},
            {"type": "function", "name": "balanceOf", "stateMutability": "view",
             "inputs": [{"name": "owner", "type": "address"}],
             "outputs": [{"name": "", "type": "uint256"}]},
            {"type": "function", "name": "name", "stateMutability": "view",
             "inputs": [], "outputs": [{"name": "", "type": "string"}]},
            {"type": "function", "name": "safeTransferFrom", "inputs": [
                {"name": "from", "type": "address"}, {"name": "to", "type": "address"},
                {"name": "id", "type": "uint256"}], "outputs": []},
            {"type": "function", "name": "safeTransferFrom", "inputs": [
                {"name": "from", "type": "address"}, {"name": "to", "type": "address"},
                {"name": "id", "type": "uint256"}, {"name": "data", "type": "bytes"}], "outputs": []}
        ]))
    }

    #[test]
    fn transfer_calldata() {
        let abi = erc20_abi();
        let f = find_function(&abi, "transfer", None).unwrap();
        let data = encode_call(f, &["0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045", "1000"]).unwrap();
        assert_eq!(hex::encode(&data[..4]), "a9059cbb");
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(
            hex::encode(&data[4..36]),
            "000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045"
        );
        assert_eq!(data[67], 0xe8);
        assert_eq!(data[66], 0x03);
    }

    #[test]
    fn overloads_resolved_by_arity() {
        let abi = erc20_abi();
        assert_eq!(find_function(&abi, "safeTransferFrom", Some(4)).unwrap().inputs.len(), 4);
        assert_eq!(find_function(&abi, "safeTransferFrom", Some(3)).unwrap().inputs.len(), 3);
        assert!(find_function(&abi, "safeTransferFrom", Some(2)).is_none());
        assert!(find_function(&abi, "mint", None).is_none());
    }

    #[test]
    fn bad_argument_names_the_parameter() {
        let abi = erc20_abi();
        let f = find_function(&abi, "transfer", None).unwrap();
        let err = encode_call(f, &["0x1234", "1"]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidArgument { ref name, .. } if name == "to"));
        let err = encode_call(f, &["0x1234"]).unwrap_err();
        assert_eq!(err, DecodeError::LengthMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn outputs_decode_with_default_names() {
        let abi = erc20_abi();
        let f = find_function(&abi, "balanceOf", None).unwrap();
        let mut ret = vec![0u8; 32];
        ret[31] = 42;
        let out = decode_output(f, &ret);
        assert_eq!(out[0].name, "output0");
        assert_eq!(out[0].value, Some(Value::Uint(U256::from(42u8))));

        let name = find_function(&abi, "name", None).unwrap();
        let encoded = codec::encode_params(&[AbiType::String], &[Value::String("Token".into())]).unwrap();
        assert_eq!(decode_output(name, &encoded)[0].value, Some(Value::String("Token".into())));

        let out = decode_output(name, &[]);
        assert!(out[0].error.is_some());
    }
}
