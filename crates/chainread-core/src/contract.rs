//! Contract bindings: an address plus its ABI, read through a provider set.

use std::sync::Arc;

use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Event, Function, JsonAbi};
use alloy_primitives::keccak256;

use crate::error::ReadError;
use crate::provider_set::ProviderSet;
use crate::types::{BlockTag, Log, LogFilter};

/// Association between a contract address and its ABI.
///
/// Immutable once built. The address is stored lower-cased.
#[derive(Debug, Clone)]
pub struct ContractBinding {
    address: String,
    abi: Arc<JsonAbi>,
}

impl ContractBinding {
    pub fn new(address: &str, abi: Arc<JsonAbi>) -> Self {
        Self {
            address: address.to_ascii_lowercase(),
            abi,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// The overload of `method` taking `argc` arguments.
    pub fn function(&self, method: &str, argc: usize) -> Result<&Function, ReadError> {
        let overloads = self
            .abi
            .function(method)
            .ok_or_else(|| ReadError::Abi(format!("function '{method}' not found in ABI")))?;
        overloads
            .iter()
            .find(|f| f.inputs.len() == argc)
            .ok_or_else(|| {
                ReadError::Abi(format!("no overload of '{method}' takes {argc} arguments"))
            })
    }

    /// Selector-prefixed calldata for `method(args…)`.
    pub fn encode_call(&self, method: &str, args: &[DynSolValue]) -> Result<Vec<u8>, ReadError> {
        self.function(method, args.len())?
            .abi_encode_input(args)
            .map_err(|e| ReadError::Abi(format!("encoding '{method}': {e}")))
    }

    fn event(&self, name: &str, indexed_values: usize) -> Result<&Event, ReadError> {
        let overloads = self
            .abi
            .event(name)
            .ok_or_else(|| ReadError::Abi(format!("event '{name}' not found in ABI")))?;
        overloads
            .iter()
            .find(|e| e.inputs.iter().filter(|p| p.indexed).count() >= indexed_values)
            .ok_or_else(|| {
                ReadError::Abi(format!(
                    "event '{name}' has fewer than {indexed_values} indexed parameters"
                ))
            })
    }

    /// A log filter for `event_name` emitted by this contract.
    ///
    /// `topics` are the indexed parameter values in declaration order; `None`
    /// matches anything. Value types are matched by their 32-byte word,
    /// `string` and `bytes` by the keccak256 of their contents. Indexed
    /// arrays and tuples are rejected.
    pub fn event_filter(
        &self,
        event_name: &str,
        topics: &[Option<DynSolValue>],
    ) -> Result<LogFilter, ReadError> {
        let event = self.event(event_name, topics.len())?;
        let mut filter = LogFilter::address(self.address.clone());
        if !event.anonymous {
            filter = filter.topic(Some(format!("0x{}", hex::encode(event.selector()))));
        }
        for value in topics {
            let topic = value.as_ref().map(topic_word).transpose()?;
            filter = filter.topic(topic);
        }
        Ok(filter)
    }
}

/// The topic encoding of one indexed value.
fn topic_word(value: &DynSolValue) -> Result<String, ReadError> {
    let word = match value {
        DynSolValue::String(s) => keccak256(s.as_bytes()),
        DynSolValue::Bytes(b) => keccak256(b),
        other => other.as_word().ok_or_else(|| {
            ReadError::Abi(format!(
                "cannot filter on indexed {}",
                other.sol_type_name().unwrap_or_else(|| "value".into())
            ))
        })?,
    };
    Ok(format!("0x{}", hex::encode(word)))
}

// ─── Contract ─────────────────────────────────────────────────────────────────

/// A binding paired with the provider set it reads through.
pub struct Contract<'a> {
    binding: Arc<ContractBinding>,
    providers: &'a ProviderSet,
}

impl<'a> Contract<'a> {
    pub(crate) fn new(binding: Arc<ContractBinding>, providers: &'a ProviderSet) -> Self {
        Self { binding, providers }
    }

    pub fn binding(&self) -> &ContractBinding {
        &self.binding
    }

    pub fn address(&self) -> &str {
        self.binding.address()
    }

    /// Call a view method and decode its outputs.
    ///
    /// An endpoint that returns no data for a method with outputs (contract
    /// not deployed there yet) or data that does not decode is skipped.
    pub async fn read(
        &self,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, ReadError> {
        let function = self.binding.function(method, args.len())?;
        let calldata = self.binding.encode_call(method, args)?;
        let calldata = calldata.as_slice();
        let address = self.binding.address();

        self.providers
            .try_on_each_endpoint(move |client| async move {
                let data = client.call(address, calldata).await?;
                if data.is_empty() && !function.outputs.is_empty() {
                    return Ok(None);
                }
                function
                    .abi_decode_output(&data, true)
                    .map(Some)
                    .map_err(|e| ReadError::Abi(format!("decoding '{method}': {e}")))
            })
            .await
            .into_result(self.providers.name(), || format!("{address}.{method}"))
    }

    /// Log filter for `event_name` with the given indexed values.
    pub fn filter(
        &self,
        event_name: &str,
        topics: &[Option<DynSolValue>],
    ) -> Result<LogFilter, ReadError> {
        self.binding.event_filter(event_name, topics)
    }

    /// Run `filter` over `[from_block, to_block]` on the first endpoint that
    /// answers. Bounds left as `None` keep whatever the filter already had.
    pub async fn query_filter(
        &self,
        mut filter: LogFilter,
        from_block: Option<BlockTag>,
        to_block: Option<BlockTag>,
    ) -> Result<Vec<Log>, ReadError> {
        if from_block.is_some() {
            filter.from_block = from_block;
        }
        if to_block.is_some() {
            filter.to_block = to_block;
        }
        self.providers.get_logs(&filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use std::str::FromStr;

    const ERC20_ABI: &str = r#"[
        {"type":"function","name":"balanceOf","stateMutability":"view",
         "inputs":[{"name":"owner","type":"address"}],
         "outputs":[{"name":"","type":"uint256"}]},
        {"type":"event","name":"Transfer","anonymous":false,
         "inputs":[{"name":"from","type":"address","indexed":true},
                   {"name":"to","type":"address","indexed":true},
                   {"name":"value","type":"uint256","indexed":false}]}
    ]"#;

    fn binding() -> ContractBinding {
        let abi: JsonAbi = serde_json::from_str(ERC20_ABI).unwrap();
        ContractBinding::new("0xC7198437980c041c805A1EDcbA50c1Ce5db95118", Arc::new(abi))
    }

    #[test]
    fn address_is_lowercased() {
        assert_eq!(binding().address(), "0xc7198437980c041c805a1edcba50c1ce5db95118");
    }

    #[test]
    fn encode_balance_of() {
        let owner = Address::from_str("0x078dD3a28D9908d38424980944319431462A5aB6").unwrap();
        let calldata = binding()
            .encode_call("balanceOf", &[DynSolValue::Address(owner)])
            .unwrap();
        assert_eq!(&calldata[..4], hex::decode("70a08231").unwrap().as_slice());
        assert_eq!(calldata.len(), 4 + 32);
    }

    #[test]
    fn unknown_method_is_abi_error() {
        let err = binding().encode_call("totalSupply", &[]).unwrap_err();
        assert!(matches!(err, ReadError::Abi(_)));
    }

    #[test]
    fn wrong_arity_is_abi_error() {
        let err = binding().encode_call("balanceOf", &[]).unwrap_err();
        assert!(err.to_string().contains("0 arguments"));
    }

    #[test]
    fn transfer_filter_topics() {
        let to = Address::from_str("0x078dD3a28D9908d38424980944319431462A5aB6").unwrap();
        let filter = binding()
            .event_filter("Transfer", &[None, Some(DynSolValue::Address(to))])
            .unwrap();

        assert_eq!(
            filter.address.as_deref(),
            Some("0xc7198437980c041c805a1edcba50c1ce5db95118")
        );
        assert_eq!(
            filter.topics[0].as_deref(),
            Some("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        );
        assert_eq!(filter.topics[1], None);
        assert_eq!(
            filter.topics[2].as_deref(),
            Some("0x000000000000000000000000078dd3a28d9908d38424980944319431462a5ab6")
        );
    }

    #[test]
    fn dynamic_topics_are_hashed() {
        assert_eq!(
            topic_word(&DynSolValue::String("hello".into())).unwrap(),
            format!("0x{}", hex::encode(keccak256(b"hello")))
        );
        assert_eq!(
            topic_word(&DynSolValue::Bytes(vec![0xde, 0xad])).unwrap(),
            format!("0x{}", hex::encode(keccak256([0xdeu8, 0xad])))
        );
    }

    #[test]
    fn indexed_tuple_or_array_rejected() {
        let tuple = DynSolValue::Tuple(vec![
            DynSolValue::Bool(true),
            DynSolValue::String("x".into()),
        ]);
        assert!(matches!(topic_word(&tuple), Err(ReadError::Abi(_))));

        let array = DynSolValue::Array(vec![DynSolValue::Bool(true)]);
        assert!(matches!(topic_word(&array), Err(ReadError::Abi(_))));
    }

    #[test]
    fn too_many_topics_rejected() {
        let err = binding()
            .event_filter("Transfer", &[None, None, None])
            .unwrap_err();
        assert!(matches!(err, ReadError::Abi(_)));
    }
}
