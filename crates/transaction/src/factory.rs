//! Construction of envelopes from raw bytes, JSON or their parts.

use alloy_rlp::EMPTY_STRING_CODE;

use crate::{
    ConversionError, DecodeError, TransactionType,
    envelope::{Eip1559, Eip2930, Envelope, EnvelopeParts, Legacy},
    rpc,
};

/// The type byte reserved by EIP-2718 for future extension.
const RESERVED_TYPE: u8 = 0xff;

/// Decodes an envelope from its raw bytes, dispatching on the first byte.
///
/// A first byte of `0x80` or more starts an RLP list, so the envelope is
/// untyped.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn from_raw(raw: &[u8]) -> Result<Envelope, DecodeError> {
    let first = *raw.first().ok_or(DecodeError::EmptyInput)?;

    let envelope = match first {
        RESERVED_TYPE => return Err(DecodeError::ReservedType),
        byte if byte >= EMPTY_STRING_CODE => Envelope::Legacy(Legacy::decode(raw)?),
        Eip2930::TYPE => Envelope::Eip2930(Eip2930::decode(raw)?),
        Eip1559::TYPE => Envelope::Eip1559(Eip1559::decode(raw)?),
        byte => return Err(DecodeError::UnknownType(byte)),
    };

    log::debug!("Decoded {} transaction", envelope.transaction_type());
    Ok(envelope)
}

/// Converts a JSON transaction, dispatching on its `type` field.
pub fn from_rpc(transaction: rpc::Transaction) -> Result<Envelope, ConversionError> {
    let envelope = match transaction.transaction_type()? {
        TransactionType::Legacy => Envelope::Legacy(transaction.try_into()?),
        TransactionType::Eip2930 => Envelope::Eip2930(transaction.try_into()?),
        TransactionType::Eip1559 => Envelope::Eip1559(transaction.try_into()?),
    };

    log::debug!("Converted {} transaction", envelope.transaction_type());
    Ok(envelope)
}

/// Builds an unsigned envelope of the provided type.
pub fn from_parts(transaction_type: TransactionType, parts: EnvelopeParts) -> Envelope {
    log::debug!("Creating unsigned {transaction_type} transaction");
    Envelope::from_parts(transaction_type, parts)
}

#[cfg(test)]
mod tests {
    use ethtx_primitives::{U256, hex};

    use super::*;

    const LEGACY: &str = "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";
    const EIP1559: &str = "02f8be010102050394c014ba5ec014ba5ec014ba5ec014ba5ec014ba5e04821234f85bf859940000000000000000000000000000000000000000f842a00000000000000000000000000000000000000000000000000000000000000000a0000000000000000000000000000000000000000000000000000000000000000101a07764e376b5b4090264f73abee68ebb5fdc9f76050eff800237e5a2bedadcd7eda044c0ae9b07c75cf4e0a14aebfe792ab2fdccd7d89550b166b1b4a4ece0054f02";

    #[test]
    fn dispatches_on_first_byte() -> anyhow::Result<()> {
        assert_eq!(
            from_raw(&hex::decode(LEGACY)?)?.transaction_type(),
            TransactionType::Legacy
        );
        assert_eq!(
            from_raw(&hex::decode(EIP1559)?)?.transaction_type(),
            TransactionType::Eip1559
        );

        Ok(())
    }

    #[test]
    fn rejects_invalid_type_bytes() -> anyhow::Result<()> {
        let mut raw = hex::decode(EIP1559)?;

        raw[0] = 0xff;
        assert_eq!(from_raw(&raw), Err(DecodeError::ReservedType));

        for byte in [0x00, 0x03, 0x7f] {
            raw[0] = byte;
            assert_eq!(from_raw(&raw), Err(DecodeError::UnknownType(byte)));
        }

        assert_eq!(from_raw(&[]), Err(DecodeError::EmptyInput));

        Ok(())
    }

    #[test]
    fn converts_json_by_type() -> anyhow::Result<()> {
        let json = r#"{
            "chainId": "0x1",
            "nonce": "0x0",
            "to": "0x000000000000000000000000000000000000dead",
            "value": "0x0",
            "gas": "0x5208",
            "gasPrice": "0x1",
            "input": "0x",
            "v": "0x1",
            "r": "0x0",
            "s": "0x0"
        }"#;

        let legacy = from_rpc(serde_json::from_str(json)?)?;
        assert_eq!(legacy.transaction_type(), TransactionType::Legacy);
        assert_eq!(legacy.chain_id(), Some(U256::from(1)));

        let mut typed: serde_json::Value = serde_json::from_str(json)?;
        typed["type"] = "0x1".into();
        let eip2930 = from_rpc(serde_json::from_value(typed.clone())?)?;
        assert_eq!(eip2930.transaction_type(), TransactionType::Eip2930);
        assert_eq!(eip2930.gas_price(), Some(U256::from(1)));

        typed["type"] = "0x3".into();
        assert!(matches!(
            from_rpc(serde_json::from_value(typed)?),
            Err(ConversionError::UnknownType(_))
        ));

        Ok(())
    }
}
