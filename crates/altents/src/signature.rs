use crate::error::SignatureError;

/// Curve prefix the settlement layer expects on ERC-191 signatures.
pub const SECP256K1_PREFIX: &str = "secp256k1:";

/// Map a `v` / y-parity value to a recovery bit.
fn to_recovery_bit(v: u8) -> Result<u8, SignatureError> {
    match v {
        0 | 1 => Ok(v),
        27 => Ok(0),
        28 => Ok(1),
        other => Err(SignatureError::InvalidRecoveryByte(other)),
    }
}

/// Normalize the trailing recovery byte of a raw signature in place.
pub fn normalize_recovery_byte(signature: &mut [u8]) -> Result<(), SignatureError> {
    let last = signature.last_mut().ok_or(SignatureError::Empty)?;
    *last = to_recovery_bit(*last)?;
    Ok(())
}

/// Convert a wallet's hex ERC-191 signature into `secp256k1:<base58>`.
pub fn transform_erc191_signature(signature: &str) -> Result<String, SignatureError> {
    let hex_str = signature.strip_prefix("0x").unwrap_or(signature);
    let mut bytes =
        hex::decode(hex_str).map_err(|e| SignatureError::InvalidHex(e.to_string()))?;

    normalize_recovery_byte(&mut bytes)?;

    Ok(format!(
        "{SECP256K1_PREFIX}{}",
        bs58::encode(bytes).into_string()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature_with_v(v: u8) -> String {
        format!("0x{}{:02x}", "11".repeat(64), v)
    }

    fn decoded(transformed: &str) -> Vec<u8> {
        let encoded = transformed.strip_prefix(SECP256K1_PREFIX).unwrap();
        bs58::decode(encoded).into_vec().unwrap()
    }

    #[test]
    fn test_legacy_v_is_normalized() {
        let out = transform_erc191_signature(&signature_with_v(27)).unwrap();
        let bytes = decoded(&out);
        assert_eq!(bytes.len(), 65);
        assert_eq!(bytes[64], 0);

        let out = transform_erc191_signature(&signature_with_v(28)).unwrap();
        assert_eq!(decoded(&out)[64], 1);
    }

    #[test]
    fn test_parity_bits_pass_through() {
        let zero = transform_erc191_signature(&signature_with_v(0)).unwrap();
        let legacy = transform_erc191_signature(&signature_with_v(27)).unwrap();
        assert_eq!(zero, legacy);

        let one = transform_erc191_signature(&signature_with_v(1)).unwrap();
        assert_eq!(decoded(&one)[64], 1);
    }

    #[test]
    fn test_without_0x_prefix() {
        let sig = signature_with_v(28);
        let with = transform_erc191_signature(&sig).unwrap();
        let without = transform_erc191_signature(&sig[2..]).unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_invalid_recovery_byte() {
        let err = transform_erc191_signature(&signature_with_v(29)).unwrap_err();
        assert!(matches!(err, SignatureError::InvalidRecoveryByte(29)));
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            transform_erc191_signature("0xzz"),
            Err(SignatureError::InvalidHex(_))
        ));
        assert!(matches!(
            transform_erc191_signature("0x"),
            Err(SignatureError::Empty)
        ));
    }
}
