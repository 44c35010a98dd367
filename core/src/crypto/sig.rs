// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Transfer signatures
//!
//! Custody transfers between participants of the supply chain are authorized off-chain with an
//! [EIP-712](https://eips.ethereum.org/EIPS/eip-712) signature over a `Transfer` message, which the
//! contract checks before moving the token.
//!
//! The signing domain binds signatures to one deployment. Its chain ID and verifying contract have
//! no default value and must always be provided by the caller.

use crate::crypto::error::CryptoError;
use crate::crypto::hash::{keccak256, HashValue};
use chrono::Utc;
use ethers_core::abi::{self, Token};
use ethers_core::k256::ecdsa::SigningKey;
use ethers_core::types::transaction::eip712::{EIP712Domain, Eip712};
use ethers_core::types::{Address, Bytes, Signature, H256, U256};
use ethers_core::utils::secret_key_to_address;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

/// Default name of the signing domain.
pub const DEFAULT_DOMAIN_NAME: &str = "MedicineSupplyChain";

/// Default version of the signing domain.
pub const DEFAULT_DOMAIN_VERSION: &str = "1.0";

/// EIP-712 type of the transfer message.
pub const TRANSFER_TYPE: &str =
    "Transfer(address from,address to,uint256 tokenId,uint256 timestamp)";

/// Length in bytes of a serialized signature (`r || s || v`).
pub const SIGNATURE_LEN: usize = 65;

/// Offset added to the recovery id to obtain `v`.
const RECOVERY_ID_OFFSET: u64 = 27;

/// EIP-712 domain of a supply chain deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct SigningDomain {
    #[getset(get = "pub")]
    name: String,
    #[getset(get = "pub")]
    version: String,
    #[getset(get_copy = "pub")]
    chain_id: u64,
    #[getset(get_copy = "pub")]
    verifying_contract: Address,
}

impl SigningDomain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }

    /// Returns the domain as understood by `ethers`.
    pub fn to_eip712(&self) -> EIP712Domain {
        EIP712Domain {
            name: Some(self.name.clone()),
            version: Some(self.version.clone()),
            chain_id: Some(U256::from(self.chain_id)),
            verifying_contract: Some(self.verifying_contract),
            salt: None,
        }
    }

    /// Computes the domain separator, `hashStruct(eip712Domain)`.
    pub fn separator(&self) -> HashValue {
        HashValue::new(self.to_eip712().separator())
    }
}

/// Transfer of a token from its current holder to the next participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, CopyGetters)]
#[serde(rename_all = "camelCase")]
#[getset(get_copy = "pub")]
pub struct Transfer {
    from: Address,
    to: Address,
    token_id: U256,
    timestamp: U256,
}

impl Transfer {
    pub fn new(from: Address, to: Address, token_id: U256, timestamp: U256) -> Self {
        Self {
            from,
            to,
            token_id,
            timestamp,
        }
    }
}

/// A transfer bound to the domain it is signed for.
struct TypedTransfer<'a> {
    domain: &'a SigningDomain,
    transfer: &'a Transfer,
}

impl Eip712 for TypedTransfer<'_> {
    type Error = CryptoError;

    fn domain(&self) -> Result<EIP712Domain, Self::Error> {
        Ok(self.domain.to_eip712())
    }

    fn type_hash() -> Result<[u8; 32], Self::Error> {
        Ok(keccak256(TRANSFER_TYPE.as_bytes()).hash())
    }

    fn struct_hash(&self) -> Result<[u8; 32], Self::Error> {
        let encoded = abi::encode(&[
            Token::FixedBytes(Self::type_hash()?.to_vec()),
            Token::Address(self.transfer.from),
            Token::Address(self.transfer.to),
            Token::Uint(self.transfer.token_id),
            Token::Uint(self.transfer.timestamp),
        ]);

        Ok(keccak256(&encoded).hash())
    }
}

/// Computes the digest that is actually signed for a transfer,
/// `keccak256("\x19\x01" || domainSeparator || hashStruct(transfer))`.
///
/// # Arguments
///
/// * `domain` - The signing domain.
/// * `transfer` - The transfer message.
///
/// # Returns
///
/// The EIP-712 digest of the transfer.
pub fn transfer_digest(
    domain: &SigningDomain,
    transfer: &Transfer,
) -> Result<HashValue, CryptoError> {
    TypedTransfer { domain, transfer }
        .encode_eip712()
        .map(HashValue::new)
}

/// A signature along with its split components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct TransferSignature {
    /// The serialized signature, `r || s || v`.
    #[getset(get = "pub")]
    signature: Bytes,
    #[getset(get_copy = "pub")]
    v: u64,
    #[getset(get_copy = "pub")]
    r: H256,
    #[getset(get_copy = "pub")]
    s: H256,
}

impl From<Signature> for TransferSignature {
    fn from(signature: Signature) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        signature.r.to_big_endian(&mut r);
        signature.s.to_big_endian(&mut s);

        Self {
            signature: Bytes::from(signature.to_vec()),
            v: signature.v,
            r: H256::from(r),
            s: H256::from(s),
        }
    }
}

/// A transfer along with its signature, as handed to the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct SignedTransfer {
    transfer: Transfer,
    signature: TransferSignature,
}

impl SignedTransfer {
    pub const fn new(transfer: Transfer, signature: TransferSignature) -> Self {
        Self {
            transfer,
            signature,
        }
    }
}

/// Parses a hexadecimal private key, with or without its `0x` prefix.
pub fn signing_key_from_hex(private_key: &str) -> Result<SigningKey, CryptoError> {
    let stripped = private_key.strip_prefix("0x").unwrap_or(private_key);
    let bytes =
        hex::decode(stripped).map_err(|err| CryptoError::InvalidKey { source: err.into() })?;

    SigningKey::from_slice(&bytes).map_err(|err| CryptoError::InvalidKey { source: err.into() })
}

/// Returns the address controlled by a private key.
pub fn signer_address(key: &SigningKey) -> Address {
    secret_key_to_address(key)
}

/// Signs a transfer.
///
/// # Arguments
///
/// * `domain` - The signing domain.
/// * `transfer` - The transfer to authorize.
/// * `key` - The private key of the signer.
///
/// # Returns
///
/// The signature and its `v`, `r`, `s` components, with `v` in `{27, 28}`.
pub fn sign_transfer(
    domain: &SigningDomain,
    transfer: &Transfer,
    key: &SigningKey,
) -> Result<TransferSignature, CryptoError> {
    let digest = transfer_digest(domain, transfer)?;

    let (signature, recovery_id) = key
        .sign_prehash_recoverable(digest.as_ref())
        .map_err(|err| CryptoError::Signing { source: err.into() })?;

    let bytes = signature.to_bytes();
    let signature = Signature {
        r: U256::from_big_endian(&bytes[..32]),
        s: U256::from_big_endian(&bytes[32..]),
        v: u64::from(recovery_id.to_byte()) + RECOVERY_ID_OFFSET,
    };

    Ok(TransferSignature::from(signature))
}

/// Recovers the address that signed a transfer.
///
/// # Arguments
///
/// * `domain` - The signing domain.
/// * `transfer` - The transfer that was signed.
/// * `signature` - The serialized signature, `r || s || v`.
///
/// # Returns
///
/// The address of the signer. A signature made over another message or another domain recovers to
/// an unrelated address.
pub fn recover_transfer_signer(
    domain: &SigningDomain,
    transfer: &Transfer,
    signature: &[u8],
) -> Result<Address, CryptoError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(CryptoError::Recovery {
            source: format!(
                "expected a signature of {} bytes, got {}",
                SIGNATURE_LEN,
                signature.len()
            )
            .into(),
        });
    }

    let signature =
        Signature::try_from(signature).map_err(|err| CryptoError::Recovery { source: err.into() })?;
    let digest = transfer_digest(domain, transfer)?;

    signature
        .recover(H256::from(digest.hash()))
        .map_err(|err| CryptoError::Recovery { source: err.into() })
}

/// Checks that a transfer was signed by its `from` address.
pub fn verify_transfer_signature(
    domain: &SigningDomain,
    transfer: &Transfer,
    signature: &[u8],
) -> Result<bool, CryptoError> {
    Ok(recover_transfer_signer(domain, transfer, signature)? == transfer.from)
}

/// Signs the hand-off of a token from a manufacturer to a distributor, stamped with the current
/// time.
///
/// # Arguments
///
/// * `domain` - The signing domain.
/// * `manufacturer` - The private key of the manufacturer, current holder of the token.
/// * `distributor` - The address of the distributor.
/// * `token_id` - The token being handed off.
///
/// # Returns
///
/// The transfer and its signature.
pub fn manufacturer_to_distributor(
    domain: &SigningDomain,
    manufacturer: &SigningKey,
    distributor: Address,
    token_id: U256,
) -> Result<SignedTransfer, CryptoError> {
    let timestamp = u64::try_from(Utc::now().timestamp())
        .map_err(|err| CryptoError::Internal { source: err.into() })?;
    let transfer = Transfer::new(
        signer_address(manufacturer),
        distributor,
        token_id,
        U256::from(timestamp),
    );
    let signature = sign_transfer(domain, &transfer, manufacturer)?;

    Ok(SignedTransfer::new(transfer, signature))
}
