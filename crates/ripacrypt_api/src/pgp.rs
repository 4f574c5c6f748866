//! OpenPGP key generation, encryption and decryption.
//!
//! Ciphertext crossing the wire is the base64 (standard alphabet, padded)
//! encoding of a binary OpenPGP message. Keys are exchanged and stored as
//! ascii armored text.

use crate::*;
use base64::Engine;
use sequoia_openpgp as openpgp;
use openpgp::cert::{CertBuilder, CertParser, CipherSuite};
use openpgp::crypto::{KeyPair, SessionKey};
use openpgp::packet::{UserID, PKESK, SKESK};
use openpgp::parse::stream::{
    DecryptionHelper, DecryptorBuilder, MessageStructure, VerificationHelper,
};
use openpgp::parse::Parse;
use openpgp::policy::StandardPolicy;
use openpgp::serialize::stream::{Encryptor, LiteralWriter, Message};
use openpgp::serialize::SerializeInto;
use openpgp::types::SymmetricAlgorithm;
use openpgp::{Cert, Fingerprint, KeyHandle, KeyID};
use std::collections::HashMap;
use std::io::Write;
use zeroize::Zeroizing;

/// Domain used for generated throwaway identity emails.
pub const GENERATED_EMAIL_DOMAIN: &str = "clients.ripacrypt.download";

const EMAIL_ALPHABET: [char; 52] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n',
    'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
    'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P',
    'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// A random `<24 letters>@clients.ripacrypt.download` address.
pub fn random_identity_email() -> String {
    format!(
        "{}@{}",
        nanoid::nanoid!(24, &EMAIL_ALPHABET),
        GENERATED_EMAIL_DOMAIN
    )
}

/// The identity a generated key is issued to.
/// We recommend against setting any of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcIdentity {
    /// Display name, "Anonymous" by default.
    pub name: String,
    /// Optional user id comment.
    pub comment: Option<String>,
    /// Email, a random address at [GENERATED_EMAIL_DOMAIN] if unset.
    pub email: Option<String>,
}

impl Default for RcIdentity {
    fn default() -> Self {
        Self {
            name: "Anonymous".to_string(),
            comment: None,
            email: None,
        }
    }
}

/// Public key algorithm for generated keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RcKeyAlgorithm {
    /// RSA 2048, what the service has always issued challenges against.
    #[default]
    Rsa2k,
    /// RSA 3072.
    Rsa3k,
    /// RSA 4096.
    Rsa4k,
    /// Ed25519 / Curve25519.
    Cv25519,
}

impl From<RcKeyAlgorithm> for CipherSuite {
    fn from(a: RcKeyAlgorithm) -> Self {
        match a {
            RcKeyAlgorithm::Rsa2k => CipherSuite::RSA2k,
            RcKeyAlgorithm::Rsa3k => CipherSuite::RSA3k,
            RcKeyAlgorithm::Rsa4k => CipherSuite::RSA4k,
            RcKeyAlgorithm::Cv25519 => CipherSuite::Cv25519,
        }
    }
}

/// Armored key material for an account.
pub struct RcKeyPair {
    /// Armored public key, the only half sent to the service.
    pub public_key: String,
    /// Armored private key, never leaves the local machine.
    pub private_key: Zeroizing<String>,
    /// Upper case hex key id of the primary key.
    pub fingerprint: String,
}

impl std::fmt::Debug for RcKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RcKeyPair")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Generate a new self-signed key pair with signing and encryption
/// subkeys for the given identity.
pub fn generate_key_pair(
    identity: &RcIdentity,
    algorithm: RcKeyAlgorithm,
) -> RcResult<RcKeyPair> {
    let gen_err = |e: anyhow::Error| RcError::KeyGeneration(e.to_string());

    let email = identity
        .email
        .clone()
        .filter(|e| !e.is_empty())
        .unwrap_or_else(random_identity_email);
    let name = Some(identity.name.as_str()).filter(|n| !n.is_empty());
    let comment = identity.comment.as_deref().filter(|c| !c.is_empty());
    let userid =
        UserID::from_address(name, comment, email.as_str()).map_err(gen_err)?;

    tracing::debug!(?algorithm, %email, "generating key pair");

    let (cert, _revocation) =
        CertBuilder::general_purpose(CipherSuite::from(algorithm), Some(userid))
            .set_validity_period(Option::<std::time::Duration>::None)
            .generate()
            .map_err(gen_err)?;

    let public_key = armor_string(cert.armored().to_vec()).map_err(gen_err)?;
    let private_key = Zeroizing::new(
        armor_string(cert.as_tsk().armored().to_vec()).map_err(gen_err)?,
    );
    let fingerprint = cert.keyid().to_hex();

    tracing::info!(%fingerprint, "generated key pair");

    Ok(RcKeyPair {
        public_key,
        private_key,
        fingerprint,
    })
}

fn armor_string(
    armored: openpgp::Result<Vec<u8>>,
) -> openpgp::Result<String> {
    Ok(String::from_utf8(armored?)?)
}

fn parse_key_ring(armored: &str) -> openpgp::Result<Vec<Cert>> {
    let certs = CertParser::from_bytes(armored.as_bytes())?
        .collect::<openpgp::Result<Vec<Cert>>>()?;
    if certs.is_empty() {
        return Err(openpgp::Error::InvalidArgument(
            "key ring contains no keys".into(),
        )
        .into());
    }
    Ok(certs)
}

/// Parse an armored public key (ring) and return the short fingerprint
/// (upper case hex key id) of the first key's primary key.
pub fn public_key_fingerprint(public_key: &str) -> RcResult<String> {
    let certs =
        parse_key_ring(public_key).map_err(|e| RcError::KeyParse(e.to_string()))?;
    Ok(certs[0].keyid().to_hex())
}

/// Encrypt `plaintext` to every encryption capable key in the armored
/// public key ring, returning the base64 encoded binary message.
// Encryptor is deprecated in favour of Encryptor2 on newer 1.x releases
#[allow(deprecated)]
pub fn encrypt_to_public_key(
    public_key: &str,
    plaintext: &[u8],
) -> RcResult<String> {
    let enc_err = |e: anyhow::Error| RcError::Encryption(e.to_string());

    let certs =
        parse_key_ring(public_key).map_err(|e| RcError::KeyParse(e.to_string()))?;

    let policy = &StandardPolicy::new();
    let recipients = certs
        .iter()
        .flat_map(|cert| {
            cert.keys()
                .with_policy(policy, None)
                .supported()
                .alive()
                .revoked(false)
                .for_transport_encryption()
                .for_storage_encryption()
        })
        .collect::<Vec<_>>();
    if recipients.is_empty() {
        return Err(RcError::Encryption(
            "public key has no usable encryption key".into(),
        ));
    }

    let mut sink = Vec::new();
    {
        let message = Message::new(&mut sink);
        let message = Encryptor::for_recipients(message, recipients)
            .build()
            .map_err(enc_err)?;
        let mut message = LiteralWriter::new(message).build().map_err(enc_err)?;
        message
            .write_all(plaintext)
            .map_err(|e| RcError::Encryption(e.to_string()))?;
        message.finalize().map_err(enc_err)?;
    }

    Ok(base64::prelude::BASE64_STANDARD.encode(&sink))
}

/// Base64 decode `message` and open it with the armored private key ring.
/// The literal body is returned without any signature verification.
pub fn decrypt_with_private_key(
    private_key: &str,
    message: &str,
) -> RcResult<Vec<u8>> {
    let dec_err = |e: anyhow::Error| RcError::Decryption(e.to_string());

    let message = base64::prelude::BASE64_STANDARD
        .decode(message.trim())
        .map_err(|e| RcError::Decryption(format!("invalid base64: {e}")))?;

    let certs = parse_key_ring(private_key).map_err(|e| {
        RcError::Decryption(format!("cannot parse private key: {e}"))
    })?;

    let policy = StandardPolicy::new();
    let helper = PrivDecryptHelper::new(&policy, &certs).map_err(dec_err)?;

    let mut decryptor = DecryptorBuilder::from_bytes(&message)
        .map_err(dec_err)?
        .with_policy(&policy, None, helper)
        .map_err(dec_err)?;

    let mut plaintext = Vec::new();
    std::io::copy(&mut decryptor, &mut plaintext)
        .map_err(|e| RcError::Decryption(e.to_string()))?;

    Ok(plaintext)
}

// -- private -- //

struct PrivDecryptHelper {
    keys: HashMap<KeyID, (Fingerprint, KeyPair)>,
}

impl PrivDecryptHelper {
    fn new(policy: &StandardPolicy<'_>, certs: &[Cert]) -> openpgp::Result<Self> {
        let mut keys = HashMap::new();
        for cert in certs {
            for ka in cert
                .keys()
                .unencrypted_secret()
                .with_policy(policy, None)
                .supported()
                .for_storage_encryption()
                .for_transport_encryption()
            {
                let key = ka.key();
                keys.insert(
                    key.keyid(),
                    (key.fingerprint(), key.clone().into_keypair()?),
                );
            }
        }
        if keys.is_empty() {
            return Err(openpgp::Error::InvalidArgument(
                "private key ring has no unencrypted decryption key".into(),
            )
            .into());
        }
        Ok(Self { keys })
    }
}

impl VerificationHelper for PrivDecryptHelper {
    fn get_certs(&mut self, _ids: &[KeyHandle]) -> openpgp::Result<Vec<Cert>> {
        Ok(Vec::new())
    }

    fn check(&mut self, _structure: MessageStructure) -> openpgp::Result<()> {
        Ok(())
    }
}

impl DecryptionHelper for PrivDecryptHelper {
    fn decrypt<D>(
        &mut self,
        pkesks: &[PKESK],
        _skesks: &[SKESK],
        sym_algo: Option<SymmetricAlgorithm>,
        mut decrypt: D,
    ) -> openpgp::Result<Option<Fingerprint>>
    where
        D: FnMut(SymmetricAlgorithm, &SessionKey) -> bool,
    {
        for pkesk in pkesks {
            let recipient = pkesk.recipient();
            for (keyid, (fingerprint, pair)) in self.keys.iter_mut() {
                if recipient != keyid && !recipient.is_wildcard() {
                    continue;
                }
                if pkesk
                    .decrypt(pair, sym_algo)
                    .map(|(algo, session_key)| decrypt(algo, &session_key))
                    .unwrap_or(false)
                {
                    return Ok(Some(fingerprint.clone()));
                }
            }
        }
        Err(openpgp::Error::MissingSessionKey(
            "no private key can open this message".into(),
        )
        .into())
    }
}
