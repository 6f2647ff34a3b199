// Copyright 2022 Parity Technologies (UK) Ltd.
//
// Permission is hereby granted, free of charge, to any person obtaining a
// copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS
// OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! Key wrapping, secret derivation, MAC computation, and encryption.
//!
//! The asymmetric half seals a per-hop [`SymmetricKey`] to a relay's X25519 public key using a
//! fresh ephemeral key exchange. The symmetric half encrypts a layer body with ChaCha20 and
//! authenticates it with a keyed BLAKE2b MAC. Every key is used to encrypt exactly one message,
//! so the stream cipher nonce is always zero.

use super::error::Error;
use arrayref::{array_ref, array_refs, mut_array_refs};
use blake2::{
	digest::{
		consts::{U16, U64},
		generic_array::GenericArray, FixedOutput, Mac as DigestMac,
	},
	Blake2bMac,
};
use c2_chacha::{
	stream_cipher::{NewStreamCipher, SyncStreamCipher},
	ChaCha20,
};
use curve25519_dalek::{montgomery::MontgomeryPoint, traits::IsIdentity};
use rand::{CryptoRng, Rng};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

const WRAP_KEYS_PERSONAL: &[u8; 16] = b"onionnet-wrapkey";
const BODY_KEYS_PERSONAL: &[u8; 16] = b"onionnet-body-ky";

/// Size in bytes of a [`KxPublic`].
pub const KX_PUBLIC_SIZE: usize = 32;
/// X25519 public key, published in the directory.
pub type KxPublic = [u8; KX_PUBLIC_SIZE];
/// Size in bytes of an X25519 secret key.
pub const KX_SECRET_SIZE: usize = 32;

pub const MAC_SIZE: usize = 16;
pub type Mac = [u8; MAC_SIZE];

/// Size in bytes of a [`SymmetricKey`].
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Size in bytes of a sealed [`SymmetricKey`]: ephemeral public key, encrypted key, MAC.
pub const WRAPPED_KEY_SIZE: usize = KX_PUBLIC_SIZE + SYMMETRIC_KEY_SIZE + MAC_SIZE;
pub type WrappedKey = [u8; WRAPPED_KEY_SIZE];

const CIPHER_KEY_SIZE: usize = 32;
type CipherKey = [u8; CIPHER_KEY_SIZE];
const MAC_KEY_SIZE: usize = 32;
type MacKey = [u8; MAC_KEY_SIZE];
const DERIVED_KEYS_SIZE: usize = CIPHER_KEY_SIZE + MAC_KEY_SIZE;

////////////////////////////////////////////////////////////////////////////////
// Per-hop symmetric key
////////////////////////////////////////////////////////////////////////////////

/// Single-use symmetric key protecting one layer of one message. Wiped on drop.
pub struct SymmetricKey(Zeroizing<[u8; SYMMETRIC_KEY_SIZE]>);

impl SymmetricKey {
	pub fn gen(rng: &mut (impl Rng + CryptoRng)) -> Self {
		let mut key = Zeroizing::new([0; SYMMETRIC_KEY_SIZE]);
		rng.fill_bytes(&mut key[..]);
		Self(key)
	}

	pub fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
		&self.0
	}

	/// Lowercase hex export.
	pub fn export(&self) -> String {
		hex::encode(&self.0[..])
	}

	pub fn import(encoded: &str) -> Result<Self, Error> {
		let mut key = Zeroizing::new([0; SYMMETRIC_KEY_SIZE]);
		hex::decode_to_slice(encoded, &mut key[..]).map_err(|_| Error::InvalidKey)?;
		Ok(Self(key))
	}
}

impl From<[u8; SYMMETRIC_KEY_SIZE]> for SymmetricKey {
	fn from(key: [u8; SYMMETRIC_KEY_SIZE]) -> Self {
		Self(Zeroizing::new(key))
	}
}

////////////////////////////////////////////////////////////////////////////////
// Key exchange
////////////////////////////////////////////////////////////////////////////////

/// Derive the public key corresponding to a secret key. Clamping is applied to the secret.
pub fn derive_kx_public(kx_secret: &[u8; KX_SECRET_SIZE]) -> KxPublic {
	MontgomeryPoint::mul_base_clamped(*kx_secret).to_bytes()
}

fn derive_kx_shared_secret(
	kx_public: &KxPublic,
	kx_secret: &[u8; KX_SECRET_SIZE],
) -> MontgomeryPoint {
	MontgomeryPoint(*kx_public).mul_clamped(*kx_secret)
}

/// Lowercase hex export of a public key, as published in the directory.
pub fn export_public(kx_public: &KxPublic) -> String {
	hex::encode(kx_public)
}

pub fn import_public(encoded: &str) -> Result<KxPublic, Error> {
	let mut kx_public = [0; KX_PUBLIC_SIZE];
	hex::decode_to_slice(encoded, &mut kx_public).map_err(|_| Error::InvalidKey)?;
	Ok(kx_public)
}

////////////////////////////////////////////////////////////////////////////////
// Secret derivation
////////////////////////////////////////////////////////////////////////////////

struct DerivedKeys(Zeroizing<[u8; DERIVED_KEYS_SIZE]>);

impl DerivedKeys {
	fn new(secret: &[u8], personal: &[u8; 16]) -> Self {
		let mut derived = Zeroizing::new([0; DERIVED_KEYS_SIZE]);
		// Same construction as libsodium's crypto_kdf_derive_from_key, single block
		let h = Blake2bMac::<U64>::new_with_salt_and_personal(
			secret,
			&0usize.to_le_bytes(),
			personal,
		)
		.expect("Key, salt, and personalisation sizes are fixed and small enough");
		h.finalize_into(GenericArray::from_mut_slice(&mut derived[..]));
		Self(derived)
	}

	fn split(&self) -> (&CipherKey, &MacKey) {
		array_refs![&*self.0, CIPHER_KEY_SIZE, MAC_KEY_SIZE]
	}

	fn cipher_key(&self) -> &CipherKey {
		self.split().0
	}

	fn mac_key(&self) -> &MacKey {
		self.split().1
	}
}

fn wrap_keys(ephemeral_public: &KxPublic, shared_secret: &MontgomeryPoint) -> DerivedKeys {
	let mut secret = Zeroizing::new([0; KX_PUBLIC_SIZE * 2]);
	secret[..KX_PUBLIC_SIZE].copy_from_slice(ephemeral_public);
	secret[KX_PUBLIC_SIZE..].copy_from_slice(shared_secret.as_bytes());
	DerivedKeys::new(&secret[..], WRAP_KEYS_PERSONAL)
}

////////////////////////////////////////////////////////////////////////////////
// MAC computation
////////////////////////////////////////////////////////////////////////////////

fn compute_mac(parts: &[&[u8]], key: &MacKey) -> Mac {
	let mut h = Blake2bMac::<U16>::new_from_slice(key).expect("Key size is fixed and small enough");
	for part in parts {
		h.update(part);
	}
	h.finalize().into_bytes().into()
}

fn mac_ok(mac: &Mac, parts: &[&[u8]], key: &MacKey) -> bool {
	compute_mac(parts, key)[..].ct_eq(&mac[..]).into()
}

////////////////////////////////////////////////////////////////////////////////
// Encryption
////////////////////////////////////////////////////////////////////////////////

fn apply_keystream(data: &mut [u8], key: &CipherKey) {
	// Key is only used once, so fine for nonce to be 0
	let mut c = ChaCha20::new(key.into(), &[0; 8].into());
	c.apply_keystream(data);
}

/// Seal `key` to `their_kx_public`. The result is always exactly [`WRAPPED_KEY_SIZE`] bytes.
pub fn wrap_key(
	rng: &mut (impl Rng + CryptoRng),
	their_kx_public: &KxPublic,
	key: &SymmetricKey,
) -> Result<WrappedKey, Error> {
	let mut ephemeral_secret = Zeroizing::new([0; KX_SECRET_SIZE]);
	rng.fill_bytes(&mut ephemeral_secret[..]);
	let ephemeral_public = derive_kx_public(&ephemeral_secret);
	let shared_secret = derive_kx_shared_secret(their_kx_public, &ephemeral_secret);
	if shared_secret.is_identity() {
		// Low-order public key, nothing would protect the wrapped key
		return Err(Error::InvalidKey)
	}
	let keys = wrap_keys(&ephemeral_public, &shared_secret);

	let mut wrapped = [0; WRAPPED_KEY_SIZE];
	let (out_public, out_key, out_mac) =
		mut_array_refs![&mut wrapped, KX_PUBLIC_SIZE, SYMMETRIC_KEY_SIZE, MAC_SIZE];
	*out_public = ephemeral_public;
	out_key.copy_from_slice(key.as_bytes());
	apply_keystream(out_key, keys.cipher_key());
	*out_mac = compute_mac(&[&out_public[..], &out_key[..]], keys.mac_key());
	Ok(wrapped)
}

/// Recover the symmetric key sealed by [`wrap_key`] using our secret key.
pub fn unwrap_key(
	kx_secret: &[u8; KX_SECRET_SIZE],
	wrapped: &WrappedKey,
) -> Result<SymmetricKey, Error> {
	let (ephemeral_public, encrypted_key, mac) =
		array_refs![wrapped, KX_PUBLIC_SIZE, SYMMETRIC_KEY_SIZE, MAC_SIZE];
	let shared_secret = derive_kx_shared_secret(ephemeral_public, kx_secret);
	if shared_secret.is_identity() {
		return Err(Error::Decryption("degenerate key exchange"))
	}
	let keys = wrap_keys(ephemeral_public, &shared_secret);
	if !mac_ok(mac, &[&ephemeral_public[..], &encrypted_key[..]], keys.mac_key()) {
		return Err(Error::Decryption("wrapped key authentication failed"))
	}

	let mut key = Zeroizing::new(*encrypted_key);
	apply_keystream(&mut key[..], keys.cipher_key());
	Ok(SymmetricKey(key))
}

/// Encrypt `plaintext` under `key`. Output is the ciphertext followed by a [`Mac`].
pub fn encrypt_body(key: &SymmetricKey, plaintext: &[u8]) -> Vec<u8> {
	let keys = DerivedKeys::new(key.as_bytes(), BODY_KEYS_PERSONAL);
	let mut body = Vec::with_capacity(plaintext.len() + MAC_SIZE);
	body.extend_from_slice(plaintext);
	apply_keystream(&mut body, keys.cipher_key());
	let mac = compute_mac(&[body.as_slice()], keys.mac_key());
	body.extend_from_slice(&mac);
	body
}

/// Authenticate and decrypt a body produced by [`encrypt_body`].
pub fn decrypt_body(key: &SymmetricKey, body: &[u8]) -> Result<Vec<u8>, Error> {
	if body.len() < MAC_SIZE {
		return Err(Error::Decryption("body shorter than its MAC"))
	}
	let keys = DerivedKeys::new(key.as_bytes(), BODY_KEYS_PERSONAL);
	let (ciphertext, mac) = body.split_at(body.len() - MAC_SIZE);
	if !mac_ok(array_ref![mac, 0, MAC_SIZE], &[ciphertext], keys.mac_key()) {
		return Err(Error::Decryption("body authentication failed"))
	}
	let mut plaintext = ciphertext.to_vec();
	apply_keystream(&mut plaintext, keys.cipher_key());
	Ok(plaintext)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn gen_kx_pair(rng: &mut (impl Rng + CryptoRng)) -> ([u8; KX_SECRET_SIZE], KxPublic) {
		let mut secret = [0; KX_SECRET_SIZE];
		rng.fill_bytes(&mut secret);
		let public = derive_kx_public(&secret);
		(secret, public)
	}

	#[test]
	fn wrap_and_unwrap_key() {
		let mut rng = rand::thread_rng();
		let (secret, public) = gen_kx_pair(&mut rng);
		let key = SymmetricKey::gen(&mut rng);

		let wrapped = wrap_key(&mut rng, &public, &key).unwrap();
		let unwrapped = unwrap_key(&secret, &wrapped).unwrap();
		assert_eq!(unwrapped.as_bytes(), key.as_bytes());
	}

	#[test]
	fn unwrap_with_wrong_secret() {
		let mut rng = rand::thread_rng();
		let (_, public) = gen_kx_pair(&mut rng);
		let (other_secret, _) = gen_kx_pair(&mut rng);
		let key = SymmetricKey::gen(&mut rng);

		let wrapped = wrap_key(&mut rng, &public, &key).unwrap();
		assert!(matches!(unwrap_key(&other_secret, &wrapped), Err(Error::Decryption(_))));
	}

	#[test]
	fn wrapped_key_tampering() {
		let mut rng = rand::thread_rng();
		let (secret, public) = gen_kx_pair(&mut rng);
		let key = SymmetricKey::gen(&mut rng);
		let mut wrapped = wrap_key(&mut rng, &public, &key).unwrap();

		// Corrupt the encrypted key, MAC check should fail
		wrapped[KX_PUBLIC_SIZE] ^= 1;
		assert!(matches!(unwrap_key(&secret, &wrapped), Err(Error::Decryption(_))));

		wrapped[KX_PUBLIC_SIZE] ^= 1;
		assert!(unwrap_key(&secret, &wrapped).is_ok());
	}

	#[test]
	fn low_order_public_rejected() {
		let mut rng = rand::thread_rng();
		let key = SymmetricKey::gen(&mut rng);
		assert_eq!(wrap_key(&mut rng, &[0; KX_PUBLIC_SIZE], &key).err(), Some(Error::InvalidKey));
	}

	#[test]
	fn body_encryption() {
		let mut rng = rand::thread_rng();
		let key = SymmetricKey::gen(&mut rng);
		let plaintext = b"0000003000hello";

		let mut body = encrypt_body(&key, plaintext);
		assert_eq!(body.len(), plaintext.len() + MAC_SIZE);
		assert_ne!(&body[..plaintext.len()], &plaintext[..]);
		assert_eq!(decrypt_body(&key, &body).unwrap(), plaintext);

		body[0] ^= 1;
		assert!(matches!(decrypt_body(&key, &body), Err(Error::Decryption(_))));
	}

	#[test]
	fn body_with_wrong_key() {
		let mut rng = rand::thread_rng();
		let body = encrypt_body(&SymmetricKey::gen(&mut rng), b"hello");
		let other = SymmetricKey::gen(&mut rng);
		assert!(matches!(decrypt_body(&other, &body), Err(Error::Decryption(_))));
		assert!(matches!(decrypt_body(&other, &body[..MAC_SIZE - 1]), Err(Error::Decryption(_))));
	}

	#[test]
	fn empty_body() {
		let key = SymmetricKey::gen(&mut rand::thread_rng());
		let body = encrypt_body(&key, &[]);
		assert_eq!(body.len(), MAC_SIZE);
		assert_eq!(decrypt_body(&key, &body).unwrap(), Vec::<u8>::new());
	}

	#[test]
	fn key_export_import() {
		let mut rng = rand::thread_rng();
		let key = SymmetricKey::gen(&mut rng);
		let exported = key.export();
		assert_eq!(exported.len(), SYMMETRIC_KEY_SIZE * 2);
		assert_eq!(SymmetricKey::import(&exported).unwrap().as_bytes(), key.as_bytes());
		assert_eq!(SymmetricKey::import("not hex").err(), Some(Error::InvalidKey));

		let (_, public) = gen_kx_pair(&mut rng);
		assert_eq!(import_public(&export_public(&public)).unwrap(), public);
		assert_eq!(import_public("abcd").err(), Some(Error::InvalidKey));
	}
}
