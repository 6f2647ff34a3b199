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

//! Envelope format.
//!
//! An envelope is the blob handed to a relay:
//!
//! - A [`WrappedKey`] of exactly [`WRAPPED_KEY_SIZE`] bytes: the per-hop [`SymmetricKey`] sealed to
//!   the relay's public key.
//! - The body: the layer encrypted under the per-hop key, followed by its MAC.
//!
//! The decrypted body is a [`DecryptedLayer`]: a destination token followed by the opaque
//! remainder, which is either the next envelope or the final plaintext.

use super::{
	crypto::{
		decrypt_body, encrypt_body, wrap_key, KxPublic, SymmetricKey, WrappedKey, WRAPPED_KEY_SIZE,
	},
	error::Error,
	kx_pair::KxPair,
	token::decode_token,
	Address,
};
use arrayref::array_ref;
use rand::{CryptoRng, Rng};

/// One layer of an envelope once the relay's encryption has been removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptedLayer(Vec<u8>);

impl DecryptedLayer {
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	/// Address in the leading destination token and the remainder to forward there.
	pub fn split(&self) -> Result<(Address, &[u8]), Error> {
		decode_token(&self.0)
	}
}

/// Encrypt `layer` for the holder of `their_kx_public` under a fresh single-use key.
pub fn seal(
	rng: &mut (impl Rng + CryptoRng),
	their_kx_public: &KxPublic,
	layer: &[u8],
) -> Result<Vec<u8>, Error> {
	let key = SymmetricKey::gen(rng);
	let wrapped = wrap_key(rng, their_kx_public, &key)?;
	let body = encrypt_body(&key, layer);

	let mut envelope = Vec::with_capacity(WRAPPED_KEY_SIZE + body.len());
	envelope.extend_from_slice(&wrapped);
	envelope.extend_from_slice(&body);
	Ok(envelope)
}

/// Split an envelope into its wrapped key and encrypted body.
pub fn split(envelope: &[u8]) -> Result<(&WrappedKey, &[u8]), Error> {
	if envelope.len() < WRAPPED_KEY_SIZE {
		return Err(Error::MalformedEnvelope("shorter than a wrapped key"))
	}
	let (wrapped, body) = envelope.split_at(WRAPPED_KEY_SIZE);
	Ok((array_ref![wrapped, 0, WRAPPED_KEY_SIZE], body))
}

/// Remove exactly one layer of encryption using our key pair.
pub fn peel(kx_pair: &KxPair, envelope: &[u8]) -> Result<DecryptedLayer, Error> {
	let (wrapped, body) = split(envelope)?;
	let key = kx_pair.unwrap_key(wrapped)?;
	Ok(DecryptedLayer(decrypt_body(&key, body)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::{crypto::MAC_SIZE, token::prepend_token};

	#[test]
	fn envelope_layout() {
		let mut rng = rand::thread_rng();
		let kx_pair = KxPair::gen(&mut rng);
		let layer = prepend_token(3000, b"hello").unwrap();

		let envelope = seal(&mut rng, kx_pair.public(), &layer).unwrap();
		assert_eq!(envelope.len(), WRAPPED_KEY_SIZE + layer.len() + MAC_SIZE);

		let peeled = peel(&kx_pair, &envelope).unwrap();
		assert_eq!(peeled.as_bytes(), b"0000003000hello");
		assert_eq!(peeled.split().unwrap(), (3000, &b"hello"[..]));
	}

	#[test]
	fn short_envelope() {
		let kx_pair = KxPair::gen(&mut rand::thread_rng());
		assert!(matches!(peel(&kx_pair, &[]), Err(Error::MalformedEnvelope(_))));
		assert!(matches!(
			peel(&kx_pair, &[0; WRAPPED_KEY_SIZE - 1]),
			Err(Error::MalformedEnvelope(_))
		));
		// Long enough to split, but garbage
		assert!(matches!(peel(&kx_pair, &[0; WRAPPED_KEY_SIZE]), Err(Error::Decryption(_))));
	}

	#[test]
	fn wrong_key_pair() {
		let mut rng = rand::thread_rng();
		let addressed_to = KxPair::gen(&mut rng);
		let other = KxPair::gen(&mut rng);
		let envelope = seal(&mut rng, addressed_to.public(), b"0000004002payload").unwrap();
		assert!(matches!(peel(&other, &envelope), Err(Error::Decryption(_))));
	}

	#[test]
	fn fresh_key_per_seal() {
		let mut rng = rand::thread_rng();
		let kx_pair = KxPair::gen(&mut rng);
		let first = seal(&mut rng, kx_pair.public(), b"0000003000hello").unwrap();
		let second = seal(&mut rng, kx_pair.public(), b"0000003000hello").unwrap();
		assert_ne!(first, second);
		assert_eq!(peel(&kx_pair, &first).unwrap(), peel(&kx_pair, &second).unwrap());
	}
}
