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

//! Relay key-exchange key pair.

use super::{
	crypto::{derive_kx_public, unwrap_key, KxPublic, SymmetricKey, WrappedKey, KX_SECRET_SIZE},
	error::Error,
};
use rand::{CryptoRng, Rng};
use zeroize::Zeroizing;

pub struct KxPair {
	/// Boxed to avoid leaving copies of the secret key around in memory if `KxPair` is moved.
	secret: Box<Zeroizing<[u8; KX_SECRET_SIZE]>>,
	public: KxPublic,
}

impl KxPair {
	pub fn gen(rng: &mut (impl Rng + CryptoRng)) -> Self {
		let mut secret = [0; KX_SECRET_SIZE];
		rng.fill_bytes(&mut secret);
		secret.into()
	}

	/// Rebuild a key pair from the hex export produced by [`KxPair::export_secret`].
	pub fn import_secret(encoded: &str) -> Result<Self, Error> {
		let mut secret = Box::new(Zeroizing::new([0; KX_SECRET_SIZE]));
		hex::decode_to_slice(encoded, &mut secret[..]).map_err(|_| Error::InvalidKey)?;
		let public = derive_kx_public(&secret);
		Ok(Self { secret, public })
	}

	pub fn public(&self) -> &KxPublic {
		&self.public
	}

	/// Lowercase hex export of the secret key. Only meant for test and debug introspection.
	pub fn export_secret(&self) -> String {
		hex::encode(&self.secret[..])
	}

	/// Open a per-hop key that was sealed to our public key.
	pub fn unwrap_key(&self, wrapped: &WrappedKey) -> Result<SymmetricKey, Error> {
		unwrap_key(&self.secret, wrapped)
	}
}

impl From<[u8; KX_SECRET_SIZE]> for KxPair {
	fn from(secret: [u8; KX_SECRET_SIZE]) -> Self {
		// We box the secret to avoid leaving copies of it in memory when the KxPair is moved. Note
		// that we will likely leave some copies on the stack here.
		let secret = Box::new(Zeroizing::new(secret));
		let public = derive_kx_public(&secret);
		Self { secret, public }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::crypto::wrap_key;

	#[test]
	fn export_import_round_trip() {
		let kx_pair = KxPair::gen(&mut rand::thread_rng());
		let imported = KxPair::import_secret(&kx_pair.export_secret()).unwrap();
		assert_eq!(imported.public(), kx_pair.public());
	}

	#[test]
	fn import_rejects_bad_encoding() {
		assert!(matches!(KxPair::import_secret("zz"), Err(Error::InvalidKey)));
		assert!(matches!(KxPair::import_secret(&"ab".repeat(31)), Err(Error::InvalidKey)));
	}

	#[test]
	fn unwrap_sealed_key() {
		let mut rng = rand::thread_rng();
		let kx_pair = KxPair::gen(&mut rng);
		let key = SymmetricKey::gen(&mut rng);
		let wrapped = wrap_key(&mut rng, kx_pair.public(), &key).unwrap();
		assert_eq!(kx_pair.unwrap_key(&wrapped).unwrap().as_bytes(), key.as_bytes());
	}
}
