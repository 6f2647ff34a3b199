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

//! Relay node. Peels one layer off each incoming envelope and forwards the remainder.

use super::{
	config::Config,
	directory::Node,
	envelope::peel,
	error::Error,
	kx_pair::KxPair,
	transport::Transport,
	Address, NodeId,
};
use parking_lot::Mutex;
use rand::{CryptoRng, Rng};

/// Diagnostic fields, overwritten by every incoming message. Last writer wins.
#[derive(Default)]
struct RelayState {
	last_received_encrypted_message: Option<Vec<u8>>,
	last_received_decrypted_message: Option<Vec<u8>>,
	last_message_destination: Option<Address>,
}

pub struct RelayNode {
	id: NodeId,
	address: Address,
	log_target: &'static str,
	kx_pair: KxPair,
	state: Mutex<RelayState>,
}

impl RelayNode {
	/// Create a relay with a freshly generated key pair.
	pub fn new(
		id: NodeId,
		config: &Config,
		rng: &mut (impl Rng + CryptoRng),
	) -> Result<Self, Error> {
		Self::with_kx_pair(id, config, KxPair::gen(rng))
	}

	pub fn with_kx_pair(id: NodeId, config: &Config, kx_pair: KxPair) -> Result<Self, Error> {
		Ok(Self {
			id,
			address: config.relay_address(id)?,
			log_target: config.log_target,
			kx_pair,
			state: Mutex::new(RelayState::default()),
		})
	}

	pub fn id(&self) -> NodeId {
		self.id
	}

	/// Address this relay's message endpoint is bound at.
	pub fn address(&self) -> Address {
		self.address
	}

	/// Directory entry for this relay.
	pub fn node(&self) -> Node {
		Node { id: self.id, public_key: *self.kx_pair.public() }
	}

	pub fn status(&self) -> &'static str {
		"live"
	}

	/// Handle one incoming envelope: peel our layer, then forward the remainder unchanged to the
	/// address in the layer's destination token.
	///
	/// The relay learns nothing beyond the next hop. It does not know its position in the circuit
	/// or whether the remainder is another envelope or plaintext.
	pub fn handle_incoming(&self, blob: Vec<u8>, transport: &dyn Transport) -> Result<(), Error> {
		self.state.lock().last_received_encrypted_message = Some(blob.clone());

		let layer = peel(&self.kx_pair, &blob).map_err(|e| {
			log::debug!(target: self.log_target, "Relay {}: failed to peel message: {}", self.id, e);
			e
		})?;
		self.state.lock().last_received_decrypted_message = Some(layer.as_bytes().to_vec());

		let (destination, remainder) = layer.split().map_err(|e| {
			log::debug!(target: self.log_target, "Relay {}: bad destination token: {}", self.id, e);
			e
		})?;
		self.state.lock().last_message_destination = Some(destination);

		log::debug!(
			target: self.log_target,
			"Relay {}: forwarding {} bytes to {}",
			self.id,
			remainder.len(),
			destination
		);
		transport
			.post_message(destination, remainder.to_vec())
			.map_err(|source| Error::Forward { address: destination, source })
	}

	pub fn last_received_encrypted_message(&self) -> Option<Vec<u8>> {
		self.state.lock().last_received_encrypted_message.clone()
	}

	pub fn last_received_decrypted_message(&self) -> Option<Vec<u8>> {
		self.state.lock().last_received_decrypted_message.clone()
	}

	pub fn last_message_destination(&self) -> Option<Address> {
		self.state.lock().last_message_destination
	}

	/// Hex export of the relay's secret key. Test and debug introspection only.
	pub fn private_key(&self) -> String {
		self.kx_pair.export_secret()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::{
		crypto::WRAPPED_KEY_SIZE,
		envelope::seal,
		token::prepend_token,
		transport::{tests::RecordingTransport, TransportError},
	};

	fn relay(id: NodeId) -> RelayNode {
		RelayNode::new(id, &Config::default(), &mut rand::thread_rng()).unwrap()
	}

	#[test]
	fn forwards_remainder() {
		let relay = relay(1);
		let transport = RecordingTransport::default();
		let layer = prepend_token(4002, b"inner envelope").unwrap();
		let blob = seal(&mut rand::thread_rng(), &relay.node().public_key, &layer).unwrap();

		relay.handle_incoming(blob.clone(), &transport).unwrap();

		assert_eq!(*transport.posted.lock(), vec![(4002, b"inner envelope".to_vec())]);
		assert_eq!(relay.last_received_encrypted_message(), Some(blob));
		assert_eq!(relay.last_received_decrypted_message(), Some(layer));
		assert_eq!(relay.last_message_destination(), Some(4002));
	}

	#[test]
	fn short_blob_is_malformed() {
		let relay = relay(1);
		let transport = RecordingTransport::default();
		let blob = vec![7; WRAPPED_KEY_SIZE - 1];

		assert!(matches!(
			relay.handle_incoming(blob.clone(), &transport),
			Err(Error::MalformedEnvelope(_))
		));
		assert_eq!(relay.last_received_encrypted_message(), Some(blob));
		assert_eq!(relay.last_received_decrypted_message(), None);
		assert!(transport.posted.lock().is_empty());
	}

	#[test]
	fn envelope_for_another_relay() {
		let relay_a = relay(1);
		let relay_b = relay(2);
		let transport = RecordingTransport::default();
		let layer = prepend_token(3000, b"hello").unwrap();
		let blob = seal(&mut rand::thread_rng(), &relay_b.node().public_key, &layer).unwrap();

		assert!(matches!(relay_a.handle_incoming(blob, &transport), Err(Error::Decryption(_))));
		assert_eq!(relay_a.last_message_destination(), None);
		assert!(transport.posted.lock().is_empty());
	}

	#[test]
	fn missing_token_is_malformed() {
		let _ = env_logger::try_init();
		let relay = relay(1);
		let transport = RecordingTransport::default();
		let blob = seal(&mut rand::thread_rng(), &relay.node().public_key, b"hello").unwrap();

		assert!(matches!(
			relay.handle_incoming(blob, &transport),
			Err(Error::MalformedEnvelope(_))
		));
		assert_eq!(relay.last_received_decrypted_message(), Some(b"hello".to_vec()));
		assert_eq!(relay.last_message_destination(), None);

		let blob =
			seal(&mut rand::thread_rng(), &relay.node().public_key, b"00000x4001inner").unwrap();
		assert!(matches!(
			relay.handle_incoming(blob, &transport),
			Err(Error::MalformedEnvelope(_))
		));
		assert_eq!(relay.last_message_destination(), None);
		assert!(transport.posted.lock().is_empty());
	}

	#[test]
	fn unreachable_next_hop() {
		let relay = relay(1);
		let transport = RecordingTransport { unreachable: vec![4009], ..Default::default() };
		let layer = prepend_token(4009, b"inner").unwrap();
		let blob = seal(&mut rand::thread_rng(), &relay.node().public_key, &layer).unwrap();

		assert_eq!(
			relay.handle_incoming(blob, &transport),
			Err(Error::Forward { address: 4009, source: TransportError::Unreachable(4009) })
		);
		// Diagnostics are recorded even though forwarding failed
		assert_eq!(relay.last_message_destination(), Some(4009));
	}

	#[test]
	fn diagnostics_overwritten() {
		let relay = relay(1);
		let transport = RecordingTransport::default();
		let mut rng = rand::thread_rng();
		for destination in [3001, 3002] {
			let layer = prepend_token(destination, b"m").unwrap();
			let blob = seal(&mut rng, &relay.node().public_key, &layer).unwrap();
			relay.handle_incoming(blob, &transport).unwrap();
		}
		assert_eq!(relay.last_message_destination(), Some(3002));
		assert_eq!(relay.last_received_decrypted_message(), Some(b"0000003002m".to_vec()));
	}

	#[test]
	fn private_key_matches_public() {
		let relay = relay(5);
		let imported = KxPair::import_secret(&relay.private_key()).unwrap();
		assert_eq!(imported.public(), &relay.node().public_key);
		assert_eq!(relay.address(), 4005);
		assert_eq!(relay.status(), "live");
	}
}
