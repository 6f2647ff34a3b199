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

//! User endpoint: sends messages through a circuit and records messages delivered to it.

use super::{
	circuit::{build_onion, select_circuit},
	config::Config,
	directory::Directory,
	error::Error,
	transport::Transport,
	Address, NodeId, UserId,
};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[derive(Default)]
struct UserState {
	last_received_message: Option<Vec<u8>>,
	last_sent_message: Option<Vec<u8>>,
	/// Kept for inspection only, never reused for later sends.
	last_circuit: Vec<NodeId>,
}

pub struct User {
	id: UserId,
	address: Address,
	config: Config,
	/// Drives circuit selection and per-hop key generation.
	rng: Mutex<ChaCha20Rng>,
	state: Mutex<UserState>,
}

impl User {
	pub fn new(id: UserId, config: &Config) -> Result<Self, Error> {
		Self::with_rng(id, config, ChaCha20Rng::from_entropy())
	}

	/// User whose circuit choices and keys are reproducible from `seed`.
	pub fn with_seed(id: UserId, config: &Config, seed: u64) -> Result<Self, Error> {
		Self::with_rng(id, config, ChaCha20Rng::seed_from_u64(seed))
	}

	fn with_rng(id: UserId, config: &Config, rng: ChaCha20Rng) -> Result<Self, Error> {
		Ok(Self {
			id,
			address: config.user_address(id)?,
			config: config.clone(),
			rng: Mutex::new(rng),
			state: Mutex::new(UserState::default()),
		})
	}

	pub fn id(&self) -> UserId {
		self.id
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn status(&self) -> &'static str {
		"live"
	}

	/// Send `message` to user `destination_user_id` through a fresh three-relay circuit.
	///
	/// Returns once the entry relay has accepted the onion. Delivery past the entry relay is not
	/// acknowledged. Nothing is sent if the directory lists fewer than three distinct relays.
	pub fn send_message(
		&self,
		message: &[u8],
		destination_user_id: UserId,
		directory: &dyn Directory,
		transport: &dyn Transport,
	) -> Result<(), Error> {
		self.state.lock().last_sent_message = Some(message.to_vec());
		let destination = self.config.user_address(destination_user_id)?;

		let nodes = directory.nodes();
		let (entry, onion) = {
			let mut rng = self.rng.lock();
			let circuit = select_circuit(&mut *rng, &nodes).map_err(|e| {
				log::debug!(target: self.config.log_target, "User {}: {}", self.id, e);
				e
			})?;
			log::trace!(
				target: self.config.log_target,
				"User {}: circuit {:?} to {}",
				self.id,
				circuit.ids(),
				destination
			);
			self.state.lock().last_circuit = circuit.ids();
			let onion = build_onion(&mut *rng, &self.config, &circuit, destination, message)?;
			(self.config.relay_address(circuit.entry().id)?, onion)
		};

		log::debug!(
			target: self.config.log_target,
			"User {}: sending {} bytes to entry relay at {}",
			self.id,
			onion.len(),
			entry
		);
		transport
			.post_message(entry, onion)
			.map_err(|source| Error::Forward { address: entry, source })
	}

	/// Inbound delivery of a plaintext message.
	pub fn receive_message(&self, message: Vec<u8>) {
		log::debug!(
			target: self.config.log_target,
			"User {}: received {} bytes",
			self.id,
			message.len()
		);
		self.state.lock().last_received_message = Some(message);
	}

	pub fn last_received_message(&self) -> Option<Vec<u8>> {
		self.state.lock().last_received_message.clone()
	}

	pub fn last_sent_message(&self) -> Option<Vec<u8>> {
		self.state.lock().last_sent_message.clone()
	}

	/// Ids of the relays used by the last send, entry first. Empty before any circuit was built.
	pub fn last_circuit(&self) -> Vec<NodeId> {
		self.state.lock().last_circuit.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::{
		directory::{Node, Registry},
		kx_pair::KxPair,
		transport::{tests::RecordingTransport, TransportError},
	};

	fn registry_with(count: u32) -> (Registry, Vec<KxPair>) {
		let registry = Registry::new(&Config::default());
		let mut rng = rand::thread_rng();
		let kx_pairs = (1..=count)
			.map(|id| {
				let kx_pair = KxPair::gen(&mut rng);
				registry.register(Node { id, public_key: *kx_pair.public() });
				kx_pair
			})
			.collect();
		(registry, kx_pairs)
	}

	#[test]
	fn insufficient_relays_sends_nothing() {
		for count in 0..3 {
			let (registry, _) = registry_with(count);
			let transport = RecordingTransport::default();
			let user = User::new(0, &Config::default()).unwrap();

			assert_eq!(
				user.send_message(b"hello", 1, &registry, &transport),
				Err(Error::InsufficientRelays { available: count as usize })
			);
			assert!(transport.posted.lock().is_empty());
			assert_eq!(user.last_sent_message(), Some(b"hello".to_vec()));
			assert!(user.last_circuit().is_empty());
		}
	}

	#[test]
	fn posts_onion_to_entry_relay() {
		let (registry, _) = registry_with(5);
		let transport = RecordingTransport::default();
		let user = User::new(0, &Config::default()).unwrap();

		user.send_message(b"hello", 1, &registry, &transport).unwrap();

		let circuit = user.last_circuit();
		assert_eq!(circuit.len(), 3);
		let posted = transport.posted.lock();
		assert_eq!(posted.len(), 1);
		assert_eq!(posted[0].0, 4000 + circuit[0] as Address);
	}

	#[test]
	fn seeded_users_pick_same_circuit() {
		let (registry, _) = registry_with(8);
		let transport = RecordingTransport::default();
		let first = User::with_seed(0, &Config::default(), 42).unwrap();
		let second = User::with_seed(1, &Config::default(), 42).unwrap();

		first.send_message(b"a", 2, &registry, &transport).unwrap();
		second.send_message(b"a", 2, &registry, &transport).unwrap();
		assert_eq!(first.last_circuit(), second.last_circuit());
	}

	#[test]
	fn unreachable_entry() {
		let (registry, _) = registry_with(3);
		let unreachable = (4001..=4003).collect();
		let transport = RecordingTransport { unreachable, ..Default::default() };
		let user = User::new(0, &Config::default()).unwrap();

		let result = user.send_message(b"hello", 1, &registry, &transport);
		let entry = 4000 + user.last_circuit()[0] as Address;
		assert_eq!(
			result,
			Err(Error::Forward { address: entry, source: TransportError::Unreachable(entry) })
		);
	}

	#[test]
	fn receive_records_message() {
		let user = User::new(3, &Config::default()).unwrap();
		assert_eq!(user.last_received_message(), None);
		user.receive_message(b"hello".to_vec());
		assert_eq!(user.last_received_message(), Some(b"hello".to_vec()));
		assert_eq!(user.address(), 3003);
		assert_eq!(user.status(), "live");
	}
}
