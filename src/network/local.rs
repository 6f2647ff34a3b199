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

//! In-process network. Binds relays, users and the registry at their derived addresses and
//! delivers messages between them synchronously, standing in for a request/response transport.

use crate::core::{
	Address, Config, Directory, Error, NodeId, RelayNode, Registry, Transport, TransportError,
	User, UserId,
};
use parking_lot::RwLock;
use std::{
	cell::Cell,
	collections::{hash_map::Entry, HashMap},
	sync::Arc,
};

/// Maximum number of deliveries a thread may be nested inside. A send through a circuit nests
/// `CIRCUIT_LEN + 1` deliveries; anything much deeper is a chain of layers looping through relays.
const MAX_DELIVERY_DEPTH: usize = 16;

thread_local! {
	static DELIVERY_DEPTH: Cell<usize> = Cell::new(0);
}

/// Counts one nested delivery on the current thread for as long as it is alive.
struct DeliveryDepthGuard;

impl DeliveryDepthGuard {
	fn enter() -> Option<Self> {
		DELIVERY_DEPTH.with(|depth| {
			if depth.get() >= MAX_DELIVERY_DEPTH {
				return None
			}
			depth.set(depth.get() + 1);
			Some(Self)
		})
	}
}

impl Drop for DeliveryDepthGuard {
	fn drop(&mut self) {
		DELIVERY_DEPTH.with(|depth| depth.set(depth.get() - 1));
	}
}

#[derive(Clone)]
enum Endpoint {
	Registry,
	Relay(Arc<RelayNode>),
	User(Arc<User>),
}

pub struct LocalNetwork {
	config: Config,
	registry: Arc<Registry>,
	endpoints: RwLock<HashMap<Address, Endpoint>>,
}

impl LocalNetwork {
	pub fn new(config: Config) -> Self {
		let registry = Arc::new(Registry::new(&config));
		Self { config, registry, endpoints: RwLock::new(HashMap::new()) }
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}

	fn bind(&self, address: Address, endpoint: Endpoint) -> Result<(), Error> {
		match self.endpoints.write().entry(address) {
			Entry::Occupied(_) => Err(Error::AddressInUse(address)),
			Entry::Vacant(entry) => {
				entry.insert(endpoint);
				Ok(())
			},
		}
	}

	/// Bind the registry at the configured registry port.
	pub fn launch_registry(&self) -> Result<Arc<Registry>, Error> {
		self.bind(self.config.registry_address(), Endpoint::Registry)?;
		log::debug!(
			target: self.config.log_target,
			"Registry listening on {}",
			self.config.registry_address()
		);
		Ok(self.registry.clone())
	}

	/// Start a relay with a fresh key pair and publish it in the registry.
	pub fn launch_relay(&self, id: NodeId) -> Result<Arc<RelayNode>, Error> {
		let relay = Arc::new(RelayNode::new(id, &self.config, &mut rand::thread_rng())?);
		self.bind(relay.address(), Endpoint::Relay(relay.clone()))?;
		log::debug!(target: self.config.log_target, "Relay {} listening on {}", id, relay.address());
		self.registry.register(relay.node());
		Ok(relay)
	}

	pub fn launch_user(&self, id: UserId) -> Result<Arc<User>, Error> {
		self.add_user(User::new(id, &self.config)?)
	}

	/// Bind an already constructed user, e.g. one with a seeded RNG.
	pub fn add_user(&self, user: User) -> Result<Arc<User>, Error> {
		let user = Arc::new(user);
		self.bind(user.address(), Endpoint::User(user.clone()))?;
		log::debug!(
			target: self.config.log_target,
			"User {} listening on {}",
			user.id(),
			user.address()
		);
		Ok(user)
	}

	pub fn relay(&self, id: NodeId) -> Option<Arc<RelayNode>> {
		match self.endpoint(self.config.relay_address(id).ok()?)? {
			Endpoint::Relay(relay) => Some(relay),
			_ => None,
		}
	}

	pub fn user(&self, id: UserId) -> Option<Arc<User>> {
		match self.endpoint(self.config.user_address(id).ok()?)? {
			Endpoint::User(user) => Some(user),
			_ => None,
		}
	}

	/// Ask user `from` to send `message` to user `destination_user_id`.
	pub fn send_message(
		&self,
		from: UserId,
		message: &[u8],
		destination_user_id: UserId,
	) -> Result<(), Error> {
		let address = self.config.user_address(from)?;
		let user = self
			.user(from)
			.ok_or(Error::Forward { address, source: TransportError::Unreachable(address) })?;
		user.send_message(message, destination_user_id, &*self.registry, self)
	}

	/// `"live"` if anything is bound at `address`.
	pub fn status(&self, address: Address) -> Option<&'static str> {
		Some(match self.endpoint(address)? {
			Endpoint::Registry => self.registry.status(),
			Endpoint::Relay(relay) => relay.status(),
			Endpoint::User(user) => user.status(),
		})
	}

	fn endpoint(&self, address: Address) -> Option<Endpoint> {
		// Cloned out so the lock is not held while a handler forwards further
		self.endpoints.read().get(&address).cloned()
	}
}

impl Transport for LocalNetwork {
	fn post_message(&self, address: Address, message: Vec<u8>) -> Result<(), TransportError> {
		let endpoint = self.endpoint(address).ok_or(TransportError::Unreachable(address))?;
		let _depth = match DeliveryDepthGuard::enter() {
			Some(guard) => guard,
			None => {
				log::warn!(
					target: self.config.log_target,
					"Message to {} dropped: more than {} nested deliveries",
					address,
					MAX_DELIVERY_DEPTH
				);
				return Err(TransportError::Rejected(address))
			},
		};
		let result = match endpoint {
			Endpoint::Registry => Err(Error::MalformedEnvelope("registry accepts no messages")),
			Endpoint::Relay(relay) => relay.handle_incoming(message, self),
			Endpoint::User(user) => {
				user.receive_message(message);
				Ok(())
			},
		};
		result.map_err(|e| {
			log::warn!(target: self.config.log_target, "Message to {} failed: {}", address, e);
			TransportError::Rejected(address)
		})
	}
}
