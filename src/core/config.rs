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

//! Onion network configuration.

use super::{error::Error, Address, NodeId, UserId};

/// Default base port relays are bound at, offset by their node id.
pub const DEFAULT_BASE_RELAY_PORT: Address = 4000;
/// Default base port users are bound at, offset by their user id.
pub const DEFAULT_BASE_USER_PORT: Address = 3000;
pub const DEFAULT_REGISTRY_PORT: Address = 8080;

/// Configuration shared by relays, users and the registry.
#[derive(Clone, Debug)]
pub struct Config {
	/// The target for log messages.
	pub log_target: &'static str,
	/// Relay `n` is bound at `base_relay_port + n`.
	pub base_relay_port: Address,
	/// User `n` is bound at `base_user_port + n`.
	pub base_user_port: Address,
	pub registry_port: Address,
}

impl Config {
	pub fn relay_address(&self, id: NodeId) -> Result<Address, Error> {
		self.base_relay_port.checked_add(id.into()).ok_or(Error::AddressOverflow)
	}

	pub fn user_address(&self, id: UserId) -> Result<Address, Error> {
		self.base_user_port.checked_add(id.into()).ok_or(Error::AddressOverflow)
	}

	pub fn registry_address(&self) -> Address {
		self.registry_port
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			log_target: "onionnet",
			base_relay_port: DEFAULT_BASE_RELAY_PORT,
			base_user_port: DEFAULT_BASE_USER_PORT,
			registry_port: DEFAULT_REGISTRY_PORT,
		}
	}
}
