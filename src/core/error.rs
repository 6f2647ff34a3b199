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

//! Error handling

use super::{transport::TransportError, Address, NodeId};

/// Onion network generic error. Every variant is terminal for the request it occurs in.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// The directory does not list enough distinct relays to build a circuit.
	#[error("Not enough relays to build a circuit: {available} available.")]
	InsufficientRelays { available: usize },
	/// A circuit was given the same relay more than once.
	#[error("Relay {0} appears more than once in the circuit.")]
	DuplicateRelay(NodeId),
	/// Incoming blob or decrypted layer does not have the expected shape.
	#[error("Malformed envelope: {0}.")]
	MalformedEnvelope(&'static str),
	/// Wrapped key or layer body could not be decrypted.
	#[error("Decryption failed: {0}.")]
	Decryption(&'static str),
	/// Next hop unreachable or rejected the message.
	#[error("Failed to forward to {address}: {source}.")]
	Forward {
		address: Address,
		#[source]
		source: TransportError,
	},
	/// Address does not fit in a destination token.
	#[error("Address {0} does not fit in a destination token.")]
	AddressTooWide(Address),
	/// Base port plus identifier overflows.
	#[error("Address overflow.")]
	AddressOverflow,
	/// An endpoint is already bound at this address.
	#[error("Address {0} already in use.")]
	AddressInUse(Address),
	/// Key could not be imported or used for key exchange.
	#[error("Invalid key.")]
	InvalidKey,
}
