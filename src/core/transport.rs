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

//! Transport interface.

use super::Address;

/// Why a message could not be handed to the endpoint at an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
	/// Nothing is bound at the address.
	#[error("no endpoint at {0}")]
	Unreachable(Address),
	/// The endpoint failed to process the message. Carries no detail about the failure.
	#[error("endpoint at {0} rejected the message")]
	Rejected(Address),
}

/// Blocking request/response transport between relays and users.
///
/// `post_message` returns once the endpoint at `address` has accepted or refused the message.
/// There is no queueing, and no timeout beyond what an implementation provides.
pub trait Transport {
	fn post_message(&self, address: Address, message: Vec<u8>) -> Result<(), TransportError>;
}
