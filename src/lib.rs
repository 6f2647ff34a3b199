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

//! Three-hop onion routing.
//!
//! A [`User`] selects a circuit of three distinct relays from a [`Directory`] and wraps its
//! message in one layer of encryption per relay. Each [`RelayNode`] peels exactly one layer,
//! learns only the next hop, and forwards the remainder. The exit relay delivers the plaintext to
//! the destination user.
//!
//! The [`core`] module is transport agnostic. [`network::LocalNetwork`] provides an in-process
//! transport binding every endpoint at its derived address.

pub mod core;
pub mod network;

pub use crate::core::{
	Address, Circuit, Config, DecryptedLayer, Directory, Error, KxPair, KxPublic, Node, NodeId,
	RelayNode, Registry, Transport, TransportError, User, UserId,
};
pub use network::LocalNetwork;
