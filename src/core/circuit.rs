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

//! Circuit selection and onion building. This runs on the sending side.

use super::{
	config::Config,
	directory::Node,
	envelope::seal,
	error::Error,
	token::prepend_token,
	Address, NodeId,
};
use arrayvec::ArrayVec;
use rand::{CryptoRng, Rng};
use std::collections::HashSet;

/// Number of relays in every circuit.
pub const CIRCUIT_LEN: usize = 3;

/// Ordered relays a message traverses: entry, middle, exit. Always exactly [`CIRCUIT_LEN`]
/// distinct nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Circuit(ArrayVec<Node, CIRCUIT_LEN>);

impl Circuit {
	/// Use `nodes` as entry, middle and exit. Fails if any id appears twice.
	pub fn new(nodes: [Node; CIRCUIT_LEN]) -> Result<Self, Error> {
		let mut seen = HashSet::new();
		if let Some(node) = nodes.iter().find(|node| !seen.insert(node.id)) {
			return Err(Error::DuplicateRelay(node.id))
		}
		Ok(Self(nodes.into()))
	}

	pub fn entry(&self) -> &Node {
		&self.0[0]
	}

	pub fn middle(&self) -> &Node {
		&self.0[1]
	}

	pub fn exit(&self) -> &Node {
		&self.0[CIRCUIT_LEN - 1]
	}

	pub fn nodes(&self) -> &[Node] {
		&self.0
	}

	pub fn ids(&self) -> Vec<NodeId> {
		self.0.iter().map(|node| node.id).collect()
	}
}

/// Choose [`CIRCUIT_LEN`] distinct nodes uniformly at random, without replacement.
///
/// Nodes are distinct by id. When a directory lists an id more than once, its first entry is the
/// one considered. Selection is a partial Fisher-Yates shuffle driven by `rng`, so a seeded `rng`
/// gives a reproducible circuit.
pub fn select_circuit(rng: &mut impl Rng, nodes: &[Node]) -> Result<Circuit, Error> {
	let mut seen = HashSet::new();
	let mut candidates: Vec<&Node> = nodes.iter().filter(|node| seen.insert(node.id)).collect();
	if candidates.len() < CIRCUIT_LEN {
		return Err(Error::InsufficientRelays { available: candidates.len() })
	}

	for i in 0..CIRCUIT_LEN {
		let j = rng.gen_range(i..candidates.len());
		candidates.swap(i, j);
	}
	Ok(Circuit(candidates[..CIRCUIT_LEN].iter().map(|node| (*node).clone()).collect()))
}

/// Wrap `plaintext` for delivery to `destination` through `circuit`.
///
/// Layers are built from the exit back to the entry, as each layer must contain the complete
/// envelope for the next hop. Every hop gets a fresh single-use key, dropped before returning.
/// The result is the blob to post to the entry relay.
pub fn build_onion(
	rng: &mut (impl Rng + CryptoRng),
	config: &Config,
	circuit: &Circuit,
	destination: Address,
	plaintext: &[u8],
) -> Result<Vec<u8>, Error> {
	let mut next_address = destination;
	let mut blob = plaintext.to_vec();
	for node in circuit.nodes().iter().rev() {
		let layer = prepend_token(next_address, &blob)?;
		blob = seal(rng, &node.public_key, &layer)?;
		next_address = config.relay_address(node.id)?;
	}
	Ok(blob)
}
