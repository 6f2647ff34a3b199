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

//! Node directory.

use super::{config::Config, crypto::KxPublic, NodeId};
use parking_lot::RwLock;

/// A relay as published in the directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
	pub id: NodeId,
	pub public_key: KxPublic,
}

/// Lookup service mapping relay identity to public key.
pub trait Directory {
	/// Publish a node. Registering the same node twice lists it twice.
	fn register(&self, node: Node);

	/// Point-in-time snapshot of all registered nodes, in registration order. Callers must not
	/// assume the directory is unchanged by the time they use the snapshot.
	fn nodes(&self) -> Vec<Node>;
}

/// In-memory directory. Nothing is persisted and entries are not authenticated.
pub struct Registry {
	log_target: &'static str,
	nodes: RwLock<Vec<Node>>,
}

impl Registry {
	pub fn new(config: &Config) -> Self {
		Self { log_target: config.log_target, nodes: RwLock::new(Vec::new()) }
	}

	pub fn status(&self) -> &'static str {
		"live"
	}

	pub fn len(&self) -> usize {
		self.nodes.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.read().is_empty()
	}
}

impl Directory for Registry {
	fn register(&self, node: Node) {
		log::debug!(target: self.log_target, "Registered node {}", node.id);
		self.nodes.write().push(node);
	}

	fn nodes(&self) -> Vec<Node> {
		self.nodes.read().clone()
	}
}
