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

//! Onion routing core logic. This module is transport agnostic: relays and users reach each other
//! only through the [`Transport`] trait.

mod circuit;
mod config;
mod crypto;
mod directory;
mod envelope;
mod error;
mod kx_pair;
mod relay;
mod token;
mod transport;
mod user;

pub use self::{
	circuit::{build_onion, select_circuit, Circuit, CIRCUIT_LEN},
	config::{Config, DEFAULT_BASE_RELAY_PORT, DEFAULT_BASE_USER_PORT, DEFAULT_REGISTRY_PORT},
	crypto::{
		decrypt_body, encrypt_body, export_public, import_public, unwrap_key, wrap_key, KxPublic,
		SymmetricKey, WrappedKey, KX_PUBLIC_SIZE, MAC_SIZE, SYMMETRIC_KEY_SIZE, WRAPPED_KEY_SIZE,
	},
	directory::{Directory, Node, Registry},
	envelope::{peel, seal, split as split_envelope, DecryptedLayer},
	error::Error,
	kx_pair::KxPair,
	relay::RelayNode,
	token::{decode_token, encode_token, prepend_token, MAX_TOKEN_ADDRESS, TOKEN_WIDTH},
	transport::{Transport, TransportError},
	user::User,
};

/// Relay identifier, as published in the directory.
pub type NodeId = u32;
/// User identifier.
pub type UserId = u32;
/// Endpoint address: a base port plus a relay or user identifier.
pub type Address = u64;
