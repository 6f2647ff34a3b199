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

//! Destination tokens.
//!
//! Every decrypted layer starts with the address of the next hop (or of the final recipient),
//! written as a zero-padded decimal string of exactly [`TOKEN_WIDTH`] characters. A receiver
//! always reads the same number of characters to find it.
//!
//! Addresses wider than the token are rejected rather than truncated: a truncated token would
//! silently route to a different endpoint.

use super::{error::Error, Address};

/// Number of decimal digits in a destination token.
pub const TOKEN_WIDTH: usize = 10;
/// Largest address representable in a destination token.
pub const MAX_TOKEN_ADDRESS: Address = 9_999_999_999;

pub fn encode_token(address: Address) -> Result<String, Error> {
	if address > MAX_TOKEN_ADDRESS {
		return Err(Error::AddressTooWide(address))
	}
	Ok(format!("{:0width$}", address, width = TOKEN_WIDTH))
}

/// Split `layer` into the address in its leading token and the remainder.
pub fn decode_token(layer: &[u8]) -> Result<(Address, &[u8]), Error> {
	if layer.len() < TOKEN_WIDTH {
		return Err(Error::MalformedEnvelope("missing destination token"))
	}
	let (token, rest) = layer.split_at(TOKEN_WIDTH);
	let address = token.iter().try_fold(0 as Address, |acc, c| match c {
		b'0'..=b'9' => Ok(acc * 10 + Address::from(c - b'0')),
		_ => Err(Error::MalformedEnvelope("non-decimal destination token")),
	})?;
	Ok((address, rest))
}

/// Prefix `payload` with the token for `address`.
pub fn prepend_token(address: Address, payload: &[u8]) -> Result<Vec<u8>, Error> {
	let token = encode_token(address)?;
	let mut layer = Vec::with_capacity(TOKEN_WIDTH + payload.len());
	layer.extend_from_slice(token.as_bytes());
	layer.extend_from_slice(payload);
	Ok(layer)
}
