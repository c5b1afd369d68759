/*
SPDX-License-Identifier: Apache-2.0 OR MIT

Copyright 2024 The Dibclip contributors

The project to which this file belongs is licensed under either of
the Apache 2.0 or the MIT license at the licensee's choice. The terms
and conditions of the chosen license apply to this file.
*/

//! Handing an encoded DIB to the clipboard.

use crate::common::{Error, ScopeGuard};
use crate::dib::EncodedDib;

/// The capability set a clipboard backend must provide.
///
/// The OS clipboard is process-wide mutable state; modeling it as an
/// injected capability keeps [`publish`] testable against a recording fake.
/// Methods take `&self` because the real backend is a stateless shim over
/// the OS and fakes track their bookkeeping internally.
///
/// Contract, on top of the per-method docs:
/// - `open`/`close` and `alloc`/`free` must stay balanced on every failure
///   path; [`publish`] guarantees this for its callers.
/// - a block handed to `set_dib` is never freed by the caller: on success
///   the OS owns it, on failure the backend frees it before returning.
pub trait ClipboardDevice {
	/// A movable memory block the clipboard can take ownership of.
	type Block;

	/// Opens the clipboard for exclusive use by this process.
	fn open(&self) -> Result<(), Error>;

	/// Clears the current clipboard contents. Requires an open clipboard.
	fn empty(&self) -> Result<(), Error>;

	/// Allocates a movable block of exactly `len` bytes.
	fn alloc(&self, len: usize) -> Result<Self::Block, Error>;

	/// Locks the block, copies `bytes` into it and unlocks it again. The
	/// block remains owned by the caller either way.
	fn write(&self, block: &mut Self::Block, bytes: &[u8]) -> Result<(), Error>;

	/// Hands the block to the clipboard under the DIB format. On success the
	/// OS owns the block from this moment on. On failure ownership never
	/// transferred and the backend frees the block before returning.
	fn set_dib(&self, block: Self::Block) -> Result<(), Error>;

	/// Frees a block that was never handed to the clipboard.
	fn free(&self, block: Self::Block);

	/// Closes the clipboard. Infallible from the caller's point of view;
	/// backends log close failures instead of surfacing them.
	fn close(&self);
}

/// Places an encoded DIB on the clipboard.
///
/// Strictly sequential: open, clear, allocate, write, set. The first failure
/// aborts the sequence, releasing exactly what was acquired up to that
/// point; the clipboard stays open only for the duration of this call and
/// does no unrelated work in between.
pub fn publish<D: ClipboardDevice>(device: &D, dib: &EncodedDib) -> Result<(), Error> {
	device.open()?;
	let _close = ScopeGuard::new(|| device.close());

	device.empty()?;

	let mut block = device.alloc(dib.len())?;
	if let Err(err) = device.write(&mut block, dib.as_bytes()) {
		device.free(block);
		return Err(err);
	}

	device.set_dib(block)
}
