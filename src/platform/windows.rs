/*
SPDX-License-Identifier: Apache-2.0 OR MIT

Copyright 2024 The Dibclip contributors

The project to which this file belongs is licensed under either of
the Apache 2.0 or the MIT license at the licensee's choice. The terms
and conditions of the chosen license apply to this file.
*/

use std::{io, ptr::copy_nonoverlapping, thread, time::Duration};

use windows_sys::Win32::{
	Foundation::{GlobalFree, HANDLE, HGLOBAL},
	System::{
		DataExchange::SetClipboardData,
		Memory::{GlobalAlloc, GlobalLock, GlobalUnlock, GMEM_MOVEABLE},
		Ole::CF_DIB,
	},
};

use crate::common::{Error, ScopeGuard};
use crate::transfer::ClipboardDevice;

/// The real Windows clipboard.
///
/// Windows only allows one thread on the entire system to have the clipboard
/// open at once, so [`publish`](crate::transfer::publish) opens it for a
/// single transfer and closes it right after.
pub struct OsClipboard {
	open_attempts: usize,
}

impl OsClipboard {
	/// How often opening is attempted before giving up. On Windows it is
	/// common for another process to hold the clipboard for a moment.
	const DEFAULT_OPEN_ATTEMPTS: usize = 5;

	pub fn new() -> Self {
		OsClipboard { open_attempts: Self::DEFAULT_OPEN_ATTEMPTS }
	}

	pub fn with_open_attempts(open_attempts: usize) -> Self {
		OsClipboard { open_attempts: open_attempts.max(1) }
	}
}

impl Default for OsClipboard {
	fn default() -> Self {
		Self::new()
	}
}

/// A `GlobalAlloc`ed movable block. Not dropped automatically: the transfer
/// sequence either hands it to the clipboard or frees it explicitly.
pub struct GlobalBlock {
	handle: HGLOBAL,
	len: usize,
}

impl ClipboardDevice for OsClipboard {
	type Block = GlobalBlock;

	fn open(&self) -> Result<(), Error> {
		let mut attempts = self.open_attempts;
		loop {
			match clipboard_win::raw::open() {
				Ok(()) => return Ok(()),
				Err(_) if attempts > 1 => attempts -= 1,
				Err(_) => return Err(Error::ClipboardOpenFailed),
			}
			thread::sleep(Duration::from_millis(5));
		}
	}

	fn empty(&self) -> Result<(), Error> {
		clipboard_win::raw::empty().map_err(|_| Error::ClipboardClearFailed)
	}

	fn alloc(&self, len: usize) -> Result<Self::Block, Error> {
		let handle = unsafe { GlobalAlloc(GMEM_MOVEABLE, len) };
		if handle.is_null() {
			return Err(Error::AllocationFailed);
		}
		Ok(GlobalBlock { handle, len })
	}

	fn write(&self, block: &mut Self::Block, bytes: &[u8]) -> Result<(), Error> {
		debug_assert_eq!(block.len, bytes.len());
		unsafe {
			let data_ptr = GlobalLock(block.handle).cast::<u8>();
			if data_ptr.is_null() {
				return Err(Error::LockFailed);
			}
			let _unlock = ScopeGuard::new(|| global_unlock_checked(block.handle));
			copy_nonoverlapping::<u8>(bytes.as_ptr(), data_ptr, bytes.len());
		}
		Ok(())
	}

	fn set_dib(&self, block: Self::Block) -> Result<(), Error> {
		let handle: HANDLE = unsafe { SetClipboardData(CF_DIB as u32, block.handle as HANDLE) };
		if handle.is_null() {
			// Ownership never transferred.
			unsafe { GlobalFree(block.handle) };
			return Err(Error::SetDataFailed);
		}
		Ok(())
	}

	fn free(&self, block: Self::Block) {
		unsafe { GlobalFree(block.handle) };
	}

	fn close(&self) {
		if let Err(err) = clipboard_win::raw::close() {
			log::error!("Failed closing the clipboard: {err}");
		}
	}
}

unsafe fn global_unlock_checked(handle: HGLOBAL) {
	// If the memory object is still locked after decrementing the lock
	// count, GlobalUnlock returns nonzero. On a zero return, GetLastError
	// distinguishes "fully unlocked" (NO_ERROR) from an actual failure.
	if GlobalUnlock(handle) == 0 {
		let err = io::Error::last_os_error();
		if err.raw_os_error() != Some(0) {
			log::error!("Failed calling GlobalUnlock when writing data: {err}");
		}
	}
}
