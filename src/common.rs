/*
SPDX-License-Identifier: Apache-2.0 OR MIT

Copyright 2024 The Dibclip contributors

The project to which this file belongs is licensed under either of
the Apache 2.0 or the MIT license at the licensee's choice. The terms
and conditions of the chosen license apply to this file.
*/

use std::{borrow::Cow, fmt};

/// An error that may occur while producing pixel data or while handing it to
/// the clipboard.
///
/// Every operation in this crate reports failure through this enum; nothing
/// panics. The `Display` form of each variant is the human-readable status
/// phrase shown to the user, so UI code can simply call `to_string()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// The texture reference did not resolve to a loadable 2D image asset.
	AssetNotFound,

	/// The resolved asset has no mip level with decodable pixel data.
	NoPixelData,

	/// A color channel was not an integer in the inclusive `[0, 255]` range.
	/// The whole color spec is rejected; no partial application happens.
	InvalidColorInput,

	/// A requested dimension was not a positive integer.
	InvalidSizeInput,

	/// The pixel buffer handed to the encoder was empty or had no area.
	EmptyBuffer,

	/// The OS clipboard could not be opened. Another process (or another
	/// thread of this one) may be holding it; the user can simply retry.
	ClipboardOpenFailed,

	/// The existing clipboard contents could not be cleared.
	ClipboardClearFailed,

	/// The movable memory block for the encoded image could not be allocated.
	AllocationFailed,

	/// The allocated memory block could not be locked for writing.
	LockFailed,

	/// The clipboard refused the encoded image. Ownership of the memory
	/// block never transferred, so the block was freed before returning.
	SetDataFailed,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let msg = match self {
			Error::AssetNotFound => "the texture reference did not resolve to a loadable 2D image",
			Error::NoPixelData => "the texture has no decodable pixel data",
			Error::InvalidColorInput => "color channels must be integers between 0 and 255",
			Error::InvalidSizeInput => "the image size must be a pair of positive integers",
			Error::EmptyBuffer => "the pixel buffer is empty or has no area",
			Error::ClipboardOpenFailed => "could not open the clipboard",
			Error::ClipboardClearFailed => "could not empty the clipboard",
			Error::AllocationFailed => "could not allocate global memory for the image",
			Error::LockFailed => "could not lock the global memory block",
			Error::SetDataFailed => "could not place the image on the clipboard",
		};
		f.write_str(msg)
	}
}

impl std::error::Error for Error {}

/// Stores the pixel data of an image in BGRA channel order.
///
/// Each element in `bytes` stores the value of a channel of a single pixel,
/// four channels per pixel in blue, green, red, alpha order, so a 3*3 image
/// occupies 3*3*4 = 36 bytes. Pixels are in row-major, top-down order.
///
/// The channel order is part of the type's contract: the DIB encoder copies
/// these bytes straight through, relying on them already being BGRA. Any
/// source holding RGBA data must convert before constructing one of these
/// (see `FileStore`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgraImage<'a> {
	width: i32,
	height: i32,
	bytes: Cow<'a, [u8]>,
}

impl<'a> BgraImage<'a> {
	/// Wraps BGRA bytes, enforcing `bytes.len() == width * height * 4` and
	/// positive dimensions.
	pub fn new(width: i32, height: i32, bytes: impl Into<Cow<'a, [u8]>>) -> Result<Self, Error> {
		let bytes = bytes.into();
		if width <= 0 || height <= 0 {
			return Err(Error::EmptyBuffer);
		}
		let expected = width as usize * height as usize * 4;
		if bytes.len() != expected {
			return Err(Error::EmptyBuffer);
		}
		Ok(BgraImage { width, height, bytes })
	}

	pub fn width(&self) -> i32 {
		self.width
	}

	pub fn height(&self) -> i32 {
		self.height
	}

	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// For sources that synthesize the bytes themselves and uphold the
	/// length invariant by construction.
	pub(crate) fn from_vec(width: i32, height: i32, bytes: Vec<u8>) -> BgraImage<'static> {
		debug_assert!(width > 0 && height > 0);
		debug_assert_eq!(bytes.len(), width as usize * height as usize * 4);
		BgraImage { width, height, bytes: bytes.into() }
	}

	/// Returns a copy that is guaranteed to own its bytes.
	pub fn to_owned_image(&self) -> BgraImage<'static> {
		BgraImage {
			width: self.width,
			height: self.height,
			bytes: self.bytes.clone().into_owned().into(),
		}
	}
}

/// Runs the given callback when dropped. Used to pin resource release
/// (clipboard close, memory unlock) to scope exit on every path.
pub(crate) struct ScopeGuard<F: FnOnce()> {
	callback: Option<F>,
}

impl<F: FnOnce()> ScopeGuard<F> {
	#[must_use]
	pub(crate) fn new(callback: F) -> Self {
		ScopeGuard { callback: Some(callback) }
	}
}

impl<F: FnOnce()> Drop for ScopeGuard<F> {
	fn drop(&mut self) {
		if let Some(callback) = self.callback.take() {
			(callback)();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn image_rejects_length_mismatch() {
		assert_eq!(BgraImage::new(2, 2, vec![0u8; 15]), Err(Error::EmptyBuffer));
		assert_eq!(BgraImage::new(2, 2, vec![0u8; 17]), Err(Error::EmptyBuffer));
		assert!(BgraImage::new(2, 2, vec![0u8; 16]).is_ok());
	}

	#[test]
	fn image_rejects_degenerate_dimensions() {
		assert_eq!(BgraImage::new(0, 1, vec![0u8; 0]), Err(Error::EmptyBuffer));
		assert_eq!(BgraImage::new(1, 0, vec![0u8; 0]), Err(Error::EmptyBuffer));
		assert_eq!(BgraImage::new(-1, 1, vec![0u8; 0]), Err(Error::EmptyBuffer));
	}

	#[test]
	fn to_owned_image_detaches_borrowed_bytes() {
		let bytes = [1u8, 2, 3, 4];
		let borrowed = BgraImage::new(1, 1, bytes.as_slice()).unwrap();

		let owned = borrowed.to_owned_image();
		assert_eq!(owned, borrowed);
		assert!(matches!(owned.bytes, Cow::Owned(_)));
	}

	#[test]
	fn scope_guard_runs_on_drop() {
		let mut ran = false;
		{
			let _guard = ScopeGuard::new(|| ran = true);
		}
		assert!(ran);
	}
}
