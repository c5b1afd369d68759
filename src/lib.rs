/*
SPDX-License-Identifier: Apache-2.0 OR MIT

Copyright 2024 The Dibclip contributors

The project to which this file belongs is licensed under either of
the Apache 2.0 or the MIT license at the licensee's choice. The terms
and conditions of the chosen license apply to this file.
*/

//! Export a texture asset or a synthesized solid-color image to the Windows
//! clipboard as a device-independent bitmap (`CF_DIB`).
//!
//! The pipeline has three stages, each usable on its own:
//!
//! - a pixel source ([`from_asset`] / [`from_color`]) producing a
//!   [`BgraImage`], a buffer whose type guarantees BGRA channel order;
//! - the pure DIB encoder ([`dib::encode`]) laying the buffer out as a
//!   40-byte `BITMAPINFOHEADER` followed by bottom-up rows;
//! - the transfer step ([`transfer::publish`]) moving the encoded bytes into
//!   OS-owned memory and handing them to the clipboard.
//!
//! [`Exporter`] wires the stages together and maps the outcome to a display
//! string, which is all a UI needs:
//!
//! ```no_run
//! use dibclip::{ColorSpec, Exporter, ExportRequest, Extent, MemoryStore};
//! # #[cfg(windows)]
//! # fn main() -> Result<(), dibclip::Error> {
//! let exporter = Exporter::new(MemoryStore::new(), dibclip::OsClipboard::new());
//! let request = ExportRequest::SolidColor {
//! 	color: ColorSpec::new(10, 20, 30, 255)?,
//! 	extent: Extent::new(64, 64)?,
//! };
//! println!("{}", exporter.export(&request));
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! Everything runs synchronously on the calling thread. The clipboard is
//! opened per export and closed as soon as the transfer finishes; concurrent
//! exports are not queued; the second one simply fails to open the
//! clipboard and reports that.

mod common;
pub mod dib;
mod platform;
mod source;
pub mod transfer;

pub use common::{BgraImage, Error};
#[cfg(windows)]
pub use platform::OsClipboard;
pub use source::{
	from_asset, from_color, AssetStore, ColorSpec, Extent, FileStore, MemoryStore, Texture,
	TextureMip,
};

use transfer::ClipboardDevice;

/// The status phrase reported after a successful export.
pub const SUCCESS_MESSAGE: &str = "copied the image to the clipboard";

/// What the user asked to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRequest<'a> {
	/// Copy the pixels of the referenced texture asset.
	Texture { reference: &'a str },
	/// Synthesize a solid-color image of the given extent.
	SolidColor { color: ColorSpec, extent: Extent },
}

/// Runs export requests against an asset store and a clipboard backend.
#[derive(Debug)]
pub struct Exporter<S, D> {
	store: S,
	device: D,
}

impl<S: AssetStore, D: ClipboardDevice> Exporter<S, D> {
	pub fn new(store: S, device: D) -> Self {
		Exporter { store, device }
	}

	/// Runs the request and reports the outcome as display text: either
	/// [`SUCCESS_MESSAGE`] or the failure's `Display` phrase.
	pub fn export(&self, request: &ExportRequest<'_>) -> String {
		match self.try_export(request) {
			Ok(()) => SUCCESS_MESSAGE.to_owned(),
			Err(err) => err.to_string(),
		}
	}

	/// Like [`export`](Self::export), but keeps the error machine-readable.
	pub fn try_export(&self, request: &ExportRequest<'_>) -> Result<(), Error> {
		let image = match request {
			ExportRequest::Texture { reference } => from_asset(&self.store, reference)?,
			ExportRequest::SolidColor { color, extent } => from_color(*color, *extent),
		};
		let encoded = dib::encode(&image)?;
		transfer::publish(&self.device, &encoded)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dib::DIB_HEADER_SIZE;
	use crate::transfer::fake::{FailAt, FakeClipboard};

	fn exporter(fail_at: FailAt) -> Exporter<MemoryStore, FakeClipboard> {
		let mut store = MemoryStore::new();
		store.insert("/Game/BluePixel", 1, 1, vec![255, 0, 0, 255]);
		Exporter::new(store, FakeClipboard::new(fail_at))
	}

	#[test]
	fn texture_export_end_to_end() {
		let exporter = exporter(FailAt::Nowhere);
		let request = ExportRequest::Texture { reference: "/Game/BluePixel" };

		assert_eq!(exporter.export(&request), SUCCESS_MESSAGE);

		let published = exporter.device.published.borrow();
		let payload = published.as_deref().unwrap();
		assert_eq!(payload.len(), DIB_HEADER_SIZE + 4);
		assert_eq!(&payload[DIB_HEADER_SIZE..], &[255, 0, 0, 255]);
		exporter.device.assert_balanced();
	}

	#[test]
	fn solid_color_export_end_to_end() {
		let exporter = exporter(FailAt::Nowhere);
		let request = ExportRequest::SolidColor {
			color: ColorSpec::new(10, 20, 30, 40).unwrap(),
			extent: Extent::new(2, 2).unwrap(),
		};

		assert_eq!(exporter.export(&request), SUCCESS_MESSAGE);

		let published = exporter.device.published.borrow();
		let payload = published.as_deref().unwrap();
		assert_eq!(&payload[DIB_HEADER_SIZE..], [30u8, 20, 10, 40].repeat(4).as_slice());
	}

	#[test]
	fn missing_texture_reports_without_touching_the_clipboard() {
		let exporter = exporter(FailAt::Nowhere);
		let request = ExportRequest::Texture { reference: "/Game/Missing" };

		assert_eq!(exporter.try_export(&request), Err(Error::AssetNotFound));
		assert_eq!(exporter.export(&request), Error::AssetNotFound.to_string());
		assert_eq!(exporter.device.opens.get(), 0);
	}

	#[test]
	fn clipboard_failures_map_to_their_phrases() {
		let request = ExportRequest::SolidColor {
			color: ColorSpec::new(0, 0, 0, 255).unwrap(),
			extent: Extent::new(1, 1).unwrap(),
		};
		for (fail_at, err) in [
			(FailAt::Open, Error::ClipboardOpenFailed),
			(FailAt::Empty, Error::ClipboardClearFailed),
			(FailAt::Alloc, Error::AllocationFailed),
			(FailAt::Write, Error::LockFailed),
			(FailAt::SetDib, Error::SetDataFailed),
		] {
			let exporter = exporter(fail_at);
			assert_eq!(exporter.try_export(&request), Err(err));
			assert_eq!(exporter.export(&request), err.to_string());
			exporter.device.assert_balanced();
		}
	}
}
