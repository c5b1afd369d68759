/*
SPDX-License-Identifier: Apache-2.0 OR MIT

Copyright 2024 The Dibclip contributors

The project to which this file belongs is licensed under either of
the Apache 2.0 or the MIT license at the licensee's choice. The terms
and conditions of the chosen license apply to this file.
*/

//! The device-independent bitmap layout placed on the clipboard.
//!
//! `CF_DIB` payloads are a `BITMAPINFOHEADER` immediately followed by the
//! pixel rows according to
//! <https://docs.microsoft.com/en-us/windows/win32/dataxchg/standard-clipboard-formats>.
//! With 32 bits per pixel each row is already DWORD aligned, so there is no
//! row padding to deal with.

use crate::common::{BgraImage, Error};

/// Size of a serialized `BITMAPINFOHEADER`.
pub const DIB_HEADER_SIZE: usize = 40;

/// Uncompressed pixel data (`biCompression`).
const BI_RGB: u32 = 0;

/// A complete `CF_DIB` payload: 40-byte info header plus bottom-up BGRA rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDib {
	bytes: Vec<u8>,
}

impl EncodedDib {
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.bytes
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}

/// Encodes a BGRA image as a `CF_DIB` payload.
///
/// This is a pure transformation; it touches no OS resources. The output is
/// always exactly `DIB_HEADER_SIZE + width * height * 4` bytes.
///
/// DIBs store rows bottom-up, so the source rows are written in reverse
/// vertical order. The pixel bytes themselves pass through verbatim; the
/// `BgraImage` contract guarantees they are already in the blue, green, red,
/// alpha order the bitmap format wants.
pub fn encode(image: &BgraImage<'_>) -> Result<EncodedDib, Error> {
	if image.bytes().is_empty() || image.width() <= 0 || image.height() <= 0 {
		return Err(Error::EmptyBuffer);
	}

	let width = image.width() as usize;
	let height = image.height() as usize;
	let stride = width * 4;
	let image_size = stride * height;
	debug_assert_eq!(image.bytes().len(), image_size);

	let mut out = Vec::with_capacity(DIB_HEADER_SIZE + image_size);

	// BITMAPINFOHEADER, field by field, little-endian.
	out.extend_from_slice(&(DIB_HEADER_SIZE as u32).to_le_bytes()); // biSize
	out.extend_from_slice(&image.width().to_le_bytes()); // biWidth
	out.extend_from_slice(&image.height().to_le_bytes()); // biHeight, positive = bottom-up
	out.extend_from_slice(&1u16.to_le_bytes()); // biPlanes
	out.extend_from_slice(&32u16.to_le_bytes()); // biBitCount
	out.extend_from_slice(&BI_RGB.to_le_bytes()); // biCompression
	out.extend_from_slice(&(image_size as u32).to_le_bytes()); // biSizeImage
	// biXPelsPerMeter, biYPelsPerMeter, biClrUsed, biClrImportant
	out.extend_from_slice(&[0u8; 16]);
	debug_assert_eq!(out.len(), DIB_HEADER_SIZE);

	for row in image.bytes().chunks_exact(stride).rev() {
		out.extend_from_slice(row);
	}

	Ok(EncodedDib { bytes: out })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn header_u32(dib: &EncodedDib, offset: usize) -> u32 {
		u32::from_le_bytes(dib.as_bytes()[offset..offset + 4].try_into().unwrap())
	}

	fn header_u16(dib: &EncodedDib, offset: usize) -> u16 {
		u16::from_le_bytes(dib.as_bytes()[offset..offset + 2].try_into().unwrap())
	}

	#[test]
	fn output_length_is_header_plus_pixels() {
		for (w, h) in [(1, 1), (2, 2), (3, 1), (1, 7), (16, 9)] {
			let image = BgraImage::new(w, h, vec![0u8; (w * h * 4) as usize]).unwrap();
			let dib = encode(&image).unwrap();
			assert_eq!(dib.len(), DIB_HEADER_SIZE + (w * h * 4) as usize);
		}
	}

	#[test]
	fn header_fields_for_two_by_two() {
		let pixel = [30u8, 20, 10, 40];
		let image = BgraImage::new(2, 2, pixel.repeat(4)).unwrap();
		let dib = encode(&image).unwrap();

		assert_eq!(header_u32(&dib, 0), 40); // biSize
		assert_eq!(header_u32(&dib, 4), 2); // biWidth
		assert_eq!(header_u32(&dib, 8), 2); // biHeight
		assert_eq!(header_u16(&dib, 12), 1); // biPlanes
		assert_eq!(header_u16(&dib, 14), 32); // biBitCount
		assert_eq!(header_u32(&dib, 16), 0); // biCompression
		assert_eq!(header_u32(&dib, 20), 16); // biSizeImage = stride * height
		assert_eq!(&dib.as_bytes()[24..40], &[0u8; 16]);

		assert_eq!(&dib.as_bytes()[DIB_HEADER_SIZE..], pixel.repeat(4).as_slice());
	}

	#[test]
	fn size_image_field_is_stride_times_height() {
		for (w, h) in [(1, 1), (2, 2), (5, 3)] {
			let image = BgraImage::new(w, h, vec![0u8; (w * h * 4) as usize]).unwrap();
			let dib = encode(&image).unwrap();
			assert_eq!(header_u32(&dib, 20), (w * h * 4) as u32);
		}
	}

	#[test]
	fn into_bytes_returns_the_full_payload() {
		let image = BgraImage::new(1, 1, vec![255u8, 0, 0, 255]).unwrap();
		let dib = encode(&image).unwrap();
		let expected = dib.as_bytes().to_vec();
		assert_eq!(dib.into_bytes(), expected);
	}

	#[test]
	fn rows_are_written_bottom_up() {
		#[rustfmt::skip]
		let bytes = vec![
			// top row: two distinct pixels
			1, 2, 3, 4, 5, 6, 7, 8,
			// bottom row
			9, 10, 11, 12, 13, 14, 15, 16,
		];
		let image = BgraImage::new(2, 2, bytes).unwrap();
		let dib = encode(&image).unwrap();

		let pixels = &dib.as_bytes()[DIB_HEADER_SIZE..];
		assert_eq!(&pixels[..8], &[9, 10, 11, 12, 13, 14, 15, 16]);
		assert_eq!(&pixels[8..], &[1, 2, 3, 4, 5, 6, 7, 8]);
	}

	#[test]
	fn single_pixel_passes_through_verbatim() {
		let image = BgraImage::new(1, 1, vec![255u8, 0, 0, 255]).unwrap();
		let dib = encode(&image).unwrap();
		assert_eq!(&dib.as_bytes()[DIB_HEADER_SIZE..], &[255, 0, 0, 255]);
	}
}
