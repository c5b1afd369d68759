/*
SPDX-License-Identifier: Apache-2.0 OR MIT

Copyright 2024 The Dibclip contributors

The project to which this file belongs is licensed under either of
the Apache 2.0 or the MIT license at the licensee's choice. The terms
and conditions of the chosen license apply to this file.
*/

//! Pixel sources: texture assets and synthesized solid-color images.

use std::{collections::HashMap, path::PathBuf};

use parking_lot::RwLock;

use crate::common::{BgraImage, Error};

/// Four validated color channels in the inclusive `[0, 255]` range.
///
/// Channels enter in the natural red, green, blue, alpha order; the stored
/// pixel comes out in BGRA through [`ColorSpec::bgra`]. An out-of-range or
/// unparseable channel rejects the whole spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSpec {
	r: u8,
	g: u8,
	b: u8,
	a: u8,
}

impl ColorSpec {
	pub fn new(r: i32, g: i32, b: i32, a: i32) -> Result<Self, Error> {
		let channel = |v: i32| u8::try_from(v).map_err(|_| Error::InvalidColorInput);
		Ok(ColorSpec { r: channel(r)?, g: channel(g)?, b: channel(b)?, a: channel(a)? })
	}

	/// Parses the four channel text fields, in red, green, blue, alpha order.
	/// Non-numeric text is rejected the same way an out-of-range value is.
	pub fn parse(fields: [&str; 4]) -> Result<Self, Error> {
		let mut channels = [0i32; 4];
		for (channel, field) in channels.iter_mut().zip(fields) {
			*channel = field.trim().parse().map_err(|_| Error::InvalidColorInput)?;
		}
		let [r, g, b, a] = channels;
		ColorSpec::new(r, g, b, a)
	}

	/// The single pixel this spec describes, in blue, green, red, alpha
	/// order, which is what [`BgraImage`] and the DIB layout store.
	pub fn bgra(&self) -> [u8; 4] {
		[self.b, self.g, self.r, self.a]
	}
}

/// Validated, strictly positive image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
	width: i32,
	height: i32,
}

impl Extent {
	pub fn new(width: i32, height: i32) -> Result<Self, Error> {
		if width <= 0 || height <= 0 {
			return Err(Error::InvalidSizeInput);
		}
		Ok(Extent { width, height })
	}

	/// Parses the two dimension text fields.
	pub fn parse(width: &str, height: &str) -> Result<Self, Error> {
		let width = width.trim().parse().map_err(|_| Error::InvalidSizeInput)?;
		let height = height.trim().parse().map_err(|_| Error::InvalidSizeInput)?;
		Extent::new(width, height)
	}

	pub fn width(&self) -> i32 {
		self.width
	}

	pub fn height(&self) -> i32 {
		self.height
	}
}

/// One mip level of a texture: dimensions plus its bulk pixel data.
///
/// The bulk data sits behind a lock, the way an engine's streaming
/// texture data does, and may be absent when the level's payload was
/// stripped. Readers take the read lock for the duration of their copy and
/// the guard releases it on every exit path.
#[derive(Debug)]
pub struct TextureMip {
	width: i32,
	height: i32,
	bulk: RwLock<Option<Vec<u8>>>,
}

impl TextureMip {
	/// A mip whose bulk data is `width * height * 4` BGRA bytes.
	pub fn new(width: i32, height: i32, bgra: Vec<u8>) -> Self {
		TextureMip { width, height, bulk: RwLock::new(Some(bgra)) }
	}

	/// A mip whose pixel payload is unavailable.
	pub fn without_data(width: i32, height: i32) -> Self {
		TextureMip { width, height, bulk: RwLock::new(None) }
	}
}

/// A loaded 2D texture asset: a chain of mip levels, finest first.
#[derive(Debug, Default)]
pub struct Texture {
	mips: Vec<TextureMip>,
}

impl Texture {
	pub fn new(mips: Vec<TextureMip>) -> Self {
		Texture { mips }
	}

	/// A single-mip texture from BGRA bytes.
	pub fn from_bgra(width: i32, height: i32, bgra: Vec<u8>) -> Self {
		Texture { mips: vec![TextureMip::new(width, height, bgra)] }
	}
}

/// Resolves asset references to loaded textures.
///
/// `None` means the reference does not name a loadable 2D image asset and
/// surfaces as [`Error::AssetNotFound`].
pub trait AssetStore {
	fn load_texture(&self, reference: &str) -> Option<Texture>;
}

/// An in-memory reference→texture map. Produces textures that borrow
/// nothing from the store, so entries are held as BGRA byte vectors.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: HashMap<String, (i32, i32, Vec<u8>)>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, reference: impl Into<String>, width: i32, height: i32, bgra: Vec<u8>) {
		self.entries.insert(reference.into(), (width, height, bgra));
	}
}

impl AssetStore for MemoryStore {
	fn load_texture(&self, reference: &str) -> Option<Texture> {
		let (width, height, bgra) = self.entries.get(reference)?;
		Some(Texture::from_bgra(*width, *height, bgra.clone()))
	}
}

/// Resolves references to image files under a root directory and decodes
/// them with the `image` crate.
///
/// Decoded pixels arrive in RGBA order, so they are converted to BGRA here,
/// at the source, before a [`BgraImage`] can ever see them.
#[derive(Debug)]
pub struct FileStore {
	root: PathBuf,
}

impl FileStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		FileStore { root: root.into() }
	}
}

impl AssetStore for FileStore {
	fn load_texture(&self, reference: &str) -> Option<Texture> {
		let path = self.root.join(reference);
		let decoded = image::open(&path)
			.map_err(|err| {
				log::debug!("could not decode {}: {}", path.display(), err);
				err
			})
			.ok()?;
		let rgba = decoded.into_rgba8();
		let (width, height) = rgba.dimensions();
		if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
			return None;
		}
		let mut bytes = rgba.into_raw();
		for pixel in bytes.chunks_exact_mut(4) {
			pixel.swap(0, 2);
		}
		Some(Texture::from_bgra(width as i32, height as i32, bytes))
	}
}

/// Produces a pixel buffer from the named texture asset.
///
/// Reads the first mip level: its bulk data is locked read-only, exactly
/// `width * height * 4` bytes are copied out verbatim (mip data is already
/// BGRA, 8 bits per channel) and the lock is released again whether or not
/// the copy succeeded.
pub fn from_asset(store: &impl AssetStore, reference: &str) -> Result<BgraImage<'static>, Error> {
	let texture = store.load_texture(reference).ok_or(Error::AssetNotFound)?;
	let mip = texture.mips.first().ok_or(Error::NoPixelData)?;
	if mip.width <= 0 || mip.height <= 0 {
		return Err(Error::NoPixelData);
	}

	let bulk = mip.bulk.read();
	let data = bulk.as_ref().ok_or(Error::NoPixelData)?;
	let expected = mip.width as usize * mip.height as usize * 4;
	if data.len() < expected {
		return Err(Error::NoPixelData);
	}
	BgraImage::new(mip.width, mip.height, data[..expected].to_vec())
}

/// Synthesizes an image of `extent.width() * extent.height()` identical
/// pixels from the color spec. Infallible: both inputs were validated by
/// their constructors.
pub fn from_color(color: ColorSpec, extent: Extent) -> BgraImage<'static> {
	let pixel = color.bgra();
	let count = extent.width() as usize * extent.height() as usize;
	BgraImage::from_vec(extent.width(), extent.height(), pixel.repeat(count))
}
