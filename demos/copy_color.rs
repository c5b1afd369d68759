#[cfg(windows)]
fn main() {
	use dibclip::{ColorSpec, Exporter, ExportRequest, Extent, MemoryStore, OsClipboard};

	env_logger::init();

	let exporter = Exporter::new(MemoryStore::new(), OsClipboard::new());
	let request = ExportRequest::SolidColor {
		color: ColorSpec::new(10, 120, 220, 255).unwrap(),
		extent: Extent::new(128, 128).unwrap(),
	};
	println!("{}", exporter.export(&request));
}

#[cfg(not(windows))]
fn main() {
	println!("this demo needs the Windows clipboard");
}
