use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads a text file and returns its lines as a `Vec<String>`.
///
/// Corpus files hold one training phrase per line.
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/corpus.txt` + `"bin"` → `data/corpus.bin`
pub fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/corpus.txt"` → `"corpus"`
/// - `"corpus.txt"` → `"corpus"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths). Subdirectories are ignored.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_path_swaps_the_extension() {
		let path = build_output_path("data/corpus.txt", "bin").unwrap();
		assert_eq!(path, PathBuf::from("data/corpus.bin"));
	}

	#[test]
	fn filename_drops_directory_and_extension() {
		assert_eq!(get_filename("./data/corpus.txt").unwrap(), "corpus");
		assert_eq!(get_filename("corpus.txt").unwrap(), "corpus");
	}

	#[test]
	fn read_lines_splits_on_newlines() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("corpus.txt");
		std::fs::write(&file, "one phrase\nanother phrase\n").unwrap();

		assert_eq!(read_lines(&file).unwrap(), ["one phrase", "another phrase"]);
	}

	#[test]
	fn list_files_filters_by_extension() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("a.txt"), "x").unwrap();
		std::fs::write(dir.path().join("b.bin"), "x").unwrap();

		assert_eq!(list_files(dir.path(), "txt").unwrap(), ["a.txt"]);
	}
}
