use std::{
    fs::{File, OpenOptions},
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use threadpool::ThreadPool;

pub use cli::{CLIParser, Mode};
pub use error::Error;
use huffman::{codec, payload, report::Report};

pub mod binary_stream;
mod cli;
pub mod error;
pub mod huffman;
mod logger;

pub type Result<T> = std::result::Result<T, error::Error>;

pub struct Arguments {
    mode: Mode,
    input_file: PathBuf,
    output_file: Option<PathBuf>,
    number_of_threads: usize,
    chunk_size: usize,
}

impl Arguments {
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

fn open_input_file(file_path: &Path) -> Result<File> {
    File::open(file_path).map_err(|e| {
        Error::UnableToOpenInputFileForReading(file_path.display().to_string(), e)
    })
}

fn open_output_file(file_path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .map_err(|e| {
            Error::UnableToOpenOutputFileForWriting(file_path.display().to_string(), e)
        })
}

fn read_input_file(arguments: &Arguments) -> Result<Vec<u8>> {
    let input_file = open_input_file(&arguments.input_file)?;
    let mut input = Vec::new();
    BufReader::new(&input_file)
        .read_to_end(&mut input)
        .map_err(Error::FailedToReadInput)?;
    log::debug!(
        "Read {} bytes from {}",
        input.len(),
        arguments.input_file.display()
    );
    Ok(input)
}

fn create_output_writer(arguments: &Arguments) -> Result<BufWriter<File>> {
    let output_path = arguments
        .output_file
        .as_deref()
        .ok_or(Error::MissingOutputFile)?;
    Ok(BufWriter::new(open_output_file(output_path)?))
}

/// Encodes the bytes of the input file and writes the payload to the output
/// file.
pub fn compress_file(arguments: &Arguments) -> Result<()> {
    let input = read_input_file(arguments)?;
    let mut output_writer = create_output_writer(arguments)?;
    let threadpool = ThreadPool::new(arguments.number_of_threads);
    let result = codec::encode_in_parallel(&input, &threadpool, arguments.chunk_size)?;
    payload::write_payload(&result, &mut output_writer).map_err(Error::FailedToWriteOutput)?;
    output_writer.flush().map_err(Error::FailedToWriteOutput)?;
    Ok(())
}

/// Restores the original bytes from a payload written by [`compress_file`].
pub fn decompress_file(arguments: &Arguments) -> Result<()> {
    let input = read_input_file(arguments)?;
    let mut output_writer = create_output_writer(arguments)?;
    let symbols = payload::decompress::<u8>(&input)?;
    output_writer
        .write_all(&symbols)
        .map_err(Error::FailedToWriteOutput)?;
    output_writer.flush().map_err(Error::FailedToWriteOutput)?;
    Ok(())
}

/// Encodes the bytes of the input file and renders the code table together
/// with the achieved compression.
pub fn report_file(arguments: &Arguments) -> Result<String> {
    let input = read_input_file(arguments)?;
    let threadpool = ThreadPool::new(arguments.number_of_threads);
    let result = codec::encode_in_parallel(&input, &threadpool, arguments.chunk_size)?;
    Ok(format_report(&Report::new(&result)))
}

fn format_byte(symbol: u8) -> String {
    if symbol.is_ascii_graphic() {
        format!("'{}'", symbol as char)
    } else {
        format!("0x{:02X}", symbol)
    }
}

fn format_report(report: &Report<u8>) -> String {
    let mut text = format!("{:<8} {:>12}  code\n", "symbol", "frequency");
    for row in &report.rows {
        text.push_str(&format!(
            "{:<8} {:>12}  {}\n",
            format_byte(row.symbol),
            row.frequency,
            row.code
        ));
    }
    let statistics = &report.statistics;
    let ratio = statistics
        .ratio()
        .map_or_else(|| "n/a".to_owned(), |ratio| format!("{:.4}", ratio));
    text.push_str(&format!(
        "original bits:   {}\ncompressed bits: {}\nratio:           {}\n",
        statistics.original_bits, statistics.compressed_bits, ratio
    ));
    text
}

/// Writes the report to the output file if one is given, otherwise hands
/// the text back for printing.
fn write_report(arguments: &Arguments, report: String) -> Result<Option<String>> {
    if arguments.output_file.is_none() {
        return Ok(Some(report));
    }
    let mut output_writer = create_output_writer(arguments)?;
    output_writer
        .write_all(report.as_bytes())
        .map_err(Error::FailedToWriteOutput)?;
    output_writer.flush().map_err(Error::FailedToWriteOutput)?;
    Ok(None)
}

/// Dispatches to the operation selected by `arguments.mode`.
pub fn run(arguments: &Arguments) -> Result<Option<String>> {
    match arguments.mode {
        Mode::Encode => compress_file(arguments).map(|_| None),
        Mode::Decode => decompress_file(arguments).map(|_| None),
        Mode::Report => write_report(arguments, report_file(arguments)?),
    }
}

#[cfg(test)]
mod test {
    use super::{format_byte, format_report};
    use crate::huffman::{codec::encode, report::Report};

    #[test]
    fn test_format_byte() {
        assert_eq!(format_byte(b'a'), "'a'");
        assert_eq!(format_byte(b' '), "0x20");
        assert_eq!(format_byte(0xFF), "0xFF");
    }

    #[test]
    fn test_format_report() {
        let report = Report::new(&encode(b"aab").unwrap());
        let text = format_report(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("'a'"));
        assert!(lines[1].ends_with("  1"));
        assert!(lines[2].starts_with("'b'"));
        assert!(lines[2].ends_with("  0"));
        assert_eq!(lines[3], "original bits:   24");
        assert_eq!(lines[4], "compressed bits: 3");
        assert_eq!(lines[5], "ratio:           0.1250");
    }

    #[test]
    fn test_format_empty_report() {
        let report = Report::new(&encode::<u8>(&[]).unwrap());
        assert!(format_report(&report).ends_with("ratio:           n/a\n"));
    }
}
