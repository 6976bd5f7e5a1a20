use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    EmptyInput,
    EmptyTree,
    UnknownSymbol(String),
    TruncatedCode { bit_position: usize },
    EndOfStream,
    UnassignedCode { bit_position: usize },
    MalformedTree(&'static str),
    MalformedPayload(&'static str),
    DecodedLengthMismatch { expected: u64, actual: u64 },
    BitStreamIo(std::io::Error),
    MissingOutputFile,
    UnableToOpenInputFileForReading(String, std::io::Error),
    UnableToOpenOutputFileForWriting(String, std::io::Error),
    FailedToReadInput(std::io::Error),
    FailedToWriteOutput(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "No symbols to process"),
            Self::EmptyTree => write!(f, "Huffman tree has no root node"),
            Self::UnknownSymbol(symbol) => {
                write!(f, "Symbol {} not present in code book", symbol)
            }
            Self::TruncatedCode { bit_position } => {
                write!(
                    f,
                    "Bitstream ended in the middle of a code word at bit {}",
                    bit_position
                )
            }
            Self::EndOfStream => write!(f, "Attempted to read past the end of the bitstream"),
            Self::UnassignedCode { bit_position } => {
                write!(
                    f,
                    "Bit pattern ending at bit {} is not assigned to any symbol",
                    bit_position
                )
            }
            Self::MalformedTree(reason) => write!(f, "Malformed Huffman tree: {}", reason),
            Self::MalformedPayload(reason) => write!(f, "Malformed payload: {}", reason),
            Self::DecodedLengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Decoded {} symbols, but the payload declares {}",
                    actual, expected
                )
            }
            Self::BitStreamIo(error) => write!(f, "Failed to write bitstream: {}", error),
            Self::MissingOutputFile => {
                write!(f, "An output file is required for this mode")
            }
            Self::UnableToOpenInputFileForReading(path, error) => {
                write!(
                    f,
                    "Unable to open input file '{}' for reading: {}",
                    path, error
                )
            }
            Self::UnableToOpenOutputFileForWriting(path, error) => {
                write!(
                    f,
                    "Unable to open output file '{}' for writing: {}",
                    path, error
                )
            }
            Self::FailedToReadInput(error) => write!(f, "Failed to read input: {}", error),
            Self::FailedToWriteOutput(error) => write!(f, "Failed to write output: {}", error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BitStreamIo(error)
            | Self::UnableToOpenInputFileForReading(_, error)
            | Self::UnableToOpenOutputFileForWriting(_, error)
            | Self::FailedToReadInput(error)
            | Self::FailedToWriteOutput(error) => Some(error),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::BitStreamIo(error)
    }
}
