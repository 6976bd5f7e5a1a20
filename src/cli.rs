use crate::Arguments;
use clap::{
    arg, builder::PossibleValue, crate_authors, crate_description, crate_name, crate_version,
    value_parser, Arg, ArgMatches, Command, ValueEnum,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::{io, thread};

const DEFAULT_CHUNK_SIZE: &str = "65536";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
    Report,
}

impl ValueEnum for Mode {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Encode, Self::Decode, Self::Report]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Self::Encode => Some(PossibleValue::new("encode")),
            Self::Decode => Some(PossibleValue::new("decode")),
            Self::Report => Some(PossibleValue::new("report")),
        }
    }
}

pub struct CLIParser {
    command: Command,
}

impl CLIParser {
    pub fn new() -> Self {
        let command = Self::create_base_command();
        let command = Self::register_arguments(command);
        CLIParser { command }
    }

    pub fn parse<I, T>(&mut self, itr: I) -> Arguments
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command
            .try_get_matches_from_mut(itr)
            .unwrap_or_else(|e| e.exit());
        Self::extract_arguments(&matches)
    }

    fn register_arguments(command: Command) -> Command {
        let command = Self::register_mode_argument(command);
        let command = Self::register_input_file_argument(command);
        let command = Self::register_output_file_argument(command);
        let command = Self::register_threads_argument(command);
        Self::register_chunk_size_argument(command)
    }

    fn register_mode_argument(command: Command) -> Command {
        command.arg(Self::create_mode_argument())
    }

    fn register_input_file_argument(command: Command) -> Command {
        command.arg(Self::create_input_file_argument())
    }

    fn register_output_file_argument(command: Command) -> Command {
        command.arg(Self::create_output_file_argument())
    }

    fn register_threads_argument(command: Command) -> Command {
        command.arg(Self::create_threads_argument())
    }

    fn register_chunk_size_argument(command: Command) -> Command {
        command.arg(Self::create_chunk_size_argument())
    }

    fn create_base_command() -> Command {
        Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
    }

    fn create_mode_argument() -> Arg {
        Arg::new("mode")
            .help("Encode a file, decode a payload or report the code of a file")
            .value_parser(value_parser!(Mode))
            .required(true)
    }

    fn create_input_file_argument() -> Arg {
        Arg::new("input_file")
            .help("Path to the input file")
            .value_parser(value_parser!(PathBuf))
            .required(true)
    }

    fn create_output_file_argument() -> Arg {
        Arg::new("output_file")
            .help("Path to the output file, required for encode and decode")
            .value_parser(value_parser!(PathBuf))
            .required(false)
    }

    fn create_threads_argument() -> Arg {
        arg!(-t --threads <THREADS> "Number of threads counting symbol frequencies")
            .default_value(get_number_of_threads().unwrap_or(1).to_string())
            .required(false)
            .value_parser(value_parser!(usize))
    }

    fn create_chunk_size_argument() -> Arg {
        arg!(chunk_size: -c --chunk_size <SYMBOLS> "Number of symbols counted per job")
            .default_value(DEFAULT_CHUNK_SIZE)
            .required(false)
            .value_parser(value_parser!(usize))
    }

    fn extract_arguments(matches: &ArgMatches) -> Arguments {
        Arguments {
            mode: Self::extract_mode_argument(matches),
            input_file: Self::extract_input_file_argument(matches),
            output_file: Self::extract_output_file_argument(matches),
            number_of_threads: Self::extract_threads_argument(matches),
            chunk_size: Self::extract_chunk_size_argument(matches),
        }
    }

    fn extract_mode_argument(matches: &ArgMatches) -> Mode {
        matches
            .get_one::<Mode>("mode")
            .expect("Required argument mode not provided")
            .to_owned()
    }

    fn extract_input_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("input_file")
            .expect("Required argument input_file not provided")
            .clone()
    }

    fn extract_output_file_argument(matches: &ArgMatches) -> Option<PathBuf> {
        matches.get_one::<PathBuf>("output_file").cloned()
    }

    fn extract_threads_argument(matches: &ArgMatches) -> usize {
        matches
            .get_one::<usize>("threads")
            .expect("Number of threads must be provided, but was unset.")
            .to_owned()
            .max(1)
    }

    fn extract_chunk_size_argument(matches: &ArgMatches) -> usize {
        matches
            .get_one::<usize>("chunk_size")
            .expect("Chunk size must be provided, but was unset.")
            .to_owned()
    }
}

impl Default for CLIParser {
    fn default() -> Self {
        Self::new()
    }
}

fn get_number_of_threads() -> io::Result<usize> {
    Ok(thread::available_parallelism()?.get())
}

#[cfg(test)]
mod tests {
    use clap::{error::ErrorKind, Command};

    use super::{CLIParser, Mode};

    const PROGRAM_NAME_ARGUMENT: &str = "test_program_name";

    #[test]
    fn parse_mode_argument() {
        let command = Command::new("test");
        let command = CLIParser::register_mode_argument(command);
        let matches = command.get_matches_from(vec![PROGRAM_NAME_ARGUMENT, "decode"]);
        let mode = CLIParser::extract_mode_argument(&matches);
        assert_eq!(mode, Mode::Decode);
    }

    #[test]
    fn parse_mode_illegal_argument() {
        let command = Command::new("test");
        let command = CLIParser::register_mode_argument(command);
        let result = command.try_get_matches_from(vec![PROGRAM_NAME_ARGUMENT, "compress"]);
        if let Err(error) = result {
            assert_eq!(error.kind(), ErrorKind::InvalidValue);
        } else {
            panic!("Illegal value for mode not detected");
        }
    }

    #[test]
    fn parse_input_file_argument() {
        let input_file_name = "testfile.txt";
        let command = Command::new("test");
        let command = CLIParser::register_input_file_argument(command);
        let matches = command.get_matches_from(vec![PROGRAM_NAME_ARGUMENT, input_file_name]);
        let input_file = CLIParser::extract_input_file_argument(&matches);
        assert_eq!(input_file.file_name().unwrap(), input_file_name);
    }

    #[test]
    fn parse_missing_output_file_argument() {
        let command = Command::new("test");
        let command = CLIParser::register_output_file_argument(command);
        let matches = command.get_matches_from(vec![PROGRAM_NAME_ARGUMENT]);
        assert_eq!(CLIParser::extract_output_file_argument(&matches), None);
    }

    #[test]
    fn parse_number_of_threads_argument() {
        let command = Command::new("test");
        let command = CLIParser::register_threads_argument(command);
        let matches = command.get_matches_from(vec![PROGRAM_NAME_ARGUMENT, "--threads", "5"]);
        let actual = CLIParser::extract_threads_argument(&matches);
        assert_eq!(actual, 5);
    }

    #[test]
    fn parse_zero_threads_falls_back_to_one() {
        let command = Command::new("test");
        let command = CLIParser::register_threads_argument(command);
        let matches = command.get_matches_from(vec![PROGRAM_NAME_ARGUMENT, "-t", "0"]);
        assert_eq!(CLIParser::extract_threads_argument(&matches), 1);
    }

    #[test]
    fn parse_chunk_size_argument() {
        let command = Command::new("test");
        let command = CLIParser::register_chunk_size_argument(command);
        let matches = command.get_matches_from(vec![PROGRAM_NAME_ARGUMENT, "-c", "1024"]);
        assert_eq!(CLIParser::extract_chunk_size_argument(&matches), 1024);
    }

    #[test]
    fn parse_required_arguments_only() {
        let input_file_name = "input.txt";
        let input_file_path = format!("/input_directory/{}", input_file_name);
        let output_file_name = "output.huf";
        let output_file_path = format!("/output_directory/{}", output_file_name);
        let mut cli_parser = CLIParser::default();
        let arguments = cli_parser.parse(vec![
            PROGRAM_NAME_ARGUMENT,
            "encode",
            &input_file_path,
            &output_file_path,
        ]);
        assert_eq!(arguments.mode, Mode::Encode, "mode does not match");
        assert_eq!(
            arguments.input_file.file_name().unwrap(),
            input_file_name,
            "input file does not match"
        );
        assert_eq!(
            arguments.output_file.unwrap().file_name().unwrap(),
            output_file_name,
            "output file does not match"
        );
        assert_eq!(arguments.chunk_size, 65536, "chunk_size does not match");
        assert!(arguments.number_of_threads >= 1);
    }
}
