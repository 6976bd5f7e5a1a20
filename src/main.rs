use std::env::args_os;

use huffman_codec::{run, CLIParser};

fn main() {
    let mut cli_parser = CLIParser::default();
    let arguments = cli_parser.parse(args_os());
    match run(&arguments) {
        Ok(Some(report)) => print!("{}", report),
        Ok(None) => println!("{:?} successful", arguments.mode()),
        Err(e) => eprintln!("{:?} failed because of: {}", arguments.mode(), e),
    }
}
