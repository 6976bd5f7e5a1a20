use std::env;
use std::path::{Path, PathBuf};

use crate::huffman::{code_book::CodeBook, payload::PayloadHeader, Symbol};

const CONFIG_FILE: &str = "log4rs.yaml";

/// First existing config in the working directory, next to the executable
/// or in the crate root.
fn find_config_file() -> Option<PathBuf> {
    let next_to_executable = env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|directory| directory.join(CONFIG_FILE)));
    [
        Some(PathBuf::from(CONFIG_FILE)),
        next_to_executable,
        Some(Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FILE)),
    ]
    .into_iter()
    .flatten()
    .find(|path| path.is_file())
}

#[ctor::ctor]
fn init() {
    // without a config file logging stays off
    let Some(config_file) = find_config_file() else {
        return;
    };
    if let Err(error) = log4rs::init_file(&config_file, Default::default()) {
        eprintln!(
            "Logging disabled, unable to load {}: {}",
            config_file.display(),
            error
        );
    }
}

pub fn log_payload_header(header: &PayloadHeader) {
    log::debug!(
        "payload v{} width {} entries {} bits {} data bytes {}",
        header.version,
        header.symbol_width,
        header.entry_count,
        header.bit_length,
        header.data_length
    );
}

pub fn log_code_book<S: Symbol>(code_book: &CodeBook<S>) {
    fn get_code_lines<S: Symbol>(code_book: &CodeBook<S>) -> Vec<String> {
        code_book
            .iter()
            .map(|(symbol, code)| format!("{:?}={}", symbol, code))
            .collect()
    }
    log::trace!("code book {:?}", get_code_lines(code_book));
}
