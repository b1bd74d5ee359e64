extern crate log;
extern crate simplelog;

use std::fs::File;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use hlasm_core::compiler::diagnostics::Logger;
use hlasm_core::compiler::processing::{ProcessingManager, SimpleFieldReparser};
use hlasm_core::diagnostics::config::Tracing;
use hlasm_core::diagnostics::{ConsoleWriter, JsonWriter};
use hlasm_core::io::read_statements;
use hlasm_core::*;

fn main() -> Result<(), i32> {
    let config = configure_cli().get_matches();

    if let Some(level) = get_log_level(&config) {
        if let Err(e) = configure_logging(level) {
            eprintln!("Failed to configure logger: {}", e);
        }
    }

    let tracing = match get_tracing(&config) {
        Ok(t) => t,
        Err(msg) => {
            print_errs(&[msg]);
            return Err(ERR_CONFIG_ERROR);
        }
    };

    let input = match config.value_of("input") {
        Some(input) => input,
        None => {
            print_errs(&["Expected an input file of source statements".into()]);
            return Err(ERR_CONFIG_ERROR);
        }
    };
    let src_path = Path::new(input);
    let statements = match read_statements(src_path) {
        Ok(stmts) => stmts,
        Err(msg) => {
            print_errs(&[msg]);
            return Err(ERR_INPUT_ERROR);
        }
    };

    let file = src_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("OPENCODE");

    let process_time = Instant::now();
    let mut manager = ProcessingManager::new(file, Rc::new(SimpleFieldReparser));
    manager.set_tracing(tracing);
    for (idx, stmt) in statements.iter().enumerate() {
        let stmt = stmt.to_statement(idx as u32, manager.context().ids());
        manager.process(stmt);
    }
    manager.finish();
    let process_duration = process_time.elapsed();
    eprintln!("Processing: {}", process_duration.as_secs_f32());

    let diags = manager.take_diags();

    // Setup the diagnostic writers
    let console_writer = ConsoleWriter::new(input);
    let json_writer = match get_json_output(&config) {
        Some(path) => match File::create(path) {
            Ok(f) => Some(JsonWriter::new(f)),
            Err(e) => {
                print_errs(&[format!("Could not create {}: {}", path, e)]);
                return Err(ERR_OUTPUT_ERROR);
            }
        },
        None => None,
    };

    let mut logger = Logger::new();
    if enable_console(&config) {
        logger.add_writer(&console_writer);
    }
    if let Some(w) = &json_writer {
        logger.add_writer(w);
    }

    logger.write_all(&diags);
    logger.finish();

    if diags.is_empty() {
        Ok(())
    } else {
        Err(ERR_DIAGNOSTICS)
    }
}
