//! Build script for scopeline-firmware
//!
//! - Installs memory.x on the linker search path
//! - Validates scope.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Each section, with its keys and the value kind each key takes
const SCHEMA: &[(&str, &[(&str, Kind)])] = &[
    (
        "acquisition",
        &[
            ("segments_per_screen", Kind::Integer(1, 320)),
            ("pause_on_wrap", Kind::Boolean),
            ("one_shot", Kind::Choice(&["halt", "restart"])),
        ],
    ),
    (
        "display",
        &[
            ("width", Kind::Integer(1, 320)),
            ("height", Kind::Integer(1, 320)),
            ("foreground", Kind::Integer(0, 0xFFFF)),
            ("background", Kind::Integer(0, 0xFFFF)),
            ("trace", Kind::Choice(&["segmented", "continuous"])),
        ],
    ),
    (
        "serial",
        &[
            ("baudrate", Kind::Integer(1, 7_812_500)),
            ("data_bits", Kind::Integer(7, 8)),
            ("parity", Kind::Choice(&["none", "even", "odd"])),
            ("stop_bits", Kind::Integer(1, 2)),
        ],
    ),
    ("adc", &[("vref_mv", Kind::Integer(1, 0xFFFF))]),
];

#[derive(Clone, Copy)]
enum Kind {
    Integer(i64, i64),
    Boolean,
    Choice(&'static [&'static str]),
}

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate scope.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=scope.toml");

    let config_path = Path::new("scope.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: scope.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds scope.toml as its runtime configuration.    ║\n\
            ║  Please create one in the scopeline-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read scope.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in scope.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = check_schema(&config);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in scope.toml                      ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=scope.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check every section and key against [`SCHEMA`]
///
/// Sections and keys are optional; anything present must be known and
/// well-typed. Ranges are the ones the board can actually drive.
fn check_schema(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(root) = config.as_table() else {
        errors.push("top level must be a table".to_string());
        return errors;
    };

    for (section, value) in root {
        let Some(&(_, keys)) = SCHEMA.iter().find(|(name, _)| *name == section.as_str()) else {
            errors.push(format!("unknown section [{}]", section));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };

        for (key, value) in table {
            let Some(&(_, kind)) = keys.iter().find(|(name, _)| *name == key.as_str()) else {
                errors.push(format!("[{}] unknown key '{}'", section, key));
                continue;
            };
            if let Err(e) = check_value(kind, value) {
                errors.push(format!("[{}] {} {}", section, key, e));
            }
        }
    }

    errors
}

fn check_value(kind: Kind, value: &toml::Value) -> Result<(), String> {
    match (kind, value) {
        (Kind::Integer(min, max), toml::Value::Integer(v)) => {
            if (min..=max).contains(v) {
                Ok(())
            } else {
                Err(format!("must be {}-{}", min, max))
            }
        }
        (Kind::Integer(..), _) => Err("must be an integer".to_string()),
        (Kind::Boolean, toml::Value::Boolean(_)) => Ok(()),
        (Kind::Boolean, _) => Err("must be true or false".to_string()),
        (Kind::Choice(choices), toml::Value::String(s)) if choices.contains(&s.as_str()) => Ok(()),
        (Kind::Choice(choices), _) => Err(format!("must be one of {}", choices.join(", "))),
    }
}
