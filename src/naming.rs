//! File naming for the command surface.
//!
//! `page` and `page.lhp` both name the template `page.lhp`; the generated
//! program is `page.c` and the executable `page.exe`.

use std::path::PathBuf;

pub const TEMPLATE_EXTENSION: &str = ".lhp";
pub const SOURCE_EXTENSION: &str = ".c";
pub const EXECUTABLE_EXTENSION: &str = ".exe";

/// Path of the template to read.
pub fn template_path(argument: &str) -> PathBuf {
    if argument.contains(TEMPLATE_EXTENSION) {
        PathBuf::from(argument)
    } else {
        PathBuf::from(format!("{}{}", argument, TEMPLATE_EXTENSION))
    }
}

/// Base name shared by the generated source and the executable.
pub fn output_base(argument: &str) -> String {
    if argument.contains(TEMPLATE_EXTENSION) {
        strip_extension(argument).to_string()
    } else {
        argument.to_string()
    }
}

pub fn source_path(base: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", base, SOURCE_EXTENSION))
}

pub fn executable_name(base: &str) -> String {
    format!("{}{}", base, EXECUTABLE_EXTENSION)
}

/// Remove the final extension. Dots that start a file name, or that sit in
/// a directory component, are left alone.
pub fn strip_extension(name: &str) -> &str {
    let Some(dot) = name.rfind(['.', '/', '\\']) else {
        return name;
    };
    if name.as_bytes()[dot] != b'.' || dot == 0 {
        return name;
    }
    match name.as_bytes()[dot - 1] {
        b'/' | b'\\' => name,
        _ => &name[..dot],
    }
}
