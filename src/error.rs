use thiserror::Error;

// Everything that can go wrong while loading a module. All of these are
// fatal to the load; a Module either decodes completely or not at all.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("not a CTRA module (bad magic)")]
    BadMagic,

    #[error("unsupported CTRA version {0} (this build reads version 1)")]
    UnsupportedVersion(u32),

    #[error("corrupt module data: {0}")]
    Corrupt(String),

    #[error("invalid module configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
