use crate::config::AppConfig;
use crate::utils::error::{Result, SyncError};
use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

/// Bearer tokens read once at start-up; read-only afterwards.
#[derive(Clone)]
pub struct Credentials {
    pub storage_token: String,
    pub crm_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("storage_token", &"<redacted>")
            .field("crm_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn load<R: BufRead, W: Write>(config: &AppConfig, input: &mut R, output: &mut W) -> Result<Self> {
        let storage_token =
            load_token_interactive(&config.storage.token_file, "Dropbox Access Token", input, output)?;
        let crm_token = load_token_interactive(&config.crm.token_file, "Twenty API Token", input, output)?;
        Ok(Self {
            storage_token,
            crm_token,
        })
    }

    /// 只需要 storage token 的情境（產生器）
    pub fn load_storage_only<R: BufRead, W: Write>(
        config: &AppConfig,
        input: &mut R,
        output: &mut W,
    ) -> Result<String> {
        load_token_interactive(&config.storage.token_file, "Dropbox Access Token", input, output)
    }
}

/// Trimmed file content, or `None` when the file is missing or blank.
pub fn read_token(path: impl AsRef<Path>) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let token = content.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Reads the token file; while it is missing, prints instructions and waits
/// for Enter before trying again. End of input is a configuration error.
pub fn load_token_interactive<R: BufRead, W: Write>(
    token_file: &str,
    label: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    let mut prompted = false;

    loop {
        if let Some(token) = read_token(token_file)? {
            tracing::debug!("Loaded {} from {}", label, token_file);
            return Ok(token);
        }

        if prompted {
            writeln!(output, "Error: {} not found or empty. Please try again.", token_file)?;
        }

        writeln!(output, "\n{} not found.", label)?;
        writeln!(output, "Please follow these steps:")?;
        writeln!(output, "1. Create a file named '{}'", token_file)?;
        writeln!(output, "2. Paste your {} into this file", label)?;
        writeln!(output, "3. Save the file")?;
        writeln!(output, "4. Press Enter to continue...")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(SyncError::MissingConfigError {
                field: token_file.to_string(),
            });
        }
        prompted = true;
    }
}
