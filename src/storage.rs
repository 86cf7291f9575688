//! Upload storage for label images.
//!
//! Stored files are named `<nickname>_<unix millis>.<ext>` and addressed by
//! a relative public path such as
//! `/uploads/images/generated_images/front_1700000000000.png`.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, info};

use crate::error::{Error, Result};

pub const DEFAULT_PUBLIC_PREFIX: &str = "/uploads/images/generated_images";

const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    public_prefix: String,
}

impl ImageStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();
        Ok(ImageStore {
            root,
            public_prefix,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `bytes` and return the public path they can be fetched from.
    pub fn save(&self, nickname: &str, extension: Option<&str>, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(invalid_input("no image data uploaded"));
        }
        let stem = format!("{}_{}", sanitize(nickname, "image"), unix_millis());
        let extension = sanitize(extension.unwrap_or("png"), "png").to_lowercase();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = if attempt == 0 {
                format!("{}.{}", stem, extension)
            } else {
                format!("{}-{}.{}", stem, attempt, extension)
            };
            let path = self.root.join(&file_name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(bytes)?;
                    let public = format!("{}/{}", self.public_prefix, file_name);
                    info!("Image saved: {}", public);
                    return Ok(public);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("{} exists, trying another name", file_name);
                    continue;
                }
                Err(err) => return Err(Error::Storage(err)),
            }
        }
        Err(Error::Storage(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free file name for {}", stem),
        )))
    }

    /// Map a path returned by [`ImageStore::save`] back to the file on disk.
    pub fn resolve(&self, public_path: &str) -> Result<PathBuf> {
        let file_name = public_path
            .strip_prefix(&self.public_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| invalid_input(&format!("{} is not in this store", public_path)))?;

        if file_name.is_empty()
            || file_name.contains(&['/', '\\'][..])
            || file_name == "."
            || file_name == ".."
        {
            return Err(invalid_input(&format!(
                "{} is not a stored file name",
                file_name
            )));
        }
        Ok(self.root.join(file_name))
    }
}

fn invalid_input(msg: &str) -> Error {
    Error::Storage(io::Error::new(io::ErrorKind::InvalidInput, msg.to_string()))
}

fn sanitize(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .trim()
        .trim_start_matches('.')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
