use discovery_model::SecretName;
use log::trace;
use snafu::{OptionExt, ResultExt};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads the keys (which are files) and values of a secret that the framework has mounted as a
/// directory, e.g. `<job dir>/secrets/vc-creds/username`.
#[derive(Debug, Clone)]
pub struct SecretsReader {
    /// The directory where secrets are mounted.
    dir: PathBuf,
}

#[derive(Debug)]
pub struct Error {
    name: SecretName,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    pub fn new(name: SecretName) -> Self {
        Self { name, source: None }
    }

    pub fn new_with_source<E>(name: SecretName, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            name,
            source: Some(source.into()),
        }
    }

    pub fn secret_name(&self) -> &SecretName {
        &self.name
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            None => write!(f, "Unable to read secret '{}'", self.name),
            Some(e) => write!(f, "Unable to read secret '{}': {}", self.name, e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|some| some.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
pub type SecretData = BTreeMap<String, Vec<u8>>;

impl SecretsReader {
    /// Create a new `SecretsReader` that looks for secrets in `directory`.
    pub fn new<P>(directory: P) -> SecretsReader
    where
        P: Into<PathBuf>,
    {
        Self {
            dir: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Get the key/value pairs of a secret.
    pub fn get_secret(&self, secret_name: &SecretName) -> Result<SecretData> {
        let mut map = SecretData::new();
        let directory = self.dir.join(secret_name.as_str());
        trace!("Reading secret '{}' from '{}'", secret_name, directory.display());
        let read_dir = fs::read_dir(&directory).with_context(|_| error::ListDirectorySnafu {
            name: secret_name.to_owned(),
            directory: &directory,
        })?;
        for entry in read_dir.map(|result| {
            result.with_context(|_| error::ListDirectorySnafu {
                name: secret_name.to_owned(),
                directory: &directory,
            })
        }) {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let key = path
                .file_name()
                .with_context(|| error::MissingFilenameSnafu {
                    name: secret_name.to_owned(),
                    path: &path,
                })?
                .to_str()
                .with_context(|| error::NonUtf8FilenameSnafu {
                    name: secret_name.to_owned(),
                    path: &path,
                })?
                .to_owned();
            let value = fs::read(&path).with_context(|_| error::ReadFileSnafu {
                name: secret_name.to_owned(),
                path: &path,
            })?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Get a single key of a secret as a UTF-8 string with surrounding whitespace removed, which
    /// is how credentials written by hand (`echo secret > password`) are expected to be read.
    pub fn get_secret_value(&self, secret_name: &SecretName, key: &str) -> Result<String> {
        let data = self.get_secret(secret_name)?;
        let value = data
            .get(key)
            .with_context(|| error::MissingKeySnafu {
                name: secret_name.to_owned(),
                key,
            })?
            .to_owned();
        let value = String::from_utf8(value).with_context(|_| error::NonUtf8ValueSnafu {
            name: secret_name.to_owned(),
            key,
        })?;
        Ok(value.trim().to_string())
    }

    /// Write a secret so that `get_secret` can read it back. Used when preparing a job directory.
    pub fn write_secret<'a, I>(&self, secret_name: &SecretName, data: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let directory = self.dir.join(secret_name.as_str());
        fs::create_dir_all(&directory).with_context(|_| error::CreateDirectorySnafu {
            name: secret_name.to_owned(),
            directory: &directory,
        })?;
        for (key, value) in data {
            let path = directory.join(key);
            fs::write(&path, value).with_context(|_| error::WriteFileSnafu {
                name: secret_name.to_owned(),
                path: &path,
            })?;
            restrict_permissions(&path).with_context(|_| error::WriteFileSnafu {
                name: secret_name.to_owned(),
                path: &path,
            })?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

mod error {
    use discovery_model::SecretName;
    use snafu::Snafu;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub enum OpaqueError {
        #[snafu(display("Unable to create directory '{}': {}", directory.display(), source))]
        CreateDirectory {
            name: SecretName,
            directory: PathBuf,
            source: std::io::Error,
        },

        #[snafu(display("Unable to list contents of directory '{}': {}", directory.display(), source))]
        ListDirectory {
            name: SecretName,
            directory: PathBuf,
            source: std::io::Error,
        },

        #[snafu(display("Key '{}' is missing", key))]
        MissingKey { name: SecretName, key: String },

        #[snafu(display("Unable to get filename from path '{}'", path.display()))]
        MissingFilename { name: SecretName, path: PathBuf },

        #[snafu(display("Non-UTF8 filename in path '{}'", path.display()))]
        NonUtf8Filename { name: SecretName, path: PathBuf },

        #[snafu(display("Value of key '{}' is not valid UTF-8: {}", key, source))]
        NonUtf8Value {
            name: SecretName,
            key: String,
            source: std::string::FromUtf8Error,
        },

        #[snafu(display("Unable to read file '{}': {}", path.display(), source))]
        ReadFile {
            name: SecretName,
            path: PathBuf,
            source: std::io::Error,
        },

        #[snafu(display("Unable to write file '{}': {}", path.display(), source))]
        WriteFile {
            name: SecretName,
            path: PathBuf,
            source: std::io::Error,
        },
    }

    impl OpaqueError {
        fn secret_name(&self) -> &SecretName {
            match self {
                OpaqueError::CreateDirectory { name, .. } => name,
                OpaqueError::ListDirectory { name, .. } => name,
                OpaqueError::MissingKey { name, .. } => name,
                OpaqueError::MissingFilename { name, .. } => name,
                OpaqueError::NonUtf8Filename { name, .. } => name,
                OpaqueError::NonUtf8Value { name, .. } => name,
                OpaqueError::ReadFile { name, .. } => name,
                OpaqueError::WriteFile { name, .. } => name,
            }
        }
    }

    impl From<OpaqueError> for super::Error {
        fn from(e: OpaqueError) -> Self {
            let name = e.secret_name().to_owned();
            super::Error::new_with_source(name, e)
        }
    }
}

#[test]
fn test() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let dir = tempdir.path();
    let key1 = "username";
    let value1 = "administrator@vsphere.local";
    let key2 = "password";
    let value2 = "hunter2\n";
    let secret_name = SecretName::new("vc-creds").unwrap();
    let secret_dir = dir.join(secret_name.as_str());
    fs::create_dir_all(&secret_dir).unwrap();
    fs::write(secret_dir.join(key1), value1).unwrap();
    fs::write(secret_dir.join(key2), value2).unwrap();
    let secrets = SecretsReader::new(dir);
    let data = secrets.get_secret(&secret_name).unwrap();
    assert_eq!(
        String::from_utf8(data.get(key1).unwrap().to_owned()).unwrap(),
        value1
    );
    assert_eq!(
        secrets.get_secret_value(&secret_name, key2).unwrap(),
        "hunter2"
    );
    let missing = secrets.get_secret_value(&secret_name, "token").unwrap_err();
    assert_eq!(missing.secret_name(), &secret_name);
}

#[test]
fn write_then_read() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let secrets = SecretsReader::new(tempdir.path());
    let secret_name = SecretName::new("netbox").unwrap();
    secrets
        .write_secret(&secret_name, vec![("token", "abc123".as_bytes())])
        .unwrap();
    assert_eq!(
        secrets.get_secret_value(&secret_name, "token").unwrap(),
        "abc123"
    );
}
