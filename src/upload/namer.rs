// Destination file naming
// Random base names come from an injected generator so tests can seed it

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Length of a randomized base name
pub const RANDOM_NAME_LEN: usize = 25;

/// Produces destination names for uploaded files
#[derive(Debug, Clone)]
pub struct FileNamer<R = StdRng> {
    rng: R,
}

impl FileNamer<StdRng> {
    /// Namer backed by a CSPRNG seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl Default for FileNamer<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: RngCore> FileNamer<R> {
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Random alphanumeric string of `len` characters
    pub fn random_string(&mut self, len: usize) -> String {
        (&mut self.rng)
            .sample_iter(Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }

    /// Destination name for `original`
    ///
    /// With `rename` the base name is replaced by `RANDOM_NAME_LEN` random
    /// characters and the extension is kept as given; without it the name is
    /// returned unchanged.
    pub fn name(&mut self, original: &str, rename: bool) -> String {
        if !rename {
            return original.to_string();
        }
        let base = self.random_string(RANDOM_NAME_LEN);
        match extension(original) {
            Some(ext) => format!("{base}.{ext}"),
            None => base,
        }
    }
}

/// Substring after the final '.', if the name has one
pub fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Final path component of a client-supplied file name
///
/// Both '/' and '\\' separate components. Returns `None` when nothing usable
/// remains.
pub fn base_name(name: &str) -> Option<&str> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    match last {
        "" | "." | ".." => None,
        _ => Some(last),
    }
}
